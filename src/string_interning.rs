//! Centralized string interning for identifiers, module specifiers, and CLR
//! names flowing through the IR. Every name the IR stores is a [`StringId`];
//! nothing identifier-shaped is kept as an owned `String` once it is past
//! the IR builder, so IR nodes stay `Copy`-cheap to compare and hash.

use rustc_hash::FxHashMap;

/// A unique identifier for an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn resolve(self, table: &StringTable) -> &str {
        table.resolve(self)
    }
}

/// Dual-mapping string interner: `Vec<Box<str>>` for O(1) id -> string, and
/// an `FxHashMap` for O(1) string -> id during interning.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<Box<str>>,
    string_to_id: FxHashMap<Box<str>, StringId>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
            string_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern a string slice, returning its unique, stable id.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(existing) = self.string_to_id.get(s) {
            return *existing;
        }
        self.intern_new(s)
    }

    #[cold]
    fn intern_new(&mut self, s: &str) -> StringId {
        let id = StringId(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.string_to_id.insert(boxed, id);
        id
    }

    #[inline]
    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    pub fn try_resolve(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(|s| s.as_ref())
    }

    pub fn get_existing(&self, s: &str) -> Option<StringId> {
        self.string_to_id.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.intern("System.String");
        let b = table.intern("System.String");
        assert_eq!(a, b);
        assert_eq!(table.resolve(a), "System.String");
    }

    #[test]
    fn distinct_strings_get_distinct_ids() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        assert_ne!(a, b);
    }
}
