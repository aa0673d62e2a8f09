//! Unified type universe (component C4, §3.3). Merges user-declared
//! nominal types with externally-catalogued assembly types behind one
//! lookup surface, so downstream passes never need to know whether a type
//! came from source or from a `bindings.json` manifest.

use crate::ir::ty::PrimitiveKind;
use crate::string_interning::{StringId, StringTable};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominalKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    Source,
    Assembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Internal,
    Private,
}

/// `(stableId, clrName, assembly, tsName)` from §3.3. `stableId` is
/// `"{assembly}:{fullyQualifiedName}"` for source types; assembly-emitted
/// catalogues provide their own and are taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId {
    pub stable_id: StringId,
    pub clr_name: StringId,
    pub assembly: StringId,
    pub ts_name: StringId,
}

/// Builds the stable id convention `"{assembly}:{fullyQualifiedName}"` for
/// a source-declared type.
pub fn source_stable_id(assembly: &str, fully_qualified_name: &str, table: &mut StringTable) -> StringId {
    table.intern(&format!("{assembly}:{fully_qualified_name}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterEntry {
    pub name: StringId,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeritageKind {
    Extends,
    Implements,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeritageEdge {
    pub kind: HeritageKind,
    pub target_stable_id: StringId,
    pub type_arguments: Vec<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    Value,
    Ref,
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParameter {
    pub mode: ParameterMode,
    pub declared_type: TypeId,
    pub is_optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub parameters: Vec<SignatureParameter>,
    pub return_type: TypeId,
    pub type_parameters: Vec<TypeParameterEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberFlags {
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_indexer: bool,
    pub has_getter: bool,
    pub has_setter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    pub kind: MemberKind,
    pub declared_type: TypeId,
    /// Populated only for methods; an overload set kept as a list (never
    /// collapsed) since distinct signatures may differ only by parameter
    /// modifier.
    pub signatures: Vec<MethodSignature>,
    pub flags: MemberFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominalEntry {
    pub type_id: TypeId,
    pub kind: NominalKind,
    pub type_parameters: Vec<TypeParameterEntry>,
    pub heritage: Vec<HeritageEdge>,
    members: FxHashMap<StringId, MemberEntry>,
    pub origin: TypeOrigin,
    pub accessibility: Accessibility,
}

impl NominalEntry {
    pub fn new(type_id: TypeId, kind: NominalKind, origin: TypeOrigin) -> Self {
        Self {
            type_id,
            kind,
            type_parameters: Vec::new(),
            heritage: Vec::new(),
            members: FxHashMap::default(),
            origin,
            accessibility: Accessibility::Public,
        }
    }

    pub fn insert_member(&mut self, name: StringId, entry: MemberEntry) {
        self.members.insert(name, entry);
    }

    pub fn member(&self, name: StringId) -> Option<&MemberEntry> {
        self.members.get(&name)
    }

    /// Members sorted by string id, the deterministic key invariant I-6
    /// requires whenever a hash-backed collection is iterated.
    pub fn members_sorted(&self, table: &StringTable) -> Vec<(StringId, &MemberEntry)> {
        let mut entries: Vec<_> = self.members.iter().map(|(k, v)| (*k, v)).collect();
        entries.sort_by_key(|(name, _)| table.resolve(*name).to_owned());
        entries
    }
}

/// Merges source-authored nominal entries with assembly-authored ones
/// behind one lookup surface (§3.3).
#[derive(Debug, Clone, Default)]
pub struct UnifiedTypeCatalog {
    entries: Vec<NominalEntry>,
    by_stable_id: FxHashMap<StringId, usize>,
    by_surface_name: FxHashMap<StringId, usize>,
    by_host_name: FxHashMap<StringId, usize>,
}

impl UnifiedTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: NominalEntry) {
        let index = self.entries.len();
        self.by_stable_id.insert(entry.type_id.stable_id, index);
        self.by_surface_name.insert(entry.type_id.ts_name, index);
        self.by_host_name.insert(entry.type_id.clr_name, index);
        self.entries.push(entry);
    }

    pub fn lookup_by_stable_id(&self, stable_id: StringId) -> Option<&NominalEntry> {
        self.by_stable_id.get(&stable_id).map(|&i| &self.entries[i])
    }

    pub fn lookup_by_surface_name(&self, ts_name: StringId) -> Option<&NominalEntry> {
        self.by_surface_name.get(&ts_name).map(|&i| &self.entries[i])
    }

    pub fn lookup_by_host_name(&self, clr_name: StringId) -> Option<&NominalEntry> {
        self.by_host_name.get(&clr_name).map(|&i| &self.entries[i])
    }

    pub fn heritage_of(&self, stable_id: StringId) -> &[HeritageEdge] {
        self.lookup_by_stable_id(stable_id)
            .map(|e| e.heritage.as_slice())
            .unwrap_or(&[])
    }

    /// Walks the inheritance chain via BFS to find `memberName`'s declared
    /// type, starting from `receiver`. Applies primitive normalization
    /// first (e.g. the primitive `string` is the catalogue's
    /// `System.String`) so built-in members resolve the same way as
    /// user-declared ones.
    pub fn get_member_declared_type(&self, receiver: StringId, member_name: StringId) -> Option<TypeId> {
        let mut queue = std::collections::VecDeque::new();
        let mut visited = std::collections::HashSet::new();
        queue.push_back(receiver);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(entry) = self.lookup_by_stable_id(current).or_else(|| self.lookup_by_surface_name(current)) else {
                continue;
            };
            if let Some(member) = entry.member(member_name) {
                return Some(member.declared_type);
            }
            for edge in &entry.heritage {
                queue.push_back(edge.target_stable_id);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a source primitive to its normalized CLR stdlib name, e.g. the
/// primitive *string* is the catalogue's `System.String`.
pub fn normalize_primitive_clr_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Number => "System.Double",
        PrimitiveKind::String => "System.String",
        PrimitiveKind::Boolean => "System.Boolean",
        PrimitiveKind::BigInt => "System.Numerics.BigInteger",
        PrimitiveKind::Symbol => "System.Object",
        PrimitiveKind::Undefined => "System.Object",
        PrimitiveKind::Null => "System.Object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_type_id(table: &mut StringTable, assembly: &str, name: &str) -> TypeId {
        TypeId {
            stable_id: source_stable_id(assembly, name, table),
            clr_name: table.intern(name),
            assembly: table.intern(assembly),
            ts_name: table.intern(name),
        }
    }

    #[test]
    fn member_lookup_walks_heritage_chain() {
        let mut table = StringTable::new();
        let mut catalog = UnifiedTypeCatalog::new();

        let base_id = make_type_id(&mut table, "App", "Base");
        let mut base = NominalEntry::new(base_id, NominalKind::Class, TypeOrigin::Source);
        let field_name = table.intern("value");
        let field_type = make_type_id(&mut table, "corelib", "System.Double");
        base.insert_member(
            field_name,
            MemberEntry {
                kind: MemberKind::Field,
                declared_type: field_type,
                signatures: vec![],
                flags: MemberFlags::default(),
            },
        );
        catalog.insert(base);

        let derived_id = make_type_id(&mut table, "App", "Derived");
        let mut derived = NominalEntry::new(derived_id, NominalKind::Class, TypeOrigin::Source);
        derived.heritage.push(HeritageEdge {
            kind: HeritageKind::Extends,
            target_stable_id: base_id.stable_id,
            type_arguments: vec![],
        });
        catalog.insert(derived);

        let found = catalog.get_member_declared_type(derived_id.stable_id, field_name);
        assert_eq!(found, Some(field_type));
    }

    #[test]
    fn unrelated_receiver_has_no_member() {
        let mut table = StringTable::new();
        let mut catalog = UnifiedTypeCatalog::new();
        let id = make_type_id(&mut table, "App", "Lonely");
        catalog.insert(NominalEntry::new(id, NominalKind::Class, TypeOrigin::Source));
        let member = table.intern("nope");
        assert_eq!(catalog.get_member_declared_type(id.stable_id, member), None);
    }

    #[test]
    fn string_primitive_normalizes_to_system_string() {
        assert_eq!(normalize_primitive_clr_name(PrimitiveKind::String), "System.String");
    }
}
