//! CLR-alias resolver (component C5, §2). Resolves a surface type name
//! (as written in an import specifier or type position) through an alias
//! table into the unified universe, stratifying failures: a missing
//! stdlib type is fatal, a missing third-party type is an ordinary error.

use crate::binding::universe::{TypeId, UnifiedTypeCatalog};
use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, ErrorLocation};
use crate::string_interning::{StringId, StringTable};
use rustc_hash::FxHashMap;

/// Whether an assembly backing an alias is part of the host runtime's
/// standard library (missing = fatal) or a third-party package
/// (missing = ordinary error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyOrigin {
    Stdlib,
    ThirdParty,
}

#[derive(Debug, Clone)]
pub struct AliasEntry {
    pub target_stable_id: StringId,
    pub origin: AssemblyOrigin,
}

/// Maps surface alias names (as they appear in source, e.g. `"List"` for
/// `System.Collections.Generic.List`) to a universe stable id.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: FxHashMap<StringId, AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, surface_name: StringId, entry: AliasEntry) {
        self.aliases.insert(surface_name, entry);
    }

    pub fn get(&self, surface_name: StringId) -> Option<&AliasEntry> {
        self.aliases.get(&surface_name)
    }
}

pub enum AliasResolution {
    Resolved(TypeId),
    Diagnostic(Diagnostic),
}

/// Resolves `surface_name` through `aliases` into `universe`. A surface
/// name with no alias entry at all is treated as third-party-missing
/// (conservative default); an alias entry whose target the universe does
/// not contain is stratified by the alias's recorded origin.
pub fn resolve_surface_type(
    surface_name: StringId,
    aliases: &AliasTable,
    universe: &UnifiedTypeCatalog,
    location: ErrorLocation,
    table: &StringTable,
) -> AliasResolution {
    let Some(alias) = aliases.get(surface_name) else {
        return AliasResolution::Diagnostic(Diagnostic::new(
            DiagCode::UnresolvedBinding,
            format!("no binding alias for '{}'", table.resolve(surface_name)),
            location,
        ));
    };

    match universe.lookup_by_stable_id(alias.target_stable_id) {
        Some(entry) => AliasResolution::Resolved(entry.type_id),
        None => {
            let code = match alias.origin {
                AssemblyOrigin::Stdlib => DiagCode::MissingStdlibType,
                AssemblyOrigin::ThirdParty => DiagCode::UnresolvedBinding,
            };
            AliasResolution::Diagnostic(Diagnostic::new(
                code,
                format!(
                    "alias '{}' targets '{}', which is not in the loaded universe",
                    table.resolve(surface_name),
                    table.resolve(alias.target_stable_id)
                ),
                location,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::universe::{NominalEntry, NominalKind, TypeOrigin, source_stable_id};

    #[test]
    fn missing_stdlib_alias_target_is_fatal() {
        let mut table = StringTable::new();
        let universe = UnifiedTypeCatalog::new();
        let mut aliases = AliasTable::new();
        let surface = table.intern("String");
        let target = source_stable_id("corelib", "System.String", &mut table);
        aliases.register(
            surface,
            AliasEntry {
                target_stable_id: target,
                origin: AssemblyOrigin::Stdlib,
            },
        );

        let resolution = resolve_surface_type(surface, &aliases, &universe, ErrorLocation::default(), &table);
        match resolution {
            AliasResolution::Diagnostic(diag) => assert_eq!(diag.code, DiagCode::MissingStdlibType),
            AliasResolution::Resolved(_) => panic!("expected a diagnostic"),
        }
    }

    #[test]
    fn present_alias_resolves() {
        let mut table = StringTable::new();
        let mut universe = UnifiedTypeCatalog::new();
        let type_id = TypeId {
            stable_id: source_stable_id("corelib", "System.String", &mut table),
            clr_name: table.intern("System.String"),
            assembly: table.intern("corelib"),
            ts_name: table.intern("string"),
        };
        universe.insert(NominalEntry::new(type_id, NominalKind::Class, TypeOrigin::Assembly));

        let mut aliases = AliasTable::new();
        let surface = table.intern("String");
        aliases.register(
            surface,
            AliasEntry {
                target_stable_id: type_id.stable_id,
                origin: AssemblyOrigin::Stdlib,
            },
        );

        let resolution = resolve_surface_type(surface, &aliases, &universe, ErrorLocation::default(), &table);
        match resolution {
            AliasResolution::Resolved(id) => assert_eq!(id, type_id),
            AliasResolution::Diagnostic(_) => panic!("expected a resolution"),
        }
    }

    #[test]
    fn unknown_alias_is_unresolved_binding() {
        let mut table = StringTable::new();
        let universe = UnifiedTypeCatalog::new();
        let aliases = AliasTable::new();
        let surface = table.intern("Ghost");
        let resolution = resolve_surface_type(surface, &aliases, &universe, ErrorLocation::default(), &table);
        match resolution {
            AliasResolution::Diagnostic(diag) => assert_eq!(diag.code, DiagCode::UnresolvedBinding),
            AliasResolution::Resolved(_) => panic!("expected a diagnostic"),
        }
    }
}
