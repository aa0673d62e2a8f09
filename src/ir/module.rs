//! IR module, import, and export nodes (component C1, §3.1 `Module`,
//! `Import`, `Export`).

use crate::interned_path::InternedPath;
use crate::ir::expr::Expression;
use crate::ir::stmt::Statement;
use crate::string_interning::StringId;

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    Default {
        local: StringId,
    },
    Namespace {
        local: StringId,
    },
    Named {
        imported: StringId,
        local: StringId,
        is_type_only: bool,
        /// Set when the binding manifest lists this name as a flattened
        /// CLR value export (§4.4 imports).
        resolved_clr_value: Option<StringId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub specifier: StringId,
    pub is_local: bool,
    pub is_clr: bool,
    pub resolved_namespace: Option<StringId>,
    pub resolved_host_type: Option<StringId>,
    pub resolved_assembly: Option<StringId>,
    pub target_container: Option<StringId>,
    pub specifiers: Vec<ImportSpecifier>,
}

impl Import {
    pub fn new(specifier: StringId) -> Self {
        Self {
            specifier,
            is_local: false,
            is_clr: false,
            resolved_namespace: None,
            resolved_host_type: None,
            resolved_assembly: None,
            target_container: None,
            specifiers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    Named {
        exported: StringId,
        local: StringId,
    },
    DefaultExpression(Expression),
    Declaration(Box<Statement>),
    Reexport {
        exported: StringId,
        original: StringId,
        source_module: StringId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Relative, normalized file path (invariant I-6: modules are ordered
    /// by this path).
    pub path: InternedPath,
    pub namespace: StringId,
    pub container_class_name: StringId,
    /// True when the module has no top-level executable statement and is
    /// emitted as a pure static class (§4.6 static-container policy).
    pub is_static_container: bool,
    pub imports: Vec<Import>,
    pub body: Vec<Statement>,
    pub exports: Vec<Export>,
}

impl Module {
    pub fn new(path: InternedPath, namespace: StringId, container_class_name: StringId) -> Self {
        Self {
            path,
            namespace,
            container_class_name,
            is_static_container: true,
            imports: Vec::new(),
            body: Vec::new(),
            exports: Vec::new(),
        }
    }
}

/// Sorts modules by relative path, the ordering invariant I-6 requires of
/// every deterministic join point (discovery output, pass output, emit
/// input).
pub fn sort_modules_by_path(modules: &mut [Module]) {
    modules.sort_by(|a, b| a.path.cmp(&b.path));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_interning::StringTable;

    #[test]
    fn modules_sort_deterministically_by_path() {
        let mut table = StringTable::new();
        let ns = table.intern("App");
        let b_name = table.intern("B");
        let a_name = table.intern("A");
        let mut modules = vec![
            Module::new(InternedPath::from_str("b/module", &mut table), ns, b_name),
            Module::new(InternedPath::from_str("a/module", &mut table), ns, a_name),
        ];
        sort_modules_by_path(&mut modules);
        let paths: Vec<String> = modules
            .iter()
            .map(|m| m.path.to_relative_string(&table))
            .collect();
        assert_eq!(paths, vec!["a/module", "b/module"]);
    }
}
