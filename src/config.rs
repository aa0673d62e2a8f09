//! Compiler configuration, read once by an external driver and handed to
//! the core as an immutable value. The core never reads environment
//! variables or the file system itself; everything it needs arrives here.

use std::path::PathBuf;

/// Controls how source-level identifiers are rewritten into host-language
/// identifiers during emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Identifiers are emitted exactly as written in the source.
    Preserve,
    /// Member and type identifiers are rewritten to the host language's
    /// PascalCase convention; locals and parameters are left alone.
    PascalCaseMembers,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        NamingPolicy::PascalCaseMembers
    }
}

/// A rough guess at how many nodes/bindings a module of typical size will
/// need, used only to size `Vec::with_capacity` calls up front. These are
/// heuristics from observed sample inputs, not guarantees.
pub const SRC_TO_NODE_RATIO: usize = 8;
pub const IMPORTS_CAPACITY_HINT: usize = 8;
pub const EXPORTS_CAPACITY_HINT: usize = 8;
pub const MEMBERS_CAPACITY_HINT: usize = 16;
pub const DIAGNOSTICS_CAPACITY_HINT: usize = 16;

#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Root directory source module paths are resolved relative to.
    pub source_root: PathBuf,
    /// Root namespace prefix prepended to generated static containers,
    /// e.g. `MyApp.Generated`.
    pub host_namespace_root: String,
    /// Identifier rewriting policy applied during emission.
    pub naming_policy: NamingPolicy,
    /// Emit dev-logging macro output regardless of compiled-in features
    /// (a no-op unless the corresponding `show_*` feature is also enabled).
    pub verbose: bool,
    /// Reserved for the cross-module anonymous-type collapsing mode
    /// described in the anonymous-type lowering pass; not yet honored by
    /// [`crate::passes::anon_types`].
    pub collapse_anonymous_types_across_modules: bool,
    /// `bindings.json`-shaped files to load into the binding registry
    /// before discovery resolves any CLR-interop reference (§6). Empty by
    /// default; a caller opts in with [`CompilerOptions::with_binding_manifests`].
    pub binding_manifest_paths: Vec<PathBuf>,
}

impl CompilerOptions {
    pub fn new(source_root: PathBuf, host_namespace_root: impl Into<String>) -> Self {
        Self {
            source_root,
            host_namespace_root: host_namespace_root.into(),
            naming_policy: NamingPolicy::default(),
            verbose: false,
            collapse_anonymous_types_across_modules: false,
            binding_manifest_paths: Vec::new(),
        }
    }

    pub fn with_binding_manifests(mut self, paths: Vec<PathBuf>) -> Self {
        self.binding_manifest_paths = paths;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_policy_is_pascal_case_members() {
        assert_eq!(NamingPolicy::default(), NamingPolicy::PascalCaseMembers);
    }

    #[test]
    fn new_options_default_to_non_verbose() {
        let opts = CompilerOptions::new(PathBuf::from("src"), "MyApp.Generated");
        assert!(!opts.verbose);
        assert_eq!(opts.host_namespace_root, "MyApp.Generated");
    }
}
