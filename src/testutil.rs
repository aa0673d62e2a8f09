//! In-crate fake front end. Nothing here parses real syntax: callers
//! register a [`FakeSourceFile`] directly against a path, bypassing the
//! syntactic front end this crate never implements itself (§1), so
//! integration tests can drive discovery and the pass pipeline end to
//! end without a real parser.

use crate::compiler_messages::diagnostics::DiagnosticsCollector;
use crate::external::{
    Declaration, FileReader, GenericConstraintSite, ModuleResolver, SourceFile, StaticSafetySite, SyntaxFrontEnd, TypeChecker,
    UnsupportedConstructSite,
};
use crate::ir::ty::IrType;
use crate::string_interning::StringId;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FakeSourceFile {
    pub referenced_specifiers: Vec<StringId>,
    pub unsupported_construct_sites: Vec<UnsupportedConstructSite>,
    pub generic_constraint_sites: Vec<GenericConstraintSite>,
    pub static_safety_sites: Vec<StaticSafetySite>,
}

impl SourceFile for FakeSourceFile {
    fn referenced_specifiers(&self) -> Vec<StringId> {
        self.referenced_specifiers.clone()
    }

    fn unsupported_construct_sites(&self) -> Vec<UnsupportedConstructSite> {
        self.unsupported_construct_sites.clone()
    }

    fn generic_constraint_sites(&self) -> Vec<GenericConstraintSite> {
        self.generic_constraint_sites.clone()
    }

    fn static_safety_sites(&self) -> Vec<StaticSafetySite> {
        self.static_safety_sites.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeDeclaration(pub StringId);

impl Declaration for FakeDeclaration {}

/// A checker backed by two plain maps an integration test populates
/// directly, instead of inferring anything: `identifiers` resolves a
/// name to a declaration, `declared_types` resolves a declaration back
/// to its type (§6's `TypeChecker` contract, faked).
#[derive(Debug, Clone, Default)]
pub struct FakeChecker {
    pub identifiers: FxHashMap<StringId, FakeDeclaration>,
    pub declared_types: FxHashMap<StringId, IrType>,
}

impl TypeChecker for FakeChecker {
    type Decl = FakeDeclaration;

    fn resolve_identifier(&self, name: StringId) -> Option<Self::Decl> {
        self.identifiers.get(&name).copied()
    }

    fn declared_type(&self, decl: &Self::Decl) -> Option<IrType> {
        self.declared_types.get(&decl.0).cloned()
    }

    fn inferred_expression_type(&self, _expr_id: u32) -> Option<IrType> {
        None
    }
}

/// A "front end" that returns files pre-registered by path rather than
/// parsing anything. Tests call [`FakeFrontEnd::register`] before
/// handing this to [`crate::discovery::discover_modules`].
#[derive(Debug, Clone, Default)]
pub struct FakeFrontEnd {
    files: FxHashMap<PathBuf, FakeSourceFile>,
    checker: FakeChecker,
}

impl FakeFrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>, file: FakeSourceFile) {
        self.files.insert(path.into(), file);
    }

    pub fn with_checker(mut self, checker: FakeChecker) -> Self {
        self.checker = checker;
        self
    }
}

impl SyntaxFrontEnd for FakeFrontEnd {
    type File = FakeSourceFile;
    type Checker = FakeChecker;

    fn parse_file(&mut self, path: &Path, _contents: &str) -> Result<Self::File, DiagnosticsCollector> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(DiagnosticsCollector::new)
    }

    fn build_checker(&mut self, _files: &[Self::File]) -> Result<Self::Checker, DiagnosticsCollector> {
        Ok(self.checker.clone())
    }
}

/// Resolves local specifiers by joining them against the containing
/// file's directory and normalizing `.`/`..` segments; every path it is
/// asked to canonicalize is treated as already canonical (no symlinks in
/// a fake filesystem).
#[derive(Debug, Clone, Default)]
pub struct FakeResolver {
    pub known_files: Vec<PathBuf>,
}

impl ModuleResolver for FakeResolver {
    fn resolve(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        let base = containing_file.parent().unwrap_or_else(|| Path::new("."));
        let joined = base.join(specifier);
        let candidate = normalize_path(&joined);
        let with_ext = if candidate.extension().is_none() {
            candidate.with_extension("ts")
        } else {
            candidate.clone()
        };
        if self.known_files.contains(&candidate) {
            Some(candidate)
        } else if self.known_files.contains(&with_ext) {
            Some(with_ext)
        } else {
            None
        }
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        let normalized = normalize_path(path);
        if self.known_files.contains(&normalized) {
            Some(normalized)
        } else {
            None
        }
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Reads from an in-memory map instead of the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct FakeFileReader {
    pub contents: FxHashMap<PathBuf, String>,
}

impl FileReader for FakeFileReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::string_interning::StringTable;

    #[test]
    fn discovery_walks_a_registered_two_file_graph() {
        let mut table = StringTable::new();
        let entry = PathBuf::from("/src/a.ts");
        let dep = PathBuf::from("/src/b.ts");
        let dep_specifier = table.intern("./b");

        let mut front_end = FakeFrontEnd::new();
        front_end.register(
            entry.clone(),
            FakeSourceFile { referenced_specifiers: vec![dep_specifier], ..Default::default() },
        );
        front_end.register(dep.clone(), FakeSourceFile::default());

        let resolver = FakeResolver { known_files: vec![entry.clone(), dep.clone()] };
        let reader = FakeFileReader {
            contents: FxHashMap::from_iter([
                (entry.clone(), "import './b';".to_string()),
                (dep.clone(), "".to_string()),
            ]),
        };
        let options = CompilerOptions::new(PathBuf::from("/src"), "App");

        let (discovered, collector) =
            crate::discovery::discover_modules(&entry, &options, &mut front_end, &resolver, &reader, &mut table);

        assert!(collector.is_empty());
        assert_eq!(discovered.len(), 2);
    }
}
