//! S-6: a.ts imports b.ts imports c.ts. Discovery must find all three
//! modules, and sorting by path (invariant I-6) must yield a, b, c in
//! that order regardless of discovery order.

use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tsnc_core::compiler_messages::diagnostics::DiagnosticsCollector;
use tsnc_core::config::CompilerOptions;
use tsnc_core::discovery::discover_modules;
use tsnc_core::external::{
    Declaration, FileReader, GenericConstraintSite, ModuleResolver, SourceFile, StaticSafetySite, SyntaxFrontEnd, TypeChecker,
    UnsupportedConstructSite,
};
use tsnc_core::ir::ty::IrType;
use tsnc_core::string_interning::{StringId, StringTable};

#[derive(Debug, Clone, Default)]
struct FileFixture {
    referenced_specifiers: Vec<StringId>,
}

impl SourceFile for FileFixture {
    fn referenced_specifiers(&self) -> Vec<StringId> {
        self.referenced_specifiers.clone()
    }
    fn unsupported_construct_sites(&self) -> Vec<UnsupportedConstructSite> {
        Vec::new()
    }
    fn generic_constraint_sites(&self) -> Vec<GenericConstraintSite> {
        Vec::new()
    }
    fn static_safety_sites(&self) -> Vec<StaticSafetySite> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct NoDecl;
impl Declaration for NoDecl {}

#[derive(Debug, Clone, Default)]
struct NoChecker;
impl TypeChecker for NoChecker {
    type Decl = NoDecl;
    fn resolve_identifier(&self, _name: StringId) -> Option<Self::Decl> {
        None
    }
    fn declared_type(&self, _decl: &Self::Decl) -> Option<IrType> {
        None
    }
    fn inferred_expression_type(&self, _expr_id: u32) -> Option<IrType> {
        None
    }
}

#[derive(Default)]
struct ChainFrontEnd {
    files: FxHashMap<PathBuf, FileFixture>,
}

impl SyntaxFrontEnd for ChainFrontEnd {
    type File = FileFixture;
    type Checker = NoChecker;

    fn parse_file(&mut self, path: &Path, _contents: &str) -> Result<Self::File, DiagnosticsCollector> {
        self.files.get(path).cloned().ok_or_else(DiagnosticsCollector::new)
    }

    fn build_checker(&mut self, _files: &[Self::File]) -> Result<Self::Checker, DiagnosticsCollector> {
        Ok(NoChecker)
    }
}

#[derive(Default)]
struct ChainResolver {
    known_files: Vec<PathBuf>,
}

impl ModuleResolver for ChainResolver {
    fn resolve(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
        let base = containing_file.parent().unwrap_or_else(|| Path::new("."));
        let joined = base.join(specifier).with_extension("ts");
        self.known_files.iter().find(|f| **f == joined).cloned()
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        self.known_files.iter().find(|f| *f == path).cloned()
    }
}

#[derive(Default)]
struct ChainReader {
    contents: FxHashMap<PathBuf, String>,
}

impl FileReader for ChainReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.contents
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()))
    }
}

#[test]
fn three_file_import_chain_discovers_all_modules_in_path_order() {
    let mut table = StringTable::new();

    let a = PathBuf::from("/src/a.ts");
    let b = PathBuf::from("/src/b.ts");
    let c = PathBuf::from("/src/c.ts");

    let spec_b = table.intern("./b");
    let spec_c = table.intern("./c");

    let mut front_end = ChainFrontEnd::default();
    front_end.files.insert(a.clone(), FileFixture { referenced_specifiers: vec![spec_b] });
    front_end.files.insert(b.clone(), FileFixture { referenced_specifiers: vec![spec_c] });
    front_end.files.insert(c.clone(), FileFixture::default());

    let resolver = ChainResolver { known_files: vec![a.clone(), b.clone(), c.clone()] };
    let reader = ChainReader {
        contents: FxHashMap::from_iter([
            (a.clone(), "import './b';".to_string()),
            (b.clone(), "import './c';".to_string()),
            (c.clone(), "".to_string()),
        ]),
    };
    let options = CompilerOptions::new(PathBuf::from("/src"), "App");

    let (mut discovered, collector) =
        discover_modules(&a, &options, &mut front_end, &resolver, &reader, &mut table);

    assert!(collector.is_empty());
    assert_eq!(discovered.len(), 3);

    discovered.sort_by(|x, y| x.relative_path.to_relative_string(&table).cmp(&y.relative_path.to_relative_string(&table)));
    let names: Vec<String> = discovered.iter().map(|d| d.relative_path.to_relative_string(&table)).collect();
    assert_eq!(names, vec!["a.ts".to_string(), "b.ts".to_string(), "c.ts".to_string()]);
}
