//! External collaborator interfaces (§6). Everything in this module is a
//! trait contract only — the syntactic front end, module resolver, and
//! pretty-printer consumer are implemented outside the core and supplied
//! at the call sites in [`crate::discovery`] and [`crate::emit`].

use crate::compiler_messages::diagnostics::ErrorLocation;
use crate::emit::host_ast::HostModule;
use crate::ir::ty::IrType;
use crate::string_interning::{StringId, StringTable};
use std::path::Path;

/// Opaque handle to a declaration the front end has bound a symbol to.
/// The core never inspects its internals; it is only ever round-tripped
/// back through the checker.
pub trait Declaration {}

/// A construct the front end recognized syntactically as falling outside
/// this specification's supported surface (§4.2). The front end only
/// names *what* it saw — it never assigns a diagnostic code or severity,
/// since deciding those is this crate's job (`validate::unsupported`);
/// this crate in turn never pattern-matches the front end's own AST node
/// types directly, since those are outside this specification (§1). The
/// split is: front end recognizes syntax, this crate classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedConstructKind {
    Decorator,
    SymbolType,
    Proxy,
    WeakCollection,
    Eval,
    With,
    PrototypeMutation,
    UncoveredGeneratorReturnAccess,
}

#[derive(Debug, Clone)]
pub struct UnsupportedConstructSite {
    pub kind: UnsupportedConstructKind,
    pub location: ErrorLocation,
    pub symbol_name: Option<StringId>,
}

/// A generic-constraint shape the front end recognized (§4.2,
/// `TSN71xx-TSN73xx`). `RecursiveStructuralAlias` carries the alias's
/// surface name so the validator can resolve it through the unified
/// universe rather than trust the front end's say-so blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericConstraintKind {
    RecursiveMappedType,
    ConditionalInfer,
    ThisTyping,
    RecursiveStructuralAlias { alias_name: StringId },
    SymbolIndexSignature,
    VariadicGenericInterface,
    StructOrClassConstraintWithStructuralShape,
}

#[derive(Debug, Clone)]
pub struct GenericConstraintSite {
    pub kind: GenericConstraintKind,
    pub location: ErrorLocation,
    pub symbol_name: Option<StringId>,
}

/// A static-safety shape the front end recognized (§4.2,
/// `TSN7401-TSN7430`). `DisallowedDictionaryKey` carries the offending
/// key type's surface name so the diagnostic can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticSafetyIssue {
    ExplicitAny,
    AsAny,
    UntypedParameter,
    UntypedLambdaParameterNotContextual,
    DisallowedDictionaryKey { key_type_name: StringId },
    EmptyArrayWithoutAnnotation,
    UntypedNewArray,
    NonSimpleArrowMissingTypes,
}

#[derive(Debug, Clone)]
pub struct StaticSafetySite {
    pub issue: StaticSafetyIssue,
    pub location: ErrorLocation,
    pub symbol_name: Option<StringId>,
}

/// A single source file as produced by the syntactic front end: a typed
/// AST plus enough structure for the module dependency graph builder to
/// extract import/export specifiers (§4.1 step 3) and for the validators
/// (§4.2) to extract the raw syntactic facts they classify into
/// diagnostics.
pub trait SourceFile {
    /// Module specifiers named by import declarations and `from`-bearing
    /// re-exports, in source order.
    fn referenced_specifiers(&self) -> Vec<StringId>;

    /// Decorators, symbols, proxies, weak collections, `eval`, `with`,
    /// prototype mutation, and similar unsupported constructs (§4.2,
    /// `TSN2001…`).
    fn unsupported_construct_sites(&self) -> Vec<UnsupportedConstructSite> {
        Vec::new()
    }

    /// Recursive mapped types, conditional `infer`, `this` typing, and
    /// the other generic-constraint violations in §4.2 (`TSN71xx-TSN73xx`).
    fn generic_constraint_sites(&self) -> Vec<GenericConstraintSite> {
        Vec::new()
    }

    /// Explicit `any`, untyped non-contextual parameters, disallowed
    /// dictionary keys, and the other static-safety violations in §4.2
    /// (`TSN7401-TSN7430`).
    fn static_safety_sites(&self) -> Vec<StaticSafetySite> {
        Vec::new()
    }
}

/// The type checker the front end offers over a whole program (§6):
/// resolve identifier → declaration, declaration → inferred type,
/// expression → inferred type (only in positions this spec explicitly
/// permits), and symbol for declaration.
pub trait TypeChecker {
    type Decl: Declaration;

    fn resolve_identifier(&self, name: StringId) -> Option<Self::Decl>;
    fn declared_type(&self, decl: &Self::Decl) -> Option<IrType>;
    fn inferred_expression_type(&self, expr_id: u32) -> Option<IrType>;
}

/// The syntactic front end as a whole: parses one file into a
/// [`SourceFile`] plus a shared [`TypeChecker`] over the discovered
/// program.
pub trait SyntaxFrontEnd {
    type File: SourceFile;
    type Checker: TypeChecker;

    fn parse_file(&mut self, path: &Path, contents: &str) -> Result<Self::File, DiagnosticsCollector>;

    /// Builds the shared checker over every discovered file in one
    /// invocation (§4.1 step 6: "single shared checker").
    fn build_checker(&mut self, files: &[Self::File]) -> Result<Self::Checker, DiagnosticsCollector>;
}

/// `(specifier, containingFile) → resolvedPath | unresolved`, mimicking
/// the host tool's module resolution rules (§6).
pub trait ModuleResolver {
    fn resolve(&self, specifier: &str, containing_file: &Path) -> Option<std::path::PathBuf>;

    /// Canonical (symlink-resolved) form of `path`, used to key the BFS
    /// visited set during discovery (§4.1 step 2) and to detect
    /// case-insensitive-filesystem mismatches (`TSN1003`). Returns `None`
    /// if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> Option<std::path::PathBuf>;
}

/// Reads file contents from whatever storage backs the compilation (real
/// filesystem in production, an in-memory map in tests). Kept separate
/// from [`ModuleResolver`] since resolution and reading are independently
/// fake-able.
pub trait FileReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// The host-language AST consumer: a pretty-printer whose contract is
/// trivial recursive descent plus indentation (§6). Implemented outside
/// the core; this crate only produces the [`HostModule`] it accepts.
pub trait PrettyPrinter {
    fn print_module(&mut self, module: &HostModule, table: &StringTable) -> String;
}
