//! Diagnostic collection (component C2).
//!
//! A [`DiagnosticsCollector`] is an append-only accumulator threaded through
//! every validator, resolver, and pass. It is never mutated in place by a
//! long-lived reference; passes take one by value and return one, the same
//! "conceptually persistent" shape spec.md §9 asks for. Internally it is a
//! plain `Vec`-backed struct — cheap to move, and cloning it is an explicit
//! choice a caller makes, never an accident of aliasing.
//!
//! Severities follow spec.md §7: `Fatal` aborts the pipeline immediately,
//! `Error` blocks emission but lets analysis continue, `Warning`/`Info` are
//! informational only.

use std::collections::HashMap;
use std::path::PathBuf;

/// A location within a single module, independent of the string table so
/// diagnostics can outlive a specific interning session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorLocation {
    pub module_path: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub fn new(module_path: PathBuf, line: u32, column: u32) -> Self {
        Self {
            module_path,
            line,
            column,
        }
    }
}

/// Structured metadata keys, mirroring the teacher's `ErrorMetaDataKey`: a
/// closed set of slots an external renderer can pull specific pieces of
/// context from without string-parsing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticMetaKey {
    CompilationStage,
    PrimarySuggestion,
    AlternativeSuggestion,
    ExpectedType,
    FoundType,
    SymbolName,
    ImportSpecifier,
    SuggestedLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

/// The closed enumeration of diagnostic codes from spec.md §7. Tools key on
/// the code, never the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    // Discovery / import (TSN1001-TSN1006)
    MissingEntryFile,
    UnresolvedImport,
    UnreadableFile,
    DeclarationOnlyImport,
    CaseInsensitiveMismatch,
    CircularImportBrokenByDiscovery,
    // Unsupported syntax (TSN2001-TSN2003)
    UnsupportedFeature,
    UnsupportedDecorator,
    UnsupportedDynamicConstruct,
    // Host-language identifier policy (TSN3001-TSN3011)
    ReservedIdentifier,
    // Interop / binding (TSN4001-TSN4004)
    AmbiguousBinding,
    UnresolvedBinding,
    ConflictingOverloadCandidates,
    MissingStdlibType,
    // Runtime limits (TSN5001-TSN5002)
    UnsupportedArity,
    RecursionDepthExceeded,
    // Numeric proofs (TSN5101-TSN5110)
    NumericProofMissing,
    NumericWideningUnproven,
    // IR determinism (TSN5201-TSN5203)
    ArrowParameterTypeUnavailable,
    ArrowReturnTypeUnavailable,
    NonDeterministicOrdering,
    // Compiler bug (TSN6001)
    InternalCompilerError,
    // Yield placement (TSN6101)
    InvalidYieldPosition,
    // Generics / static-safety (TSN7101-TSN7430)
    UnsupportedGenericConstraint,
    RecursiveMappedType,
    ConditionalInferType,
    ExplicitAny,
    UntypedParameter,
    UntypedLambdaParameter,
    UnsupportedDictionaryKey,
    EmptyArrayWithoutAnnotation,
    UntypedNewArray,
    NonSimpleArrowMissingTypes,
    // Metadata / bindings loading (TSN9001-TSN9114)
    MalformedManifest,
    DuplicateManifestLoad,
    UnsupportedManifestSchema,
}

impl DiagCode {
    /// The stable `TSNxxxx` textual code external tools key on.
    pub fn code(self) -> &'static str {
        use DiagCode::*;
        match self {
            MissingEntryFile => "TSN1001",
            UnresolvedImport => "TSN1002",
            CaseInsensitiveMismatch => "TSN1003",
            UnreadableFile => "TSN1004",
            DeclarationOnlyImport => "TSN1005",
            CircularImportBrokenByDiscovery => "TSN1006",
            UnsupportedFeature => "TSN2001",
            UnsupportedDecorator => "TSN2002",
            UnsupportedDynamicConstruct => "TSN2003",
            ReservedIdentifier => "TSN3001",
            AmbiguousBinding => "TSN4001",
            UnresolvedBinding => "TSN4002",
            ConflictingOverloadCandidates => "TSN4003",
            MissingStdlibType => "TSN4004",
            UnsupportedArity => "TSN5001",
            RecursionDepthExceeded => "TSN5002",
            NumericProofMissing => "TSN5101",
            NumericWideningUnproven => "TSN5110",
            ArrowParameterTypeUnavailable => "TSN5201",
            ArrowReturnTypeUnavailable => "TSN5202",
            NonDeterministicOrdering => "TSN5203",
            InternalCompilerError => "TSN6001",
            InvalidYieldPosition => "TSN6101",
            UnsupportedGenericConstraint => "TSN7101",
            RecursiveMappedType => "TSN7102",
            ConditionalInferType => "TSN7103",
            ExplicitAny => "TSN7401",
            UntypedParameter => "TSN7402",
            UntypedLambdaParameter => "TSN7403",
            UnsupportedDictionaryKey => "TSN7410",
            EmptyArrayWithoutAnnotation => "TSN7417",
            UntypedNewArray => "TSN7420",
            NonSimpleArrowMissingTypes => "TSN7430",
            MalformedManifest => "TSN9001",
            DuplicateManifestLoad => "TSN9002",
            UnsupportedManifestSchema => "TSN9003",
        }
    }

    /// The severity a code carries unless a call site escalates it (fatal
    /// can only ever be fatal; errors may not be downgraded).
    pub fn default_severity(self) -> Severity {
        use DiagCode::*;
        match self {
            MissingEntryFile | MissingStdlibType | InternalCompilerError => Severity::Fatal,
            CaseInsensitiveMismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub severity: Severity,
    pub message: String,
    pub location: ErrorLocation,
    pub metadata: HashMap<DiagnosticMetaKey, String>,
}

impl Diagnostic {
    pub fn new(code: DiagCode, message: impl Into<String>, location: ErrorLocation) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            location,
            metadata: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: DiagnosticMetaKey, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value.into());
        self
    }

    /// Plain-text rendering used only by tests and dev logging; the actual
    /// ANSI/ LSP rendering is owned by the external CLI collaborator.
    pub fn to_plain_string(&self) -> String {
        format!(
            "{}: {} ({}:{}:{})",
            self.code.code(),
            self.message,
            self.location.module_path.display(),
            self.location.line,
            self.location.column
        )
    }
}

/// Append-only diagnostics accumulator threaded through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic. Returns `Err` immediately when the diagnostic is
    /// fatal, so callers can short-circuit the current pass without having
    /// to re-check severity themselves.
    pub fn push(&mut self, diagnostic: Diagnostic) -> Result<(), ()> {
        let fatal = diagnostic.severity == Severity::Fatal;
        self.diagnostics.push(diagnostic);
        if fatal { Err(()) } else { Ok(()) }
    }

    pub fn extend(&mut self, other: DiagnosticsCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Error)
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Pushes a diagnostic into a `DiagnosticsCollector` and, if the collector
/// reports the push as fatal, returns early with `Err(collector)` from the
/// enclosing function. Mirrors the teacher's `return_rule_error!` shape,
/// adapted to the collector-threading style this pipeline uses instead of
/// `Result<T, CompileError>` per call.
#[macro_export]
macro_rules! push_diagnostic {
    ($collector:expr, $code:expr, $msg:expr, $location:expr) => {{
        let diagnostic = $crate::compiler_messages::diagnostics::Diagnostic::new(
            $code, $msg, $location,
        );
        if $collector.push(diagnostic).is_err() {
            return Err($collector);
        }
    }};
    ($collector:expr, $code:expr, $msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {{
        let mut diagnostic = $crate::compiler_messages::diagnostics::Diagnostic::new(
            $code, $msg, $location,
        );
        $(
            diagnostic = diagnostic.with_meta(
                $crate::compiler_messages::diagnostics::DiagnosticMetaKey::$key,
                $value,
            );
        )*
        if $collector.push(diagnostic).is_err() {
            return Err($collector);
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_push_reports_error_signal() {
        let mut collector = DiagnosticsCollector::new();
        let result = collector.push(Diagnostic::new(
            DiagCode::MissingEntryFile,
            "entry file not found",
            ErrorLocation::default(),
        ));
        assert!(result.is_err());
        assert!(collector.has_fatal());
        assert!(collector.has_errors());
    }

    #[test]
    fn error_push_does_not_signal_fatal() {
        let mut collector = DiagnosticsCollector::new();
        let result = collector.push(Diagnostic::new(
            DiagCode::UnresolvedImport,
            "cannot resolve './missing'",
            ErrorLocation::default(),
        ));
        assert!(result.is_ok());
        assert!(!collector.has_fatal());
        assert!(collector.has_errors());
    }

    #[test]
    fn warnings_do_not_block_emission() {
        let mut collector = DiagnosticsCollector::new();
        collector
            .push(Diagnostic::new(
                DiagCode::CaseInsensitiveMismatch,
                "path case mismatch",
                ErrorLocation::default(),
            ))
            .unwrap();
        assert!(!collector.has_errors());
    }
}
