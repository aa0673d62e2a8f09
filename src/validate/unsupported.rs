//! Unsupported-feature validator (component C7, §4.2). Decorators,
//! symbols, proxies, weak collections, `eval`, `with`, prototype
//! mutation, and similar constructs the front end has recognized
//! syntactically but this specification never gives semantics to.

use crate::compiler_messages::diagnostics::{DiagCode, Diagnostic, DiagnosticMetaKey, DiagnosticsCollector};
use crate::external::{SourceFile, UnsupportedConstructKind, UnsupportedConstructSite};

/// Runs the unsupported-feature check over one source file, folding every
/// site into `collector`. Takes the collector by value and returns it,
/// matching the pass-threading convention the rest of the pipeline uses
/// (§3.4).
pub fn check_unsupported_features<F: SourceFile>(file: &F, mut collector: DiagnosticsCollector) -> DiagnosticsCollector {
    for site in file.unsupported_construct_sites() {
        let code = diagnostic_code(site.kind);
        let mut diagnostic = Diagnostic::new(code, unsupported_feature_message(site.kind), site.location.clone());
        if let Some(name) = site.symbol_name {
            diagnostic = diagnostic.with_meta(DiagnosticMetaKey::SymbolName, name.as_u32().to_string());
        }
        let _ = collector.push(diagnostic);
    }
    collector
}

/// Decorators get their own code (`TSN2002`); every other unsupported
/// dynamic construct shares the generic dynamic-construct bucket
/// (`TSN2003`) since this crate's diagnostic taxonomy doesn't split them
/// further.
fn diagnostic_code(kind: UnsupportedConstructKind) -> DiagCode {
    match kind {
        UnsupportedConstructKind::Decorator => DiagCode::UnsupportedDecorator,
        _ => DiagCode::UnsupportedDynamicConstruct,
    }
}

fn unsupported_feature_message(kind: UnsupportedConstructKind) -> String {
    match kind {
        UnsupportedConstructKind::Decorator => "decorators are not supported".to_string(),
        UnsupportedConstructKind::SymbolType => "the 'symbol' type is not supported".to_string(),
        UnsupportedConstructKind::Proxy => "'Proxy' is not supported".to_string(),
        UnsupportedConstructKind::WeakCollection => "'WeakMap'/'WeakSet' are not supported".to_string(),
        UnsupportedConstructKind::Eval => "'eval' is not supported".to_string(),
        UnsupportedConstructKind::With => "'with' statements are not supported".to_string(),
        UnsupportedConstructKind::PrototypeMutation => "prototype mutation is not supported".to_string(),
        UnsupportedConstructKind::UncoveredGeneratorReturnAccess => {
            "this generator return-value access is not in a covered position".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler_messages::diagnostics::ErrorLocation;
    use crate::external::UnsupportedConstructSite;

    struct FakeFile {
        sites: Vec<UnsupportedConstructSite>,
    }

    impl SourceFile for FakeFile {
        fn referenced_specifiers(&self) -> Vec<crate::string_interning::StringId> {
            Vec::new()
        }

        fn unsupported_construct_sites(&self) -> Vec<UnsupportedConstructSite> {
            self.sites.clone()
        }
    }

    #[test]
    fn each_site_becomes_one_diagnostic() {
        let file = FakeFile {
            sites: vec![
                UnsupportedConstructSite {
                    kind: UnsupportedConstructKind::Decorator,
                    location: ErrorLocation::default(),
                    symbol_name: None,
                },
                UnsupportedConstructSite {
                    kind: UnsupportedConstructKind::Eval,
                    location: ErrorLocation::default(),
                    symbol_name: None,
                },
            ],
        };
        let collector = check_unsupported_features(&file, DiagnosticsCollector::new());
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn decorator_gets_its_own_code_other_constructs_share_the_dynamic_bucket() {
        let file = FakeFile {
            sites: vec![
                UnsupportedConstructSite {
                    kind: UnsupportedConstructKind::Decorator,
                    location: ErrorLocation::default(),
                    symbol_name: None,
                },
                UnsupportedConstructSite {
                    kind: UnsupportedConstructKind::Proxy,
                    location: ErrorLocation::default(),
                    symbol_name: None,
                },
            ],
        };
        let collector = check_unsupported_features(&file, DiagnosticsCollector::new());
        assert_eq!(collector.all()[0].code, DiagCode::UnsupportedDecorator);
        assert_eq!(collector.all()[1].code, DiagCode::UnsupportedDynamicConstruct);
    }

    #[test]
    fn no_sites_yields_no_diagnostics() {
        let file = FakeFile { sites: vec![] };
        let collector = check_unsupported_features(&file, DiagnosticsCollector::new());
        assert!(collector.is_empty());
    }
}
