//! Static-safety validator (component C7, §4.2). No explicit `any`/`as
//! any`, every non-lambda parameter typed, lambda parameters typed unless
//! in a deterministic expected-type position, object-literal typing
//! rules, "simple" arrow exemptions, disallowed `Record` keys, empty
//! arrays without annotation, and untyped `new Array()`.

use crate::compiler_messages::diagnostics::{DiagCode, Diagnostic, DiagnosticMetaKey, DiagnosticsCollector};
use crate::external::{SourceFile, StaticSafetyIssue};
use crate::string_interning::StringTable;

pub fn check_static_safety<F: SourceFile>(file: &F, table: &StringTable, mut collector: DiagnosticsCollector) -> DiagnosticsCollector {
    for site in file.static_safety_sites() {
        let (code, message) = classify(site.issue, table);
        let mut diagnostic = Diagnostic::new(code, message, site.location.clone());
        if let Some(name) = site.symbol_name {
            diagnostic = diagnostic.with_meta(DiagnosticMetaKey::SymbolName, name.as_u32().to_string());
        }
        let _ = collector.push(diagnostic);
    }
    collector
}

fn classify(issue: StaticSafetyIssue, table: &StringTable) -> (DiagCode, String) {
    match issue {
        StaticSafetyIssue::ExplicitAny => (DiagCode::ExplicitAny, "explicit 'any' is not permitted".to_string()),
        StaticSafetyIssue::AsAny => (DiagCode::ExplicitAny, "'as any' is not permitted".to_string()),
        StaticSafetyIssue::UntypedParameter => {
            (DiagCode::UntypedParameter, "parameter requires an explicit type".to_string())
        }
        StaticSafetyIssue::UntypedLambdaParameterNotContextual => (
            DiagCode::UntypedLambdaParameter,
            "lambda parameter requires an explicit type outside a deterministic expected-type position".to_string(),
        ),
        StaticSafetyIssue::DisallowedDictionaryKey { key_type_name } => (
            DiagCode::UnsupportedDictionaryKey,
            format!("dictionary key type '{}' must be 'string' or 'number'", table.resolve(key_type_name)),
        ),
        StaticSafetyIssue::EmptyArrayWithoutAnnotation => (
            DiagCode::EmptyArrayWithoutAnnotation,
            "empty array literal requires a type annotation".to_string(),
        ),
        StaticSafetyIssue::UntypedNewArray => {
            (DiagCode::UntypedNewArray, "'new Array()' requires an explicit type argument".to_string())
        }
        StaticSafetyIssue::NonSimpleArrowMissingTypes => (
            DiagCode::NonSimpleArrowMissingTypes,
            "non-simple arrow function requires explicit parameter and return types".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler_messages::diagnostics::ErrorLocation;
    use crate::external::StaticSafetySite;
    use crate::string_interning::StringId;

    struct FakeFile {
        sites: Vec<StaticSafetySite>,
    }

    impl SourceFile for FakeFile {
        fn referenced_specifiers(&self) -> Vec<StringId> {
            Vec::new()
        }

        fn static_safety_sites(&self) -> Vec<StaticSafetySite> {
            self.sites.clone()
        }
    }

    #[test]
    fn explicit_any_is_flagged() {
        let table = StringTable::new();
        let file = FakeFile {
            sites: vec![StaticSafetySite {
                issue: StaticSafetyIssue::ExplicitAny,
                location: ErrorLocation::default(),
                symbol_name: None,
            }],
        };
        let collector = check_static_safety(&file, &table, DiagnosticsCollector::new());
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.all()[0].code, DiagCode::ExplicitAny);
    }

    #[test]
    fn empty_array_without_annotation_is_flagged() {
        let table = StringTable::new();
        let file = FakeFile {
            sites: vec![StaticSafetySite {
                issue: StaticSafetyIssue::EmptyArrayWithoutAnnotation,
                location: ErrorLocation::default(),
                symbol_name: None,
            }],
        };
        let collector = check_static_safety(&file, &table, DiagnosticsCollector::new());
        assert_eq!(collector.all()[0].message, "empty array literal requires a type annotation");
    }

    #[test]
    fn disallowed_dictionary_key_names_the_offending_type() {
        let mut table = StringTable::new();
        let key_type_name = table.intern("boolean");
        let file = FakeFile {
            sites: vec![StaticSafetySite {
                issue: StaticSafetyIssue::DisallowedDictionaryKey { key_type_name },
                location: ErrorLocation::default(),
                symbol_name: None,
            }],
        };
        let collector = check_static_safety(&file, &table, DiagnosticsCollector::new());
        assert_eq!(collector.all()[0].message, "dictionary key type 'boolean' must be 'string' or 'number'");
        assert_eq!(collector.all()[0].code, DiagCode::UnsupportedDictionaryKey);
    }

    #[test]
    fn as_any_and_explicit_any_share_the_same_code_with_distinct_messages() {
        let table = StringTable::new();
        let file = FakeFile {
            sites: vec![
                StaticSafetySite { issue: StaticSafetyIssue::ExplicitAny, location: ErrorLocation::default(), symbol_name: None },
                StaticSafetySite { issue: StaticSafetyIssue::AsAny, location: ErrorLocation::default(), symbol_name: None },
            ],
        };
        let collector = check_static_safety(&file, &table, DiagnosticsCollector::new());
        assert_eq!(collector.all()[0].code, collector.all()[1].code);
        assert_ne!(collector.all()[0].message, collector.all()[1].message);
    }
}
