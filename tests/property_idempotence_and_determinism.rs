//! P-6 (idempotence of passes 2, 3, 5) and P-9 (diagnostic determinism):
//! running a pass twice over the same input yields the same IR, and
//! running the numeric coercion check twice over the same input yields
//! the same ordered sequence of diagnostic codes.

use pretty_assertions::assert_eq;
use tsnc_core::compiler_messages::diagnostics::DiagnosticsCollector;
use tsnc_core::interned_path::InternedPath;
use tsnc_core::ir::expr::{Expression, LiteralValue, NumericIntent};
use tsnc_core::ir::module::Module;
use tsnc_core::ir::pattern::Pattern;
use tsnc_core::ir::stmt::{Statement, VariableKind};
use tsnc_core::ir::ty::{IrType, PrimitiveKind};
use tsnc_core::passes::{numeric_coercion, numeric_proof, soundness};
use tsnc_core::string_interning::StringTable;

fn sample_module(table: &mut StringTable) -> Module {
    let x = table.intern("x");
    let y = table.intern("y");
    let module_body = vec![
        Statement::VariableDeclaration {
            kind: VariableKind::Const,
            pattern: Pattern::IdentifierPattern(x),
            declared_type: Some(IrType::PrimitiveType(PrimitiveKind::Number)),
            initializer: Some(Expression::NumericNarrowing {
                expression: Box::new(Expression::Literal(LiteralValue::Number {
                    lexeme: "1".to_string(),
                    value: 1.0,
                    intent: NumericIntent::Int32,
                })),
                target_type: IrType::PrimitiveType(PrimitiveKind::Number),
                proof: None,
            }),
        },
        Statement::VariableDeclaration {
            kind: VariableKind::Const,
            pattern: Pattern::IdentifierPattern(y),
            declared_type: Some(IrType::PrimitiveType(PrimitiveKind::Number)),
            initializer: Some(Expression::Literal(LiteralValue::Number {
                lexeme: "2".to_string(),
                value: 2.0,
                intent: NumericIntent::Int32,
            })),
        },
    ];
    let mut module = Module::new(InternedPath::from_str("p6.ts", table), table.intern("App"), table.intern("P6"));
    module.body = module_body;
    module
}

#[test]
fn numeric_proof_pass_is_idempotent() {
    let mut table = StringTable::new();
    let module = sample_module(&mut table);

    let (once, collector_once) = numeric_proof::run_numeric_proof(vec![module], &table, DiagnosticsCollector::new());
    assert!(collector_once.is_empty());

    let (twice, collector_twice) = numeric_proof::run_numeric_proof(once.clone(), &table, DiagnosticsCollector::new());
    assert!(collector_twice.is_empty());

    assert_eq!(format!("{once:?}"), format!("{twice:?}"));
}

#[test]
fn soundness_gate_is_idempotent_over_a_module_with_no_any_types() {
    let mut table = StringTable::new();
    let module = sample_module(&mut table);

    let (once, collector_once) = soundness::run_soundness_gate(vec![module], &table, DiagnosticsCollector::new());
    assert!(collector_once.is_empty());

    let (twice, collector_twice) = soundness::run_soundness_gate(once.clone(), &table, DiagnosticsCollector::new());
    assert!(collector_twice.is_empty());

    assert_eq!(format!("{once:?}"), format!("{twice:?}"));
}

#[test]
fn numeric_coercion_check_reports_the_same_diagnostic_sequence_across_runs() {
    let mut table = StringTable::new();
    let module = sample_module(&mut table);

    let (_, first) = numeric_coercion::run_numeric_coercion_check(vec![module.clone()], &table, DiagnosticsCollector::new());
    let (_, second) = numeric_coercion::run_numeric_coercion_check(vec![module], &table, DiagnosticsCollector::new());

    let first_codes: Vec<_> = first.all().iter().map(|d| d.code).collect();
    let second_codes: Vec<_> = second.all().iter().map(|d| d.code).collect();
    assert_eq!(first_codes, second_codes);
    assert_eq!(first_codes.len(), 1, "the unwrapped literal on `y` must be flagged exactly once per run");
}
