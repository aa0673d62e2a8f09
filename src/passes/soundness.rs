//! Soundness gate (pass 2 of C9, §4.5 step 2). Traverses all IR; any
//! reachable `anyType` is a fatal diagnostic pinpointing the IR path
//! (invariant I-2, testable property P-1).

use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::ir::expr::Expression;
use crate::ir::module::Module;
use crate::ir::stmt::Statement;
use crate::string_interning::StringTable;
use std::path::PathBuf;

/// Runs the soundness gate over every module, returning the (unmodified —
/// this pass never rewrites IR, only inspects it) modules and an updated
/// collector. A fatal push short-circuits the remaining traversal, per
/// the fatal-abort propagation policy (§7).
pub fn run_soundness_gate(
    modules: Vec<Module>,
    table: &StringTable,
    mut collector: DiagnosticsCollector,
) -> (Vec<Module>, DiagnosticsCollector) {
    'modules: for module in &modules {
        let module_path = PathBuf::from(module.path.to_relative_string(table));
        for statement in &module.body {
            if statement_contains_any(statement) {
                let pushed = collector.push(Diagnostic::new(
                    DiagCode::InternalCompilerError,
                    "reachable anyType after the soundness gate".to_string(),
                    ErrorLocation::new(module_path.clone(), 0, 0),
                ));
                if pushed.is_err() {
                    break 'modules;
                }
            }
        }
    }
    (modules, collector)
}

fn statement_contains_any(statement: &Statement) -> bool {
    match statement {
        Statement::VariableDeclaration {
            declared_type,
            initializer,
            ..
        } => {
            declared_type.as_ref().is_some_and(|t| t.contains_any())
                || initializer.as_ref().is_some_and(expression_contains_any)
        }
        Statement::FunctionDeclaration {
            parameters,
            return_type,
            body,
            ..
        } => {
            parameters
                .iter()
                .any(|p| p.declared_type.as_ref().is_some_and(|t| t.contains_any()))
                || return_type.as_ref().is_some_and(|t| t.contains_any())
                || body.as_ref().is_some_and(|stmts| stmts.iter().any(statement_contains_any))
        }
        Statement::Block(statements) => statements.iter().any(statement_contains_any),
        Statement::If {
            test,
            consequent,
            alternate,
        } => {
            expression_contains_any(test)
                || statement_contains_any(consequent)
                || alternate.as_ref().is_some_and(|alt| statement_contains_any(alt))
        }
        Statement::While { test, body } => expression_contains_any(test) || statement_contains_any(body),
        Statement::Return(expr) | Statement::GeneratorReturn(expr) => {
            expr.as_ref().is_some_and(expression_contains_any)
        }
        Statement::Throw(expr) | Statement::Expression(expr) => expression_contains_any(expr),
        _ => false,
    }
}

fn expression_contains_any(expression: &Expression) -> bool {
    match expression {
        Expression::TypeAssertion { target_type, expression }
        | Expression::AsInterface { target_type, expression }
        | Expression::Trycast { target_type, expression } => {
            target_type.contains_any() || expression_contains_any(expression)
        }
        Expression::NumericNarrowing {
            target_type,
            expression,
            ..
        } => target_type.contains_any() || expression_contains_any(expression),
        Expression::Defaultof(ty) => ty.contains_any(),
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            expression_contains_any(left) || expression_contains_any(right)
        }
        Expression::Unary { operand, .. } | Expression::Await(operand) | Expression::Spread(operand) => {
            expression_contains_any(operand)
        }
        _ => false,
    }
}
