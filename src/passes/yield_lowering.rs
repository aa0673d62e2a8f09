//! Yield lowering (pass 5 of C9, §4.5 step 5). Every `yield e` expression
//! inside a generator body becomes a `YieldStatement`, the only point at
//! which that internal-only statement variant is produced. A `yield`
//! found outside a valid position (not directly as a statement, or
//! inside a non-generator function) is `TSN6101`.

use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::ir::expr::{AssignmentOperator, Expression};
use crate::ir::module::Module;
use crate::ir::pattern::Pattern;
use crate::ir::stmt::Statement;
use crate::string_interning::StringTable;
use std::path::PathBuf;

pub fn run_yield_lowering(
    modules: Vec<Module>,
    table: &StringTable,
    mut collector: DiagnosticsCollector,
) -> (Vec<Module>, DiagnosticsCollector) {
    let mut out = Vec::with_capacity(modules.len());
    'modules: for mut module in modules {
        let module_path = PathBuf::from(module.path.to_relative_string(table));
        let mut body = std::mem::take(&mut module.body);
        for statement in &mut body {
            if lower_statement(statement, false, &module_path, &mut collector).is_err() {
                module.body = body;
                out.push(module);
                break 'modules;
            }
        }
        module.body = body;
        out.push(module);
    }
    (out, collector)
}

/// Rewrites `statement` in place. `in_generator` tracks whether the
/// enclosing function body is a generator; non-generator bodies reject
/// any `yield` found inside them.
fn lower_statement(
    statement: &mut Statement,
    in_generator: bool,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match statement {
        Statement::FunctionDeclaration { body, is_generator, .. } => {
            if let Some(stmts) = body {
                lower_body(stmts, *is_generator, module_path, collector)?;
            }
        }
        Statement::Block(statements) => lower_body(statements, in_generator, module_path, collector)?,
        Statement::If { test, consequent, alternate } => {
            reject_yield_in_expression(test, module_path, collector)?;
            lower_statement(consequent, in_generator, module_path, collector)?;
            if let Some(alt) = alternate {
                lower_statement(alt, in_generator, module_path, collector)?;
            }
        }
        Statement::While { test, body } => {
            reject_yield_in_expression(test, module_path, collector)?;
            lower_statement(body, in_generator, module_path, collector)?;
        }
        Statement::Expression(expr) => {
            let is_direct_assignment_of_yield = matches!(
                expr,
                Expression::Assignment { operator: AssignmentOperator::Assign, value, .. }
                    if matches!(value.as_ref(), Expression::Yield { is_delegate: false, .. })
            );
            if let Expression::Yield { argument, is_delegate } = expr {
                if !in_generator {
                    return reject(module_path, collector);
                }
                if *is_delegate {
                    return reject(module_path, collector);
                }
                let output = argument.take().map(|b| *b).unwrap_or(Expression::Literal(
                    crate::ir::expr::LiteralValue::Undefined,
                ));
                *statement = Statement::YieldStatement {
                    output,
                    received_type: None,
                    receive_target: None,
                };
            } else if is_direct_assignment_of_yield {
                if !in_generator {
                    return reject(module_path, collector);
                }
                let Expression::Assignment { target, value, .. } = expr else {
                    unreachable!("matched above")
                };
                let receive_target = match target.as_ref() {
                    Expression::Identifier(name) => Pattern::IdentifierPattern(*name),
                    _ => return reject(module_path, collector),
                };
                let Expression::Yield { argument, .. } = value.as_mut() else {
                    unreachable!("matched above")
                };
                let output = argument.take().map(|b| *b).unwrap_or(Expression::Literal(
                    crate::ir::expr::LiteralValue::Undefined,
                ));
                *statement = Statement::YieldStatement {
                    output,
                    received_type: None,
                    receive_target: Some(receive_target),
                };
            } else {
                reject_yield_in_expression(expr, module_path, collector)?;
            }
        }
        Statement::VariableDeclaration { pattern, declared_type, initializer, .. } => {
            if let Some(init_expr) = initializer {
                if matches!(init_expr, Expression::Yield { is_delegate: false, .. }) {
                    if !in_generator {
                        return reject(module_path, collector);
                    }
                    let received_type = declared_type.clone();
                    let receive_target = Some(pattern.clone());
                    let Expression::Yield { argument, .. } = init_expr else {
                        unreachable!("matched above")
                    };
                    let output = argument.take().map(|b| *b).unwrap_or(Expression::Literal(
                        crate::ir::expr::LiteralValue::Undefined,
                    ));
                    *statement = Statement::YieldStatement { output, received_type, receive_target };
                } else {
                    reject_yield_in_expression(init_expr, module_path, collector)?;
                }
            }
        }
        Statement::Return(Some(expr)) | Statement::Throw(expr) => {
            reject_yield_in_expression(expr, module_path, collector)?;
        }
        _ => {}
    }
    Ok(())
}

fn lower_body(
    statements: &mut [Statement],
    in_generator: bool,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    for statement in statements {
        lower_statement(statement, in_generator, module_path, collector)?;
    }
    Ok(())
}

/// A `yield` nested inside a larger expression (anything other than the
/// sole content of an expression statement) is always invalid position,
/// per §4.5 step 5.
fn reject_yield_in_expression(
    expression: &Expression,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    if contains_yield(expression) {
        return reject(module_path, collector);
    }
    Ok(())
}

fn contains_yield(expression: &Expression) -> bool {
    match expression {
        Expression::Yield { .. } => true,
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            contains_yield(left) || contains_yield(right)
        }
        Expression::Unary { operand, .. } | Expression::Await(operand) | Expression::Spread(operand) => {
            contains_yield(operand)
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            contains_yield(test) || contains_yield(consequent) || contains_yield(alternate)
        }
        Expression::Assignment { value, .. } => contains_yield(value),
        _ => false,
    }
}

fn reject(module_path: &PathBuf, collector: &mut DiagnosticsCollector) -> Result<(), ()> {
    let pushed = collector.push(Diagnostic::new(
        DiagCode::InvalidYieldPosition,
        "'yield' used outside a valid generator statement position".to_string(),
        ErrorLocation::new(module_path.clone(), 0, 0),
    ));
    if pushed.is_err() {
        Err(())
    } else {
        Ok(())
    }
}
