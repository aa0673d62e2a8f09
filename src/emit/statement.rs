//! Statement emission (component C10, §4.6). The other half of the
//! mutually recursive emitter dispatcher pair; see
//! [`crate::emit::expression::emit_expression`].

use crate::emit::context::EmitterContext;
use crate::emit::expression::emit_expression;
pub use crate::emit::expression::host_type_of;
use crate::emit::generator::{lower_generator_return, lower_yield_statement, YieldReceive};
use crate::emit::host_ast::{HostExpression, HostStatement, HostType};
use crate::emit::narrowing::{enter_narrowed_branch, guard_condition};
use crate::ir::pattern::Pattern;
use crate::ir::stmt::Statement;
use crate::string_interning::StringTable;

/// Local holding the current exchange instance inside a lowered generator
/// body, and the field on it that carries a yielded value (§4.6).
const GENERATOR_EXCHANGE_LOCAL: &str = "exchange";
const GENERATOR_RETURN_VALUE_LOCAL: &str = "__returnValue";
const GENERATOR_OUTPUT_FIELD: &str = "Output";
const GENERATOR_INPUT_FIELD: &str = "Input";

pub fn emit_statement(statement: &Statement, table: &mut StringTable, ctx: &EmitterContext) -> HostStatement {
    match statement {
        Statement::VariableDeclaration { pattern, declared_type, initializer, .. } => {
            let name = match pattern {
                Pattern::IdentifierPattern(name) => *name,
                // Destructuring declarations are rewritten into individual
                // bindings by the IR builder before emission reaches here;
                // this arm only has to name the first bound identifier.
                other => other.bound_names().first().copied().unwrap_or_else(|| table.intern("_")),
            };
            let ty = declared_type
                .as_ref()
                .map(|t| host_type_of(t, table))
                .unwrap_or(HostType::Var);
            let init = initializer.as_ref().map(|e| emit_expression(e, table, ctx));
            HostStatement::LocalDeclaration { declared_type: ty, name, initializer: init }
        }
        Statement::Block(statements) => {
            HostStatement::Block(statements.iter().map(|s| emit_statement(s, table, ctx)).collect())
        }
        Statement::If { test, consequent, alternate } => {
            let (test_expr, consequent_stmt) = match test.narrowing_info() {
                Some(info) => {
                    let narrowed_type = info.narrowed_type.clone();
                    let condition = guard_condition(info, table, ctx);
                    let (unwrap, entered) = enter_narrowed_branch(info, narrowed_type, table, ctx);
                    let body = emit_statement(consequent, table, &entered);
                    (condition, HostStatement::Block(vec![unwrap, body]))
                }
                None => (emit_expression(test, table, ctx), emit_statement(consequent, table, ctx)),
            };
            HostStatement::If {
                test: test_expr,
                consequent: Box::new(consequent_stmt),
                alternate: alternate.as_ref().map(|a| Box::new(emit_statement(a, table, ctx))),
            }
        }
        Statement::While { test, body } => HostStatement::While {
            test: emit_expression(test, table, ctx),
            body: Box::new(emit_statement(body, table, ctx)),
        },
        Statement::For { init, test, update, body } => HostStatement::For {
            init: init.as_ref().map(|s| Box::new(emit_statement(s, table, ctx))),
            test: test.as_ref().map(|e| emit_expression(e, table, ctx)),
            update: update.as_ref().map(|e| emit_expression(e, table, ctx)),
            body: Box::new(emit_statement(body, table, ctx)),
        },
        Statement::ForOf { left, declared_type, right, body, is_await } => {
            let name = match left {
                Pattern::IdentifierPattern(name) => *name,
                other => other.bound_names().first().copied().unwrap_or_else(|| table.intern("_")),
            };
            let ty = declared_type
                .as_ref()
                .map(|t| host_type_of(t, table))
                .unwrap_or(HostType::Var);
            HostStatement::Foreach {
                declared_type: ty,
                name,
                iterable: emit_expression(right, table, ctx),
                body: Box::new(emit_statement(body, table, ctx)),
                is_await: *is_await,
            }
        }
        Statement::Switch { discriminant, cases } => HostStatement::Switch {
            discriminant: emit_expression(discriminant, table, ctx),
            cases: cases
                .iter()
                .map(|case| {
                    let test = case.test.as_ref().map(|e| emit_expression(e, table, ctx));
                    let body = case.body.iter().map(|s| emit_statement(s, table, ctx)).collect();
                    (test, body)
                })
                .collect(),
        },
        Statement::Try { block, handler, finalizer } => HostStatement::Try {
            block: block.iter().map(|s| emit_statement(s, table, ctx)).collect(),
            catch_parameter: handler.as_ref().and_then(|h| h.parameter.as_ref()).map(|p| match p {
                Pattern::IdentifierPattern(name) => *name,
                other => other.bound_names().first().copied().unwrap_or_else(|| table.intern("_")),
            }),
            catch_body: handler
                .as_ref()
                .map(|h| h.body.iter().map(|s| emit_statement(s, table, ctx)).collect()),
            finally_body: finalizer
                .as_ref()
                .map(|stmts| stmts.iter().map(|s| emit_statement(s, table, ctx)).collect()),
        },
        Statement::Throw(expr) => HostStatement::Throw(emit_expression(expr, table, ctx)),
        Statement::Return(expr) => HostStatement::Return(expr.as_ref().map(|e| emit_expression(e, table, ctx))),
        Statement::GeneratorReturn(expr) => {
            let return_local = table.intern(GENERATOR_RETURN_VALUE_LOCAL);
            let value = expr.as_ref().map(|e| emit_expression(e, table, ctx));
            HostStatement::Block(lower_generator_return(return_local, value))
        }
        Statement::Break(_) => HostStatement::Break,
        Statement::Continue(_) => HostStatement::Continue,
        Statement::Expression(expr) => HostStatement::Expression(emit_expression(expr, table, ctx)),
        Statement::Empty => HostStatement::Empty,
        Statement::YieldStatement { output, received_type, receive_target } => {
            let exchange_local = table.intern(GENERATOR_EXCHANGE_LOCAL);
            let output_field = table.intern(GENERATOR_OUTPUT_FIELD);
            let input_field = table.intern(GENERATOR_INPUT_FIELD);
            let output_expr = emit_expression(output, table, ctx);
            let receive = receive_target.as_ref().map(|target| {
                let target_local = match target {
                    Pattern::IdentifierPattern(name) => *name,
                    other => other.bound_names().first().copied().unwrap_or_else(|| table.intern("_")),
                };
                let declared_type = received_type
                    .as_ref()
                    .map(|t| host_type_of(t, table))
                    .unwrap_or(HostType::Var);
                YieldReceive { declared_type, target_local }
            });
            HostStatement::Block(lower_yield_statement(exchange_local, output_field, input_field, output_expr, receive))
        }
        // Declarations inside a statement list (nested function/class/etc.)
        // are handled by the module/container-level emission driver, which
        // owns member ordering and static-container placement; reaching
        // here means a local declaration, emitted as a no-op placeholder
        // the driver already hoisted.
        Statement::FunctionDeclaration { .. }
        | Statement::ClassDeclaration { .. }
        | Statement::InterfaceDeclaration { .. }
        | Statement::EnumDeclaration { .. }
        | Statement::TypeAliasDeclaration { .. } => HostStatement::Empty,
    }
}
