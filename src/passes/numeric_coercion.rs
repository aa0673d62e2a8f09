//! Numeric coercion check (pass 4 of C9, §4.5 step 4, testable property
//! P-3). Detects an `Int32`-intent expression appearing in a position
//! that expects `double` without having been wrapped in a
//! `numericNarrowing` node. This pass never inserts the wrapping itself —
//! that is pass 3's and the IR builder's job — it only verifies the
//! contract was honored and emits `TSN5110` where it wasn't.
//!
//! The positions checked: variable-declaration initializers, function
//! return statements, call/`new` arguments matched against the callee's
//! declared parameter types, array literal elements against a declared
//! element type, and the non-narrowed partner of a binary arithmetic
//! operand whose sibling has already been proven `double`.

use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::ir::expr::{CallArgument, Expression, LiteralValue, NumericIntent};
use crate::ir::module::Module;
use crate::ir::stmt::{ClassMemberKind, Statement};
use crate::ir::ty::{IrType, PrimitiveKind};
use crate::string_interning::{StringId, StringTable};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Declared positional parameter types for every top-level function and
/// class constructor in a module, keyed by the callable's name. Built
/// fresh per module; this pass has no access to the unified type universe
/// (§4.5 step 4 operates purely on the IR it's handed).
type SignatureMap = FxHashMap<StringId, Vec<Option<IrType>>>;

/// Runs the numeric coercion check over every module's variable
/// declarations, function return positions, call/`new` arguments, array
/// elements, and binary-operand pairs.
pub fn run_numeric_coercion_check(
    modules: Vec<Module>,
    table: &StringTable,
    mut collector: DiagnosticsCollector,
) -> (Vec<Module>, DiagnosticsCollector) {
    'modules: for module in &modules {
        let module_path = PathBuf::from(module.path.to_relative_string(table));
        let signatures = collect_signatures(module, table);
        for statement in &module.body {
            if check_statement(statement, &signatures, &module_path, &mut collector).is_err() {
                break 'modules;
            }
        }
    }
    (modules, collector)
}

fn collect_signatures(module: &Module, table: &StringTable) -> SignatureMap {
    let mut map = FxHashMap::default();
    for statement in &module.body {
        match statement {
            Statement::FunctionDeclaration { name, parameters, .. } => {
                map.insert(*name, parameters.iter().map(|p| p.declared_type.clone()).collect());
            }
            Statement::ClassDeclaration { name, members, .. } => {
                for member in members {
                    if table.resolve(member.name) != "constructor" {
                        continue;
                    }
                    if let ClassMemberKind::Method { parameters, .. } = &member.kind {
                        map.insert(*name, parameters.iter().map(|p| p.declared_type.clone()).collect());
                    }
                }
            }
            _ => {}
        }
    }
    map
}

fn check_statement(
    statement: &Statement,
    signatures: &SignatureMap,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match statement {
        Statement::VariableDeclaration { declared_type, initializer, .. } => {
            if let Some(expr) = initializer {
                if let Some(declared) = declared_type {
                    check_value_against_type(declared, expr, module_path, collector)?;
                }
                check_expression(expr, signatures, module_path, collector)?;
            }
        }
        Statement::FunctionDeclaration { return_type, body, .. } => {
            if let Some(stmts) = body {
                for s in stmts {
                    check_return_statement(s, return_type.as_ref(), signatures, module_path, collector)?;
                    check_statement(s, signatures, module_path, collector)?;
                }
            }
        }
        Statement::ClassDeclaration { members, .. } => {
            for member in members {
                if let ClassMemberKind::Method { return_type, body, .. } = &member.kind {
                    if let Some(stmts) = body {
                        for s in stmts {
                            check_return_statement(s, return_type.as_ref(), signatures, module_path, collector)?;
                            check_statement(s, signatures, module_path, collector)?;
                        }
                    }
                }
            }
        }
        Statement::Block(statements) => {
            for s in statements {
                check_statement(s, signatures, module_path, collector)?;
            }
        }
        Statement::If { test, consequent, alternate } => {
            check_expression(test, signatures, module_path, collector)?;
            check_statement(consequent, signatures, module_path, collector)?;
            if let Some(alt) = alternate {
                check_statement(alt, signatures, module_path, collector)?;
            }
        }
        Statement::While { test, body } => {
            check_expression(test, signatures, module_path, collector)?;
            check_statement(body, signatures, module_path, collector)?;
        }
        Statement::Expression(expr) => check_expression(expr, signatures, module_path, collector)?,
        Statement::Return(Some(expr)) | Statement::Throw(expr) => {
            check_expression(expr, signatures, module_path, collector)?;
        }
        _ => {}
    }
    Ok(())
}

fn check_return_statement(
    statement: &Statement,
    return_type: Option<&IrType>,
    signatures: &SignatureMap,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match statement {
        Statement::Return(Some(expr)) => {
            if let Some(declared) = return_type {
                check_value_against_type(declared, expr, module_path, collector)?;
            }
        }
        Statement::Block(statements) => {
            for s in statements {
                check_return_statement(s, return_type, signatures, module_path, collector)?;
            }
        }
        Statement::If { consequent, alternate, .. } => {
            check_return_statement(consequent, return_type, signatures, module_path, collector)?;
            if let Some(alt) = alternate {
                check_return_statement(alt, return_type, signatures, module_path, collector)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Recursively walks an expression looking for call/`new` arguments that
/// mismatch the callee's declared parameter types, and binary arithmetic
/// pairs where one operand has been narrowed to `double` and the other
/// hasn't.
fn check_expression(
    expression: &Expression,
    signatures: &SignatureMap,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match expression {
        Expression::Call { callee, arguments, .. } | Expression::New { callee, arguments, .. } => {
            check_call_arguments(callee, arguments, signatures, module_path, collector)?;
        }
        Expression::Binary { left, right, .. } => {
            check_binary_operand_pair(left, right, module_path, collector)?;
            check_expression(left, signatures, module_path, collector)?;
            check_expression(right, signatures, module_path, collector)?;
        }
        Expression::Logical { left, right, .. } => {
            check_expression(left, signatures, module_path, collector)?;
            check_expression(right, signatures, module_path, collector)?;
        }
        Expression::Assignment { value, .. } => {
            check_expression(value, signatures, module_path, collector)?;
        }
        Expression::Unary { operand, .. }
        | Expression::Spread(operand)
        | Expression::Await(operand) => {
            check_expression(operand, signatures, module_path, collector)?;
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            check_expression(test, signatures, module_path, collector)?;
            check_expression(consequent, signatures, module_path, collector)?;
            check_expression(alternate, signatures, module_path, collector)?;
        }
        Expression::Array(elements) => {
            for element in elements {
                check_expression(&element.expression, signatures, module_path, collector)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_call_arguments(
    callee: &Expression,
    arguments: &[CallArgument],
    signatures: &SignatureMap,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    if let Expression::Identifier(name) = callee {
        if let Some(param_types) = signatures.get(name) {
            for (param_type, argument) in param_types.iter().zip(arguments.iter()) {
                if let Some(declared) = param_type {
                    check_value_against_type(declared, &argument.expression, module_path, collector)?;
                }
            }
        }
    }
    for argument in arguments {
        check_expression(&argument.expression, signatures, module_path, collector)?;
    }
    check_expression(callee, signatures, module_path, collector)
}

/// `left op right` where one side is already a proven-`double`
/// `numericNarrowing` node and the other is a bare, unwrapped `Int32`
/// literal: the bare side should have been wrapped by the IR builder too.
fn check_binary_operand_pair(
    left: &Expression,
    right: &Expression,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    if is_double_narrowed(left) && expression_is_unwrapped_int32(right) {
        flag_unproven_widening(module_path, collector)?;
    }
    if is_double_narrowed(right) && expression_is_unwrapped_int32(left) {
        flag_unproven_widening(module_path, collector)?;
    }
    Ok(())
}

fn is_double_narrowed(expression: &Expression) -> bool {
    matches!(expression, Expression::NumericNarrowing { target_type, .. } if is_double(target_type))
}

fn check_assignment_target(
    declared: &IrType,
    expr: &Expression,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    check_value_against_type(declared, expr, module_path, collector)
}

fn check_value_against_type(
    declared: &IrType,
    expr: &Expression,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    if let (IrType::ArrayType(inner), Expression::Array(elements)) = (declared, expr) {
        for element in elements {
            check_value_against_type(inner, &element.expression, module_path, collector)?;
        }
        return Ok(());
    }
    if !is_double(declared) {
        return Ok(());
    }
    if expression_is_unwrapped_int32(expr) {
        flag_unproven_widening(module_path, collector)?;
    }
    Ok(())
}

fn flag_unproven_widening(module_path: &PathBuf, collector: &mut DiagnosticsCollector) -> Result<(), ()> {
    let pushed = collector.push(Diagnostic::new(
        DiagCode::NumericWideningUnproven,
        "Int32-intent expression used in a double-expecting position without a numeric narrowing".to_string(),
        ErrorLocation::new(module_path.clone(), 0, 0),
    ));
    if pushed.is_err() { Err(()) } else { Ok(()) }
}

fn is_double(ty: &IrType) -> bool {
    matches!(ty, IrType::PrimitiveType(PrimitiveKind::Number))
}

fn expression_is_unwrapped_int32(expression: &Expression) -> bool {
    match expression {
        Expression::Literal(LiteralValue::Number { intent, .. }) => *intent == NumericIntent::Int32,
        Expression::NumericNarrowing { .. } => false,
        _ => false,
    }
}
