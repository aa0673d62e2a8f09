//! Numeric proof (pass 3 of C9, §4.5 step 3, testable property P-2).
//! Attaches a [`NarrowingProof`] to every `numericNarrowing` node the IR
//! builder emitted. A node that cannot be proven is `TSN5101`.

use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::ir::expr::{Expression, NarrowingProof};
use crate::ir::module::Module;
use crate::ir::stmt::Statement;
use crate::string_interning::StringTable;
use std::path::PathBuf;

/// Runs the numeric proof pass over every module, rewriting each
/// `numericNarrowing` node's `proof` field in place and pushing
/// `NumericProofMissing` for any node that can't be proven.
pub fn run_numeric_proof(
    modules: Vec<Module>,
    table: &StringTable,
    mut collector: DiagnosticsCollector,
) -> (Vec<Module>, DiagnosticsCollector) {
    let mut out = Vec::with_capacity(modules.len());
    'modules: for mut module in modules {
        let module_path = PathBuf::from(module.path.to_relative_string(table));
        let mut body = std::mem::take(&mut module.body);
        for statement in &mut body {
            match prove_statement(statement, &module_path, &mut collector) {
                Ok(()) => {}
                Err(()) => {
                    module.body = body;
                    out.push(module);
                    break 'modules;
                }
            }
        }
        module.body = body;
        out.push(module);
    }
    (out, collector)
}

fn prove_statement(
    statement: &mut Statement,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match statement {
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(expr) = initializer {
                prove_expression(expr, module_path, collector)?;
            }
        }
        Statement::FunctionDeclaration { body, .. } => {
            if let Some(stmts) = body {
                for s in stmts {
                    prove_statement(s, module_path, collector)?;
                }
            }
        }
        Statement::Block(statements) => {
            for s in statements {
                prove_statement(s, module_path, collector)?;
            }
        }
        Statement::If { test, consequent, alternate } => {
            prove_expression(test, module_path, collector)?;
            prove_statement(consequent, module_path, collector)?;
            if let Some(alt) = alternate {
                prove_statement(alt, module_path, collector)?;
            }
        }
        Statement::While { test, body } => {
            prove_expression(test, module_path, collector)?;
            prove_statement(body, module_path, collector)?;
        }
        Statement::For { init, test, update, body } => {
            if let Some(init) = init {
                prove_statement(init, module_path, collector)?;
            }
            if let Some(test) = test {
                prove_expression(test, module_path, collector)?;
            }
            if let Some(update) = update {
                prove_expression(update, module_path, collector)?;
            }
            prove_statement(body, module_path, collector)?;
        }
        Statement::Return(expr) | Statement::GeneratorReturn(expr) => {
            if let Some(expr) = expr {
                prove_expression(expr, module_path, collector)?;
            }
        }
        Statement::Throw(expr) => prove_expression(expr, module_path, collector)?,
        Statement::Expression(expr) => prove_expression(expr, module_path, collector)?,
        _ => {}
    }
    Ok(())
}

fn prove_expression(
    expression: &mut Expression,
    module_path: &PathBuf,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    match expression {
        Expression::NumericNarrowing { expression: inner, proof, .. } => {
            prove_expression(inner, module_path, collector)?;
            let derived = derive_proof(inner);
            match derived {
                Some(p) => *proof = Some(p),
                None => {
                    let pushed = collector.push(Diagnostic::new(
                        DiagCode::NumericProofMissing,
                        "no numeric narrowing proof could be derived for this coercion".to_string(),
                        ErrorLocation::new(module_path.clone(), 0, 0),
                    ));
                    if pushed.is_err() {
                        return Err(());
                    }
                }
            }
        }
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            prove_expression(left, module_path, collector)?;
            prove_expression(right, module_path, collector)?;
        }
        Expression::Unary { operand, .. }
        | Expression::Await(operand)
        | Expression::Spread(operand)
        | Expression::Update { operand, .. } => {
            prove_expression(operand, module_path, collector)?;
        }
        Expression::Assignment { target, value, .. } => {
            prove_expression(target, module_path, collector)?;
            prove_expression(value, module_path, collector)?;
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            prove_expression(test, module_path, collector)?;
            prove_expression(consequent, module_path, collector)?;
            prove_expression(alternate, module_path, collector)?;
        }
        Expression::Call { callee, arguments, .. } | Expression::New { callee, arguments, .. } => {
            prove_expression(callee, module_path, collector)?;
            for arg in arguments {
                prove_expression(&mut arg.expression, module_path, collector)?;
            }
        }
        Expression::MemberAccess { object, .. } => {
            prove_expression(object, module_path, collector)?;
        }
        _ => {}
    }
    Ok(())
}

/// Derives the proof kind for an already-proven inner expression. Per
/// §4.5 step 3: literals, binary/unary arithmetic, plain variable and
/// parameter references, and calls into recognized .NET-returning members
/// are all provable; anything else is not.
fn derive_proof(expression: &Expression) -> Option<NarrowingProof> {
    match expression {
        Expression::Literal(_) => Some(NarrowingProof::Literal),
        Expression::Binary { .. } => Some(NarrowingProof::BinaryOp),
        Expression::Unary { .. } => Some(NarrowingProof::UnaryOp),
        Expression::Identifier(_) => Some(NarrowingProof::Variable),
        Expression::MemberAccess { .. } => Some(NarrowingProof::DotnetReturn),
        Expression::Call { .. } => Some(NarrowingProof::DotnetReturn),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{LiteralValue, NumericIntent};
    use crate::ir::ty::{IrType, PrimitiveKind};

    #[test]
    fn literal_narrowing_is_proven() {
        let mut expr = Expression::NumericNarrowing {
            expression: Box::new(Expression::Literal(LiteralValue::Number {
                lexeme: "1".to_string(),
                value: 1.0,
                intent: NumericIntent::Int32,
            })),
            target_type: IrType::PrimitiveType(PrimitiveKind::Number),
            proof: None,
        };
        let mut collector = DiagnosticsCollector::new();
        let path = PathBuf::from("a.ts");
        prove_expression(&mut expr, &path, &mut collector).unwrap();
        assert!(collector.is_empty());
        match expr {
            Expression::NumericNarrowing { proof, .. } => assert_eq!(proof, Some(NarrowingProof::Literal)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unprovable_narrowing_emits_missing_proof() {
        let mut expr = Expression::NumericNarrowing {
            expression: Box::new(Expression::This),
            target_type: IrType::PrimitiveType(PrimitiveKind::Number),
            proof: None,
        };
        let mut collector = DiagnosticsCollector::new();
        let path = PathBuf::from("a.ts");
        prove_expression(&mut expr, &path, &mut collector).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.all()[0].code, DiagCode::NumericProofMissing);
    }
}
