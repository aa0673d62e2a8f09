//! Attribute collection (pass 6 of C9, §4.5 step 6). Recognizes
//! attribute-marker call chains of the shape `A.on(X).type(Y)` attached
//! immediately before a declaration and converts them into an
//! [`IrAttribute`] on that declaration, removing the marker statement
//! itself from the body.

use crate::ir::expr::Expression;
use crate::ir::module::Module;
use crate::ir::stmt::{AttributeArgument, IrAttribute, Statement};
use crate::string_interning::{StringId, StringTable};

/// Name of the recognized attribute-marker namespace root (`A.on(...)`).
const MARKER_ROOT: &str = "A";

pub fn run_attribute_collection(mut modules: Vec<Module>, table: &StringTable) -> Vec<Module> {
    for module in &mut modules {
        module.body = collect_in_body(std::mem::take(&mut module.body), table);
    }
    modules
}

fn collect_in_body(statements: Vec<Statement>, table: &StringTable) -> Vec<Statement> {
    let mut out: Vec<Statement> = Vec::with_capacity(statements.len());
    let mut pending: Vec<IrAttribute> = Vec::new();

    for statement in statements {
        match marker_attribute(&statement, table) {
            Some(attr) => pending.push(attr),
            None => {
                let mut statement = recurse_into_bodies(statement, table);
                if !pending.is_empty() {
                    attach_attributes(&mut statement, std::mem::take(&mut pending));
                }
                out.push(statement);
            }
        }
    }
    out
}

/// Recognizes a standalone expression-statement marker call chain and
/// extracts its attribute name plus flattened argument list. The chain
/// is read outside-in: `A.on(X).type(Y)` parses as nested `Call`s whose
/// innermost callee carries the root identifier.
fn marker_attribute(statement: &Statement, table: &StringTable) -> Option<IrAttribute> {
    let Statement::Expression(expr) = statement else {
        return None;
    };
    let mut segments: Vec<StringId> = Vec::new();
    let mut arguments = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expression::Call { callee, arguments: call_args, .. } => {
                arguments.splice(
                    0..0,
                    call_args.iter().map(|a| AttributeArgument {
                        name: None,
                        value: a.expression.clone(),
                    }),
                );
                current = callee;
            }
            Expression::MemberAccess {
                object,
                property: crate::ir::expr::PropertyKey::Name(name),
                ..
            } => {
                segments.push(*name);
                current = object;
            }
            Expression::Identifier(name) => {
                segments.push(*name);
                break;
            }
            _ => return None,
        }
    }
    segments.reverse();
    let root = *segments.first()?;
    if table.resolve(root) != MARKER_ROOT {
        return None;
    }
    let attribute_name = *segments.get(1)?;
    Some(IrAttribute { name: attribute_name, arguments })
}

fn attach_attributes(statement: &mut Statement, attrs: Vec<IrAttribute>) {
    match statement {
        Statement::FunctionDeclaration { attributes, .. } | Statement::ClassDeclaration { attributes, .. } => {
            attributes.extend(attrs);
        }
        _ => {}
    }
}

fn recurse_into_bodies(statement: Statement, table: &StringTable) -> Statement {
    match statement {
        Statement::FunctionDeclaration {
            name,
            type_parameters,
            parameters,
            return_type,
            body,
            is_generator,
            is_async,
            attributes,
        } => Statement::FunctionDeclaration {
            name,
            type_parameters,
            parameters,
            return_type,
            body: body.map(|b| collect_in_body(b, table)),
            is_generator,
            is_async,
            attributes,
        },
        Statement::Block(statements) => Statement::Block(collect_in_body(statements, table)),
        Statement::If { test, consequent, alternate } => Statement::If {
            test,
            consequent: Box::new(recurse_into_bodies(*consequent, table)),
            alternate: alternate.map(|a| Box::new(recurse_into_bodies(*a, table))),
        },
        Statement::While { test, body } => Statement::While {
            test,
            body: Box::new(recurse_into_bodies(*body, table)),
        },
        other => other,
    }
}
