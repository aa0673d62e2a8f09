//! Specialization collection (the post-pipeline pass that runs after the
//! six fixed passes, §4.5). Walks every module for calls and
//! constructions flagged `requires_specialization`, deduplicates them by
//! `(name, type-argument serialization)`, and records one
//! [`SpecializationRequest`] per distinct instantiation so the emitter
//! can synthesize a concrete, monomorphized declaration for each.

use crate::ir::expr::Expression;
use crate::ir::module::Module;
use crate::ir::pattern::Parameter;
use crate::ir::stmt::{CatchClause, Statement, SwitchCase};
use crate::ir::ty::{FunctionTypeParam, IrType, ObjectTypeMember};
use crate::passes::anon_types::canonical_type_key;
use crate::string_interning::{StringId, StringTable};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct SpecializationRequest {
    pub callee_name: StringId,
    pub type_arguments: Vec<IrType>,
    /// Deterministic, content-derived suffix distinguishing this
    /// instantiation from others of the same generic declaration.
    pub mangled_suffix: String,
}

/// Collects every distinct `(callee, type arguments)` instantiation
/// across all modules, in a deterministic order (first occurrence when
/// walking modules in path order, which callers must have already
/// sorted per invariant I-6).
pub fn collect_specializations(modules: &[Module], table: &StringTable) -> Vec<SpecializationRequest> {
    let mut seen: FxHashSet<(StringId, String)> = FxHashSet::default();
    let mut requests = Vec::new();
    for module in modules {
        for statement in &module.body {
            walk_statement(statement, table, &mut seen, &mut requests);
        }
    }
    requests
}

fn walk_statement(
    statement: &Statement,
    table: &StringTable,
    seen: &mut FxHashSet<(StringId, String)>,
    requests: &mut Vec<SpecializationRequest>,
) {
    match statement {
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(expr) = initializer {
                walk_expression(expr, table, seen, requests);
            }
        }
        Statement::FunctionDeclaration { body, .. } => {
            if let Some(stmts) = body {
                for s in stmts {
                    walk_statement(s, table, seen, requests);
                }
            }
        }
        Statement::Block(statements) => {
            for s in statements {
                walk_statement(s, table, seen, requests);
            }
        }
        Statement::If { test, consequent, alternate } => {
            walk_expression(test, table, seen, requests);
            walk_statement(consequent, table, seen, requests);
            if let Some(alt) = alternate {
                walk_statement(alt, table, seen, requests);
            }
        }
        Statement::While { test, body } => {
            walk_expression(test, table, seen, requests);
            walk_statement(body, table, seen, requests);
        }
        Statement::Return(Some(expr)) | Statement::Throw(expr) | Statement::Expression(expr) => {
            walk_expression(expr, table, seen, requests);
        }
        _ => {}
    }
}

fn walk_expression(
    expression: &Expression,
    table: &StringTable,
    seen: &mut FxHashSet<(StringId, String)>,
    requests: &mut Vec<SpecializationRequest>,
) {
    match expression {
        Expression::Call { callee, type_arguments, arguments, requires_specialization, .. }
        | Expression::New { callee, type_arguments, arguments, requires_specialization } => {
            if *requires_specialization {
                if let Expression::Identifier(name) = callee.as_ref() {
                    record(*name, type_arguments, table, seen, requests);
                }
            }
            walk_expression(callee, table, seen, requests);
            for arg in arguments {
                walk_expression(&arg.expression, table, seen, requests);
            }
        }
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            walk_expression(left, table, seen, requests);
            walk_expression(right, table, seen, requests);
        }
        Expression::Unary { operand, .. } | Expression::Await(operand) | Expression::Spread(operand) => {
            walk_expression(operand, table, seen, requests);
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            walk_expression(test, table, seen, requests);
            walk_expression(consequent, table, seen, requests);
            walk_expression(alternate, table, seen, requests);
        }
        Expression::MemberAccess { object, .. } => walk_expression(object, table, seen, requests),
        _ => {}
    }
}

fn record(
    name: StringId,
    type_arguments: &[IrType],
    table: &StringTable,
    seen: &mut FxHashSet<(StringId, String)>,
    requests: &mut Vec<SpecializationRequest>,
) {
    let (key, suffix) = mangled_key_and_suffix(type_arguments, table);
    if !seen.insert((name, key)) {
        return;
    }
    requests.push(SpecializationRequest {
        callee_name: name,
        type_arguments: type_arguments.to_vec(),
        mangled_suffix: suffix,
    });
}

/// The dedup key (joined canonical type keys) and its mangled suffix for
/// a set of type arguments. Shared with the emitter so a call/new site
/// can recompute the same suffix `collect_specializations` assigned it
/// without re-running collection.
pub(crate) fn mangled_key_and_suffix(type_arguments: &[IrType], table: &StringTable) -> (String, String) {
    let serialized: Vec<String> = type_arguments.iter().map(|t| canonical_type_key(t, table)).collect();
    let key = serialized.join(",");
    let suffix = mangle(&key);
    (key, suffix)
}

/// Deterministic, readable suffix derived from the serialized type
/// arguments. Not a cryptographic hash — collisions are acceptable only
/// in the sense that identical serializations are meant to collide
/// (that's the dedup key); distinct serializations must not.
pub(crate) fn mangle(serialized: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in serialized.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    format!("{hash:016x}")
}

/// Clones `decl` (a generic `FunctionDeclaration` matching
/// `request.callee_name`) with every occurrence of its type parameters
/// substituted by `request.type_arguments`, renamed to
/// `specialized_name`. Returns `None` if `decl` isn't the generic
/// declaration this request names.
pub fn specialize_function_declaration(
    decl: &Statement,
    request: &SpecializationRequest,
    specialized_name: StringId,
) -> Option<Statement> {
    let Statement::FunctionDeclaration { name, type_parameters, parameters, return_type, body, is_generator, is_async, attributes } = decl else {
        return None;
    };
    if *name != request.callee_name || type_parameters.is_empty() {
        return None;
    }

    let mut substitution: FxHashMap<StringId, IrType> = FxHashMap::default();
    for (param, concrete) in type_parameters.iter().zip(request.type_arguments.iter()) {
        substitution.insert(param.name, concrete.clone());
    }

    Some(Statement::FunctionDeclaration {
        name: specialized_name,
        type_parameters: Vec::new(),
        parameters: parameters.iter().map(|p| substitute_parameter(p, &substitution)).collect(),
        return_type: return_type.as_ref().map(|t| substitute_type(t, &substitution)),
        body: body.as_ref().map(|stmts| stmts.iter().map(|s| substitute_statement(s, &substitution)).collect()),
        is_generator: *is_generator,
        is_async: *is_async,
        attributes: attributes.clone(),
    })
}

fn substitute_type(ty: &IrType, sub: &FxHashMap<StringId, IrType>) -> IrType {
    match ty {
        IrType::TypeParameterType(name) => sub.get(name).cloned().unwrap_or_else(|| ty.clone()),
        IrType::ReferenceType { name, type_arguments, resolved_host_name } => IrType::ReferenceType {
            name: *name,
            type_arguments: type_arguments.iter().map(|t| substitute_type(t, sub)).collect(),
            resolved_host_name: *resolved_host_name,
        },
        IrType::ArrayType(inner) => IrType::ArrayType(Box::new(substitute_type(inner, sub))),
        IrType::TupleType(items) => IrType::TupleType(items.iter().map(|t| substitute_type(t, sub)).collect()),
        IrType::UnionType(items) => IrType::UnionType(items.iter().map(|t| substitute_type(t, sub)).collect()),
        IrType::IntersectionType(items) => {
            IrType::IntersectionType(items.iter().map(|t| substitute_type(t, sub)).collect())
        }
        IrType::FunctionType { parameters, return_type } => IrType::FunctionType {
            parameters: parameters
                .iter()
                .map(|p| FunctionTypeParam {
                    ty: substitute_type(&p.ty, sub),
                    is_optional: p.is_optional,
                    is_rest: p.is_rest,
                })
                .collect(),
            return_type: Box::new(substitute_type(return_type, sub)),
        },
        IrType::ObjectType(members) => IrType::ObjectType(
            members
                .iter()
                .map(|m| ObjectTypeMember { name: m.name, ty: substitute_type(&m.ty, sub), is_optional: m.is_optional })
                .collect(),
        ),
        IrType::DictionaryType { key, value } => {
            IrType::DictionaryType { key: Box::new(substitute_type(key, sub)), value: Box::new(substitute_type(value, sub)) }
        }
        other => other.clone(),
    }
}

fn substitute_parameter(param: &Parameter, sub: &FxHashMap<StringId, IrType>) -> Parameter {
    Parameter {
        pattern: param.pattern.clone(),
        declared_type: param.declared_type.as_ref().map(|t| substitute_type(t, sub)),
        initializer: param.initializer.as_ref().map(|e| substitute_expression(e, sub)),
        is_optional: param.is_optional,
        is_rest: param.is_rest,
        passing: param.passing,
    }
}

fn substitute_statement(statement: &Statement, sub: &FxHashMap<StringId, IrType>) -> Statement {
    match statement {
        Statement::VariableDeclaration { kind, pattern, declared_type, initializer } => Statement::VariableDeclaration {
            kind: *kind,
            pattern: pattern.clone(),
            declared_type: declared_type.as_ref().map(|t| substitute_type(t, sub)),
            initializer: initializer.as_ref().map(|e| substitute_expression(e, sub)),
        },
        Statement::FunctionDeclaration { name, type_parameters, parameters, return_type, body, is_generator, is_async, attributes } => {
            Statement::FunctionDeclaration {
                name: *name,
                type_parameters: type_parameters.clone(),
                parameters: parameters.iter().map(|p| substitute_parameter(p, sub)).collect(),
                return_type: return_type.as_ref().map(|t| substitute_type(t, sub)),
                body: body.as_ref().map(|stmts| stmts.iter().map(|s| substitute_statement(s, sub)).collect()),
                is_generator: *is_generator,
                is_async: *is_async,
                attributes: attributes.clone(),
            }
        }
        // Nested nominal declarations don't carry the enclosing function's
        // type parameters (§3.1); left untouched.
        Statement::ClassDeclaration { .. }
        | Statement::InterfaceDeclaration { .. }
        | Statement::EnumDeclaration { .. }
        | Statement::TypeAliasDeclaration { .. } => statement.clone(),
        Statement::Block(stmts) => Statement::Block(stmts.iter().map(|s| substitute_statement(s, sub)).collect()),
        Statement::If { test, consequent, alternate } => Statement::If {
            test: substitute_expression(test, sub),
            consequent: Box::new(substitute_statement(consequent, sub)),
            alternate: alternate.as_ref().map(|a| Box::new(substitute_statement(a, sub))),
        },
        Statement::While { test, body } => {
            Statement::While { test: substitute_expression(test, sub), body: Box::new(substitute_statement(body, sub)) }
        }
        Statement::For { init, test, update, body } => Statement::For {
            init: init.as_ref().map(|s| Box::new(substitute_statement(s, sub))),
            test: test.as_ref().map(|e| substitute_expression(e, sub)),
            update: update.as_ref().map(|e| substitute_expression(e, sub)),
            body: Box::new(substitute_statement(body, sub)),
        },
        Statement::ForOf { left, declared_type, right, body, is_await } => Statement::ForOf {
            left: left.clone(),
            declared_type: declared_type.as_ref().map(|t| substitute_type(t, sub)),
            right: substitute_expression(right, sub),
            body: Box::new(substitute_statement(body, sub)),
            is_await: *is_await,
        },
        Statement::Switch { discriminant, cases } => Statement::Switch {
            discriminant: substitute_expression(discriminant, sub),
            cases: cases
                .iter()
                .map(|c| SwitchCase {
                    test: c.test.as_ref().map(|e| substitute_expression(e, sub)),
                    body: c.body.iter().map(|s| substitute_statement(s, sub)).collect(),
                })
                .collect(),
        },
        Statement::Try { block, handler, finalizer } => Statement::Try {
            block: block.iter().map(|s| substitute_statement(s, sub)).collect(),
            handler: handler.as_ref().map(|h| CatchClause {
                parameter: h.parameter.clone(),
                body: h.body.iter().map(|s| substitute_statement(s, sub)).collect(),
            }),
            finalizer: finalizer.as_ref().map(|stmts| stmts.iter().map(|s| substitute_statement(s, sub)).collect()),
        },
        Statement::Throw(expr) => Statement::Throw(substitute_expression(expr, sub)),
        Statement::Return(expr) => Statement::Return(expr.as_ref().map(|e| substitute_expression(e, sub))),
        Statement::GeneratorReturn(expr) => Statement::GeneratorReturn(expr.as_ref().map(|e| substitute_expression(e, sub))),
        Statement::Break(label) => Statement::Break(*label),
        Statement::Continue(label) => Statement::Continue(*label),
        Statement::Expression(expr) => Statement::Expression(substitute_expression(expr, sub)),
        Statement::Empty => Statement::Empty,
        Statement::YieldStatement { output, received_type, receive_target } => Statement::YieldStatement {
            output: substitute_expression(output, sub),
            received_type: received_type.as_ref().map(|t| substitute_type(t, sub)),
            receive_target: receive_target.clone(),
        },
    }
}

fn substitute_expression(expression: &Expression, sub: &FxHashMap<StringId, IrType>) -> Expression {
    match expression {
        Expression::Literal(v) => Expression::Literal(v.clone()),
        Expression::Identifier(name) => Expression::Identifier(*name),
        Expression::Array(items) => Expression::Array(
            items
                .iter()
                .map(|a| crate::ir::expr::CallArgument { expression: substitute_expression(&a.expression, sub), is_spread: a.is_spread })
                .collect(),
        ),
        Expression::Object(props) => Expression::Object(
            props
                .iter()
                .map(|p| crate::ir::expr::ObjectProperty {
                    key: p.key,
                    value: substitute_expression(&p.value, sub),
                    is_shorthand: p.is_shorthand,
                    is_computed: p.is_computed,
                })
                .collect(),
        ),
        Expression::MemberAccess { object, property, is_optional, narrowing } => Expression::MemberAccess {
            object: Box::new(substitute_expression(object, sub)),
            property: match property {
                crate::ir::expr::PropertyKey::Name(n) => crate::ir::expr::PropertyKey::Name(*n),
                crate::ir::expr::PropertyKey::Computed(e) => {
                    crate::ir::expr::PropertyKey::Computed(Box::new(substitute_expression(e, sub)))
                }
            },
            is_optional: *is_optional,
            narrowing: narrowing.clone(),
        },
        Expression::Call { callee, type_arguments, arguments, is_optional, requires_specialization, narrowing } => {
            Expression::Call {
                callee: Box::new(substitute_expression(callee, sub)),
                type_arguments: type_arguments.iter().map(|t| substitute_type(t, sub)).collect(),
                arguments: arguments
                    .iter()
                    .map(|a| crate::ir::expr::CallArgument { expression: substitute_expression(&a.expression, sub), is_spread: a.is_spread })
                    .collect(),
                is_optional: *is_optional,
                requires_specialization: *requires_specialization,
                narrowing: narrowing.clone(),
            }
        }
        Expression::New { callee, type_arguments, arguments, requires_specialization } => Expression::New {
            callee: Box::new(substitute_expression(callee, sub)),
            type_arguments: type_arguments.iter().map(|t| substitute_type(t, sub)).collect(),
            arguments: arguments
                .iter()
                .map(|a| crate::ir::expr::CallArgument { expression: substitute_expression(&a.expression, sub), is_spread: a.is_spread })
                .collect(),
            requires_specialization: *requires_specialization,
        },
        Expression::Binary { operator, left, right, narrowing } => Expression::Binary {
            operator: *operator,
            left: Box::new(substitute_expression(left, sub)),
            right: Box::new(substitute_expression(right, sub)),
            narrowing: narrowing.clone(),
        },
        Expression::Logical { operator, left, right } => Expression::Logical {
            operator: *operator,
            left: Box::new(substitute_expression(left, sub)),
            right: Box::new(substitute_expression(right, sub)),
        },
        Expression::Unary { operator, operand } => {
            Expression::Unary { operator: *operator, operand: Box::new(substitute_expression(operand, sub)) }
        }
        Expression::Update { operator, operand, is_prefix } => Expression::Update {
            operator: *operator,
            operand: Box::new(substitute_expression(operand, sub)),
            is_prefix: *is_prefix,
        },
        Expression::Assignment { operator, target, value } => Expression::Assignment {
            operator: *operator,
            target: Box::new(substitute_expression(target, sub)),
            value: Box::new(substitute_expression(value, sub)),
        },
        Expression::Conditional { test, consequent, alternate, narrowing } => Expression::Conditional {
            test: Box::new(substitute_expression(test, sub)),
            consequent: Box::new(substitute_expression(consequent, sub)),
            alternate: Box::new(substitute_expression(alternate, sub)),
            narrowing: narrowing.clone(),
        },
        Expression::FunctionExpression { name, type_parameters, parameters, return_type, body, is_generator, is_async } => {
            Expression::FunctionExpression {
                name: *name,
                type_parameters: type_parameters.clone(),
                parameters: parameters.iter().map(|p| substitute_parameter(p, sub)).collect(),
                return_type: return_type.as_ref().map(|t| substitute_type(t, sub)),
                body: body.iter().map(|s| substitute_statement(s, sub)).collect(),
                is_generator: *is_generator,
                is_async: *is_async,
            }
        }
        Expression::ArrowFunction { type_parameters, parameters, return_type, expression_body, block_body, is_async } => {
            Expression::ArrowFunction {
                type_parameters: type_parameters.clone(),
                parameters: parameters.iter().map(|p| substitute_parameter(p, sub)).collect(),
                return_type: return_type.as_ref().map(|t| substitute_type(t, sub)),
                expression_body: expression_body.as_ref().map(|e| Box::new(substitute_expression(e, sub))),
                block_body: block_body.as_ref().map(|stmts| stmts.iter().map(|s| substitute_statement(s, sub)).collect()),
                is_async: *is_async,
            }
        }
        Expression::TemplateLiteral(parts) => Expression::TemplateLiteral(
            parts
                .iter()
                .map(|p| crate::ir::expr::TemplateLiteralPart {
                    quasi: p.quasi,
                    expression: p.expression.as_ref().map(|e| substitute_expression(e, sub)),
                })
                .collect(),
        ),
        Expression::Spread(inner) => Expression::Spread(Box::new(substitute_expression(inner, sub))),
        Expression::Await(inner) => Expression::Await(Box::new(substitute_expression(inner, sub))),
        Expression::Yield { argument, is_delegate } => Expression::Yield {
            argument: argument.as_ref().map(|a| Box::new(substitute_expression(a, sub))),
            is_delegate: *is_delegate,
        },
        Expression::This => Expression::This,
        Expression::NumericNarrowing { expression, target_type, proof } => Expression::NumericNarrowing {
            expression: Box::new(substitute_expression(expression, sub)),
            target_type: substitute_type(target_type, sub),
            proof: proof.clone(),
        },
        Expression::TypeAssertion { expression, target_type } => Expression::TypeAssertion {
            expression: Box::new(substitute_expression(expression, sub)),
            target_type: substitute_type(target_type, sub),
        },
        Expression::AsInterface { expression, target_type } => Expression::AsInterface {
            expression: Box::new(substitute_expression(expression, sub)),
            target_type: substitute_type(target_type, sub),
        },
        Expression::Trycast { expression, target_type } => Expression::Trycast {
            expression: Box::new(substitute_expression(expression, sub)),
            target_type: substitute_type(target_type, sub),
        },
        Expression::Stackalloc { element_type, length } => Expression::Stackalloc {
            element_type: substitute_type(element_type, sub),
            length: Box::new(substitute_expression(length, sub)),
        },
        Expression::Defaultof(ty) => Expression::Defaultof(substitute_type(ty, sub)),
    }
}
