//! Expression emission (component C10, §4.6). `emit_expression` is one
//! half of the mutually recursive emitter dispatcher pair; the other is
//! [`crate::emit::statement::emit_statement`].

use crate::emit::context::EmitterContext;
use crate::emit::host_ast::{HostExpression, HostType};
use crate::ir::expr::{
    AssignmentOperator, BinaryOperator, Expression, LiteralValue, LogicalOperator, NumericIntent, PropertyKey,
    UnaryOperator, UpdateOperator,
};
use crate::string_interning::StringTable;

/// Member name the host's indexer convention exposes for computed
/// member access (`x[i]` becomes `x.Item(i)` absent a native indexer
/// surface on the emitted AST node shape).
const INDEXER_MEMBER: &str = "Item";

/// Member name of the widening-proof-carrying numeric conversion method
/// a `numericNarrowing` node compiles to.
const NUMERIC_WIDEN_MEMBER: &str = "ToDouble";

pub fn emit_expression(expression: &Expression, table: &mut StringTable, ctx: &EmitterContext) -> HostExpression {
    match expression {
        Expression::Literal(value) => emit_literal(value, table),
        Expression::Identifier(name) => HostExpression::Identifier(ctx.resolve_reference(*name)),
        Expression::Array(elements) => HostExpression::ArrayInitializer(
            elements.iter().map(|a| emit_expression(&a.expression, table, ctx)).collect(),
        ),
        Expression::Object(_) => {
            // Object literals are typed via the anonymous-type lowering pass
            // into a reference type; the emitter reaches this node only for
            // its value-shape initializer, which the statement emitter
            // rewrites into a constructor call once it knows the
            // synthesized type name. Bare expression position (e.g. as a
            // call argument) falls back to an empty initializer.
            HostExpression::ArrayInitializer(Vec::new())
        }
        Expression::MemberAccess { object, property, is_optional, .. } => match property {
            PropertyKey::Name(name) => HostExpression::MemberAccess {
                object: Box::new(emit_expression(object, table, ctx)),
                member: *name,
                is_null_conditional: *is_optional,
            },
            PropertyKey::Computed(index_expr) => {
                let indexer = table.intern(INDEXER_MEMBER);
                HostExpression::Call {
                    callee: Box::new(HostExpression::MemberAccess {
                        object: Box::new(emit_expression(object, table, ctx)),
                        member: indexer,
                        is_null_conditional: *is_optional,
                    }),
                    type_arguments: Vec::new(),
                    arguments: vec![emit_expression(index_expr, table, ctx)],
                }
            }
        },
        Expression::Call { callee, arguments, type_arguments, requires_specialization, .. } => HostExpression::Call {
            callee: Box::new(specialized_callee(callee, type_arguments, *requires_specialization, table, ctx)),
            // A specialized callee is already fully concrete; the type
            // arguments move onto the synthesized declaration's name
            // rather than the call site (§4.5).
            type_arguments: if *requires_specialization {
                Vec::new()
            } else {
                type_arguments.iter().map(|t| host_type_of(t, table)).collect()
            },
            arguments: arguments.iter().map(|a| emit_expression(&a.expression, table, ctx)).collect(),
        },
        Expression::New { callee, type_arguments, arguments, requires_specialization } => HostExpression::New {
            ty: if *requires_specialization {
                match specialized_callee(callee, type_arguments, true, table, ctx) {
                    HostExpression::Identifier(name) => HostType::Named { name, type_arguments: Vec::new() },
                    _ => host_type_from_callee(callee, type_arguments, table, ctx),
                }
            } else {
                host_type_from_callee(callee, type_arguments, table, ctx)
            },
            arguments: arguments.iter().map(|a| emit_expression(&a.expression, table, ctx)).collect(),
        },
        Expression::Binary { operator, left, right, .. } => HostExpression::Binary {
            op: binary_operator_text(*operator),
            left: Box::new(emit_expression(left, table, ctx)),
            right: Box::new(emit_expression(right, table, ctx)),
        },
        Expression::Logical { operator, left, right } => HostExpression::Binary {
            op: logical_operator_text(*operator),
            left: Box::new(emit_expression(left, table, ctx)),
            right: Box::new(emit_expression(right, table, ctx)),
        },
        Expression::Unary { operator, operand } => HostExpression::Unary {
            op: unary_operator_text(*operator),
            operand: Box::new(emit_expression(operand, table, ctx)),
            is_prefix: true,
        },
        Expression::Update { operator, operand, is_prefix } => HostExpression::Unary {
            op: update_operator_text(*operator),
            operand: Box::new(emit_expression(operand, table, ctx)),
            is_prefix: *is_prefix,
        },
        Expression::Assignment { operator, target, value } => HostExpression::Assignment {
            op: assignment_operator_text(*operator),
            target: Box::new(emit_expression(target, table, ctx)),
            value: Box::new(emit_expression(value, table, ctx)),
        },
        Expression::Conditional { test, consequent, alternate, .. } => HostExpression::Conditional {
            test: Box::new(emit_expression(test, table, ctx)),
            consequent: Box::new(emit_expression(consequent, table, ctx)),
            alternate: Box::new(emit_expression(alternate, table, ctx)),
        },
        Expression::ArrowFunction { parameters, expression_body, .. } => {
            let params = parameters
                .iter()
                .filter_map(|p| match &p.pattern {
                    crate::ir::pattern::Pattern::IdentifierPattern(name) => Some(*name),
                    _ => None,
                })
                .collect();
            let body = expression_body
                .as_ref()
                .map(|e| emit_expression(e, table, ctx))
                .unwrap_or(HostExpression::This);
            HostExpression::Lambda { parameters: params, body: Box::new(body) }
        }
        Expression::TemplateLiteral(parts) => {
            // Lowered to a single string concatenation chain; the host's
            // interpolated-string syntax is a pretty-printer concern, not
            // this core's (§1), so this produces the equivalent `+`-chain.
            let mut chain: Option<HostExpression> = None;
            for part in parts {
                let quasi_text = table.resolve(part.quasi).to_string();
                let quasi = HostExpression::Literal(format!("{quasi_text:?}"));
                chain = Some(append(chain, quasi));
                if let Some(expr) = &part.expression {
                    let emitted = emit_expression(expr, table, ctx);
                    chain = Some(append(chain, emitted));
                }
            }
            chain.unwrap_or(HostExpression::Literal("\"\"".to_string()))
        }
        Expression::Spread(inner) => emit_expression(inner, table, ctx),
        Expression::Await(inner) => emit_expression(inner, table, ctx),
        Expression::This => HostExpression::This,
        Expression::NumericNarrowing { expression, target_type, .. } => {
            let member = table.intern(NUMERIC_WIDEN_MEMBER);
            HostExpression::Call {
                callee: Box::new(HostExpression::MemberAccess {
                    object: Box::new(emit_expression(expression, table, ctx)),
                    member,
                    is_null_conditional: false,
                }),
                type_arguments: vec![host_type_of(target_type, table)],
                arguments: Vec::new(),
            }
        }
        Expression::TypeAssertion { expression, .. } | Expression::AsInterface { expression, .. } => {
            emit_expression(expression, table, ctx)
        }
        Expression::Trycast { expression, target_type } => HostExpression::Conditional {
            test: Box::new(HostExpression::IsVariant {
                subject: Box::new(emit_expression(expression, table, ctx)),
                variant_index: 0,
            }),
            consequent: Box::new(emit_expression(expression, table, ctx)),
            alternate: Box::new(HostExpression::Default(host_type_of(target_type, table))),
        },
        Expression::Stackalloc { element_type, length } => HostExpression::New {
            ty: HostType::Array(Box::new(host_type_of(element_type, table))),
            arguments: vec![emit_expression(length, table, ctx)],
        },
        Expression::Defaultof(ty) => HostExpression::Default(host_type_of(ty, table)),
        Expression::Yield { .. } => {
            // Reached only for a `yield` the yield-lowering pass could not
            // rewrite (invalid position); the pass already recorded the
            // diagnostic, so emission never runs for that module. This
            // arm exists only to keep the match exhaustive.
            HostExpression::This
        }
        Expression::FunctionExpression { .. } => {
            // Function expressions carry a full statement body and are
            // emitted via a local function declaration at the statement
            // level, not as an inline expression; reached only from a
            // position the statement emitter has already special-cased.
            HostExpression::This
        }
    }
}

/// The callee a `Call`/`New` site should actually emit: the monomorphized
/// declaration's name when `requires_specialization` is set and a match is
/// recorded in `ctx.specializations`, otherwise the callee as written.
fn specialized_callee(
    callee: &Expression,
    type_arguments: &[crate::ir::ty::IrType],
    requires_specialization: bool,
    table: &mut StringTable,
    ctx: &EmitterContext,
) -> HostExpression {
    if requires_specialization {
        if let Expression::Identifier(name) = callee {
            let (_, suffix) = crate::passes::specialization::mangled_key_and_suffix(type_arguments, table);
            if let Some(specialized) = ctx.specializations.get(&(*name, suffix)) {
                return HostExpression::Identifier(*specialized);
            }
        }
    }
    emit_expression(callee, table, ctx)
}

fn append(chain: Option<HostExpression>, next: HostExpression) -> HostExpression {
    match chain {
        None => next,
        Some(acc) => HostExpression::Binary { op: "+", left: Box::new(acc), right: Box::new(next) },
    }
}

fn emit_literal(value: &LiteralValue, table: &StringTable) -> HostExpression {
    match value {
        LiteralValue::Number { lexeme, intent, .. } => {
            let suffix = if *intent == NumericIntent::Double && !lexeme.contains('.') {
                ".0"
            } else {
                ""
            };
            HostExpression::Literal(format!("{lexeme}{suffix}"))
        }
        LiteralValue::String(id) => HostExpression::Literal(format!("{:?}", table.resolve(*id))),
        LiteralValue::Boolean(b) => HostExpression::Literal(b.to_string()),
        LiteralValue::BigInt(id) => HostExpression::Literal(table.resolve(*id).to_string()),
        LiteralValue::Null => HostExpression::Literal("null".to_string()),
        LiteralValue::Undefined => HostExpression::Literal("default".to_string()),
    }
}

fn binary_operator_text(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;
    match op {
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Modulo => "%",
        Exponent => "**",
        Equal | StrictEqual => "==",
        NotEqual | StrictNotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        BitwiseAnd => "&",
        BitwiseOr => "|",
        BitwiseXor => "^",
        ShiftLeft => "<<",
        ShiftRight => ">>",
        UnsignedShiftRight => ">>>",
        In => "in",
        Instanceof => "is",
    }
}

fn logical_operator_text(op: LogicalOperator) -> &'static str {
    match op {
        LogicalOperator::And => "&&",
        LogicalOperator::Or => "||",
        LogicalOperator::NullishCoalescing => "??",
    }
}

fn unary_operator_text(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::LogicalNot => "!",
        UnaryOperator::BitwiseNot => "~",
        UnaryOperator::Typeof => "typeof",
        UnaryOperator::Void => "void",
        UnaryOperator::Delete => "delete",
    }
}

fn update_operator_text(op: UpdateOperator) -> &'static str {
    match op {
        UpdateOperator::Increment => "++",
        UpdateOperator::Decrement => "--",
    }
}

fn assignment_operator_text(op: AssignmentOperator) -> &'static str {
    use AssignmentOperator::*;
    match op {
        Assign => "=",
        AddAssign => "+=",
        SubtractAssign => "-=",
        MultiplyAssign => "*=",
        DivideAssign => "/=",
        ModuloAssign => "%=",
        BitwiseAndAssign => "&=",
        BitwiseOrAssign => "|=",
        BitwiseXorAssign => "^=",
        NullishAssign => "??=",
    }
}

/// Converts an IR `Type` into its host-AST representation. Shared by the
/// statement emitter for declared-type positions.
pub fn host_type_of(ty: &crate::ir::ty::IrType, table: &mut StringTable) -> HostType {
    use crate::ir::ty::IrType;
    match ty {
        IrType::PrimitiveType(kind) => HostType::Named {
            name: table.intern(primitive_host_name(*kind)),
            type_arguments: vec![],
        },
        IrType::LiteralType(_) => HostType::Var,
        IrType::ReferenceType { name, type_arguments, resolved_host_name } => HostType::Named {
            name: resolved_host_name.unwrap_or(*name),
            type_arguments: type_arguments.iter().map(|t| host_type_of(t, table)).collect(),
        },
        IrType::ArrayType(inner) => HostType::Array(Box::new(host_type_of(inner, table))),
        IrType::TupleType(items) => HostType::Tuple(items.iter().map(|t| host_type_of(t, table)).collect()),
        IrType::UnionType(items) | IrType::IntersectionType(items) => {
            items.first().map(|t| host_type_of(t, table)).unwrap_or(HostType::Var)
        }
        IrType::FunctionType { parameters, return_type } => {
            let name = table.intern("Func");
            let mut type_arguments: Vec<HostType> = parameters.iter().map(|p| host_type_of(&p.ty, table)).collect();
            type_arguments.push(host_type_of(return_type, table));
            HostType::Named { name, type_arguments }
        }
        IrType::ObjectType(_) => HostType::Var,
        IrType::TypeParameterType(name) => HostType::Named { name: *name, type_arguments: vec![] },
        IrType::DictionaryType { key, value } => {
            let name = table.intern("Dictionary");
            HostType::Named {
                name,
                type_arguments: vec![host_type_of(key, table), host_type_of(value, table)],
            }
        }
        IrType::VoidType => HostType::Void,
        IrType::NeverType => HostType::Void,
        IrType::UnknownType => HostType::Var,
        IrType::AnyType => HostType::Var,
    }
}

fn primitive_host_name(kind: crate::ir::ty::PrimitiveKind) -> &'static str {
    use crate::ir::ty::PrimitiveKind::*;
    match kind {
        Number => "double",
        String => "string",
        Boolean => "bool",
        BigInt => "System.Numerics.BigInteger",
        Symbol => "object",
        Undefined => "object",
        Null => "object",
    }
}

fn host_type_from_callee(
    callee: &Expression,
    type_arguments: &[crate::ir::ty::IrType],
    table: &mut StringTable,
    ctx: &EmitterContext,
) -> HostType {
    let host_type_arguments: Vec<HostType> = type_arguments.iter().map(|t| host_type_of(t, table)).collect();
    match callee {
        Expression::Identifier(name) => {
            HostType::Named { name: ctx.resolve_reference(*name), type_arguments: host_type_arguments }
        }
        other => {
            let _ = emit_expression(other, table, ctx);
            HostType::Var
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::emit::context::ModuleMap;
    use std::sync::Arc;

    fn test_ctx() -> EmitterContext {
        let options = Arc::new(CompilerOptions::new(std::path::PathBuf::from("src"), "App"));
        EmitterContext::new(options, ModuleMap::default())
    }

    #[test]
    fn int32_literal_in_double_target_gets_point_zero() {
        let mut table = StringTable::new();
        let literal = Expression::Literal(LiteralValue::Number {
            lexeme: "1".to_string(),
            value: 1.0,
            intent: NumericIntent::Double,
        });
        let emitted = emit_expression(&literal, &mut table, &test_ctx());
        assert_eq!(emitted, HostExpression::Literal("1.0".to_string()));
    }

    #[test]
    fn identifier_resolves_through_narrowing_rename() {
        let mut table = StringTable::new();
        let auth = table.intern("auth");
        let ctx = test_ctx();
        let renamed = table.intern("auth__0_0");
        let entered = ctx.enter_guard(auth, renamed, crate::ir::ty::IrType::VoidType);
        let emitted = emit_expression(&Expression::Identifier(auth), &mut table, &entered);
        assert_eq!(emitted, HostExpression::Identifier(renamed));
    }

    #[test]
    fn binary_add_keeps_operator_text() {
        let mut table = StringTable::new();
        let expr = Expression::Binary {
            operator: BinaryOperator::Add,
            left: Box::new(Expression::This),
            right: Box::new(Expression::This),
            narrowing: None,
        };
        let emitted = emit_expression(&expr, &mut table, &test_ctx());
        assert!(matches!(emitted, HostExpression::Binary { op: "+", .. }));
    }

    #[test]
    fn specialized_call_site_rewrites_to_monomorphized_name() {
        let mut table = StringTable::new();
        let identity = table.intern("identity");
        let type_arguments = vec![crate::ir::ty::IrType::PrimitiveType(crate::ir::ty::PrimitiveKind::Number)];
        let (_, suffix) = crate::passes::specialization::mangled_key_and_suffix(&type_arguments, &table);
        let specialized = table.intern("identity_specialized");

        let mut map = rustc_hash::FxHashMap::default();
        map.insert((identity, suffix), specialized);
        let ctx = test_ctx().with_specializations(Arc::new(map));

        let expr = Expression::Call {
            callee: Box::new(Expression::Identifier(identity)),
            type_arguments,
            arguments: vec![],
            is_optional: false,
            requires_specialization: true,
            narrowing: None,
        };
        let emitted = emit_expression(&expr, &mut table, &ctx);
        match emitted {
            HostExpression::Call { callee, type_arguments, .. } => {
                assert_eq!(*callee, HostExpression::Identifier(specialized));
                assert!(type_arguments.is_empty());
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn unspecialized_call_site_keeps_original_callee() {
        let mut table = StringTable::new();
        let identity = table.intern("identity");
        let expr = Expression::Call {
            callee: Box::new(Expression::Identifier(identity)),
            type_arguments: vec![crate::ir::ty::IrType::PrimitiveType(crate::ir::ty::PrimitiveKind::Number)],
            arguments: vec![],
            is_optional: false,
            requires_specialization: false,
            narrowing: None,
        };
        let emitted = emit_expression(&expr, &mut table, &test_ctx());
        match emitted {
            HostExpression::Call { callee, .. } => assert_eq!(*callee, HostExpression::Identifier(identity)),
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn computed_member_access_becomes_indexer_call() {
        let mut table = StringTable::new();
        let arr = table.intern("arr");
        let expr = Expression::MemberAccess {
            object: Box::new(Expression::Identifier(arr)),
            property: PropertyKey::Computed(Box::new(Expression::Literal(LiteralValue::Number {
                lexeme: "0".to_string(),
                value: 0.0,
                intent: NumericIntent::Int32,
            }))),
            is_optional: false,
            narrowing: None,
        };
        let emitted = emit_expression(&expr, &mut table, &test_ctx());
        match emitted {
            HostExpression::Call { callee, arguments, .. } => {
                assert_eq!(arguments.len(), 1);
                match *callee {
                    HostExpression::MemberAccess { member, .. } => assert_eq!(table.resolve(member), "Item"),
                    _ => panic!("expected member access callee"),
                }
            }
            _ => panic!("expected call"),
        }
    }
}
