//! Generator lowering (§4.6). Synthesizes the `_exchange` (and, when
//! `TNext` is non-void, the wrapping `_Generator`) class for a generator
//! function, and rewrites its body so every `yieldStatement` becomes an
//! exchange assignment followed by `yield return exchange`.

use crate::emit::host_ast::{
    HostAccessibility, HostExpression, HostFieldDecl, HostMethodDecl, HostParameter, HostStatement, HostType,
    HostTypeDecl, HostTypeKind, HostTypeMember,
};
use crate::ir::stmt::Statement;
use crate::string_interning::{StringId, StringTable};

/// The generic arguments of a `Generator<TYield, TReturn, TNext>` return
/// type annotation, as resolved host types.
pub struct GeneratorShape {
    pub yield_type: HostType,
    pub return_type: HostType,
    pub next_type: Option<HostType>,
}

pub struct GeneratorPlan {
    pub exchange_class: HostTypeDecl,
    /// Present only when `next_type` is non-void (§4.6).
    pub wrapper_class: Option<HostTypeDecl>,
}

/// Builds the `_exchange` (and, conditionally, `_Generator` wrapper)
/// class declarations for a generator named `base_name`.
pub fn build_generator_plan(base_name: &str, shape: &GeneratorShape, table: &mut StringTable) -> GeneratorPlan {
    let exchange_name = table.intern(&format!("{base_name}_exchange"));
    let input_field = table.intern("Input");
    let output_field = table.intern("Output");

    let mut members = Vec::new();
    if let Some(next_type) = &shape.next_type {
        members.push(HostTypeMember::Field(HostFieldDecl {
            name: input_field,
            ty: HostType::Nullable(Box::new(next_type.clone())),
            initializer: None,
            accessibility: HostAccessibility::Public,
            is_static: false,
            is_readonly: false,
        }));
    }
    members.push(HostTypeMember::Field(HostFieldDecl {
        name: output_field,
        ty: shape.yield_type.clone(),
        initializer: None,
        accessibility: HostAccessibility::Public,
        is_static: false,
        is_readonly: false,
    }));

    let exchange_class = HostTypeDecl {
        name: exchange_name,
        kind: HostTypeKind::Class,
        type_parameters: Vec::new(),
        heritage: Vec::new(),
        members,
        is_static: false,
        is_sealed: true,
        accessibility: HostAccessibility::Internal,
    };

    let wrapper_class = shape
        .next_type
        .as_ref()
        .map(|next_type| build_wrapper_class(base_name, &shape.yield_type, next_type, table));

    GeneratorPlan { exchange_class, wrapper_class }
}

fn build_wrapper_class(
    base_name: &str,
    yield_type: &HostType,
    next_type: &HostType,
    table: &mut StringTable,
) -> HostTypeDecl {
    let wrapper_name = table.intern(&format!("{base_name}_Generator"));
    let next_method = table.intern("next");
    let return_method = table.intern("return");
    let throw_method = table.intern("throw");
    let value_param = table.intern("value");

    let iterator_result = HostType::Named {
        name: table.intern("IteratorResult"),
        type_arguments: vec![yield_type.clone()],
    };

    let members = vec![
        HostTypeMember::Method(HostMethodDecl {
            name: next_method,
            type_parameters: Vec::new(),
            parameters: vec![HostParameter {
                name: value_param,
                ty: HostType::Nullable(Box::new(next_type.clone())),
                default_value: None,
                modifier: None,
            }],
            return_type: iterator_result.clone(),
            body: None,
            accessibility: HostAccessibility::Public,
            is_static: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_async: false,
        }),
        HostTypeMember::Method(HostMethodDecl {
            name: return_method,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: iterator_result.clone(),
            body: None,
            accessibility: HostAccessibility::Public,
            is_static: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_async: false,
        }),
        HostTypeMember::Method(HostMethodDecl {
            name: throw_method,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: iterator_result,
            body: None,
            accessibility: HostAccessibility::Public,
            is_static: false,
            is_abstract: false,
            is_virtual: false,
            is_override: false,
            is_async: false,
        }),
    ];

    HostTypeDecl {
        name: wrapper_name,
        kind: HostTypeKind::Class,
        type_parameters: Vec::new(),
        heritage: Vec::new(),
        members,
        is_static: false,
        is_sealed: true,
        accessibility: HostAccessibility::Internal,
    }
}

/// Rewrites a generator body's statements, replacing each
/// `YieldStatement` with the exchange-assignment-then-yield-return
/// sequence, and each `GeneratorReturn` with a `__returnValue` assignment
/// followed by `yield break` (§4.6). Other IR shapes pass through to the
/// statement emitter unchanged; this function only identifies the
/// generator-specific rewrite points.
pub fn is_generator_rewrite_point(statement: &Statement) -> bool {
    matches!(statement, Statement::YieldStatement { .. } | Statement::GeneratorReturn(_))
}

/// What a lowered `yield e` should read back into after resuming, for the
/// bidirectional case (`let x = yield e;`, `x = yield e;`).
pub struct YieldReceive {
    pub declared_type: HostType,
    pub target_local: StringId,
}

/// The host statement sequence for a lowered `yield e`: assign `e` into
/// the exchange's `Output` field, `yield return exchange`, and — when
/// `receive` is present — declare the receiving local from the exchange's
/// `Input` field once execution resumes.
pub fn lower_yield_statement(
    exchange_local: StringId,
    output_field: StringId,
    input_field: StringId,
    output: HostExpression,
    receive: Option<YieldReceive>,
) -> Vec<HostStatement> {
    let mut out = vec![
        HostStatement::Expression(HostExpression::Assignment {
            op: "=",
            target: Box::new(HostExpression::MemberAccess {
                object: Box::new(HostExpression::Identifier(exchange_local)),
                member: output_field,
                is_null_conditional: false,
            }),
            value: Box::new(output),
        }),
        HostStatement::YieldReturn(HostExpression::Identifier(exchange_local)),
    ];
    if let Some(YieldReceive { declared_type, target_local }) = receive {
        out.push(HostStatement::LocalDeclaration {
            declared_type,
            name: target_local,
            initializer: Some(HostExpression::MemberAccess {
                object: Box::new(HostExpression::Identifier(exchange_local)),
                member: input_field,
                is_null_conditional: false,
            }),
        });
    }
    out
}

/// The host statement sequence for a lowered generator `return e`:
/// assign into `__returnValue`, then `yield break`.
pub fn lower_generator_return(return_value_local: StringId, value: Option<HostExpression>) -> Vec<HostStatement> {
    let mut out = Vec::new();
    if let Some(value) = value {
        out.push(HostStatement::Expression(HostExpression::Assignment {
            op: "=",
            target: Box::new(HostExpression::Identifier(return_value_local)),
            value: Box::new(value),
        }));
    }
    out.push(HostStatement::YieldBreak);
    out
}
