//! Guard rename stack (§4.6). Turns a [`NarrowingInfo`] attached to a
//! guard expression into the pair of host constructs it emits to:
//! `x.IsN()` as the branch condition, and `var x__N_k = x.AsN();` as the
//! first statement inside the branch, plus the context update that makes
//! later references inside the branch use the renamed local.

use crate::emit::context::EmitterContext;
use crate::emit::host_ast::{HostExpression, HostStatement, HostType};
use crate::ir::expr::NarrowingInfo;
use crate::string_interning::StringTable;

/// The guard condition to emit for `info`: `subject.IsN()`.
pub fn guard_condition(info: &NarrowingInfo, _table: &StringTable, ctx: &EmitterContext) -> HostExpression {
    let subject_name = ctx.resolve_reference(info.subject);
    HostExpression::IsVariant {
        subject: Box::new(HostExpression::Identifier(subject_name)),
        variant_index: info.member_index,
    }
}

/// Enters a guarded branch: produces the branch's first statement (the
/// `AsN()` unwrap binding) plus the context subsequent statements in the
/// branch must be emitted under, per the guard rename stack's
/// `enter`/`leave` transitions. The caller emits the rest of the branch
/// using `entered_ctx`, then discards it and continues with the
/// original `ctx` once the branch closes.
pub fn enter_narrowed_branch(
    info: &NarrowingInfo,
    declared_type: crate::ir::ty::IrType,
    table: &mut StringTable,
    ctx: &EmitterContext,
) -> (HostStatement, EmitterContext) {
    let subject_name = table.resolve(ctx.resolve_reference(info.subject)).to_string();
    let renamed_text = ctx.fresh_guard_name(&subject_name, info.member_index);
    let renamed = table.intern(&renamed_text);

    let unwrap_statement = HostStatement::LocalDeclaration {
        declared_type: HostType::Var,
        name: renamed,
        initializer: Some(HostExpression::AsVariant {
            subject: Box::new(HostExpression::Identifier(ctx.resolve_reference(info.subject))),
            variant_index: info.member_index,
        }),
    };

    let entered_ctx = ctx.enter_guard(info.subject, renamed, declared_type);
    (unwrap_statement, entered_ctx)
}

/// Whether `binding` should receive a `.Value` unwrap when referenced:
/// it is a value-typed nullable and the narrowed-bindings map doesn't
/// already mark it as unwrapped in the current context (§4.6, "nullable
/// unwrap").
pub fn needs_nullable_unwrap(binding_is_nullable_value_type: bool, already_narrowed: bool) -> bool {
    binding_is_nullable_value_type && !already_narrowed
}
