//! Specialization emission (§4.6). Turns each collected
//! [`SpecializationRequest`] into a monomorphized declaration name, and
//! rewrites flagged call/new sites to call that name instead of the
//! generic one.

use crate::passes::specialization::SpecializationRequest;
use crate::string_interning::{StringId, StringTable};

/// The monomorphized declaration name for `request`: the base callee
/// name plus its deterministic mangled suffix, e.g. `identity_3f2a…`.
pub fn specialized_name(request: &SpecializationRequest, table: &mut StringTable) -> StringId {
    let base = table.resolve(request.callee_name).to_string();
    table.intern(&format!("{base}_{}", request.mangled_suffix))
}

/// Builds the full set of specialized names for `requests`, keyed by
/// `(callee_name, mangled_suffix)` so call-site rewriting can look one up
/// without re-deriving it.
pub fn specialized_names(
    requests: &[SpecializationRequest],
    table: &mut StringTable,
) -> rustc_hash::FxHashMap<(StringId, String), StringId> {
    let mut map = rustc_hash::FxHashMap::default();
    for request in requests {
        let name = specialized_name(request, table);
        map.insert((request.callee_name, request.mangled_suffix.clone()), name);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ty::{IrType, PrimitiveKind};

    #[test]
    fn specialized_name_combines_base_and_suffix() {
        let mut table = StringTable::new();
        let callee = table.intern("identity");
        let request = SpecializationRequest {
            callee_name: callee,
            type_arguments: vec![IrType::PrimitiveType(PrimitiveKind::Number)],
            mangled_suffix: "abc123".to_string(),
        };
        let name = specialized_name(&request, &mut table);
        assert_eq!(table.resolve(name), "identity_abc123");
    }
}
