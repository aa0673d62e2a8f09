//! Anonymous-type lowering (pass 1 of C9, §4.5 step 1). Every occurrence
//! of an inline `objectType` becomes a freshly generated nominal type with
//! a deterministic name derived from its member names and types, so
//! structurally identical shapes collapse to one type (invariant I-5,
//! testable property P-4).
//!
//! Per Open Question 3 (resolved in DESIGN.md): synthesis is per-module,
//! keyed by a canonical serialization of the shape scoped to the owning
//! module, not content-addressed across the whole compilation.

use crate::ir::ty::{IrType, ObjectTypeMember};
use crate::string_interning::{StringId, StringTable};
use rustc_hash::FxHashMap;

/// Canonical, deterministic serialization of a structural shape's sorted
/// `(name, type)` pairs, used both to name the synthesized type and to
/// detect within-module duplicates (so structurally identical shapes in
/// the same module collapse to one synthesized type).
pub fn canonical_shape_key(members: &[ObjectTypeMember], table: &StringTable) -> String {
    let mut sorted: Vec<&ObjectTypeMember> = members.iter().collect();
    sorted.sort_by_key(|m| table.resolve(m.name));
    let mut key = String::from("{");
    for member in sorted {
        key.push_str(table.resolve(member.name));
        key.push(':');
        key.push_str(&canonical_type_key(&member.ty, table));
        if member.is_optional {
            key.push('?');
        }
        key.push(';');
    }
    key.push('}');
    key
}

pub(crate) fn canonical_type_key(ty: &IrType, table: &StringTable) -> String {
    match ty {
        IrType::PrimitiveType(kind) => format!("{kind:?}"),
        IrType::LiteralType(_) => "literal".to_string(),
        IrType::ReferenceType { name, type_arguments, .. } => {
            let args: Vec<String> = type_arguments.iter().map(|t| canonical_type_key(t, table)).collect();
            format!("{}<{}>", table.resolve(*name), args.join(","))
        }
        IrType::ArrayType(inner) => format!("{}[]", canonical_type_key(inner, table)),
        IrType::TupleType(items) => {
            let parts: Vec<String> = items.iter().map(|t| canonical_type_key(t, table)).collect();
            format!("[{}]", parts.join(","))
        }
        IrType::UnionType(items) => {
            let parts: Vec<String> = items.iter().map(|t| canonical_type_key(t, table)).collect();
            parts.join("|")
        }
        IrType::IntersectionType(items) => {
            let parts: Vec<String> = items.iter().map(|t| canonical_type_key(t, table)).collect();
            parts.join("&")
        }
        IrType::FunctionType { parameters, return_type } => {
            let parts: Vec<String> = parameters.iter().map(|p| canonical_type_key(&p.ty, table)).collect();
            format!("({}) => {}", parts.join(","), canonical_type_key(return_type, table))
        }
        IrType::ObjectType(members) => canonical_shape_key(members, table),
        IrType::TypeParameterType(name) => table.resolve(*name).to_string(),
        IrType::DictionaryType { key, value } => {
            format!("{{[k: {}]: {}}}", canonical_type_key(key, table), canonical_type_key(value, table))
        }
        IrType::VoidType => "void".to_string(),
        IrType::NeverType => "never".to_string(),
        IrType::UnknownType => "unknown".to_string(),
        IrType::AnyType => "any".to_string(),
    }
}

/// A table tracking every anonymous shape synthesized within one module,
/// so repeated occurrences of the same shape reuse the previously
/// synthesized name (collapsing per invariant I-5). Also retains each
/// shape's lowered member list, in first-occurrence order, so the
/// module-level emission driver can materialize a nominal class for
/// every synthesized name it sees on the IR.
#[derive(Debug, Default)]
pub struct AnonTypeSynthesizer {
    by_key: FxHashMap<String, usize>,
    shapes: Vec<(StringId, Vec<ObjectTypeMember>)>,
}

impl AnonTypeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the nominal name for `members`, synthesizing and
    /// interning a fresh one the first time this shape is seen in the
    /// module.
    pub fn synthesize(&mut self, members: &[ObjectTypeMember], table: &mut StringTable) -> StringId {
        let key = canonical_shape_key(members, table);
        if let Some(existing) = self.by_key.get(&key) {
            return self.shapes[*existing].0;
        }
        let name = format!("__Anon{}", self.shapes.len());
        let id = table.intern(&name);
        self.by_key.insert(key, self.shapes.len());
        self.shapes.push((id, members.to_vec()));
        id
    }

    pub fn synthesized_count(&self) -> usize {
        self.shapes.len()
    }

    /// Every synthesized shape, in first-occurrence order, as
    /// `(nominal name, members)`.
    pub fn synthesized_shapes(&self) -> &[(StringId, Vec<ObjectTypeMember>)] {
        &self.shapes
    }
}

/// Replaces every reachable `objectType` in `ty` with a `referenceType`
/// naming its synthesized nominal type.
pub fn lower_type(ty: IrType, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) -> IrType {
    match ty {
        IrType::ObjectType(members) => {
            let lowered_members: Vec<ObjectTypeMember> = members
                .into_iter()
                .map(|m| ObjectTypeMember {
                    ty: lower_type(m.ty, synthesizer, table),
                    ..m
                })
                .collect();
            let name = synthesizer.synthesize(&lowered_members, table);
            IrType::ReferenceType {
                name,
                type_arguments: Vec::new(),
                resolved_host_name: None,
            }
        }
        IrType::ArrayType(inner) => IrType::ArrayType(Box::new(lower_type(*inner, synthesizer, table))),
        IrType::TupleType(items) => {
            IrType::TupleType(items.into_iter().map(|t| lower_type(t, synthesizer, table)).collect())
        }
        IrType::UnionType(items) => {
            IrType::UnionType(items.into_iter().map(|t| lower_type(t, synthesizer, table)).collect())
        }
        IrType::IntersectionType(items) => {
            IrType::IntersectionType(items.into_iter().map(|t| lower_type(t, synthesizer, table)).collect())
        }
        IrType::DictionaryType { key, value } => IrType::DictionaryType {
            key: Box::new(lower_type(*key, synthesizer, table)),
            value: Box::new(lower_type(*value, synthesizer, table)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_shapes_collapse_to_one_synthesized_name() {
        let mut table = StringTable::new();
        let mut synthesizer = AnonTypeSynthesizer::new();
        let name_a = table.intern("a");
        let name_b = table.intern("b");
        let members = vec![
            ObjectTypeMember { name: name_a, ty: IrType::VoidType, is_optional: false },
            ObjectTypeMember { name: name_b, ty: IrType::VoidType, is_optional: true },
        ];
        let first = synthesizer.synthesize(&members, &mut table);
        let second = synthesizer.synthesize(&members, &mut table);
        assert_eq!(first, second);
        assert_eq!(synthesizer.synthesized_count(), 1);
    }

    #[test]
    fn distinct_shapes_get_distinct_names() {
        let mut table = StringTable::new();
        let mut synthesizer = AnonTypeSynthesizer::new();
        let name_a = table.intern("a");
        let name_b = table.intern("b");
        let shape_one = vec![ObjectTypeMember { name: name_a, ty: IrType::VoidType, is_optional: false }];
        let shape_two = vec![ObjectTypeMember { name: name_b, ty: IrType::VoidType, is_optional: false }];
        let first = synthesizer.synthesize(&shape_one, &mut table);
        let second = synthesizer.synthesize(&shape_two, &mut table);
        assert_ne!(first, second);
    }

    #[test]
    fn lowering_object_type_leaves_no_object_type_behind() {
        let mut table = StringTable::new();
        let mut synthesizer = AnonTypeSynthesizer::new();
        let name_a = table.intern("a");
        let ty = IrType::ArrayType(Box::new(IrType::ObjectType(vec![ObjectTypeMember {
            name: name_a,
            ty: IrType::VoidType,
            is_optional: false,
        }])));
        let lowered = lower_type(ty, &mut synthesizer, &mut table);
        assert!(!lowered.contains_object_type());
    }
}
