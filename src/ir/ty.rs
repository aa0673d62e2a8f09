//! IR type nodes (component C1, §3.1 `Type`). These are syntactic type
//! positions carried on the IR, distinct from the resolved entries living in
//! the unified type universe ([`crate::binding::universe`]) that a
//! `referenceType`'s `resolved_host_name` ultimately points into.

use crate::string_interning::StringId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    BigInt,
    Symbol,
    Undefined,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralTypeValue {
    Number(String),
    String(StringId),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeMember {
    pub name: StringId,
    pub ty: IrType,
    pub is_optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeParam {
    pub ty: IrType,
    pub is_optional: bool,
    pub is_rest: bool,
}

/// A type as it appears syntactically on the IR. Closed per invariant I-1:
/// a pass must never introduce a variant not listed here.
#[derive(Debug, Clone, PartialEq)]
pub enum IrType {
    PrimitiveType(PrimitiveKind),
    LiteralType(LiteralTypeValue),
    /// A reference to a named nominal type, optionally instantiated with
    /// type arguments. `resolved_host_name` is filled in by binding
    /// resolution; it is `None` on the raw IR coming out of the builder.
    ReferenceType {
        name: StringId,
        type_arguments: Vec<IrType>,
        resolved_host_name: Option<StringId>,
    },
    ArrayType(Box<IrType>),
    TupleType(Vec<IrType>),
    UnionType(Vec<IrType>),
    IntersectionType(Vec<IrType>),
    FunctionType {
        parameters: Vec<FunctionTypeParam>,
        return_type: Box<IrType>,
    },
    /// Structural object type. Only valid before the anonymous-type
    /// lowering pass; invariant I-5 forbids this variant from surviving
    /// past pass 1.
    ObjectType(Vec<ObjectTypeMember>),
    TypeParameterType(StringId),
    DictionaryType {
        key: Box<IrType>,
        value: Box<IrType>,
    },
    VoidType,
    NeverType,
    UnknownType,
    /// Parser artefact only. Invariant I-2: any occurrence reachable after
    /// the soundness gate (pass 2) is a fatal diagnostic.
    AnyType,
}

impl IrType {
    pub fn is_object_type(&self) -> bool {
        matches!(self, IrType::ObjectType(_))
    }

    pub fn is_any_type(&self) -> bool {
        matches!(self, IrType::AnyType)
    }

    /// Recursively checks whether `anyType` is reachable anywhere within
    /// this type, used by the soundness gate (pass 2).
    pub fn contains_any(&self) -> bool {
        match self {
            IrType::AnyType => true,
            IrType::ArrayType(inner) => inner.contains_any(),
            IrType::TupleType(items) | IrType::UnionType(items) | IrType::IntersectionType(items) => {
                items.iter().any(IrType::contains_any)
            }
            IrType::ReferenceType { type_arguments, .. } => {
                type_arguments.iter().any(IrType::contains_any)
            }
            IrType::FunctionType {
                parameters,
                return_type,
            } => {
                parameters.iter().any(|p| p.ty.contains_any()) || return_type.contains_any()
            }
            IrType::ObjectType(members) => members.iter().any(|m| m.ty.contains_any()),
            IrType::DictionaryType { key, value } => key.contains_any() || value.contains_any(),
            _ => false,
        }
    }

    /// Recursively checks whether a structural `objectType` is reachable
    /// anywhere within this type, used by P-4 (object-type lowering).
    pub fn contains_object_type(&self) -> bool {
        match self {
            IrType::ObjectType(_) => true,
            IrType::ArrayType(inner) => inner.contains_object_type(),
            IrType::TupleType(items) | IrType::UnionType(items) | IrType::IntersectionType(items) => {
                items.iter().any(IrType::contains_object_type)
            }
            IrType::ReferenceType { type_arguments, .. } => {
                type_arguments.iter().any(IrType::contains_object_type)
            }
            IrType::FunctionType {
                parameters,
                return_type,
            } => {
                parameters.iter().any(|p| p.ty.contains_object_type()) || return_type.contains_object_type()
            }
            IrType::DictionaryType { key, value } => {
                key.contains_object_type() || value.contains_object_type()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_any_is_detected_through_array() {
        let ty = IrType::ArrayType(Box::new(IrType::AnyType));
        assert!(ty.contains_any());
    }

    #[test]
    fn object_type_detected_inside_union() {
        let ty = IrType::UnionType(vec![IrType::VoidType, IrType::ObjectType(vec![])]);
        assert!(ty.contains_object_type());
    }

    #[test]
    fn plain_primitive_has_neither() {
        let ty = IrType::PrimitiveType(PrimitiveKind::Number);
        assert!(!ty.contains_any());
        assert!(!ty.contains_object_type());
    }
}
