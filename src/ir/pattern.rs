//! IR pattern and parameter nodes (component C1, §3.1 `Pattern`/`Parameter`).

use crate::ir::expr::Expression;
use crate::ir::ty::IrType;
use crate::string_interning::StringId;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: StringId,
    pub value: Pattern,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    IdentifierPattern(StringId),
    ArrayPattern {
        /// `None` entries are holes (`[a, , c]`).
        elements: Vec<Option<Pattern>>,
        rest: Option<Box<Pattern>>,
    },
    ObjectPattern {
        properties: Vec<ObjectPatternProperty>,
        /// A rest pattern carries a synthesized shape name for the
        /// anonymous-type lowering pass to attach a nominal type to.
        rest: Option<(Box<Pattern>, Option<StringId>)>,
    },
}

impl Pattern {
    /// Every identifier this pattern binds, in left-to-right declaration
    /// order (the order destructuring lowering assigns them in).
    pub fn bound_names(&self) -> Vec<StringId> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names(&self, out: &mut Vec<StringId>) {
        match self {
            Pattern::IdentifierPattern(name) => out.push(*name),
            Pattern::ArrayPattern { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.collect_bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.collect_bound_names(out);
                }
            }
            Pattern::ObjectPattern { properties, rest } => {
                for property in properties {
                    property.value.collect_bound_names(out);
                }
                if let Some((rest, _)) = rest {
                    rest.collect_bound_names(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterPassing {
    Value,
    Ref,
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub pattern: Pattern,
    pub declared_type: Option<IrType>,
    pub initializer: Option<Expression>,
    pub is_optional: bool,
    pub is_rest: bool,
    pub passing: ParameterPassing,
}

impl Parameter {
    pub fn simple(name: StringId, declared_type: Option<IrType>) -> Self {
        Self {
            pattern: Pattern::IdentifierPattern(name),
            declared_type,
            initializer: None,
            is_optional: false,
            is_rest: false,
            passing: ParameterPassing::Value,
        }
    }
}
