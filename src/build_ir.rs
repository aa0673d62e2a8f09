//! IR builder (component C8, §4.4). The syntax-to-IR conversion glue
//! itself is necessarily specific to whatever concrete front end a caller
//! plugs in (the front end's AST shape is outside this specification,
//! §1); what lives here are the builder *responsibilities* spec.md calls
//! out explicitly: import reclassification, destructuring lowering,
//! numeric-lexeme intent tagging, arrow-parameter inference, and
//! narrowing-guard annotation. A concrete front-end adapter calls these
//! while walking its own syntax tree.

use crate::compiler_messages::diagnostics::DiagCode;
use crate::ir::expr::{CallArgument, Expression, LiteralValue, NarrowingInfo, NumericIntent, PropertyKey};
use crate::ir::module::{Import, ImportSpecifier};
use crate::ir::pattern::{ObjectPatternProperty, Pattern};
use crate::ir::stmt::{Statement, VariableKind};
use crate::ir::ty::IrType;
use crate::string_interning::{StringId, StringTable};

/// Classifies an import specifier as local, CLR, or a bare module
/// binding, per §4.4 "Imports". Local specifiers begin with `.` or `/`;
/// everything else is treated as a CLR/module binding target, which
/// [`crate::binding::alias`] resolves further.
pub fn classify_import(specifier: &str, import: &mut Import) {
    import.is_local = specifier.starts_with('.') || specifier.starts_with('/');
    import.is_clr = !import.is_local;
}

/// Derives a local import's target container name from the file
/// basename, capitalized (e.g. `./widgets` → `Widgets`), per §4.4.
pub fn local_import_container_name(specifier: &str, table: &mut StringTable) -> StringId {
    let basename = specifier
        .rsplit('/')
        .next()
        .unwrap_or(specifier)
        .trim_end_matches(".ts");
    let mut chars = basename.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    table.intern(&capitalized)
}

/// Attaches a flattened CLR value export to a named import specifier when
/// the binding manifest lists one (§4.4 "For CLR value imports, consult
/// the binding registry to attach `resolvedClrValue`").
pub fn attach_resolved_clr_value(specifier: &mut ImportSpecifier, resolved_value: StringId) {
    if let ImportSpecifier::Named { resolved_clr_value, .. } = specifier {
        *resolved_clr_value = Some(resolved_value);
    }
}

/// Derives numeric intent from the lexeme alone (invariant I-3): the
/// presence of a decimal point, an exponent marker, or — conversely — a
/// bare integer lexeme (including hex/octal/binary prefixed ones) that
/// fits `i32`.
pub fn numeric_intent_from_lexeme(lexeme: &str) -> NumericIntent {
    let has_point = lexeme.contains('.');
    let has_exponent = lexeme.contains(['e', 'E']) && !lexeme.starts_with("0x") && !lexeme.starts_with("0X");
    if has_point || has_exponent {
        return NumericIntent::Double;
    }
    NumericIntent::Int32
}

/// Validates numeric separator placement (`_`): no leading, trailing,
/// doubled, or post-prefix underscore. Returns `Err` on violation; the
/// caller raises whatever diagnostic code fits the call site.
pub fn validate_numeric_separators(lexeme: &str) -> Result<(), ()> {
    if lexeme.starts_with('_') || lexeme.ends_with('_') || lexeme.contains("__") {
        return Err(());
    }
    for prefix in ["0x", "0X", "0b", "0B", "0o", "0O"] {
        if let Some(rest) = lexeme.strip_prefix(prefix) {
            if rest.starts_with('_') {
                return Err(());
            }
        }
    }
    Ok(())
}

/// Parses a numeric literal lexeme into an IR literal value, classifying
/// intent per [`numeric_intent_from_lexeme`] and checking a narrowing
/// candidacy: an integer lexeme may only be narrowed to an integer type
/// when its value fits the target range (invariant I-3).
pub fn parse_numeric_literal(lexeme: &str) -> Option<LiteralValue> {
    validate_numeric_separators(lexeme).ok()?;
    let cleaned: String = lexeme.chars().filter(|c| *c != '_').collect();
    let intent = numeric_intent_from_lexeme(&cleaned);
    let value = parse_numeric_value(&cleaned)?;
    Some(LiteralValue::Number {
        lexeme: lexeme.to_string(),
        value,
        intent,
    })
}

fn parse_numeric_value(cleaned: &str) -> Option<f64> {
    if let Some(rest) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(rest, 16).ok().map(|v| v as f64);
    }
    if let Some(rest) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return i64::from_str_radix(rest, 2).ok().map(|v| v as f64);
    }
    if let Some(rest) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return i64::from_str_radix(rest, 8).ok().map(|v| v as f64);
    }
    cleaned.parse::<f64>().ok()
}

/// An integer lexeme fits `Int32` narrowing only when both its intent is
/// `Int32` and the parsed value is within range (invariant I-3).
pub fn fits_int32_narrowing(literal: &LiteralValue) -> bool {
    match literal {
        LiteralValue::Number { value, intent, .. } => {
            *intent == NumericIntent::Int32 && *value >= i32::MIN as f64 && *value <= i32::MAX as f64
        }
        _ => false,
    }
}

/// Lowers a destructuring variable declaration into an explicit sequence
/// of statements (§4.4 "Destructuring"): a temporary holds the
/// initializer, each binding is assigned from `temp[i]`/`temp.prop`, and
/// rest patterns are left as a marker for the caller to attach a runtime
/// slice helper or synthesized shape to (this function does not itself
/// know the shape-synthesis naming scheme, owned by anonymous-type
/// lowering).
pub fn lower_destructuring_declaration(
    kind: VariableKind,
    pattern: &Pattern,
    declared_type: Option<IrType>,
    initializer: Expression,
    temp_name: StringId,
) -> Vec<Statement> {
    if matches!(pattern, Pattern::IdentifierPattern(_)) {
        return vec![Statement::VariableDeclaration {
            kind,
            pattern: pattern.clone(),
            declared_type,
            initializer: Some(initializer),
        }];
    }

    let mut statements = vec![Statement::VariableDeclaration {
        kind,
        pattern: Pattern::IdentifierPattern(temp_name),
        declared_type: None,
        initializer: Some(initializer),
    }];

    match pattern {
        Pattern::ArrayPattern { elements, rest } => {
            for (index, element) in elements.iter().enumerate() {
                let Some(element_pattern) = element else {
                    continue;
                };
                statements.push(array_index_assignment(kind, element_pattern, temp_name, index));
            }
            if let Some(rest_pattern) = rest {
                statements.push(Statement::VariableDeclaration {
                    kind,
                    pattern: (**rest_pattern).clone(),
                    declared_type: None,
                    initializer: Some(Expression::Spread(Box::new(Expression::Identifier(temp_name)))),
                });
            }
        }
        Pattern::ObjectPattern { properties, rest } => {
            for property in properties {
                statements.push(object_property_assignment(kind, property, temp_name));
            }
            if let Some((rest_pattern, _shape_name)) = rest {
                statements.push(Statement::VariableDeclaration {
                    kind,
                    pattern: (**rest_pattern).clone(),
                    declared_type: None,
                    initializer: Some(Expression::Spread(Box::new(Expression::Identifier(temp_name)))),
                });
            }
        }
        Pattern::IdentifierPattern(_) => unreachable!("handled above"),
    }

    statements
}

fn array_index_assignment(kind: VariableKind, element: &Pattern, temp_name: StringId, index: usize) -> Statement {
    let access = Expression::MemberAccess {
        object: Box::new(Expression::Identifier(temp_name)),
        property: PropertyKey::Computed(Box::new(Expression::Literal(LiteralValue::Number {
            lexeme: index.to_string(),
            value: index as f64,
            intent: NumericIntent::Int32,
        }))),
        is_optional: false,
        narrowing: None,
    };
    Statement::VariableDeclaration {
        kind,
        pattern: element.clone(),
        declared_type: None,
        initializer: Some(access),
    }
}

fn object_property_assignment(kind: VariableKind, property: &ObjectPatternProperty, temp_name: StringId) -> Statement {
    Statement::VariableDeclaration {
        kind,
        pattern: property.value.clone(),
        declared_type: None,
        initializer: Some(Expression::MemberAccess {
            object: Box::new(Expression::Identifier(temp_name)),
            property: PropertyKey::Name(property.key),
            is_optional: false,
            narrowing: None,
        }),
    }
}

/// Infers a simple arrow's parameter types from the expected function
/// type's positional parameters (§4.4 "Arrow parameter inference"). Fails
/// deterministically with `TSN5201`/`TSN5202` when the expected type is
/// not a function type (i.e. not accessible without contextual
/// inference).
pub fn infer_arrow_parameter_types(
    parameter_count: usize,
    expected: Option<&IrType>,
) -> Result<Vec<IrType>, DiagCode> {
    match expected {
        Some(IrType::FunctionType { parameters, .. }) => {
            if parameters.len() < parameter_count {
                return Err(DiagCode::ArrowParameterTypeUnavailable);
            }
            Ok(parameters[..parameter_count].iter().map(|p| p.ty.clone()).collect())
        }
        Some(_) | None => Err(DiagCode::ArrowParameterTypeUnavailable),
    }
}

/// Builds narrowing metadata for a union-discriminant guard (`x.disc ===
/// "lit"` where exactly one union member's discriminant literal matches),
/// per §4.4 "Narrowing metadata on guards".
pub fn narrowing_for_discriminant_match(subject: StringId, member_index: u32, narrowed_type: IrType) -> NarrowingInfo {
    NarrowingInfo {
        subject,
        member_index,
        narrowed_type,
    }
}

/// Builds narrowing metadata for an `in`-check guard (`"prop" in x`) when
/// exactly one union member carries `prop`.
pub fn narrowing_for_in_check(subject: StringId, member_index: u32, narrowed_type: IrType) -> NarrowingInfo {
    narrowing_for_discriminant_match(subject, member_index, narrowed_type)
}

pub fn call_argument(expression: Expression) -> CallArgument {
    CallArgument {
        expression,
        is_spread: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ty::{FunctionTypeParam, PrimitiveKind};

    #[test]
    fn dotted_lexeme_has_double_intent() {
        assert_eq!(numeric_intent_from_lexeme("1.0"), NumericIntent::Double);
        assert_eq!(numeric_intent_from_lexeme("1"), NumericIntent::Int32);
        assert_eq!(numeric_intent_from_lexeme("1e10"), NumericIntent::Double);
        assert_eq!(numeric_intent_from_lexeme("0x1F"), NumericIntent::Int32);
    }

    #[test]
    fn leading_underscore_is_rejected() {
        assert!(validate_numeric_separators("_100").is_err());
    }

    #[test]
    fn doubled_underscore_is_rejected() {
        assert!(validate_numeric_separators("1__000").is_err());
    }

    #[test]
    fn underscore_after_prefix_is_rejected() {
        assert!(validate_numeric_separators("0x_FF").is_err());
    }

    #[test]
    fn well_formed_separator_is_accepted() {
        assert!(validate_numeric_separators("1_000_000").is_ok());
    }

    #[test]
    fn hex_literal_parses_to_its_integer_value() {
        let literal = parse_numeric_literal("0x10").unwrap();
        match literal {
            LiteralValue::Number { value, intent, .. } => {
                assert_eq!(value, 16.0);
                assert_eq!(intent, NumericIntent::Int32);
            }
            _ => panic!("expected a number literal"),
        }
    }

    #[test]
    fn out_of_range_integer_does_not_fit_int32_narrowing() {
        let literal = LiteralValue::Number {
            lexeme: "9999999999".to_string(),
            value: 9_999_999_999.0,
            intent: NumericIntent::Int32,
        };
        assert!(!fits_int32_narrowing(&literal));
    }

    #[test]
    fn arrow_inference_fails_without_function_type_context() {
        let result = infer_arrow_parameter_types(1, None);
        assert_eq!(result, Err(DiagCode::ArrowParameterTypeUnavailable));
    }

    #[test]
    fn arrow_inference_succeeds_with_matching_function_type() {
        let expected = IrType::FunctionType {
            parameters: vec![FunctionTypeParam {
                ty: IrType::PrimitiveType(PrimitiveKind::Number),
                is_optional: false,
                is_rest: false,
            }],
            return_type: Box::new(IrType::VoidType),
        };
        let result = infer_arrow_parameter_types(1, Some(&expected)).unwrap();
        assert_eq!(result, vec![IrType::PrimitiveType(PrimitiveKind::Number)]);
    }

    #[test]
    fn local_import_container_name_capitalizes_basename() {
        let mut table = StringTable::new();
        let id = local_import_container_name("./lib/widgets", &mut table);
        assert_eq!(table.resolve(id), "Widgets");
    }

    #[test]
    fn identifier_pattern_declaration_is_not_lowered() {
        let mut table = StringTable::new();
        let name = table.intern("x");
        let statements = lower_destructuring_declaration(
            VariableKind::Const,
            &Pattern::IdentifierPattern(name),
            None,
            Expression::This,
            table.intern("__tmp0"),
        );
        assert_eq!(statements.len(), 1);
    }
}
