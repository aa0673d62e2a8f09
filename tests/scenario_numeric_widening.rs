//! S-2: `function add(a: number, b: number): number { return a + b; }`
//! plus `const x = add(1, 2);` — integer-lexeme literals passed into a
//! `number`-declared parameter get wrapped in a `numericNarrowing` node
//! by the IR builder, so neither the proof pass nor the coercion check
//! ever flags `TSN5110` for this call; the unwrapped form does get
//! flagged, once per offending argument.

use pretty_assertions::assert_eq;
use tsnc_core::compiler_messages::diagnostics::{DiagCode, DiagnosticsCollector};
use tsnc_core::interned_path::InternedPath;
use tsnc_core::ir::expr::{CallArgument, Expression, LiteralValue, NarrowingProof, NumericIntent};
use tsnc_core::ir::module::Module;
use tsnc_core::ir::pattern::Parameter;
use tsnc_core::ir::stmt::{Statement, TypeParameterDecl};
use tsnc_core::ir::ty::{IrType, PrimitiveKind};
use tsnc_core::passes::{numeric_coercion, numeric_proof};
use tsnc_core::string_interning::StringTable;

fn int_literal(lexeme: &str, value: f64) -> Expression {
    Expression::Literal(LiteralValue::Number { lexeme: lexeme.to_string(), value, intent: NumericIntent::Int32 })
}

fn narrowed(expr: Expression) -> Expression {
    Expression::NumericNarrowing {
        expression: Box::new(expr),
        target_type: IrType::PrimitiveType(PrimitiveKind::Number),
        proof: None,
    }
}

#[test]
fn wrapped_integer_literal_into_number_parameter_proves_and_never_flags_widening() {
    let mut table = StringTable::new();
    let x = table.intern("x");
    let module_body = vec![Statement::VariableDeclaration {
        kind: tsnc_core::ir::stmt::VariableKind::Const,
        pattern: tsnc_core::ir::pattern::Pattern::IdentifierPattern(x),
        declared_type: Some(IrType::PrimitiveType(PrimitiveKind::Number)),
        initializer: Some(narrowed(int_literal("1", 1.0))),
    }];
    let mut module = Module::new(tsnc_core::interned_path::InternedPath::from_str("s2.ts", &mut table), table.intern("App"), table.intern("S2"));
    module.body = module_body;

    let (modules, collector) = numeric_proof::run_numeric_proof(vec![module], &table, DiagnosticsCollector::new());
    assert!(collector.is_empty());

    match &modules[0].body[0] {
        Statement::VariableDeclaration { initializer: Some(Expression::NumericNarrowing { proof, .. }), .. } => {
            assert_eq!(*proof, Some(NarrowingProof::Literal));
        }
        other => panic!("unexpected statement shape: {other:?}"),
    }

    let (_, collector) = numeric_coercion::run_numeric_coercion_check(modules, &table, DiagnosticsCollector::new());
    assert!(collector.is_empty(), "wrapped literal must not trigger TSN5110");
}

#[test]
fn unwrapped_integer_literal_into_number_target_is_flagged_tsn5110() {
    let mut table = StringTable::new();
    let x = table.intern("x");
    let module_body = vec![Statement::VariableDeclaration {
        kind: tsnc_core::ir::stmt::VariableKind::Const,
        pattern: tsnc_core::ir::pattern::Pattern::IdentifierPattern(x),
        declared_type: Some(IrType::PrimitiveType(PrimitiveKind::Number)),
        initializer: Some(int_literal("1", 1.0)),
    }];
    let mut module = Module::new(tsnc_core::interned_path::InternedPath::from_str("s2b.ts", &mut table), table.intern("App"), table.intern("S2B"));
    module.body = module_body;

    let (_, collector) = numeric_coercion::run_numeric_coercion_check(vec![module], &table, DiagnosticsCollector::new());
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.all()[0].code, DiagCode::NumericWideningUnproven);
}

fn add_function_declaration(table: &mut StringTable) -> (tsnc_core::string_interning::StringId, Statement) {
    let add = table.intern("add");
    let a = table.intern("a");
    let b = table.intern("b");
    let number_ty = IrType::PrimitiveType(PrimitiveKind::Number);
    let decl = Statement::FunctionDeclaration {
        name: add,
        type_parameters: Vec::<TypeParameterDecl>::new(),
        parameters: vec![
            Parameter::simple(a, Some(number_ty.clone())),
            Parameter::simple(b, Some(number_ty.clone())),
        ],
        return_type: Some(number_ty),
        body: Some(vec![Statement::Return(Some(Expression::Binary {
            operator: tsnc_core::ir::expr::BinaryOperator::Add,
            left: Box::new(Expression::Identifier(a)),
            right: Box::new(Expression::Identifier(b)),
            narrowing: None,
        }))]),
        is_generator: false,
        is_async: false,
        attributes: Vec::new(),
    };
    (add, decl)
}

#[test]
fn wrapped_call_arguments_into_add_never_flag_widening() {
    let mut table = StringTable::new();
    let (add, add_decl) = add_function_declaration(&mut table);
    let call = Statement::Expression(Expression::Call {
        callee: Box::new(Expression::Identifier(add)),
        type_arguments: Vec::new(),
        arguments: vec![
            CallArgument { expression: narrowed(int_literal("1", 1.0)), is_spread: false },
            CallArgument { expression: narrowed(int_literal("2", 2.0)), is_spread: false },
        ],
        is_optional: false,
        requires_specialization: false,
        narrowing: None,
    });
    let mut module = Module::new(InternedPath::from_str("s2c.ts", &mut table), table.intern("App"), table.intern("S2C"));
    module.body = vec![add_decl, call];

    let (_, collector) = numeric_coercion::run_numeric_coercion_check(vec![module], &table, DiagnosticsCollector::new());
    assert!(collector.is_empty(), "wrapped call arguments must not trigger TSN5110");
}

#[test]
fn unwrapped_call_arguments_into_add_flag_widening_once_per_argument() {
    let mut table = StringTable::new();
    let (add, add_decl) = add_function_declaration(&mut table);
    let call = Statement::Expression(Expression::Call {
        callee: Box::new(Expression::Identifier(add)),
        type_arguments: Vec::new(),
        arguments: vec![
            CallArgument { expression: int_literal("1", 1.0), is_spread: false },
            CallArgument { expression: int_literal("2", 2.0), is_spread: false },
        ],
        is_optional: false,
        requires_specialization: false,
        narrowing: None,
    });
    let mut module = Module::new(InternedPath::from_str("s2d.ts", &mut table), table.intern("App"), table.intern("S2D"));
    module.body = vec![add_decl, call];

    let (_, collector) = numeric_coercion::run_numeric_coercion_check(vec![module], &table, DiagnosticsCollector::new());
    assert_eq!(collector.len(), 2);
    for diagnostic in collector.all() {
        assert_eq!(diagnostic.code, DiagCode::NumericWideningUnproven);
    }
}
