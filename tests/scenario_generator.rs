//! S-5: `function* counter(): Generator<number, void, undefined> { let i
//! = 0; while (true) { yield i; i += 1; } }` lowers to a `counter_exchange`
//! class with an `Output: double` field and no wrapper class (TNext is
//! `undefined`), and `yield i` inside the loop becomes a `YieldStatement`
//! the emitter later turns into `exchange.Output = i; yield return
//! exchange;`.

use pretty_assertions::assert_eq;
use tsnc_core::compiler_messages::diagnostics::DiagnosticsCollector;
use tsnc_core::emit::generator::{build_generator_plan, GeneratorShape};
use tsnc_core::emit::host_ast::HostType;
use tsnc_core::interned_path::InternedPath;
use tsnc_core::ir::expr::{Expression, LiteralValue};
use tsnc_core::ir::module::Module;
use tsnc_core::ir::stmt::Statement;
use tsnc_core::passes::yield_lowering::run_yield_lowering;
use tsnc_core::string_interning::StringTable;

#[test]
fn unidirectional_number_generator_has_output_field_and_no_wrapper() {
    let mut table = StringTable::new();
    let shape = GeneratorShape {
        yield_type: HostType::Named { name: table.intern("double"), type_arguments: vec![] },
        return_type: HostType::Void,
        next_type: None,
    };
    let plan = build_generator_plan("counter", &shape, &mut table);
    assert_eq!(table.resolve(plan.exchange_class.name), "counter_exchange");
    assert!(plan.wrapper_class.is_none());
}

#[test]
fn yield_inside_while_loop_lowers_to_yield_statement_in_place() {
    let mut table = StringTable::new();
    let counter = table.intern("counter");
    let i = table.intern("i");

    let generator_body = vec![Statement::While {
        test: Expression::Literal(LiteralValue::Boolean(true)),
        body: Box::new(Statement::Block(vec![
            Statement::Expression(Expression::Yield {
                argument: Some(Box::new(Expression::Identifier(i))),
                is_delegate: false,
            }),
            Statement::Expression(Expression::Update {
                operator: tsnc_core::ir::expr::UpdateOperator::Increment,
                operand: Box::new(Expression::Identifier(i)),
                is_prefix: false,
            }),
        ])),
    }];

    let mut module = Module::new(InternedPath::from_str("gen.ts", &mut table), table.intern("App"), table.intern("Gen"));
    module.body = vec![Statement::FunctionDeclaration {
        name: counter,
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: None,
        body: Some(generator_body),
        is_generator: true,
        is_async: false,
        attributes: Vec::new(),
    }];

    let (modules, collector) = run_yield_lowering(vec![module], &table, DiagnosticsCollector::new());
    assert!(collector.is_empty());

    let Statement::FunctionDeclaration { body: Some(stmts), .. } = &modules[0].body[0] else {
        panic!("expected the generator function to survive lowering");
    };
    let Statement::While { body: loop_body, .. } = &stmts[0] else {
        panic!("expected the while loop to survive lowering");
    };
    let Statement::Block(loop_stmts) = loop_body.as_ref() else {
        panic!("expected a block loop body");
    };
    assert!(matches!(loop_stmts[0], Statement::YieldStatement { .. }));
    assert!(matches!(loop_stmts[1], Statement::Expression(Expression::Update { .. })));
}

#[test]
fn yield_outside_generator_function_is_rejected() {
    let mut table = StringTable::new();
    let fn_name = table.intern("notAGenerator");
    let mut module = Module::new(InternedPath::from_str("notgen.ts", &mut table), table.intern("App"), table.intern("NotGen"));
    module.body = vec![Statement::FunctionDeclaration {
        name: fn_name,
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: None,
        body: Some(vec![Statement::Expression(Expression::Yield { argument: None, is_delegate: false })]),
        is_generator: false,
        is_async: false,
        attributes: Vec::new(),
    }];

    let (_, collector) = run_yield_lowering(vec![module], &table, DiagnosticsCollector::new());
    assert_eq!(collector.len(), 1);
    assert_eq!(
        collector.all()[0].code,
        tsnc_core::compiler_messages::diagnostics::DiagCode::InvalidYieldPosition
    );
}

