//! Pass pipeline orchestrator (component C9, §4.5). Runs the six fixed
//! passes in order, then specialization collection, threading a single
//! [`DiagnosticsCollector`] through the whole run. A fatal diagnostic
//! from any pass stops the pipeline immediately with whatever modules
//! that pass had already produced; non-fatal diagnostics accumulate and
//! the pipeline continues (§7's abort-vs-continue policy).

use crate::compiler_messages::diagnostics::DiagnosticsCollector;
use crate::ir::module::Module;
use crate::pass_log;
use crate::passes::anon_types::AnonTypeSynthesizer;
use crate::passes::specialization::{self, SpecializationRequest};
use crate::passes::{attributes, numeric_coercion, numeric_proof, soundness, yield_lowering};
use crate::string_interning::StringTable;

pub struct PipelineOutput {
    pub modules: Vec<Module>,
    pub collector: DiagnosticsCollector,
    pub specializations: Vec<SpecializationRequest>,
}

/// Runs the fixed pass pipeline: anonymous-type lowering, soundness
/// gate, numeric proof, numeric coercion check, yield lowering,
/// attribute collection, then specialization collection. `table` is
/// mutated by anonymous-type lowering, which interns freshly synthesized
/// type names.
pub fn run_pipeline(
    mut modules: Vec<Module>,
    table: &mut StringTable,
    mut collector: DiagnosticsCollector,
) -> PipelineOutput {
    pass_log!("anon_types: lowering structural object types");
    for module in &mut modules {
        let mut synthesizer = AnonTypeSynthesizer::new();
        lower_module_types(module, &mut synthesizer, table);
        append_synthesized_shapes(module, &synthesizer);
    }

    if collector.has_fatal() {
        return PipelineOutput { modules, collector, specializations: Vec::new() };
    }

    pass_log!("soundness: checking for reachable anyType");
    let (modules, collector) = soundness::run_soundness_gate(modules, table, collector);
    if collector.has_fatal() {
        return PipelineOutput { modules, collector, specializations: Vec::new() };
    }

    pass_log!("numeric_proof: attaching narrowing proofs");
    let (modules, collector) = numeric_proof::run_numeric_proof(modules, table, collector);
    if collector.has_fatal() {
        return PipelineOutput { modules, collector, specializations: Vec::new() };
    }

    pass_log!("numeric_coercion: checking unwrapped widenings");
    let (modules, collector) = numeric_coercion::run_numeric_coercion_check(modules, table, collector);
    if collector.has_fatal() {
        return PipelineOutput { modules, collector, specializations: Vec::new() };
    }

    pass_log!("yield_lowering: rewriting generator yields");
    let (modules, collector) = yield_lowering::run_yield_lowering(modules, table, collector);
    if collector.has_fatal() {
        return PipelineOutput { modules, collector, specializations: Vec::new() };
    }

    pass_log!("attributes: collecting attribute markers");
    let modules = attributes::run_attribute_collection(modules, table);

    pass_log!("specialization: collecting generic instantiations");
    let specializations = specialization::collect_specializations(&modules, table);

    PipelineOutput { modules, collector, specializations }
}

fn lower_module_types(module: &mut Module, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) {
    use crate::ir::expr::Expression;
    use crate::ir::stmt::Statement;
    use crate::passes::anon_types::lower_type;

    fn lower_optional_type(ty: &mut Option<crate::ir::ty::IrType>, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) {
        if let Some(t) = ty.take() {
            *ty = Some(lower_type(t, synthesizer, table));
        }
    }

    fn lower_class_member(member: &mut crate::ir::stmt::ClassMember, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) {
        use crate::ir::stmt::ClassMemberKind;
        match &mut member.kind {
            ClassMemberKind::Field { declared_type, initializer, .. } => {
                lower_optional_type(declared_type, synthesizer, table);
                if let Some(expr) = initializer {
                    lower_expression(expr, synthesizer, table);
                }
            }
            ClassMemberKind::Property { declared_type, getter_body, setter_body } => {
                let owned = std::mem::replace(declared_type, crate::ir::ty::IrType::VoidType);
                *declared_type = lower_type(owned, synthesizer, table);
                for body in [getter_body, setter_body].into_iter().flatten() {
                    for s in body {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
            ClassMemberKind::Method { parameters, return_type, body, .. } => {
                for param in parameters {
                    lower_optional_type(&mut param.declared_type, synthesizer, table);
                }
                lower_optional_type(return_type, synthesizer, table);
                if let Some(stmts) = body {
                    for s in stmts {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
        }
    }

    fn lower_statement(statement: &mut Statement, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) {
        match statement {
            Statement::VariableDeclaration { declared_type, initializer, .. } => {
                lower_optional_type(declared_type, synthesizer, table);
                if let Some(expr) = initializer {
                    lower_expression(expr, synthesizer, table);
                }
            }
            Statement::FunctionDeclaration { parameters, return_type, body, .. } => {
                for param in parameters {
                    lower_optional_type(&mut param.declared_type, synthesizer, table);
                }
                lower_optional_type(return_type, synthesizer, table);
                if let Some(stmts) = body {
                    for s in stmts {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
            Statement::ClassDeclaration { members, .. } | Statement::InterfaceDeclaration { members, .. } => {
                for member in members {
                    lower_class_member(member, synthesizer, table);
                }
            }
            Statement::EnumDeclaration { members, .. } => {
                for member in members {
                    if let Some(expr) = &mut member.initializer {
                        lower_expression(expr, synthesizer, table);
                    }
                }
            }
            Statement::TypeAliasDeclaration { aliased_type, .. } => {
                let owned = std::mem::replace(aliased_type, crate::ir::ty::IrType::VoidType);
                *aliased_type = lower_type(owned, synthesizer, table);
            }
            Statement::Block(statements) => {
                for s in statements {
                    lower_statement(s, synthesizer, table);
                }
            }
            Statement::If { test, consequent, alternate } => {
                lower_expression(test, synthesizer, table);
                lower_statement(consequent, synthesizer, table);
                if let Some(alt) = alternate {
                    lower_statement(alt, synthesizer, table);
                }
            }
            Statement::While { test, body } => {
                lower_expression(test, synthesizer, table);
                lower_statement(body, synthesizer, table);
            }
            Statement::For { init, test, update, body } => {
                if let Some(init) = init {
                    lower_statement(init, synthesizer, table);
                }
                if let Some(test) = test {
                    lower_expression(test, synthesizer, table);
                }
                if let Some(update) = update {
                    lower_expression(update, synthesizer, table);
                }
                lower_statement(body, synthesizer, table);
            }
            Statement::ForOf { declared_type, right, body, .. } => {
                lower_optional_type(declared_type, synthesizer, table);
                lower_expression(right, synthesizer, table);
                lower_statement(body, synthesizer, table);
            }
            Statement::Switch { discriminant, cases } => {
                lower_expression(discriminant, synthesizer, table);
                for case in cases {
                    if let Some(test) = &mut case.test {
                        lower_expression(test, synthesizer, table);
                    }
                    for s in &mut case.body {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
            Statement::Try { block, handler, finalizer } => {
                for s in block {
                    lower_statement(s, synthesizer, table);
                }
                if let Some(handler) = handler {
                    for s in &mut handler.body {
                        lower_statement(s, synthesizer, table);
                    }
                }
                if let Some(finalizer) = finalizer {
                    for s in finalizer {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
            Statement::Return(Some(expr)) | Statement::GeneratorReturn(Some(expr)) | Statement::Throw(expr) => {
                lower_expression(expr, synthesizer, table);
            }
            Statement::Expression(expr) => lower_expression(expr, synthesizer, table),
            _ => {}
        }
    }

    fn lower_expression(expression: &mut Expression, synthesizer: &mut AnonTypeSynthesizer, table: &mut StringTable) {
        match expression {
            Expression::TypeAssertion { target_type, expression }
            | Expression::AsInterface { target_type, expression }
            | Expression::Trycast { target_type, expression } => {
                let owned = std::mem::replace(target_type, crate::ir::ty::IrType::VoidType);
                *target_type = lower_type(owned, synthesizer, table);
                lower_expression(expression, synthesizer, table);
            }
            Expression::NumericNarrowing { target_type, expression, .. } => {
                let owned = std::mem::replace(target_type, crate::ir::ty::IrType::VoidType);
                *target_type = lower_type(owned, synthesizer, table);
                lower_expression(expression, synthesizer, table);
            }
            Expression::Stackalloc { element_type, length } => {
                let owned = std::mem::replace(element_type, crate::ir::ty::IrType::VoidType);
                *element_type = lower_type(owned, synthesizer, table);
                lower_expression(length, synthesizer, table);
            }
            Expression::Defaultof(ty) => {
                let owned = std::mem::replace(ty, crate::ir::ty::IrType::VoidType);
                *ty = lower_type(owned, synthesizer, table);
            }
            Expression::Array(elements) => {
                for arg in elements {
                    lower_expression(&mut arg.expression, synthesizer, table);
                }
            }
            Expression::Object(properties) => {
                for prop in properties {
                    lower_expression(&mut prop.value, synthesizer, table);
                }
            }
            Expression::MemberAccess { object, property, .. } => {
                lower_expression(object, synthesizer, table);
                if let crate::ir::expr::PropertyKey::Computed(key) = property {
                    lower_expression(key, synthesizer, table);
                }
            }
            Expression::Call { callee, type_arguments, arguments, .. }
            | Expression::New { callee, type_arguments, arguments, .. } => {
                lower_expression(callee, synthesizer, table);
                for ty in type_arguments {
                    let owned = std::mem::replace(ty, crate::ir::ty::IrType::VoidType);
                    *ty = lower_type(owned, synthesizer, table);
                }
                for arg in arguments {
                    lower_expression(&mut arg.expression, synthesizer, table);
                }
            }
            Expression::Binary { left, right, .. } | Expression::Logical { left, right } => {
                lower_expression(left, synthesizer, table);
                lower_expression(right, synthesizer, table);
            }
            Expression::Unary { operand, .. }
            | Expression::Update { operand, .. }
            | Expression::Await(operand)
            | Expression::Spread(operand) => lower_expression(operand, synthesizer, table),
            Expression::Assignment { target, value, .. } => {
                lower_expression(target, synthesizer, table);
                lower_expression(value, synthesizer, table);
            }
            Expression::Conditional { test, consequent, alternate, .. } => {
                lower_expression(test, synthesizer, table);
                lower_expression(consequent, synthesizer, table);
                lower_expression(alternate, synthesizer, table);
            }
            Expression::FunctionExpression { parameters, return_type, body, .. } => {
                for param in parameters {
                    lower_optional_type(&mut param.declared_type, synthesizer, table);
                }
                lower_optional_type(return_type, synthesizer, table);
                for s in body {
                    lower_statement(s, synthesizer, table);
                }
            }
            Expression::ArrowFunction { parameters, return_type, expression_body, block_body, .. } => {
                for param in parameters {
                    lower_optional_type(&mut param.declared_type, synthesizer, table);
                }
                lower_optional_type(return_type, synthesizer, table);
                if let Some(body) = expression_body {
                    lower_expression(body, synthesizer, table);
                }
                if let Some(stmts) = block_body {
                    for s in stmts {
                        lower_statement(s, synthesizer, table);
                    }
                }
            }
            Expression::TemplateLiteral(parts) => {
                for part in parts {
                    if let Some(expr) = &mut part.expression {
                        lower_expression(expr, synthesizer, table);
                    }
                }
            }
            Expression::Yield { argument, .. } => {
                if let Some(arg) = argument {
                    lower_expression(arg, synthesizer, table);
                }
            }
            Expression::Literal(_) | Expression::Identifier(_) | Expression::This => {}
        }
    }

    for statement in &mut module.body {
        lower_statement(statement, synthesizer, table);
    }
}

/// Appends one `InterfaceDeclaration` per shape the anonymous-type
/// synthesizer collapsed in this module, so every `__AnonN` reference
/// type the lowering above introduced has a matching nominal
/// declaration for the emitter to build a class from.
fn append_synthesized_shapes(module: &mut Module, synthesizer: &AnonTypeSynthesizer) {
    use crate::ir::stmt::{Accessibility, ClassMember, ClassMemberKind, Statement};

    for (name, members) in synthesizer.synthesized_shapes() {
        let class_members: Vec<ClassMember> = members
            .iter()
            .map(|m| ClassMember {
                name: m.name,
                kind: ClassMemberKind::Field {
                    declared_type: Some(m.ty.clone()),
                    initializer: None,
                    is_readonly: false,
                },
                accessibility: Accessibility::Public,
                is_static: false,
                attributes: Vec::new(),
            })
            .collect();
        module.body.push(Statement::InterfaceDeclaration {
            name: *name,
            type_parameters: Vec::new(),
            heritage: Vec::new(),
            members: class_members,
        });
    }
}
