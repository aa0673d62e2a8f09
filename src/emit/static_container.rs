//! Static-container synthesis policy (§4.6). A module with no top-level
//! executable statement becomes a single static class named after the
//! file's container. When the entry module has top-level executable
//! code, that code is collected into a synthesized `__TopLevel()`
//! method and declarations stay as static members. A name collision
//! between the container and a user-declared type in the same module
//! forces a `__Module` suffix on the container.

use crate::ir::stmt::Statement;
use crate::string_interning::{StringId, StringTable};

/// Whether `statement` counts as "top-level executable code" for the
/// purposes of static-container synthesis: anything other than a pure
/// declaration.
pub fn is_executable(statement: &Statement) -> bool {
    !matches!(
        statement,
        Statement::FunctionDeclaration { .. }
            | Statement::ClassDeclaration { .. }
            | Statement::InterfaceDeclaration { .. }
            | Statement::EnumDeclaration { .. }
            | Statement::TypeAliasDeclaration { .. }
    )
}

/// Splits a module body into its declarations (stay as static members)
/// and its executable statements (collected into `__TopLevel()`).
pub fn split_declarations_and_executable(body: Vec<Statement>) -> (Vec<Statement>, Vec<Statement>) {
    let mut declarations = Vec::new();
    let mut executable = Vec::new();
    for statement in body {
        if is_executable(&statement) {
            executable.push(statement);
        } else {
            declarations.push(statement);
        }
    }
    (declarations, executable)
}

/// Resolves the final container class name for a module, applying the
/// `__Module` collision-avoidance suffix when `candidate` collides with
/// one of the module's own declared type names.
pub fn resolve_container_name(candidate: StringId, declared_type_names: &[StringId], table: &mut StringTable) -> StringId {
    if declared_type_names.contains(&candidate) {
        let suffixed = format!("{}__Module", table.resolve(candidate));
        table.intern(&suffixed)
    } else {
        candidate
    }
}

/// Name of the synthesized top-level-statements method, `__TopLevel`.
pub const TOP_LEVEL_METHOD_NAME: &str = "__TopLevel";
