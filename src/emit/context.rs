//! Emitter context (component C10, §4.6). Threaded through the mutually
//! recursive `emitStatement`/`emitExpression` dispatchers. Conceptually
//! immutable: entering a nested scope produces a new `EmitterContext`
//! value (cheap — the backing maps are small) rather than mutating a
//! shared one, matching the value-semantics convention the rest of this
//! crate uses for IR (§3.4).

use crate::config::CompilerOptions;
use crate::ir::ty::IrType;
use crate::string_interning::StringId;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// One entry in the guard rename stack (§4.6 "guard rename stack" state
/// machine): the original binding's name, its renamed form under the
/// current guard, and the narrowed type it carries in that branch.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrowedBinding {
    pub renamed: StringId,
    pub narrowed_type: IrType,
}

/// An immutable, structurally-shared map from module path to its
/// namespace and container class name, built once before emission starts
/// and consulted by every module's emission for cross-module references.
#[derive(Debug, Clone, Default)]
pub struct ModuleMap {
    pub entries: Arc<FxHashMap<StringId, (StringId, StringId)>>,
}

impl ModuleMap {
    pub fn namespace_and_container(&self, module_name: StringId) -> Option<(StringId, StringId)> {
        self.entries.get(&module_name).copied()
    }
}

/// Monotonic temp-name allocator. Cloning an `EmitterContext` clones the
/// `Arc`, so every clone of a context within one module's emission shares
/// the same counter — nested scopes must not silently restart numbering
/// and collide with an outer scope's temp names.
#[derive(Debug, Clone, Default)]
pub struct TempNameAllocator {
    next: Arc<std::sync::atomic::AtomicU32>,
}

impl TempNameAllocator {
    pub fn next_suffix(&self) -> u32 {
        self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct EmitterContext {
    pub indentation_depth: u32,
    pub is_static_container: bool,
    pub enclosing_class_name: Option<StringId>,
    /// Value-symbol table: identifiers currently in scope mapped to their
    /// declared type, used to decide nullable-unwrap insertion.
    pub value_symbols: ValueSymbols,
    /// Narrowed-binding map: original name -> active rename, per the
    /// guard rename stack. Entering a guarded branch adds an entry;
    /// leaving it restores the context from before entry (§4.6).
    pub narrowed_bindings: FxHashMap<StringId, NarrowedBinding>,
    pub temp_names: TempNameAllocator,
    pub type_parameter_scope: Vec<StringId>,
    pub module_map: ModuleMap,
    pub options: Arc<CompilerOptions>,
    /// Call/new sites flagged `requires_specialization` look themselves up
    /// here by `(callee_name, mangled_suffix)` — recomputing the suffix
    /// from their own type arguments via
    /// [`crate::passes::specialization::mangled_key_and_suffix`] — to find
    /// the monomorphized declaration's emitted name. Populated once, before
    /// any module's statements are emitted, from
    /// [`crate::emit::specialization::specialized_names`]'s output.
    pub specializations: Arc<FxHashMap<(StringId, String), StringId>>,
}

/// Copy-on-write map of in-scope identifiers to their declared type,
/// used to decide nullable-unwrap insertion. Cloning is an `Arc` bump
/// until a write actually happens.
#[derive(Debug, Clone, Default)]
pub struct ValueSymbols {
    entries: Arc<FxHashMap<StringId, IrType>>,
}

impl ValueSymbols {
    pub fn get(&self, name: StringId) -> Option<&IrType> {
        self.entries.get(&name)
    }

    pub fn with_binding(&self, name: StringId, ty: IrType) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(name, ty);
        Self { entries: Arc::new(entries) }
    }
}

impl EmitterContext {
    pub fn new(options: Arc<CompilerOptions>, module_map: ModuleMap) -> Self {
        Self {
            indentation_depth: 0,
            is_static_container: true,
            enclosing_class_name: None,
            value_symbols: Default::default(),
            narrowed_bindings: FxHashMap::default(),
            temp_names: TempNameAllocator::default(),
            type_parameter_scope: Vec::new(),
            module_map,
            options,
            specializations: Arc::new(FxHashMap::default()),
        }
    }

    pub fn with_specializations(mut self, specializations: Arc<FxHashMap<(StringId, String), StringId>>) -> Self {
        self.specializations = specializations;
        self
    }

    pub fn indented(&self) -> Self {
        Self {
            indentation_depth: self.indentation_depth + 1,
            ..self.clone()
        }
    }

    pub fn with_enclosing_class(&self, name: StringId) -> Self {
        Self {
            enclosing_class_name: Some(name),
            ..self.clone()
        }
    }

    /// Enters a guarded branch: returns a new context with `subject`
    /// renamed to `renamed` and its narrowed type recorded. The caller
    /// holds onto the pre-entry context and restores it (by simply using
    /// the old value again, since contexts are immutable) when the
    /// branch ends — the pop half of the guard rename stack is "discard
    /// the branch context, keep using the one from before it".
    pub fn enter_guard(&self, subject: StringId, renamed: StringId, narrowed_type: IrType) -> Self {
        let mut narrowed_bindings = self.narrowed_bindings.clone();
        narrowed_bindings.insert(subject, NarrowedBinding { renamed, narrowed_type });
        Self { narrowed_bindings, ..self.clone() }
    }

    /// The name a reference to `name` should actually use: its narrowed
    /// rename if one is active, otherwise `name` itself.
    pub fn resolve_reference(&self, name: StringId) -> StringId {
        self.narrowed_bindings.get(&name).map(|b| b.renamed).unwrap_or(name)
    }

    /// Fresh guard-rename local, `x__N_k` per §4.6, where `member_index`
    /// is *N* and `k` is a per-module monotonic counter so repeated
    /// narrowings of the same union member never collide.
    pub fn fresh_guard_name(&self, base: &str, member_index: u32) -> String {
        format!("{base}__{member_index}_{}", self.temp_names.next_suffix())
    }
}
