//! Binding registry (component C3, §3.3, §4.3). A flat CLR lookup table
//! keyed by `(typeAlias, memberAlias)`, plus an extension-method index with
//! inheritance-aware overload resolution.

use crate::binding::universe::{ParameterMode, UnifiedTypeCatalog};
use crate::string_interning::StringId;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// `(assembly, clrType, member)` — the one host target a resolved call
/// must name (invariant I-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallTarget {
    pub assembly: StringId,
    pub clr_type: StringId,
    pub member: StringId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub target: CallTarget,
    pub parameter_modifiers: Vec<ParameterMode>,
    pub is_optional: Vec<bool>,
}

impl Overload {
    pub fn arity(&self) -> usize {
        self.parameter_modifiers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionCandidate {
    pub target: CallTarget,
    pub parameter_modifiers: Vec<ParameterMode>,
}

impl ExtensionCandidate {
    /// Host-language parameter count, receiver occupying position 0.
    pub fn host_arity(&self) -> usize {
        self.parameter_modifiers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionResolution {
    Resolved(CallTarget),
    Unresolved,
}

#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    flat: FxHashMap<(StringId, StringId), Vec<Overload>>,
    extensions: FxHashMap<(StringId, StringId, StringId), Vec<ExtensionCandidate>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_overload(&mut self, type_alias: StringId, member_alias: StringId, overload: Overload) {
        self.flat.entry((type_alias, member_alias)).or_default().push(overload);
    }

    pub fn overloads(&self, type_alias: StringId, member_alias: StringId) -> &[Overload] {
        self.flat
            .get(&(type_alias, member_alias))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn register_extension(
        &mut self,
        namespace_key: StringId,
        receiver_type_name: StringId,
        method_name: StringId,
        candidate: ExtensionCandidate,
    ) {
        self.extensions
            .entry((namespace_key, receiver_type_name, method_name))
            .or_default()
            .push(candidate);
    }

    /// Overload resolution for extension methods (§4.3). For a call of
    /// arity `n` using instance-style dispatch:
    /// 1. Filter to signatures whose host parameter count is `n + 1`.
    /// 2. If none match, select the smallest arity strictly larger than
    ///    `n + 1` (optional parameters) and filter to that.
    /// 3. If candidates disagree on target or parameter-modifier set,
    ///    unresolved.
    /// 4. If the receiver doesn't match directly, BFS over supertypes;
    ///    the first depth with any resolution requires unanimity.
    pub fn resolve_extension_method(
        &self,
        universe: &UnifiedTypeCatalog,
        namespace_key: StringId,
        receiver_type_name: StringId,
        method_name: StringId,
        call_arity: usize,
    ) -> ExtensionResolution {
        let mut visited = std::collections::HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(receiver_type_name);

        while let Some(receiver) = queue.pop_front() {
            if !visited.insert(receiver) {
                continue;
            }
            if let Some(resolution) =
                self.resolve_at_receiver(namespace_key, receiver, method_name, call_arity)
            {
                return resolution;
            }
            for edge in universe.heritage_of(receiver) {
                queue.push_back(edge.target_stable_id);
            }
        }
        ExtensionResolution::Unresolved
    }

    fn resolve_at_receiver(
        &self,
        namespace_key: StringId,
        receiver_type_name: StringId,
        method_name: StringId,
        call_arity: usize,
    ) -> Option<ExtensionResolution> {
        let candidates = self
            .extensions
            .get(&(namespace_key, receiver_type_name, method_name))?;
        if candidates.is_empty() {
            return None;
        }

        let exact_arity = call_arity + 1;
        let mut matching: Vec<&ExtensionCandidate> = candidates
            .iter()
            .filter(|c| c.host_arity() == exact_arity)
            .collect();

        if matching.is_empty() {
            let next_arity = candidates
                .iter()
                .map(ExtensionCandidate::host_arity)
                .filter(|&arity| arity > exact_arity)
                .min();
            let Some(next_arity) = next_arity else {
                return None;
            };
            matching = candidates
                .iter()
                .filter(|c| c.host_arity() == next_arity)
                .collect();
        }

        if matching.is_empty() {
            return None;
        }

        let first = matching[0];
        let unanimous = matching
            .iter()
            .all(|c| c.target == first.target && c.parameter_modifiers == first.parameter_modifiers);

        Some(if unanimous {
            ExtensionResolution::Resolved(first.target)
        } else {
            ExtensionResolution::Unresolved
        })
    }
}
