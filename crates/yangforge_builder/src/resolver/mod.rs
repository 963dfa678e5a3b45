//! The resolution engine.
//!
//! Resolution runs in phases over the whole module set:
//!
//! ```text
//! 0. imports, unknown nodes   (unknown.rs)
//! 1. types                    (types.rs)
//! 2. identities               (identities.rs)
//! 3. uses                     (uses.rs)
//! 4. augments                 (augments.rs)
//! 5. deviations               (deviations.rs)
//! 6. leafref targets          (leafrefs.rs)
//! ```
//!
//! Phases with forward references run as bounded fixpoint loops: each pass
//! retries every deferred item, and the loop stops on a pass that settles
//! nothing. Whatever is still deferred then is reported as unresolved.

mod augments;
mod deviations;
mod identities;
mod leafrefs;
mod types;
mod unknown;
mod uses;

use std::fmt;

use yangforge_foundation::{CompileError, ErrorKind, NodeRef, SchemaPath};

use crate::arena::{BuilderKind, NodeBuilder, NodeId};
use crate::config::CompilerConfig;
use crate::module_builder::{ModuleBuilder, Slot};
use crate::type_spec::TypeSpec;

pub(crate) use augments::resolve_augments;
pub(crate) use deviations::apply_deviations;
pub(crate) use identities::resolve_identities;
pub(crate) use leafrefs::check_leafrefs;
pub(crate) use types::resolve_types;
pub(crate) use unknown::{check_imports, resolve_unknown_nodes};
pub(crate) use uses::expand_uses;

/// A builder somewhere in the module set: module index and arena id.
pub(crate) type Item = (usize, NodeId);

// =============================================================================
// Context
// =============================================================================

/// The module set under resolution.
pub(crate) struct Context<'a> {
    pub modules: &'a mut [ModuleBuilder],
    pub config: &'a CompilerConfig,
}

impl<'a> Context<'a> {
    pub fn new(modules: &'a mut [ModuleBuilder], config: &'a CompilerConfig) -> Self {
        Self { modules, config }
    }

    /// Index of the module named `name`; the latest revision if `revision`
    /// is `None`.
    pub fn find_module(&self, name: &str, revision: Option<&str>) -> Option<usize> {
        let candidates = self
            .modules
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name() == name);
        match revision {
            Some(rev) => candidates
                .filter(|(_, m)| m.revision() == Some(rev))
                .map(|(i, _)| i)
                .next(),
            None => candidates
                .max_by(|(_, a), (_, b)| a.revision().cmp(&b.revision()))
                .map(|(i, _)| i),
        }
    }

    /// Index of the module a prefix used in module `from` stands for.
    pub fn module_for_prefix(&self, from: usize, prefix: Option<&str>) -> Option<usize> {
        let module = &self.modules[from];
        match prefix {
            None => Some(from),
            Some(p) if p == module.prefix() => Some(from),
            Some(p) => {
                let (import, _) = module.imports.iter().find(|(i, _)| i.prefix == p)?;
                self.find_module(&import.module_name, import.revision.as_deref())
            }
        }
    }

    /// Looks up a typedef or grouping visible from `scope` in module `from`.
    ///
    /// Unprefixed and own-prefix names are searched in every enclosing scope
    /// up to the module top level; names of imported modules only at their
    /// top level.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownPrefix`] if the prefix names no module.
    pub fn find_definition(
        &self,
        from: usize,
        scope: Option<NodeId>,
        reference: &NodeRef,
        slot: Slot,
    ) -> Result<Option<Item>, ErrorKind> {
        let target = self
            .module_for_prefix(from, reference.prefix.as_deref())
            .ok_or_else(|| unknown_prefix(reference))?;
        let module = &self.modules[target];
        if target == from {
            let mut current = scope;
            while let Some(id) = current {
                let found = module.find_named(module.scope_list(Some(id), slot), &reference.name);
                if let Some(found) = found {
                    return Ok(Some((target, found)));
                }
                current = module.arena[id.index()].common.parent;
            }
        }
        Ok(module
            .find_named(module.scope_list(None, slot), &reference.name)
            .map(|found| (target, found)))
    }

    pub fn node(&self, (m, id): Item) -> &NodeBuilder {
        &self.modules[m].arena[id.index()]
    }

    pub fn node_mut(&mut self, (m, id): Item) -> &mut NodeBuilder {
        &mut self.modules[m].arena[id.index()]
    }

    /// Error located at a builder.
    pub fn error_at(&self, item: Item, kind: ErrorKind) -> CompileError {
        let node = self.node(item);
        kind.at(&*node.common.module, node.common.line)
    }
}

pub(crate) fn unknown_prefix(reference: &NodeRef) -> ErrorKind {
    ErrorKind::UnknownPrefix(reference.prefix.clone().unwrap_or_default())
}

/// Follows local names from `start` (`None` is top level).
pub(crate) fn navigate(
    module: &ModuleBuilder,
    start: Option<NodeId>,
    segments: &[NodeRef],
) -> Option<NodeId> {
    let mut current = start;
    for segment in segments {
        current = Some(module.find_child(current, &segment.name)?);
    }
    current
}

// =============================================================================
// Paths
// =============================================================================

/// Moves `path` from below `old_base` to below `new_base`.
pub(crate) fn rebase_path(
    path: &SchemaPath,
    old_base: &SchemaPath,
    new_base: &SchemaPath,
) -> SchemaPath {
    if !path.starts_with(old_base) {
        return path.clone();
    }
    let mut segments = new_base.segments().to_vec();
    segments.extend_from_slice(&path.segments()[old_base.len()..]);
    SchemaPath::new(segments, new_base.is_absolute())
}

/// Rebases every path in the subtree at `root` and applies `mark` to each
/// builder. Type links declared by a moved leaf move with it.
pub(crate) fn rebase_subtree(
    arena: &mut [NodeBuilder],
    root: NodeId,
    old_base: &SchemaPath,
    new_base: &SchemaPath,
    mark: impl Fn(&mut NodeBuilder),
) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = &mut arena[id.index()];
        let path = rebase_path(&node.common.path, old_base, new_base);
        if let BuilderKind::Leaf {
            ty: TypeSpec::Resolved(link),
            ..
        }
        | BuilderKind::LeafList {
            ty: TypeSpec::Resolved(link),
            ..
        } = &mut node.kind
        {
            *link = link.relocated(&node.common.path, &path);
        }
        node.common.path = path;
        for record in &mut node.augmentations {
            record.target_path = rebase_path(&record.target_path, old_base, new_base);
        }
        mark(node);
        stack.extend(node.owned_ids());
    }
}

// =============================================================================
// Fixpoint
// =============================================================================

/// Outcome of one attempt at an item.
pub(crate) enum Attempt {
    /// Done; drop the item.
    Resolved,
    /// Depends on something not resolved yet; retry next pass.
    Deferred,
    /// Can never resolve.
    Failed(CompileError),
}

/// What a fixpoint loop left behind.
pub(crate) struct Fixpoint<T> {
    /// Items still deferred when the loop stopped.
    pub pending: Vec<T>,
    /// Items that failed.
    pub errors: Vec<CompileError>,
}

/// Retries `items` until a pass settles nothing or `max_passes` is reached.
pub(crate) fn fixpoint<T: Copy + fmt::Debug>(
    phase: &'static str,
    items: Vec<T>,
    max_passes: usize,
    mut attempt: impl FnMut(T) -> Attempt,
) -> Fixpoint<T> {
    let mut pending = items;
    let mut errors = Vec::new();
    let mut pass = 0;
    while !pending.is_empty() {
        if pass == max_passes {
            tracing::warn!(phase, max_passes, remaining = pending.len(), "pass limit reached");
            break;
        }
        pass += 1;
        let before = pending.len();
        let mut deferred = Vec::with_capacity(before);
        for item in pending {
            match attempt(item) {
                Attempt::Resolved => {}
                Attempt::Deferred => deferred.push(item),
                Attempt::Failed(error) => errors.push(error),
            }
        }
        pending = deferred;
        let settled = before - pending.len();
        tracing::debug!(phase, pass, resolved = settled, remaining = pending.len(), "resolution pass");
        if settled == 0 {
            break;
        }
    }
    Fixpoint { pending, errors }
}
