//! Phase 3: grouping instantiation.
//!
//! A uses expands into fresh copies of everything its grouping declares.
//! Copies are independent builders: refines and uses-scoped augments change
//! the copy only, never the grouping or another instantiation of it.
//!
//! A grouping is copied only once it contains no unexpanded uses itself, so
//! nested groupings expand inside out and a grouping that (transitively)
//! uses itself never becomes ready.

use yangforge_foundation::{CompileError, ErrorKind, Result, SchemaPath};

use super::augments::graft;
use super::unknown::resolve_one;
use super::{Attempt, Context, Item, fixpoint, navigate, rebase_subtree};
use crate::arena::{BuilderKind, NodeBuilder, NodeId, Subtree};
use crate::module_builder::Slot;

/// Expands every uses of every module.
pub(crate) fn expand_uses(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.all_uses.iter().map(move |&id| (m, id)))
        .collect();
    tracing::debug!(uses = items.len(), "expanding uses");

    let max_passes = ctx.config.max_passes;
    let result = fixpoint("uses", items, max_passes, |item| attempt(ctx, item));

    let mut errors = result.errors;
    for item in result.pending {
        let grouping = match &ctx.node(item).kind {
            BuilderKind::Uses { grouping, .. } => grouping.to_string(),
            _ => String::new(),
        };
        errors.push(ctx.error_at(item, ErrorKind::CyclicGrouping(grouping)));
    }
    errors
}

fn attempt(ctx: &mut Context<'_>, item: Item) -> Attempt {
    let (m, _) = item;
    let node = ctx.node(item);
    let BuilderKind::Uses {
        grouping,
        expanded: false,
        ..
    } = &node.kind
    else {
        return Attempt::Resolved;
    };
    let grouping = match ctx.find_definition(m, node.common.parent, grouping, Slot::Groupings) {
        Ok(Some(found)) => found,
        Ok(None) => {
            let kind = ErrorKind::UnresolvedGrouping(grouping.to_string());
            return Attempt::Failed(ctx.error_at(item, kind));
        }
        Err(kind) => return Attempt::Failed(ctx.error_at(item, kind)),
    };

    let (gm, gid) = grouping;
    if has_pending_uses(&ctx.modules[gm].arena, &ctx.node(grouping).owned_ids())
        || has_pending_uses(&ctx.modules[m].arena, &ctx.node(item).owned_ids())
    {
        return Attempt::Deferred;
    }
    match instantiate(ctx, item, (gm, gid)) {
        Ok(()) => Attempt::Resolved,
        Err(error) => Attempt::Failed(error),
    }
}

/// Returns true if any builder reachable from `roots` is an unexpanded uses.
fn has_pending_uses(arena: &[NodeBuilder], roots: &[NodeId]) -> bool {
    let mut stack = roots.to_vec();
    while let Some(id) = stack.pop() {
        let node = &arena[id.index()];
        if matches!(node.kind, BuilderKind::Uses { expanded: false, .. }) {
            return true;
        }
        stack.extend(node.owned_ids());
    }
    false
}

fn instantiate(ctx: &mut Context<'_>, item: Item, grouping: Item) -> Result<()> {
    let (m, uid) = item;
    let (gm, gid) = grouping;
    let uses = ctx.node(item);
    let parent = uses.common.parent;
    let line = uses.common.line;
    let (refines, augments) = match &uses.kind {
        BuilderKind::Uses {
            refines, augments, ..
        } => (refines.clone(), augments.clone()),
        _ => (Vec::new(), Vec::new()),
    };
    let source = ctx.node(grouping);
    let old_base = source.common.path.clone();
    let new_base = ctx.modules[m].scope_path(parent);
    let copies = [
        (Slot::Children, source.children.clone()),
        (Slot::Typedefs, source.typedefs.clone()),
        (Slot::Groupings, source.groupings.clone()),
        (Slot::Uses, source.uses.clone()),
    ];

    for (slot, ids) in copies {
        // Typedefs and groupings keep the grouping's scope: they stay with
        // the uses record instead of joining the using node's namespace.
        let holder = match slot {
            Slot::Typedefs | Slot::Groupings => Some(uid),
            Slot::Children | Slot::Uses => parent,
        };
        for id in ids {
            let original = &ctx.modules[gm].arena[id.index()];
            if slot == Slot::Children {
                let module = &ctx.modules[m];
                let name = original.common.qname.local_name();
                if let Some(existing) = module.find_named(module.scope_list(parent, slot), name) {
                    return Err(CompileError::duplicate(
                        module.name(),
                        line,
                        original.kind.keyword(),
                        name,
                        module.arena[existing.index()].common.line,
                    ));
                }
            }
            let subtree = Subtree::extract(&ctx.modules[gm].arena, id);
            let target = &mut ctx.modules[m];
            let copy = subtree.insert(&mut target.arena, holder);
            rebase_subtree(&mut target.arena, copy, &old_base, &new_base, |node| {
                node.common.added_by_uses = true;
            });
            target.scope_list_mut(holder, slot).push(copy);
        }
    }

    let module_name = ctx.modules[m].name().to_string();
    for refine in &refines {
        let raw = refine.parsed_target(&module_name)?;
        let target = navigate(&ctx.modules[m], parent, &raw.segments).ok_or_else(|| {
            ErrorKind::RefineTargetNotFound(refine.target().to_string())
                .at(module_name.as_str(), refine.line())
        })?;
        refine.apply(&mut ctx.modules[m].arena[target.index()], &module_name)?;
        for (node_type, argument) in &refine.extensions {
            let usage = ctx.modules[m].attach_unknown(
                target,
                refine.line(),
                node_type.clone(),
                argument.clone(),
            );
            resolve_one(ctx, (m, usage))?;
        }
    }

    for augment in augments {
        let target_path = match &ctx.modules[m].arena[augment.index()].kind {
            BuilderKind::Augment { target, .. } => target.clone(),
            _ => continue,
        };
        let target = navigate(&ctx.modules[m], parent, &target_path.segments).ok_or_else(|| {
            ctx.error_at(
                (m, augment),
                ErrorKind::UnresolvedAugment(target_path.to_string()),
            )
        })?;
        graft(ctx, (m, augment), (m, target))?;
    }

    if let BuilderKind::Uses {
        expanded,
        grouping_path,
        ..
    } = &mut ctx.node_mut((m, uid)).kind
    {
        *expanded = true;
        *grouping_path = Some(old_base.clone());
    }
    tracing::trace!(module = %module_name, grouping = %old_base, into = %display(&new_base), "uses expanded");
    Ok(())
}

fn display(path: &SchemaPath) -> String {
    if path.is_empty() {
        "module top level".to_string()
    } else {
        path.to_string()
    }
}
