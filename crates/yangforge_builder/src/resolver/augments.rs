//! Phase 4: augmentations.
//!
//! Top-level augments are retried until their target exists, so an augment
//! may target nodes that another augment (of any module) adds. Grafted
//! children are copies owned by the target's module; the augment keeps its
//! own children for the built augmentation.

use yangforge_foundation::{CompileError, ErrorKind, NodeRef, Result};

use super::{Attempt, Context, Item, fixpoint, navigate, rebase_subtree, unknown_prefix};
use crate::arena::{AugmentRecord, BuilderKind, Subtree};

/// Grafts every top-level augment of every module.
pub(crate) fn resolve_augments(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.all_augments.iter().map(move |&id| (m, id)))
        .collect();
    tracing::debug!(augments = items.len(), "resolving augments");

    let max_passes = ctx.config.max_passes;
    let result = fixpoint("augments", items, max_passes, |item| attempt(ctx, item));

    let mut errors = result.errors;
    for item in result.pending {
        let target = match &ctx.node(item).kind {
            BuilderKind::Augment { target, .. } => target.to_string(),
            _ => String::new(),
        };
        errors.push(ctx.error_at(item, ErrorKind::UnresolvedAugment(target)));
    }
    errors
}

fn attempt(ctx: &mut Context<'_>, item: Item) -> Attempt {
    let BuilderKind::Augment {
        target,
        resolved: false,
        ..
    } = &ctx.node(item).kind
    else {
        return Attempt::Resolved;
    };
    let Some(tm) = ctx.module_for_prefix(item.0, target.first_prefix()) else {
        let first = target.segments.first().cloned().unwrap_or_else(|| NodeRef::local(""));
        return Attempt::Failed(ctx.error_at(item, unknown_prefix(&first)));
    };
    let Some(tid) = navigate(&ctx.modules[tm], None, &target.segments) else {
        return Attempt::Deferred;
    };
    match graft(ctx, item, (tm, tid)) {
        Ok(()) => {
            ctx.modules[item.0].augments_resolved += 1;
            Attempt::Resolved
        }
        Err(error) => Attempt::Failed(error),
    }
}

/// Copies the children of `augment` onto `target`.
///
/// Children grafted onto a choice that are not cases are wrapped in a case
/// of the same name.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidAugmentTarget`] if the target cannot hold
/// data and [`ErrorKind::DuplicateName`] if a child clashes with an existing
/// one.
pub(crate) fn graft(ctx: &mut Context<'_>, augment: Item, target: Item) -> Result<()> {
    let (am, aid) = augment;
    let (tm, tid) = target;
    let destination = ctx.node(target);
    let target_path = destination.common.path.clone();
    let into_choice = matches!(destination.kind, BuilderKind::Choice { .. });
    let accepts = matches!(
        destination.kind,
        BuilderKind::Container { .. }
            | BuilderKind::List { .. }
            | BuilderKind::Case
            | BuilderKind::Notification
    );
    if !into_choice && !accepts {
        let kind = ErrorKind::InvalidAugmentTarget(target_path.to_string());
        return Err(ctx.error_at(augment, kind));
    }

    let source = ctx.node(augment);
    let old_base = source.common.path.clone();
    let children = source.children.clone();
    let when = match &source.kind {
        BuilderKind::Augment { when, .. } => when.clone(),
        _ => None,
    };
    let mut record = AugmentRecord {
        target_path: target_path.clone(),
        when,
        description: source.common.description.clone(),
        reference: source.common.reference.clone(),
        status: source.common.status,
        children: Vec::with_capacity(children.len()),
    };

    for child in children {
        let original = &ctx.modules[am].arena[child.index()];
        let name = original.common.qname.local_name();
        let destination = &ctx.modules[tm];
        if let Some(existing) = destination.find_named(&ctx.node(target).children, name) {
            return Err(CompileError::duplicate(
                &*original.common.module,
                original.common.line,
                original.kind.keyword(),
                name,
                destination.arena[existing.index()].common.line,
            ));
        }
        let wrap = into_choice && !matches!(original.kind, BuilderKind::Case);
        let (line, qname) = (original.common.line, original.common.qname.clone());
        let subtree = Subtree::extract(&ctx.modules[am].arena, child);

        let dst = &mut ctx.modules[tm];
        let holder = if wrap {
            let case = dst.alloc(line, qname, Some(tid), BuilderKind::Case);
            dst.arena[case.index()].common.augmenting = true;
            case
        } else {
            tid
        };
        let new_base = dst.arena[holder.index()].common.path.clone();
        let copy = subtree.insert(&mut dst.arena, Some(holder));
        rebase_subtree(&mut dst.arena, copy, &old_base, &new_base, |node| {
            node.common.augmenting = true;
        });
        let grafted = if wrap {
            dst.arena[holder.index()].children.push(copy);
            holder
        } else {
            copy
        };
        dst.arena[tid.index()].children.push(grafted);
        record.children.push(grafted);
    }
    ctx.node_mut(target).augmentations.push(record);

    let src = &mut ctx.modules[am];
    rebase_subtree(&mut src.arena, aid, &old_base, &target_path, |_| {});
    if let BuilderKind::Augment { resolved, .. } = &mut src.arena[aid.index()].kind {
        *resolved = true;
    }
    tracing::trace!(module = src.name(), target = %target_path, "augment grafted");
    Ok(())
}
