//! Phase 5: deviations.
//!
//! Deviations run last, in declaration order, so they see every node uses
//! and augments have added, including nodes added by augments declared after
//! the deviation.

use yangforge_foundation::{CompileError, ErrorKind, NodeRef, Result};
use yangforge_model::DeviateKind;

use super::types::{Step, resolve_spec};
use super::{Context, Item, navigate, unknown_prefix};
use crate::arena::{BuilderKind, NodeId};
use crate::module_builder::ModuleBuilder;
use crate::type_spec::TypeSpec;

/// Applies every deviation of every module.
pub(crate) fn apply_deviations(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.root.deviations.iter().map(move |&id| (m, id)))
        .collect();
    tracing::debug!(deviations = items.len(), "applying deviations");
    items
        .into_iter()
        .filter_map(|item| apply(ctx, item).err())
        .collect()
}

fn apply(ctx: &mut Context<'_>, item: Item) -> Result<()> {
    let node = ctx.node(item);
    let BuilderKind::Deviation {
        target,
        deviate,
        properties,
    } = &node.kind
    else {
        return Ok(());
    };
    let (raw, deviate, mut properties) = (target.clone(), *deviate, properties.clone());
    let line = node.common.line;
    let module = node.common.module.to_string();

    let Some(tm) = ctx.module_for_prefix(item.0, raw.first_prefix()) else {
        let first = raw.segments.first().cloned().unwrap_or_else(|| NodeRef::local(""));
        return Err(ctx.error_at(item, unknown_prefix(&first)));
    };
    let tid = navigate(&ctx.modules[tm], None, &raw.segments)
        .ok_or_else(|| ctx.error_at(item, ErrorKind::UnresolvedDeviation(raw.to_string())))?;
    let target_path = ctx.modules[tm].arena[tid.index()].common.path.clone();

    if deviate == DeviateKind::NotSupported {
        detach(&mut ctx.modules[tm], tid);
    } else {
        if let Some(spec) = properties.ty.take() {
            let resolved = match resolve_spec(ctx, item.0, None, &spec, &target_path) {
                Step::Ready(parts) => TypeSpec::Resolved(parts.into_link(&target_path)),
                Step::Waiting(name) => {
                    return Err(ctx.error_at(item, ErrorKind::UnresolvedType(name)));
                }
                Step::Missing(kind) => return Err(ctx.error_at(item, kind)),
            };
            properties.ty = Some(resolved);
        }
        let node = &mut ctx.modules[tm].arena[tid.index()];
        properties.apply(deviate, node, &module, line)?;
    }

    ctx.node_mut(item).common.path = target_path;
    tracing::trace!(module = %module, target = %raw, deviate = %deviate, "deviation applied");
    Ok(())
}

/// Removes a node from its parent's children and augmentation records.
fn detach(module: &mut ModuleBuilder, id: NodeId) {
    match module.arena[id.index()].common.parent {
        Some(parent) => {
            let parent = &mut module.arena[parent.index()];
            parent.children.retain(|child| *child != id);
            for record in &mut parent.augmentations {
                record.children.retain(|child| *child != id);
            }
        }
        None => {
            let root = &mut module.root;
            for list in [&mut root.children, &mut root.rpcs, &mut root.notifications] {
                list.retain(|child| *child != id);
            }
        }
    }
}
