//! Phase 2: identity bases.

use std::collections::HashSet;
use std::sync::Arc;

use yangforge_foundation::{CompileError, ErrorKind};
use yangforge_model::IdentitySchemaNode;

use super::{Attempt, Context, Item, fixpoint, unknown_prefix};
use crate::arena::BuilderKind;
use crate::build::plain_meta;

/// Freezes every identity once its base has been frozen.
pub(crate) fn resolve_identities(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.root.identities.iter().map(move |&id| (m, id)))
        .collect();
    tracing::debug!(identities = items.len(), "resolving identities");

    let max_passes = ctx.config.max_passes;
    let result = fixpoint("identities", items, max_passes, |item| resolve_identity(ctx, item));

    let mut errors = result.errors;
    for &item in &result.pending {
        let name = ctx.node(item).common.qname.local_name().to_string();
        let kind = if ctx.config.check_identity_cycles && in_cycle(ctx, item) {
            ErrorKind::CyclicIdentity(name)
        } else {
            ErrorKind::UnresolvedIdentity(name)
        };
        errors.push(ctx.error_at(item, kind));
    }
    errors
}

/// The identity a builder names as its base.
fn base_of(ctx: &Context<'_>, (m, id): Item) -> Result<Option<Item>, ErrorKind> {
    let BuilderKind::Identity {
        base: Some(base), ..
    } = &ctx.modules[m].arena[id.index()].kind
    else {
        return Ok(None);
    };
    let target = ctx
        .module_for_prefix(m, base.prefix.as_deref())
        .ok_or_else(|| unknown_prefix(base))?;
    let module = &ctx.modules[target];
    module
        .find_named(&module.root.identities, &base.name)
        .map(|found| Some((target, found)))
        .ok_or_else(|| ErrorKind::UnresolvedIdentity(base.to_string()))
}

fn resolve_identity(ctx: &mut Context<'_>, item: Item) -> Attempt {
    let base = match base_of(ctx, item) {
        Ok(None) => None,
        Ok(Some(base)) => match &ctx.node(base).kind {
            BuilderKind::Identity {
                resolved: Some(frozen),
                ..
            } => Some(frozen.clone()),
            _ => return Attempt::Deferred,
        },
        Err(kind) => return Attempt::Failed(ctx.error_at(item, kind)),
    };

    let identity = Arc::new(IdentitySchemaNode {
        meta: plain_meta(ctx.node(item)),
        base,
    });
    tracing::trace!(identity = %identity.meta.qname, "identity resolved");
    if let BuilderKind::Identity { resolved, .. } = &mut ctx.node_mut(item).kind {
        *resolved = Some(identity);
    }
    Attempt::Resolved
}

/// Returns true if following bases from `start` comes back to it.
fn in_cycle(ctx: &Context<'_>, start: Item) -> bool {
    let mut seen = HashSet::new();
    let mut current = start;
    while let Ok(Some(next)) = base_of(ctx, current) {
        if next == start {
            return true;
        }
        if !seen.insert(next) {
            return false;
        }
        current = next;
    }
    false
}
