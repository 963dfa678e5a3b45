//! Phase 1: typedef chains and leaf types.
//!
//! Every dirty builder (leaf, leaf-list or typedef) is retried until the
//! typedefs it names have resolved themselves. Declaration order does not
//! matter; a chain `a -> b -> c` resolves in as many passes as it is long.

use yangforge_foundation::{CompileError, ErrorKind, SchemaPath};
use yangforge_model::{BuiltinType, Restrictions, TypeBase, TypeKind};

use super::{Attempt, Context, Item, fixpoint, unknown_prefix};
use crate::arena::{BuilderKind, NodeId};
use crate::build::typedef_definition;
use crate::module_builder::Slot;
use crate::type_spec::{TypeParts, TypeSpec};

/// Where resolving one spec got to.
pub(crate) enum Step {
    Ready(TypeParts),
    /// Waiting on the named typedef.
    Waiting(String),
    Missing(ErrorKind),
}

/// Resolves the dirty set of every module.
pub(crate) fn resolve_types(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.dirty_nodes().map(move |id| (m, id)))
        .collect();
    tracing::debug!(dirty = items.len(), "resolving types");

    let max_passes = ctx.config.max_passes;
    let result = fixpoint("types", items, max_passes, |item| resolve_node(ctx, item));

    let mut errors = result.errors;
    for item in result.pending {
        let node = ctx.node(item);
        let step = type_spec(&node.kind)
            .map(|spec| resolve_spec(ctx, item.0, node.common.parent, spec, &node.common.path));
        let name = match step {
            Some(Step::Waiting(name)) => name,
            _ => node.common.qname.local_name().to_string(),
        };
        errors.push(ctx.error_at(item, ErrorKind::UnresolvedType(name)));
    }
    errors
}

fn type_spec(kind: &BuilderKind) -> Option<&TypeSpec> {
    match kind {
        BuilderKind::Leaf { ty, .. }
        | BuilderKind::LeafList { ty, .. }
        | BuilderKind::Typedef { ty, .. } => Some(ty),
        _ => None,
    }
}

fn resolve_node(ctx: &mut Context<'_>, item: Item) -> Attempt {
    let (m, id) = item;
    let node = ctx.node(item);
    let Some(spec) = type_spec(&node.kind) else {
        ctx.modules[m].dirty_nodes.remove(&id);
        return Attempt::Resolved;
    };
    let path = node.common.path.clone();
    let parts = match resolve_spec(ctx, m, node.common.parent, spec, &path) {
        Step::Ready(parts) => parts,
        Step::Waiting(_) => return Attempt::Deferred,
        Step::Missing(kind) => return Attempt::Failed(ctx.error_at(item, kind)),
    };

    let node = ctx.node(item);
    if let BuilderKind::Typedef { .. } = node.kind {
        let definition = typedef_definition(node, parts);
        if let BuilderKind::Typedef { resolved, .. } = &mut ctx.node_mut(item).kind {
            *resolved = Some(definition);
        }
    } else {
        let link = parts.into_link(&path);
        if let BuilderKind::Leaf { ty, .. } | BuilderKind::LeafList { ty, .. } =
            &mut ctx.node_mut(item).kind
        {
            *ty = TypeSpec::Resolved(link);
        }
    }
    ctx.modules[m].dirty_nodes.remove(&id);
    tracing::trace!(module = ctx.modules[m].name(), path = %path, "type resolved");
    Attempt::Resolved
}

/// Resolves a spec written in module `m` at `scope`.
pub(crate) fn resolve_spec(
    ctx: &Context<'_>,
    m: usize,
    scope: Option<NodeId>,
    spec: &TypeSpec,
    path: &SchemaPath,
) -> Step {
    if let Some(parts) = TypeParts::direct(spec, path) {
        return Step::Ready(parts);
    }
    match spec {
        TypeSpec::Named { name, restrictions } => {
            let found = match ctx.find_definition(m, scope, name, Slot::Typedefs) {
                Ok(Some(found)) => found,
                Ok(None) => return Step::Missing(ErrorKind::UnresolvedType(name.to_string())),
                Err(kind) => return Step::Missing(kind),
            };
            match &ctx.node(found).kind {
                BuilderKind::Typedef {
                    resolved: Some(definition),
                    ..
                } => Step::Ready(TypeParts {
                    base: TypeBase::Derived(definition.clone()),
                    restrictions: restrictions.clone(),
                    kind: TypeKind::Plain,
                }),
                _ => Step::Waiting(name.to_string()),
            }
        }
        TypeSpec::Identityref(base) => {
            let Some(target) = ctx.module_for_prefix(m, base.prefix.as_deref()) else {
                return Step::Missing(unknown_prefix(base));
            };
            let module = &ctx.modules[target];
            match module.find_named(&module.root.identities, &base.name) {
                Some(identity) => Step::Ready(TypeParts::builtin(
                    BuiltinType::Identityref,
                    Restrictions::default(),
                    TypeKind::Identityref {
                        base: module.arena[identity.index()].common.qname.clone(),
                    },
                )),
                None => Step::Missing(ErrorKind::UnresolvedIdentity(base.to_string())),
            }
        }
        TypeSpec::Union(members) => {
            let mut links = Vec::with_capacity(members.len());
            for member in members {
                match resolve_spec(ctx, m, scope, member, path) {
                    Step::Ready(parts) => links.push(parts.into_link(path)),
                    other => return other,
                }
            }
            Step::Ready(TypeParts::builtin(
                BuiltinType::Union,
                Restrictions::default(),
                TypeKind::Union(links),
            ))
        }
        // `direct` handles every other variant.
        _ => Step::Missing(ErrorKind::Internal(format!("unexpected type spec at {path}"))),
    }
}
