//! Phase 0: imports and extension usages.

use yangforge_foundation::{CompileError, ErrorKind, Result, SchemaPath};

use super::{Context, Item, unknown_prefix};
use crate::arena::BuilderKind;

/// Checks that every import names a module of the compilation.
pub(crate) fn check_imports(ctx: &Context<'_>) -> Vec<CompileError> {
    let mut errors = Vec::new();
    for module in ctx.modules.iter() {
        for (import, line) in &module.imports {
            if ctx
                .find_module(&import.module_name, import.revision.as_deref())
                .is_none()
            {
                let name = match &import.revision {
                    Some(revision) => format!("{}@{revision}", import.module_name),
                    None => import.module_name.clone(),
                };
                errors.push(ErrorKind::MissingModule(name).at(module.name(), *line));
            }
        }
    }
    errors
}

/// Qualifies the node type of every extension usage.
pub(crate) fn resolve_unknown_nodes(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<Item> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| module.all_unknown.iter().map(move |&id| (m, id)))
        .collect();
    items
        .into_iter()
        .filter_map(|item| resolve_one(ctx, item).err())
        .collect()
}

/// Qualifies one extension usage with the namespace its prefix stands for.
///
/// # Errors
///
/// Returns [`ErrorKind::UnknownPrefix`] in strict mode when the prefix names
/// no module.
pub(crate) fn resolve_one(ctx: &mut Context<'_>, item: Item) -> Result<()> {
    let BuilderKind::Unknown {
        node_type,
        resolved: false,
        ..
    } = &ctx.node(item).kind
    else {
        return Ok(());
    };
    let Some(target) = ctx.module_for_prefix(item.0, node_type.prefix.as_deref()) else {
        if ctx.config.strict_unknown_nodes {
            return Err(ctx.error_at(item, unknown_prefix(node_type)));
        }
        tracing::debug!(node_type = %node_type, "extension prefix not resolved");
        return Ok(());
    };
    let qname = ctx.modules[target].qname(&node_type.name);
    let node = ctx.node_mut(item);
    node.common.path = node
        .common
        .path
        .parent()
        .unwrap_or_else(SchemaPath::root)
        .child(qname.clone());
    node.common.qname = qname;
    if let BuilderKind::Unknown { resolved, .. } = &mut node.kind {
        *resolved = true;
    }
    Ok(())
}
