//! Phase 6: leafref targets.
//!
//! Runs on the final data tree, after uses, augments and deviations, so a
//! leafref may point at a node that only exists through one of them and a
//! target removed by `deviate not-supported` no longer counts. Leaves inside
//! groupings are checked where they are instantiated, not where declared.
//!
//! Paths are followed through the data tree: predicates are ignored and
//! choice and case nodes are transparent, as in XPath.

use yangforge_foundation::{CompileError, ErrorKind, NodeRef, RawPath};
use yangforge_model::TypeKind;

use super::{Context, Item};
use crate::arena::{BuilderKind, NodeId};
use crate::module_builder::ModuleBuilder;
use crate::type_spec::TypeSpec;

/// Checks the target of every leafref in the data tree of every module.
pub(crate) fn check_leafrefs(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let items: Vec<(Item, String)> = ctx
        .modules
        .iter()
        .enumerate()
        .flat_map(|(m, module)| {
            data_leaves(module).into_iter().filter_map(move |id| {
                leafref_path(&module.arena[id.index()].kind).map(|path| ((m, id), path))
            })
        })
        .collect();
    tracing::debug!(leafrefs = items.len(), "checking leafrefs");

    items
        .into_iter()
        .filter_map(|(item, path)| {
            if resolves(ctx, item, &path) {
                tracing::trace!(path = %path, "leafref resolved");
                None
            } else {
                Some(ctx.error_at(item, ErrorKind::UnresolvedLeafref(path)))
            }
        })
        .collect()
}

/// Leaves and leaf-lists reachable from the module's data tree, rpcs and
/// notifications.
fn data_leaves(module: &ModuleBuilder) -> Vec<NodeId> {
    let root = &module.root;
    let mut stack: Vec<NodeId> = root
        .children
        .iter()
        .chain(&root.rpcs)
        .chain(&root.notifications)
        .copied()
        .collect();
    let mut leaves = Vec::new();
    while let Some(id) = stack.pop() {
        let node = &module.arena[id.index()];
        match node.kind {
            BuilderKind::Leaf { .. } | BuilderKind::LeafList { .. } => leaves.push(id),
            _ => stack.extend(node.children.iter().copied()),
        }
    }
    leaves.sort_unstable();
    leaves
}

/// The leafref path of a leaf type, also when it comes through a typedef.
fn leafref_path(kind: &BuilderKind) -> Option<String> {
    let ty = match kind {
        BuilderKind::Leaf { ty, .. } | BuilderKind::LeafList { ty, .. } => ty,
        _ => return None,
    };
    match ty {
        TypeSpec::Leafref(path) => Some(path.clone()),
        TypeSpec::Resolved(link) => link.chain().find_map(|t| match &t.kind {
            TypeKind::Leafref { path } => Some(path.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// A leafref path split into its steps.
#[derive(Debug, PartialEq, Eq)]
struct LeafrefPath {
    /// Number of leading `..` steps; `None` for an absolute path.
    up: Option<usize>,
    /// Node names after the `..` steps.
    down: RawPath,
}

impl LeafrefPath {
    fn parse(text: &str) -> Option<Self> {
        let text = strip_predicates(text);
        let text = text.trim();
        if text.starts_with('/') {
            return RawPath::parse(text).ok().map(|down| Self { up: None, down });
        }
        let mut up = 0;
        let mut rest = text;
        while let Some(tail) = rest.strip_prefix("..") {
            up += 1;
            rest = tail.strip_prefix('/').unwrap_or(tail);
        }
        let down = if rest.is_empty() {
            RawPath {
                absolute: false,
                segments: Vec::new(),
            }
        } else {
            RawPath::parse(rest).ok()?
        };
        Some(Self { up: Some(up), down })
    }
}

fn strip_predicates(text: &str) -> String {
    let mut depth = 0usize;
    text.chars()
        .filter(|c| match c {
            '[' => {
                depth += 1;
                false
            }
            ']' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn resolves(ctx: &Context<'_>, (m, id): Item, text: &str) -> bool {
    let Some(path) = LeafrefPath::parse(text) else {
        return false;
    };
    let (tm, start) = match path.up {
        None => {
            let declaring = declaring_module(ctx, m, id);
            match ctx.module_for_prefix(declaring, path.down.first_prefix()) {
                Some(tm) => (tm, None),
                None => return false,
            }
        }
        Some(up) => {
            let module = &ctx.modules[m];
            let mut current = Some(id);
            for _ in 0..up {
                match current {
                    Some(node) => current = data_parent(module, node),
                    None => return false,
                }
            }
            (m, current)
        }
    };
    let module = &ctx.modules[tm];
    let mut current = start;
    for segment in &path.down.segments {
        match find_data_child(module, current, segment) {
            Some(child) => current = Some(child),
            None => return false,
        }
    }
    current.is_some_and(|target| {
        matches!(
            module.arena[target.index()].kind,
            BuilderKind::Leaf { .. } | BuilderKind::LeafList { .. }
        )
    })
}

/// The module whose prefixes a leaf's path is written with: the one that
/// declared the leaf, which differs from `m` for augmented nodes.
fn declaring_module(ctx: &Context<'_>, m: usize, id: NodeId) -> usize {
    let declared_in = &ctx.modules[m].arena[id.index()].common.module;
    if **declared_in == *ctx.modules[m].name() {
        m
    } else {
        ctx.find_module(declared_in, None).unwrap_or(m)
    }
}

/// The nearest ancestor that is a data node; choices and cases are skipped.
fn data_parent(module: &ModuleBuilder, id: NodeId) -> Option<NodeId> {
    let mut current = module.arena[id.index()].common.parent;
    while let Some(parent) = current {
        let node = &module.arena[parent.index()];
        if !matches!(node.kind, BuilderKind::Choice { .. } | BuilderKind::Case) {
            return Some(parent);
        }
        current = node.common.parent;
    }
    None
}

/// A data child named `segment`, looking through choices and cases.
fn find_data_child(
    module: &ModuleBuilder,
    parent: Option<NodeId>,
    segment: &NodeRef,
) -> Option<NodeId> {
    let children = match parent {
        Some(p) => module.arena[p.index()].children.clone(),
        None => module
            .root
            .children
            .iter()
            .chain(&module.root.rpcs)
            .chain(&module.root.notifications)
            .copied()
            .collect(),
    };
    children.into_iter().find_map(|child| {
        let node = &module.arena[child.index()];
        match node.kind {
            BuilderKind::Choice { .. } | BuilderKind::Case => {
                find_data_child(module, Some(child), segment)
            }
            _ if node.common.qname.local_name() == segment.name => Some(child),
            _ => None,
        }
    })
}
