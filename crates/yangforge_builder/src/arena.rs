//! Builder storage.
//!
//! Every builder of a module lives in one arena owned by its
//! [`ModuleBuilder`](crate::ModuleBuilder) and is addressed by a [`NodeId`].
//! Parents are ids, never references, so a builder can be reparented, copied
//! into another module, or removed without fighting the borrow checker.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{NodeRef, QName, RawPath, SchemaPath, Status};
use yangforge_model::{
    AugmentationSchema, Constraints, DataSchemaNode, DeviateKind, Deviation, ExtensionDefinition,
    FeatureDefinition, GroupingDefinition, IdentitySchemaNode, NotificationDefinition,
    RpcDefinition, TypeDefinition, UnknownSchemaNode, UsesNode,
};

use crate::deviate::DeviateProperties;
use crate::refine::Refine;
use crate::type_spec::TypeSpec;

// =============================================================================
// NodeId
// =============================================================================

/// Index of a builder in its module's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // Arenas never approach u32::MAX builders.
        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }

    /// The arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn offset(self, base: usize) -> Self {
        Self::from_index(self.index() + base)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Builder payloads
// =============================================================================

/// Which statement a container builder stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerRole {
    /// A `container`.
    Data,
    /// The `input` of an rpc.
    Input,
    /// The `output` of an rpc.
    Output,
}

/// Metadata every builder carries.
#[derive(Clone, Debug)]
pub struct BuilderCommon {
    /// Name of the module that declared the statement.
    pub module: Arc<str>,
    /// Source line of the statement.
    pub line: u32,
    /// Qualified name.
    pub qname: QName,
    /// Path from the schema root.
    pub path: SchemaPath,
    /// `description`.
    pub description: Option<String>,
    /// `reference`.
    pub reference: Option<String>,
    /// `status`.
    pub status: Status,
    /// Parent builder; `None` for top-level statements.
    pub parent: Option<NodeId>,
    /// Explicit `config`.
    pub config: Option<bool>,
    /// Cardinality, `when` and `must`.
    pub constraints: Constraints,
    /// Grafted by an augmentation.
    pub augmenting: bool,
    /// Copied in by a `uses`.
    pub added_by_uses: bool,
}

/// Kind-specific builder state.
#[derive(Clone, Debug)]
pub enum BuilderKind {
    /// `container`, `input` or `output`.
    Container {
        /// Which statement this is.
        role: ContainerRole,
        /// `presence`.
        presence: Option<String>,
    },
    /// `list`.
    List {
        /// Key leaf names.
        keys: Vec<String>,
        /// `ordered-by user`.
        user_ordered: bool,
    },
    /// `leaf`.
    Leaf {
        /// The type statement.
        ty: TypeSpec,
        /// `default`.
        default: Option<String>,
        /// `units`.
        units: Option<String>,
    },
    /// `leaf-list`.
    LeafList {
        /// The type statement.
        ty: TypeSpec,
        /// `ordered-by user`.
        user_ordered: bool,
        /// `units`.
        units: Option<String>,
    },
    /// `choice`. Its children are its cases.
    Choice {
        /// `default` case name.
        default_case: Option<String>,
    },
    /// `case`.
    Case,
    /// `anyxml`.
    Anyxml,
    /// `grouping`.
    Grouping,
    /// `uses`.
    Uses {
        /// The referenced grouping.
        grouping: NodeRef,
        /// Path of the grouping once resolved.
        grouping_path: Option<SchemaPath>,
        /// `refine` statements.
        refines: Vec<Refine>,
        /// Augments scoped to this instantiation.
        augments: Vec<NodeId>,
        /// The grouping has been copied in.
        expanded: bool,
    },
    /// `augment`.
    Augment {
        /// Target as written.
        target: RawPath,
        /// `when`.
        when: Option<String>,
        /// The children have been grafted.
        resolved: bool,
    },
    /// `rpc`. Its children are its input and output.
    Rpc,
    /// `notification`.
    Notification,
    /// `typedef`.
    Typedef {
        /// The type statement.
        ty: TypeSpec,
        /// `units`.
        units: Option<String>,
        /// `default`.
        default: Option<String>,
        /// The frozen chain, once resolved.
        resolved: Option<Arc<TypeDefinition>>,
    },
    /// `identity`.
    Identity {
        /// `base`, as written.
        base: Option<NodeRef>,
        /// The frozen identity, once its base has resolved.
        resolved: Option<Arc<IdentitySchemaNode>>,
    },
    /// `extension`.
    Extension {
        /// `argument` name.
        argument: Option<String>,
        /// `yin-element`.
        yin_element: bool,
    },
    /// `feature`.
    Feature,
    /// `deviation`.
    Deviation {
        /// Target as written.
        target: RawPath,
        /// The `deviate` kind.
        deviate: DeviateKind,
        /// Properties added, replaced or deleted.
        properties: DeviateProperties,
    },
    /// An extension usage.
    Unknown {
        /// The extension, as written.
        node_type: NodeRef,
        /// The statement argument.
        argument: Option<String>,
        /// The prefix has been resolved into `common.qname`.
        resolved: bool,
    },
}

impl BuilderKind {
    /// The statement keyword.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Container {
                role: ContainerRole::Data,
                ..
            } => "container",
            Self::Container {
                role: ContainerRole::Input,
                ..
            } => "input",
            Self::Container {
                role: ContainerRole::Output,
                ..
            } => "output",
            Self::List { .. } => "list",
            Self::Leaf { .. } => "leaf",
            Self::LeafList { .. } => "leaf-list",
            Self::Choice { .. } => "choice",
            Self::Case => "case",
            Self::Anyxml => "anyxml",
            Self::Grouping => "grouping",
            Self::Uses { .. } => "uses",
            Self::Augment { .. } => "augment",
            Self::Rpc => "rpc",
            Self::Notification => "notification",
            Self::Typedef { .. } => "typedef",
            Self::Identity { .. } => "identity",
            Self::Extension { .. } => "extension",
            Self::Feature => "feature",
            Self::Deviation { .. } => "deviation",
            Self::Unknown { .. } => "unknown statement",
        }
    }

    /// Returns true for kinds that hold data children.
    #[must_use]
    pub fn holds_data(&self) -> bool {
        matches!(
            self,
            Self::Container { .. }
                | Self::List { .. }
                | Self::Case
                | Self::Grouping
                | Self::Augment { .. }
                | Self::Notification
        )
    }

    /// Returns true for kinds that may declare typedefs and groupings.
    #[must_use]
    pub fn holds_definitions(&self) -> bool {
        matches!(
            self,
            Self::Container { .. }
                | Self::List { .. }
                | Self::Grouping
                | Self::Rpc
                | Self::Notification
        )
    }

    /// Returns true for data node kinds.
    #[must_use]
    pub fn is_data_node(&self) -> bool {
        matches!(
            self,
            Self::Container { .. }
                | Self::List { .. }
                | Self::Leaf { .. }
                | Self::LeafList { .. }
                | Self::Choice { .. }
                | Self::Case
                | Self::Anyxml
        )
    }
}

/// Children grafted onto a node by one augmentation.
#[derive(Clone, Debug)]
pub struct AugmentRecord {
    /// Resolved target path.
    pub target_path: SchemaPath,
    /// `when` of the augmentation.
    pub when: Option<String>,
    /// `description` of the augmentation.
    pub description: Option<String>,
    /// `reference` of the augmentation.
    pub reference: Option<String>,
    /// `status` of the augmentation.
    pub status: Status,
    /// Grafted children; also listed in the target's `children`.
    pub children: Vec<NodeId>,
}

// =============================================================================
// BuiltNode
// =============================================================================

/// The frozen form of any builder.
#[derive(Clone, Debug)]
pub enum BuiltNode {
    /// A data node, `input` or `output`.
    Data(DataSchemaNode),
    /// A grouping.
    Grouping(Arc<GroupingDefinition>),
    /// A uses record.
    Uses(Arc<UsesNode>),
    /// An augmentation.
    Augment(Arc<AugmentationSchema>),
    /// An rpc.
    Rpc(Arc<RpcDefinition>),
    /// A notification.
    Notification(Arc<NotificationDefinition>),
    /// A typedef.
    Typedef(Arc<TypeDefinition>),
    /// An identity.
    Identity(Arc<IdentitySchemaNode>),
    /// An extension.
    Extension(Arc<ExtensionDefinition>),
    /// A feature.
    Feature(Arc<FeatureDefinition>),
    /// A deviation.
    Deviation(Arc<Deviation>),
    /// An extension usage.
    Unknown(Arc<UnknownSchemaNode>),
}

impl BuiltNode {
    /// Returns true if both values are the same frozen instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        use DataSchemaNode as D;
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => match (a, b) {
                (D::Container(a), D::Container(b)) => Arc::ptr_eq(a, b),
                (D::List(a), D::List(b)) => Arc::ptr_eq(a, b),
                (D::Leaf(a), D::Leaf(b)) => Arc::ptr_eq(a, b),
                (D::LeafList(a), D::LeafList(b)) => Arc::ptr_eq(a, b),
                (D::Choice(a), D::Choice(b)) => Arc::ptr_eq(a, b),
                (D::Case(a), D::Case(b)) => Arc::ptr_eq(a, b),
                (D::Anyxml(a), D::Anyxml(b)) => Arc::ptr_eq(a, b),
                _ => false,
            },
            (Self::Grouping(a), Self::Grouping(b)) => Arc::ptr_eq(a, b),
            (Self::Uses(a), Self::Uses(b)) => Arc::ptr_eq(a, b),
            (Self::Augment(a), Self::Augment(b)) => Arc::ptr_eq(a, b),
            (Self::Rpc(a), Self::Rpc(b)) => Arc::ptr_eq(a, b),
            (Self::Notification(a), Self::Notification(b)) => Arc::ptr_eq(a, b),
            (Self::Typedef(a), Self::Typedef(b)) => Arc::ptr_eq(a, b),
            (Self::Identity(a), Self::Identity(b)) => Arc::ptr_eq(a, b),
            (Self::Extension(a), Self::Extension(b)) => Arc::ptr_eq(a, b),
            (Self::Feature(a), Self::Feature(b)) => Arc::ptr_eq(a, b),
            (Self::Deviation(a), Self::Deviation(b)) => Arc::ptr_eq(a, b),
            (Self::Unknown(a), Self::Unknown(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The data node, if this is one.
    #[must_use]
    pub fn as_data(&self) -> Option<&DataSchemaNode> {
        match self {
            Self::Data(node) => Some(node),
            _ => None,
        }
    }
}

// =============================================================================
// NodeBuilder
// =============================================================================

/// One builder in the arena.
#[derive(Clone, Debug)]
pub struct NodeBuilder {
    pub(crate) common: BuilderCommon,
    pub(crate) kind: BuilderKind,
    /// Data children; cases for a choice; input and output for an rpc.
    pub(crate) children: Vec<NodeId>,
    pub(crate) typedefs: Vec<NodeId>,
    pub(crate) groupings: Vec<NodeId>,
    pub(crate) uses: Vec<NodeId>,
    pub(crate) unknown_nodes: Vec<NodeId>,
    /// Augmentations grafted onto this node.
    pub(crate) augmentations: Vec<AugmentRecord>,
    pub(crate) snapshot: Option<BuiltNode>,
}

impl NodeBuilder {
    pub(crate) fn new(common: BuilderCommon, kind: BuilderKind) -> Self {
        Self {
            common,
            kind,
            children: Vec::new(),
            typedefs: Vec::new(),
            groupings: Vec::new(),
            uses: Vec::new(),
            unknown_nodes: Vec::new(),
            augmentations: Vec::new(),
            snapshot: None,
        }
    }

    /// Common metadata.
    #[must_use]
    pub fn common(&self) -> &BuilderCommon {
        &self.common
    }

    /// Kind-specific state.
    #[must_use]
    pub fn kind(&self) -> &BuilderKind {
        &self.kind
    }

    /// Qualified name.
    #[must_use]
    pub fn qname(&self) -> &QName {
        &self.common.qname
    }

    /// Schema path.
    #[must_use]
    pub fn path(&self) -> &SchemaPath {
        &self.common.path
    }

    /// Source line.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.common.line
    }

    /// Parent builder.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.common.parent
    }

    /// Data children, cases of a choice, or input/output of an rpc.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Typedefs declared here.
    #[must_use]
    pub fn typedefs(&self) -> &[NodeId] {
        &self.typedefs
    }

    /// Groupings declared here.
    #[must_use]
    pub fn groupings(&self) -> &[NodeId] {
        &self.groupings
    }

    /// Uses declared here.
    #[must_use]
    pub fn uses(&self) -> &[NodeId] {
        &self.uses
    }

    /// Returns true once the builder has a frozen snapshot.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Every id this builder owns.
    pub(crate) fn owned_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(
            self.children.len() + self.typedefs.len() + self.groupings.len() + self.uses.len(),
        );
        ids.extend_from_slice(&self.children);
        ids.extend_from_slice(&self.typedefs);
        ids.extend_from_slice(&self.groupings);
        ids.extend_from_slice(&self.uses);
        ids.extend_from_slice(&self.unknown_nodes);
        if let BuilderKind::Uses { augments, .. } = &self.kind {
            ids.extend_from_slice(augments);
        }
        ids
    }

    fn remap(&mut self, map: impl Fn(NodeId) -> NodeId) {
        for list in [
            &mut self.children,
            &mut self.typedefs,
            &mut self.groupings,
            &mut self.uses,
            &mut self.unknown_nodes,
        ] {
            for id in list.iter_mut() {
                *id = map(*id);
            }
        }
        for record in &mut self.augmentations {
            for id in &mut record.children {
                *id = map(*id);
            }
        }
        if let BuilderKind::Uses { augments, .. } = &mut self.kind {
            for id in augments {
                *id = map(*id);
            }
        }
        self.common.parent = self.common.parent.map(&map);
    }
}

// =============================================================================
// Subtree copies
// =============================================================================

/// A detached deep copy of a builder and everything it owns.
///
/// Ids inside a subtree index into its own `nodes`; the root is at index 0
/// and has no parent.
#[derive(Clone, Debug)]
pub(crate) struct Subtree {
    nodes: Vec<NodeBuilder>,
}

impl Subtree {
    /// Copies the subtree rooted at `root` out of `arena`.
    pub fn extract(arena: &[NodeBuilder], root: NodeId) -> Self {
        let mut order = vec![root];
        let mut cursor = 0;
        while cursor < order.len() {
            let id = order[cursor];
            order.extend(arena[id.index()].owned_ids());
            cursor += 1;
        }
        let local: HashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, NodeId::from_index(i)))
            .collect();

        let nodes = order
            .iter()
            .map(|id| {
                let mut node = arena[id.index()].clone();
                node.snapshot = None;
                node.remap(|old| local.get(&old).copied().unwrap_or(old));
                node
            })
            .enumerate()
            .map(|(i, mut node)| {
                if i == 0 {
                    node.common.parent = None;
                }
                node
            })
            .collect();
        Self { nodes }
    }

    /// Appends the subtree to `arena` under `parent`, returning the new id
    /// of its root.
    pub fn insert(self, arena: &mut Vec<NodeBuilder>, parent: Option<NodeId>) -> NodeId {
        let base = arena.len();
        for (i, mut node) in self.nodes.into_iter().enumerate() {
            node.remap(|id| id.offset(base));
            if i == 0 {
                node.common.parent = parent;
            }
            arena.push(node);
        }
        NodeId::from_index(base)
    }
}
