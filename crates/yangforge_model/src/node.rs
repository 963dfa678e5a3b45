//! Frozen data schema nodes.
//!
//! Every node is produced once by the builder layer and shared behind an
//! `Arc`. Nodes expose their data through public fields; nothing here can
//! mutate a node once it has been handed out. Equality and hashing use the
//! node's QName and schema path only, so nodes can serve as map keys for
//! code generators and codecs.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::Vector;

use yangforge_foundation::{QName, SchemaPath, Status};

use crate::constraints::Constraints;
use crate::definitions::{AugmentationSchema, GroupingDefinition, UnknownSchemaNode, UsesNode};
use crate::types::TypeDefinition;

// =============================================================================
// Common metadata
// =============================================================================

/// Metadata shared by every schema construct.
#[derive(Clone, Debug)]
pub struct NodeMeta {
    /// Qualified name.
    pub qname: QName,
    /// Path from the schema root.
    pub path: SchemaPath,
    /// `description` statement.
    pub description: Option<String>,
    /// `reference` statement.
    pub reference: Option<String>,
    /// `status` statement.
    pub status: Status,
    /// Extension usages attached to this construct.
    pub unknown_nodes: Vector<Arc<UnknownSchemaNode>>,
}

impl NodeMeta {
    /// Creates metadata with only a name and path.
    #[must_use]
    pub fn new(qname: QName, path: SchemaPath) -> Self {
        Self {
            qname,
            path,
            description: None,
            reference: None,
            status: Status::Current,
            unknown_nodes: Vector::new(),
        }
    }
}

/// Flags shared by every data node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DataFlags {
    /// Effective `config` value.
    pub config: bool,
    /// The node was grafted by an augmentation.
    pub augmenting: bool,
    /// The node was copied in by a `uses`.
    pub added_by_uses: bool,
}

// =============================================================================
// DataNodeContainer
// =============================================================================

/// Read access shared by every node that holds data children.
pub trait DataNodeContainer {
    /// Data children, ordered by local name then namespace.
    fn children(&self) -> &Vector<DataSchemaNode>;

    /// Typedefs declared directly in this node.
    fn typedefs(&self) -> &Vector<Arc<TypeDefinition>>;

    /// Groupings declared directly in this node.
    fn groupings(&self) -> &Vector<Arc<GroupingDefinition>>;

    /// `uses` statements of this node.
    fn uses(&self) -> &Vector<Arc<UsesNode>>;

    /// Finds a child by its qualified name.
    fn data_child(&self, qname: &QName) -> Option<&DataSchemaNode> {
        self.children().iter().find(|c| c.qname() == qname)
    }

    /// Finds a child by local name, ignoring namespaces.
    fn data_child_by_name(&self, name: &str) -> Option<&DataSchemaNode> {
        self.children()
            .iter()
            .find(|c| c.qname().local_name() == name)
    }
}

macro_rules! impl_data_node_container {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DataNodeContainer for $ty {
                fn children(&self) -> &Vector<DataSchemaNode> {
                    &self.children
                }

                fn typedefs(&self) -> &Vector<Arc<TypeDefinition>> {
                    &self.typedefs
                }

                fn groupings(&self) -> &Vector<Arc<GroupingDefinition>> {
                    &self.groupings
                }

                fn uses(&self) -> &Vector<Arc<UsesNode>> {
                    &self.uses
                }
            }
        )*
    };
}

// =============================================================================
// Concrete nodes
// =============================================================================

/// A `container`, or the `input`/`output` of an rpc.
#[derive(Clone, Debug)]
pub struct ContainerSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// `presence` statement.
    pub presence: Option<String>,
    /// Constraints.
    pub constraints: Constraints,
    /// Data children.
    pub children: Vector<DataSchemaNode>,
    /// Typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// `uses` statements.
    pub uses: Vector<Arc<UsesNode>>,
    /// Augmentations that target this node.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
}

impl ContainerSchemaNode {
    /// Returns true for a presence container.
    #[must_use]
    pub fn is_presence(&self) -> bool {
        self.presence.is_some()
    }
}

/// A `list`.
#[derive(Clone, Debug)]
pub struct ListSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Key leaves, in `key` statement order.
    pub keys: Vec<QName>,
    /// `ordered-by user`.
    pub user_ordered: bool,
    /// Constraints.
    pub constraints: Constraints,
    /// Data children.
    pub children: Vector<DataSchemaNode>,
    /// Typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// `uses` statements.
    pub uses: Vector<Arc<UsesNode>>,
    /// Augmentations that target this node.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
}

/// A `leaf`.
#[derive(Clone, Debug)]
pub struct LeafSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Constraints.
    pub constraints: Constraints,
    /// Resolved type.
    pub ty: Arc<TypeDefinition>,
    /// `default` statement.
    pub default: Option<String>,
    /// `units` statement.
    pub units: Option<String>,
}

impl LeafSchemaNode {
    /// The default declared on the leaf, or else on its type chain.
    #[must_use]
    pub fn effective_default(&self) -> Option<&str> {
        self.default
            .as_deref()
            .or_else(|| self.ty.effective_default())
    }
}

/// A `leaf-list`.
#[derive(Clone, Debug)]
pub struct LeafListSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Constraints.
    pub constraints: Constraints,
    /// Resolved type.
    pub ty: Arc<TypeDefinition>,
    /// `ordered-by user`.
    pub user_ordered: bool,
    /// `units` statement.
    pub units: Option<String>,
}

/// A `choice`.
#[derive(Clone, Debug)]
pub struct ChoiceNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Constraints.
    pub constraints: Constraints,
    /// Cases, ordered by local name then namespace.
    pub cases: Vector<Arc<ChoiceCaseNode>>,
    /// Name of the `default` case.
    pub default_case: Option<String>,
    /// Augmentations that target this node.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
}

impl ChoiceNode {
    /// Finds a case by local name.
    #[must_use]
    pub fn case_by_name(&self, name: &str) -> Option<&Arc<ChoiceCaseNode>> {
        self.cases.iter().find(|c| c.meta.qname.local_name() == name)
    }
}

/// A `case`, declared explicitly or synthesized from shorthand.
#[derive(Clone, Debug)]
pub struct ChoiceCaseNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Constraints.
    pub constraints: Constraints,
    /// Data children.
    pub children: Vector<DataSchemaNode>,
    /// Typedefs. Always empty, cases cannot declare typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Groupings. Always empty.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// `uses` statements.
    pub uses: Vector<Arc<UsesNode>>,
    /// Augmentations that target this node.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
}

/// An `anyxml`.
#[derive(Clone, Debug)]
pub struct AnyxmlSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data flags.
    pub flags: DataFlags,
    /// Constraints.
    pub constraints: Constraints,
}

impl_data_node_container!(ContainerSchemaNode, ListSchemaNode, ChoiceCaseNode);

// =============================================================================
// DataSchemaNode
// =============================================================================

/// Any node that can appear in the data tree.
#[derive(Clone)]
pub enum DataSchemaNode {
    /// A container.
    Container(Arc<ContainerSchemaNode>),
    /// A list.
    List(Arc<ListSchemaNode>),
    /// A leaf.
    Leaf(Arc<LeafSchemaNode>),
    /// A leaf-list.
    LeafList(Arc<LeafListSchemaNode>),
    /// A choice.
    Choice(Arc<ChoiceNode>),
    /// A case. Only appears as the child of an augmentation targeting a choice.
    Case(Arc<ChoiceCaseNode>),
    /// An anyxml.
    Anyxml(Arc<AnyxmlSchemaNode>),
}

impl DataSchemaNode {
    /// Common metadata.
    #[must_use]
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Self::Container(n) => &n.meta,
            Self::List(n) => &n.meta,
            Self::Leaf(n) => &n.meta,
            Self::LeafList(n) => &n.meta,
            Self::Choice(n) => &n.meta,
            Self::Case(n) => &n.meta,
            Self::Anyxml(n) => &n.meta,
        }
    }

    /// Data flags.
    #[must_use]
    pub fn flags(&self) -> DataFlags {
        match self {
            Self::Container(n) => n.flags,
            Self::List(n) => n.flags,
            Self::Leaf(n) => n.flags,
            Self::LeafList(n) => n.flags,
            Self::Choice(n) => n.flags,
            Self::Case(n) => n.flags,
            Self::Anyxml(n) => n.flags,
        }
    }

    /// Constraints.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        match self {
            Self::Container(n) => &n.constraints,
            Self::List(n) => &n.constraints,
            Self::Leaf(n) => &n.constraints,
            Self::LeafList(n) => &n.constraints,
            Self::Choice(n) => &n.constraints,
            Self::Case(n) => &n.constraints,
            Self::Anyxml(n) => &n.constraints,
        }
    }

    /// Qualified name.
    #[must_use]
    pub fn qname(&self) -> &QName {
        &self.meta().qname
    }

    /// Schema path.
    #[must_use]
    pub fn path(&self) -> &SchemaPath {
        &self.meta().path
    }

    /// The statement keyword for this node kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::List(_) => "list",
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
            Self::Choice(_) => "choice",
            Self::Case(_) => "case",
            Self::Anyxml(_) => "anyxml",
        }
    }

    /// The node as a data-node container, if it holds children.
    #[must_use]
    pub fn as_container(&self) -> Option<&dyn DataNodeContainer> {
        match self {
            Self::Container(n) => Some(&**n),
            Self::List(n) => Some(&**n),
            Self::Case(n) => Some(&**n),
            _ => None,
        }
    }

    /// The node as a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Arc<LeafSchemaNode>> {
        match self {
            Self::Leaf(n) => Some(n),
            _ => None,
        }
    }

    /// The node as a choice.
    #[must_use]
    pub fn as_choice(&self) -> Option<&Arc<ChoiceNode>> {
        match self {
            Self::Choice(n) => Some(n),
            _ => None,
        }
    }

    /// The node as a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&Arc<ListSchemaNode>> {
        match self {
            Self::List(n) => Some(n),
            _ => None,
        }
    }

    /// Navigates one step down by local name.
    ///
    /// Containers, lists and cases look in their children, choices in their
    /// cases.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<DataSchemaNode> {
        match self {
            Self::Choice(choice) => choice
                .case_by_name(name)
                .map(|c| DataSchemaNode::Case(c.clone())),
            other => other
                .as_container()
                .and_then(|c| c.data_child_by_name(name))
                .cloned(),
        }
    }
}

impl PartialEq for DataSchemaNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind_name() == other.kind_name()
            && self.qname() == other.qname()
            && self.path() == other.path()
    }
}

impl Eq for DataSchemaNode {}

impl Hash for DataSchemaNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qname().hash(state);
        self.path().hash(state);
    }
}

impl fmt::Debug for DataSchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind_name(), self.path())
    }
}

impl From<Arc<ChoiceCaseNode>> for DataSchemaNode {
    fn from(node: Arc<ChoiceCaseNode>) -> Self {
        Self::Case(node)
    }
}
