//! Frozen non-data definitions: groupings, uses, augmentations, rpcs,
//! notifications, features, deviations, extensions, identities and
//! extension usages.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::Vector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use yangforge_foundation::{ErrorKind, QName, SchemaPath, Status};

use crate::node::{ContainerSchemaNode, DataNodeContainer, DataSchemaNode, NodeMeta};
use crate::types::TypeDefinition;

/// A `grouping`. Never part of the data tree itself.
#[derive(Clone, Debug)]
pub struct GroupingDefinition {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data children of the canonical definition.
    pub children: Vector<DataSchemaNode>,
    /// Typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Nested groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// `uses` statements.
    pub uses: Vector<Arc<UsesNode>>,
}

impl DataNodeContainer for GroupingDefinition {
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

/// A `uses` statement, kept as a record on the node that declared it.
#[derive(Clone, Debug)]
pub struct UsesNode {
    /// Path of the grouping it instantiates.
    pub grouping_path: SchemaPath,
    /// The uses sits inside an augmentation.
    pub augmenting: bool,
    /// Paths of the refined nodes, relative to the using node.
    pub refines: Vector<SchemaPath>,
    /// Augmentations scoped to this instantiation.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
    /// Copies of the grouping's typedefs. They keep the grouping's scope,
    /// so two uses in one node may bring typedefs of the same name.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Copies of the grouping's nested groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
}

/// An `augment` statement.
#[derive(Clone, Debug)]
pub struct AugmentationSchema {
    /// Resolved target path.
    pub target_path: SchemaPath,
    /// `when` condition.
    pub when: Option<String>,
    /// `description` statement.
    pub description: Option<String>,
    /// `reference` statement.
    pub reference: Option<String>,
    /// `status` statement.
    pub status: Status,
    /// Grafted children.
    pub children: Vector<DataSchemaNode>,
    /// `uses` inside the augmentation.
    pub uses: Vector<Arc<UsesNode>>,
    /// Extension usages.
    pub unknown_nodes: Vector<Arc<UnknownSchemaNode>>,
}

impl PartialEq for AugmentationSchema {
    fn eq(&self, other: &Self) -> bool {
        self.target_path == other.target_path && self.children == other.children
    }
}

impl Eq for AugmentationSchema {}

/// An `rpc`.
#[derive(Clone, Debug)]
pub struct RpcDefinition {
    /// Common metadata.
    pub meta: NodeMeta,
    /// `input` statement.
    pub input: Option<Arc<ContainerSchemaNode>>,
    /// `output` statement.
    pub output: Option<Arc<ContainerSchemaNode>>,
    /// Typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
}

/// A `notification`.
#[derive(Clone, Debug)]
pub struct NotificationDefinition {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Data children.
    pub children: Vector<DataSchemaNode>,
    /// Typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// `uses` statements.
    pub uses: Vector<Arc<UsesNode>>,
}

impl DataNodeContainer for NotificationDefinition {
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

/// A `feature`.
#[derive(Clone, Debug)]
pub struct FeatureDefinition {
    /// Common metadata.
    pub meta: NodeMeta,
}

// =============================================================================
// Deviations
// =============================================================================

/// The argument of a `deviate` statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviateKind {
    /// The target is not implemented.
    NotSupported,
    /// Properties are added to the target.
    Add,
    /// Properties of the target are replaced.
    Replace,
    /// Properties are removed from the target.
    Delete,
}

impl DeviateKind {
    /// Parses a `deviate` argument.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidDeviate`] for any other keyword.
    pub fn parse(keyword: &str) -> Result<Self, ErrorKind> {
        match keyword.trim() {
            "not-supported" => Ok(Self::NotSupported),
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            "delete" => Ok(Self::Delete),
            other => Err(ErrorKind::InvalidDeviate(other.to_string())),
        }
    }

    /// The keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotSupported => "not-supported",
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for DeviateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `deviation`.
#[derive(Clone, Debug)]
pub struct Deviation {
    /// Resolved target path.
    pub target_path: SchemaPath,
    /// The deviate kind.
    pub deviate: DeviateKind,
    /// `reference` statement.
    pub reference: Option<String>,
    /// Extension usages.
    pub unknown_nodes: Vector<Arc<UnknownSchemaNode>>,
}

// =============================================================================
// Extensions and identities
// =============================================================================

/// An `extension` definition.
#[derive(Clone, Debug)]
pub struct ExtensionDefinition {
    /// Common metadata.
    pub meta: NodeMeta,
    /// Name of the `argument`.
    pub argument: Option<String>,
    /// `yin-element`.
    pub yin_element: bool,
}

/// An `identity`.
#[derive(Clone, Debug)]
pub struct IdentitySchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// The resolved base identity.
    pub base: Option<Arc<IdentitySchemaNode>>,
}

impl IdentitySchemaNode {
    /// Returns true if `ancestor` is this identity or one of its bases.
    #[must_use]
    pub fn derives_from(&self, ancestor: &QName) -> bool {
        let mut current = Some(self);
        while let Some(identity) = current {
            if &identity.meta.qname == ancestor {
                return true;
            }
            current = identity.base.as_deref();
        }
        false
    }
}

impl PartialEq for IdentitySchemaNode {
    fn eq(&self, other: &Self) -> bool {
        self.meta.qname == other.meta.qname
    }
}

impl Eq for IdentitySchemaNode {}

impl Hash for IdentitySchemaNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.qname.hash(state);
    }
}

/// A usage of an extension, e.g. `ext:annotation "x";`.
#[derive(Clone, Debug)]
pub struct UnknownSchemaNode {
    /// Common metadata.
    pub meta: NodeMeta,
    /// QName of the extension, with namespace filled in once its prefix resolves.
    pub node_type: QName,
    /// The statement argument.
    pub argument: Option<String>,
    /// The usage was copied in by a `uses`.
    pub added_by_uses: bool,
}

/// An `import` statement of a module.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleImport {
    /// Name of the imported module.
    pub module_name: String,
    /// Requested revision; `None` picks the latest.
    pub revision: Option<String>,
    /// Prefix used for the import.
    pub prefix: String,
}
