//! Immutable schema model for yangforge.
//!
//! Everything in this crate is produced by the builder layer and handed out
//! behind `Arc`s. Nothing here mutates after construction.
//!
//! - [`Module`] / [`SchemaSet`] - compiled modules and their lookup
//! - [`DataSchemaNode`] - containers, lists, leaves, choices, cases, anyxml
//! - [`TypeDefinition`] - typedef chains ending in a [`BuiltinType`]
//! - [`Constraints`] - cardinality, `when` and `must`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod constraints;
pub mod definitions;
pub mod module;
pub mod node;
pub mod types;

pub use constraints::{Constraints, MustDefinition};
pub use definitions::{
    AugmentationSchema, DeviateKind, Deviation, ExtensionDefinition, FeatureDefinition,
    GroupingDefinition, IdentitySchemaNode, ModuleImport, NotificationDefinition, RpcDefinition,
    UnknownSchemaNode, UsesNode,
};
pub use module::{Module, SchemaSet};
pub use node::{
    AnyxmlSchemaNode, ChoiceCaseNode, ChoiceNode, ContainerSchemaNode, DataFlags,
    DataNodeContainer, DataSchemaNode, LeafListSchemaNode, LeafSchemaNode, ListSchemaNode,
    NodeMeta,
};
pub use types::{
    BUILTIN_NAMESPACE, Bit, BuiltinType, EnumMember, Interval, PatternConstraint, Restrictions,
    TypeBase, TypeDefinition, TypeKind,
};
