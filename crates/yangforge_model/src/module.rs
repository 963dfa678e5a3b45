//! Frozen modules and the compiled schema set.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::Vector;

use yangforge_foundation::{QName, SchemaPath};

use crate::definitions::{
    AugmentationSchema, Deviation, ExtensionDefinition, FeatureDefinition, GroupingDefinition,
    IdentitySchemaNode, ModuleImport, NotificationDefinition, RpcDefinition, UnknownSchemaNode,
    UsesNode,
};
use crate::node::{DataNodeContainer, DataSchemaNode};
use crate::types::TypeDefinition;

/// A fully resolved module.
#[derive(Clone, Debug)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// `namespace` statement.
    pub namespace: String,
    /// `prefix` statement.
    pub prefix: String,
    /// Latest `revision`.
    pub revision: Option<String>,
    /// `yang-version` statement.
    pub yang_version: Option<String>,
    /// `organization` statement.
    pub organization: Option<String>,
    /// `contact` statement.
    pub contact: Option<String>,
    /// `description` statement.
    pub description: Option<String>,
    /// `reference` statement.
    pub reference: Option<String>,
    /// Imports.
    pub imports: Vec<ModuleImport>,
    /// Top-level typedefs.
    pub typedefs: Vector<Arc<TypeDefinition>>,
    /// Top-level data nodes, ordered by local name then namespace.
    pub children: Vector<DataSchemaNode>,
    /// Top-level groupings.
    pub groupings: Vector<Arc<GroupingDefinition>>,
    /// Top-level `uses`.
    pub uses: Vector<Arc<UsesNode>>,
    /// Features.
    pub features: Vector<Arc<FeatureDefinition>>,
    /// Notifications.
    pub notifications: Vector<Arc<NotificationDefinition>>,
    /// Top-level augmentations declared by this module.
    pub augmentations: Vector<Arc<AugmentationSchema>>,
    /// Rpcs.
    pub rpcs: Vector<Arc<RpcDefinition>>,
    /// Deviations declared by this module.
    pub deviations: Vector<Arc<Deviation>>,
    /// Extension definitions.
    pub extensions: Vector<Arc<ExtensionDefinition>>,
    /// Identities.
    pub identities: Vector<Arc<IdentitySchemaNode>>,
    /// Top-level extension usages.
    pub unknown_nodes: Vector<Arc<UnknownSchemaNode>>,
}

impl Module {
    /// QName for `local_name` in this module's namespace.
    #[must_use]
    pub fn qname(&self, local_name: &str) -> QName {
        QName::new(
            self.namespace.as_str(),
            self.revision.as_deref().map(Arc::from),
            local_name,
        )
        .with_prefix(self.prefix.as_str())
    }

    /// Finds a typedef by name.
    #[must_use]
    pub fn typedef(&self, name: &str) -> Option<&Arc<TypeDefinition>> {
        self.typedefs
            .iter()
            .find(|t| t.qname.local_name() == name)
    }

    /// Finds a grouping by name.
    #[must_use]
    pub fn grouping(&self, name: &str) -> Option<&Arc<GroupingDefinition>> {
        self.groupings
            .iter()
            .find(|g| g.meta.qname.local_name() == name)
    }

    /// Finds an rpc by name.
    #[must_use]
    pub fn rpc(&self, name: &str) -> Option<&Arc<RpcDefinition>> {
        self.rpcs.iter().find(|r| r.meta.qname.local_name() == name)
    }

    /// Finds a notification by name.
    #[must_use]
    pub fn notification(&self, name: &str) -> Option<&Arc<NotificationDefinition>> {
        self.notifications
            .iter()
            .find(|n| n.meta.qname.local_name() == name)
    }

    /// Finds an identity by name.
    #[must_use]
    pub fn identity(&self, name: &str) -> Option<&Arc<IdentitySchemaNode>> {
        self.identities
            .iter()
            .find(|i| i.meta.qname.local_name() == name)
    }

    /// Finds a feature by name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&Arc<FeatureDefinition>> {
        self.features
            .iter()
            .find(|f| f.meta.qname.local_name() == name)
    }

    /// Finds an extension by name.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&Arc<ExtensionDefinition>> {
        self.extensions
            .iter()
            .find(|e| e.meta.qname.local_name() == name)
    }

    /// Follows local names from the module's top level.
    ///
    /// Choices are stepped through by case name, so `["c", "x", "x"]` reaches
    /// leaf `x` of shorthand case `x` of choice `c`.
    #[must_use]
    pub fn find_node<S: AsRef<str>>(&self, names: &[S]) -> Option<DataSchemaNode> {
        let (first, rest) = names.split_first()?;
        let mut current = self.data_child_by_name(first.as_ref())?.clone();
        for name in rest {
            current = current.child(name.as_ref())?;
        }
        Some(current)
    }

    /// Finds a node by its schema path; namespaces are ignored.
    #[must_use]
    pub fn find_by_path(&self, path: &SchemaPath) -> Option<DataSchemaNode> {
        let names: Vec<&str> = path.segments().iter().map(QName::local_name).collect();
        self.find_node(&names)
    }
}

impl DataNodeContainer for Module {
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

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.namespace == other.namespace
            && self.revision == other.revision
    }
}

impl Eq for Module {}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.namespace.hash(state);
        self.revision.hash(state);
    }
}

// =============================================================================
// SchemaSet
// =============================================================================

/// The result of a successful compilation: every module, fully resolved.
#[derive(Clone, Debug, Default)]
pub struct SchemaSet {
    modules: BTreeMap<(String, Option<String>), Arc<Module>>,
}

impl SchemaSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, replacing any module with the same name and revision.
    pub fn insert(&mut self, module: Arc<Module>) {
        self.modules
            .insert((module.name.clone(), module.revision.clone()), module);
    }

    /// Finds a module by name and revision; `None` picks the latest revision.
    #[must_use]
    pub fn module(&self, name: &str, revision: Option<&str>) -> Option<&Arc<Module>> {
        match revision {
            Some(rev) => self
                .modules
                .get(&(name.to_string(), Some(rev.to_string()))),
            None => self.latest(name),
        }
    }

    /// The latest revision of a module.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<&Arc<Module>> {
        self.modules
            .iter()
            .filter(|((n, _), _)| n == name)
            .map(|(_, m)| m)
            .next_back()
    }

    /// All revisions of modules with this namespace, oldest first.
    #[must_use]
    pub fn by_namespace(&self, namespace: &str) -> Vec<&Arc<Module>> {
        self.modules
            .values()
            .filter(|m| m.namespace == namespace)
            .collect()
    }

    /// Iterates over all modules, ordered by name then revision.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the set holds no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Finds a node by absolute schema path, using the first segment's
    /// namespace to pick the module.
    #[must_use]
    pub fn find_node(&self, path: &SchemaPath) -> Option<DataSchemaNode> {
        let first = path.segments().first()?;
        let module = self
            .modules
            .values()
            .rev()
            .find(|m| m.namespace == first.namespace())?;
        module.find_by_path(path)
    }
}

impl<'a> IntoIterator for &'a SchemaSet {
    type Item = &'a Arc<Module>;
    type IntoIter = std::collections::btree_map::Values<'a, (String, Option<String>), Arc<Module>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.values()
    }
}
