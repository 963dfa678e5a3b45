//! Freezing builders into the immutable model.
//!
//! Building is memoized: every builder keeps its snapshot, so building twice
//! hands out the same `Arc`s. Mutating a built builder fails with
//! [`ErrorKind::Frozen`](yangforge_foundation::ErrorKind::Frozen) until it is
//! unfrozen.
//!
//! Building never fails. References the resolver could not settle are
//! frozen as they are: unresolved types become [`TypeBase::Unresolved`]
//! links and identities without a resolved base have none.
//!
//! [`TypeBase::Unresolved`]: yangforge_model::TypeBase::Unresolved

use std::sync::Arc;

use im::Vector;

use yangforge_foundation::{RawPath, Result, SchemaPath};
use yangforge_model::{
    AnyxmlSchemaNode, AugmentationSchema, ChoiceCaseNode, ChoiceNode, ContainerSchemaNode,
    DataFlags, DataSchemaNode, Deviation, ExtensionDefinition, FeatureDefinition,
    GroupingDefinition, IdentitySchemaNode, LeafListSchemaNode, LeafSchemaNode, ListSchemaNode,
    Module, NodeMeta, NotificationDefinition, RpcDefinition, TypeDefinition, UnknownSchemaNode,
    UsesNode,
};

use crate::arena::{AugmentRecord, BuilderKind, BuiltNode, ContainerRole, NodeBuilder, NodeId};
use crate::module_builder::ModuleBuilder;
use crate::type_spec::{TypeParts, TypeSpec};

impl ModuleBuilder {
    /// Freezes the module.
    ///
    /// Returns the same `Arc` until the module is unfrozen.
    pub fn build(&mut self) -> Arc<Module> {
        if let Some(module) = &self.snapshot {
            return module.clone();
        }
        let root = self.root.clone();
        let module = Arc::new(Module {
            name: self.name.to_string(),
            namespace: self.namespace.clone(),
            prefix: self.prefix.clone(),
            revision: self.revision.clone(),
            yang_version: self.yang_version.clone(),
            organization: self.organization.clone(),
            contact: self.contact.clone(),
            description: self.description.clone(),
            reference: self.reference.clone(),
            imports: self.imports().cloned().collect(),
            typedefs: self.built_list(&root.typedefs, typedef_of),
            children: self.data_list(&root.children),
            groupings: self.built_list(&root.groupings, grouping_of),
            uses: self.built_list(&root.uses, uses_of),
            features: self.built_list(&root.features, feature_of),
            notifications: self.built_list(&root.notifications, notification_of),
            augmentations: self.built_list(&root.augments, augment_of),
            rpcs: self.built_list(&root.rpcs, rpc_of),
            deviations: self.built_list(&root.deviations, deviation_of),
            extensions: self.built_list(&root.extensions, extension_of),
            identities: self.built_list(&root.identities, identity_of),
            unknown_nodes: self.built_list(&root.unknown_nodes, unknown_of),
        });
        tracing::debug!(module = %self.name, builders = self.arena.len(), "module built");
        self.snapshot = Some(module.clone());
        module
    }

    /// Freezes one builder and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`](yangforge_foundation::ErrorKind::Internal)
    /// for an id of another module.
    pub fn build_node(&mut self, id: NodeId) -> Result<BuiltNode> {
        self.node_ref(id)?;
        Ok(self.build_id(id))
    }

    /// Returns true once the module has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drops every snapshot, making the whole module mutable again.
    pub fn unfreeze(&mut self) {
        for node in &mut self.arena {
            node.snapshot = None;
        }
        self.snapshot = None;
    }

    /// Drops the snapshots of `id`, its ancestors and the module.
    ///
    /// Siblings and descendants keep their snapshots, so a rebuild shares
    /// them with the previous build.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`](yangforge_foundation::ErrorKind::Internal)
    /// for an id of another module.
    pub fn unfreeze_node(&mut self, id: NodeId) -> Result<()> {
        self.node_ref(id)?;
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = &mut self.arena[cid.index()];
            node.snapshot = None;
            current = node.common.parent;
        }
        self.snapshot = None;
        Ok(())
    }

    /// Unfreezes and builds the module again.
    pub fn rebuild(&mut self) -> Arc<Module> {
        self.unfreeze();
        self.build()
    }

    /// Unfreezes and builds one builder again.
    ///
    /// # Errors
    ///
    /// See [`Self::unfreeze_node`].
    pub fn rebuild_node(&mut self, id: NodeId) -> Result<BuiltNode> {
        self.unfreeze_node(id)?;
        self.build_node(id)
    }

    // =========================================================================
    // Freezing
    // =========================================================================

    pub(crate) fn build_id(&mut self, id: NodeId) -> BuiltNode {
        if let Some(built) = &self.arena[id.index()].snapshot {
            return built.clone();
        }
        let built = self.freeze(id);
        self.arena[id.index()].snapshot = Some(built.clone());
        built
    }

    fn freeze(&mut self, id: NodeId) -> BuiltNode {
        let node = self.arena[id.index()].clone();
        let meta = NodeMeta {
            unknown_nodes: self.built_list(&node.unknown_nodes, unknown_of),
            ..plain_meta(&node)
        };
        let flags = DataFlags {
            config: self.effective_config(id),
            augmenting: node.common.augmenting,
            added_by_uses: node.common.added_by_uses,
        };
        let constraints = node.common.constraints.clone();

        match &node.kind {
            BuilderKind::Container { presence, .. } => {
                BuiltNode::Data(DataSchemaNode::Container(Arc::new(ContainerSchemaNode {
                    meta,
                    flags,
                    presence: presence.clone(),
                    constraints,
                    children: self.data_list(&node.children),
                    typedefs: self.built_list(&node.typedefs, typedef_of),
                    groupings: self.built_list(&node.groupings, grouping_of),
                    uses: self.built_list(&node.uses, uses_of),
                    augmentations: self.augmentation_records(&node.augmentations),
                })))
            }
            BuilderKind::List { keys, user_ordered } => {
                let keys = keys
                    .iter()
                    .map(|key| {
                        self.find_named(&node.children, key).map_or_else(
                            || node.common.qname.sibling(key.as_str()),
                            |child| self.arena[child.index()].common.qname.clone(),
                        )
                    })
                    .collect();
                BuiltNode::Data(DataSchemaNode::List(Arc::new(ListSchemaNode {
                    meta,
                    flags,
                    keys,
                    user_ordered: *user_ordered,
                    constraints,
                    children: self.data_list(&node.children),
                    typedefs: self.built_list(&node.typedefs, typedef_of),
                    groupings: self.built_list(&node.groupings, grouping_of),
                    uses: self.built_list(&node.uses, uses_of),
                    augmentations: self.augmentation_records(&node.augmentations),
                })))
            }
            BuilderKind::Leaf { ty, default, units } => {
                BuiltNode::Data(DataSchemaNode::Leaf(Arc::new(LeafSchemaNode {
                    ty: leaf_type(ty, &node.common.path),
                    meta,
                    flags,
                    constraints,
                    default: default.clone(),
                    units: units.clone(),
                })))
            }
            BuilderKind::LeafList {
                ty,
                user_ordered,
                units,
            } => BuiltNode::Data(DataSchemaNode::LeafList(Arc::new(LeafListSchemaNode {
                ty: leaf_type(ty, &node.common.path),
                meta,
                flags,
                constraints,
                user_ordered: *user_ordered,
                units: units.clone(),
            }))),
            BuilderKind::Choice { default_case } => {
                let mut cases: Vec<Arc<ChoiceCaseNode>> = node
                    .children
                    .iter()
                    .filter_map(|&child| match self.build_id(child) {
                        BuiltNode::Data(DataSchemaNode::Case(case)) => Some(case),
                        _ => None,
                    })
                    .collect();
                cases.sort_by(|a, b| a.meta.qname.cmp(&b.meta.qname));
                BuiltNode::Data(DataSchemaNode::Choice(Arc::new(ChoiceNode {
                    meta,
                    flags,
                    constraints,
                    cases: cases.into_iter().collect(),
                    default_case: default_case.clone(),
                    augmentations: self.augmentation_records(&node.augmentations),
                })))
            }
            BuilderKind::Case => BuiltNode::Data(DataSchemaNode::Case(Arc::new(ChoiceCaseNode {
                meta,
                flags,
                constraints,
                children: self.data_list(&node.children),
                typedefs: self.built_list(&node.typedefs, typedef_of),
                groupings: self.built_list(&node.groupings, grouping_of),
                uses: self.built_list(&node.uses, uses_of),
                augmentations: self.augmentation_records(&node.augmentations),
            }))),
            BuilderKind::Anyxml => BuiltNode::Data(DataSchemaNode::Anyxml(Arc::new(
                AnyxmlSchemaNode {
                    meta,
                    flags,
                    constraints,
                },
            ))),
            BuilderKind::Grouping => BuiltNode::Grouping(Arc::new(GroupingDefinition {
                meta,
                children: self.data_list(&node.children),
                typedefs: self.built_list(&node.typedefs, typedef_of),
                groupings: self.built_list(&node.groupings, grouping_of),
                uses: self.built_list(&node.uses, uses_of),
            })),
            BuilderKind::Uses {
                grouping,
                grouping_path,
                refines,
                augments,
                ..
            } => {
                let grouping_path = grouping_path
                    .clone()
                    .unwrap_or_else(|| SchemaPath::root().child(self.reference_qname(grouping)));
                let relative = SchemaPath::new(Vec::new(), false);
                let refines = refines
                    .iter()
                    .filter_map(|refine| RawPath::parse(refine.target()).ok())
                    .map(|raw| self.raw_path_guess(&raw, &relative))
                    .collect();
                BuiltNode::Uses(Arc::new(UsesNode {
                    grouping_path,
                    augmenting: node.common.augmenting,
                    refines,
                    augmentations: self.built_list(augments, augment_of),
                    typedefs: self.built_list(&node.typedefs, typedef_of),
                    groupings: self.built_list(&node.groupings, grouping_of),
                }))
            }
            BuilderKind::Augment { when, .. } => {
                BuiltNode::Augment(Arc::new(AugmentationSchema {
                    target_path: node.common.path.clone(),
                    when: when.clone(),
                    description: node.common.description.clone(),
                    reference: node.common.reference.clone(),
                    status: node.common.status,
                    children: self.data_list(&node.children),
                    uses: self.built_list(&node.uses, uses_of),
                    unknown_nodes: meta.unknown_nodes,
                }))
            }
            BuilderKind::Rpc => {
                let mut input = None;
                let mut output = None;
                for &child in &node.children {
                    let role = match &self.arena[child.index()].kind {
                        BuilderKind::Container { role, .. } => *role,
                        _ => continue,
                    };
                    if let BuiltNode::Data(DataSchemaNode::Container(c)) = self.build_id(child) {
                        match role {
                            ContainerRole::Input => input = Some(c),
                            ContainerRole::Output => output = Some(c),
                            ContainerRole::Data => {}
                        }
                    }
                }
                BuiltNode::Rpc(Arc::new(RpcDefinition {
                    meta,
                    input,
                    output,
                    typedefs: self.built_list(&node.typedefs, typedef_of),
                    groupings: self.built_list(&node.groupings, grouping_of),
                }))
            }
            BuilderKind::Notification => {
                BuiltNode::Notification(Arc::new(NotificationDefinition {
                    meta,
                    children: self.data_list(&node.children),
                    typedefs: self.built_list(&node.typedefs, typedef_of),
                    groupings: self.built_list(&node.groupings, grouping_of),
                    uses: self.built_list(&node.uses, uses_of),
                }))
            }
            BuilderKind::Typedef { ty, resolved, .. } => BuiltNode::Typedef(
                resolved.clone().unwrap_or_else(|| {
                    typedef_definition(&node, TypeParts::lenient(ty, &node.common.path))
                }),
            ),
            BuilderKind::Identity { resolved, .. } => {
                BuiltNode::Identity(resolved.clone().unwrap_or_else(|| {
                    Arc::new(IdentitySchemaNode { meta, base: None })
                }))
            }
            BuilderKind::Extension {
                argument,
                yin_element,
            } => BuiltNode::Extension(Arc::new(ExtensionDefinition {
                meta,
                argument: argument.clone(),
                yin_element: *yin_element,
            })),
            BuilderKind::Feature => BuiltNode::Feature(Arc::new(FeatureDefinition { meta })),
            BuilderKind::Deviation { deviate, .. } => BuiltNode::Deviation(Arc::new(Deviation {
                target_path: node.common.path.clone(),
                deviate: *deviate,
                reference: node.common.reference.clone(),
                unknown_nodes: meta.unknown_nodes,
            })),
            BuilderKind::Unknown { argument, .. } => BuiltNode::Unknown(Arc::new(
                UnknownSchemaNode {
                    node_type: node.common.qname.clone(),
                    argument: argument.clone(),
                    added_by_uses: node.common.added_by_uses,
                    meta,
                },
            )),
        }
    }

    /// Data children sorted by QName.
    fn data_list(&mut self, ids: &[NodeId]) -> Vector<DataSchemaNode> {
        let mut nodes: Vec<DataSchemaNode> = ids
            .iter()
            .filter_map(|&id| self.build_id(id).as_data().cloned())
            .collect();
        nodes.sort_by(|a, b| a.qname().cmp(b.qname()));
        nodes.into_iter().collect()
    }

    fn built_list<T>(
        &mut self,
        ids: &[NodeId],
        pick: fn(BuiltNode) -> Option<Arc<T>>,
    ) -> Vector<Arc<T>> {
        ids.iter().filter_map(|&id| pick(self.build_id(id))).collect()
    }

    fn augmentation_records(&mut self, records: &[AugmentRecord]) -> Vector<Arc<AugmentationSchema>> {
        records
            .iter()
            .map(|record| {
                Arc::new(AugmentationSchema {
                    target_path: record.target_path.clone(),
                    when: record.when.clone(),
                    description: record.description.clone(),
                    reference: record.reference.clone(),
                    status: record.status,
                    children: self.data_list(&record.children),
                    uses: Vector::new(),
                    unknown_nodes: Vector::new(),
                })
            })
            .collect()
    }

    /// Explicit `config` of the nearest ancestor that has one.
    ///
    /// Everything below an rpc or notification is `config false`; the default
    /// at top level is `config true`.
    fn effective_config(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            let node = &self.arena[cid.index()];
            if matches!(
                node.kind,
                BuilderKind::Rpc
                    | BuilderKind::Notification
                    | BuilderKind::Container {
                        role: ContainerRole::Input | ContainerRole::Output,
                        ..
                    }
            ) {
                return false;
            }
            if let Some(config) = node.common.config {
                return config;
            }
            current = node.common.parent;
        }
        true
    }
}

/// Metadata without extension usages.
pub(crate) fn plain_meta(node: &NodeBuilder) -> NodeMeta {
    NodeMeta {
        description: node.common.description.clone(),
        reference: node.common.reference.clone(),
        status: node.common.status,
        ..NodeMeta::new(node.common.qname.clone(), node.common.path.clone())
    }
}

/// A typedef's own link in its type chain.
pub(crate) fn typedef_definition(node: &NodeBuilder, parts: TypeParts) -> Arc<TypeDefinition> {
    let (units, default) = match &node.kind {
        BuilderKind::Typedef { units, default, .. } => (units.clone(), default.clone()),
        _ => (None, None),
    };
    Arc::new(TypeDefinition {
        qname: node.common.qname.clone(),
        path: node.common.path.clone(),
        description: node.common.description.clone(),
        reference: node.common.reference.clone(),
        status: node.common.status,
        units,
        default,
        base: parts.base,
        restrictions: parts.restrictions,
        kind: parts.kind,
    })
}

fn leaf_type(spec: &TypeSpec, path: &SchemaPath) -> Arc<TypeDefinition> {
    match spec {
        TypeSpec::Resolved(def) => def.clone(),
        other => TypeParts::lenient(other, path).into_link(path),
    }
}

macro_rules! picker {
    ($($name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        $(
            fn $name(built: BuiltNode) -> Option<Arc<$ty>> {
                match built {
                    BuiltNode::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        )*
    };
}

picker! {
    typedef_of => Typedef(TypeDefinition),
    grouping_of => Grouping(GroupingDefinition),
    uses_of => Uses(UsesNode),
    augment_of => Augment(AugmentationSchema),
    rpc_of => Rpc(RpcDefinition),
    notification_of => Notification(NotificationDefinition),
    feature_of => Feature(FeatureDefinition),
    extension_of => Extension(ExtensionDefinition),
    identity_of => Identity(IdentitySchemaNode),
    deviation_of => Deviation(Deviation),
    unknown_of => Unknown(UnknownSchemaNode),
}
