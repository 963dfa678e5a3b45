//! The module builder: registration of every statement of one module.
//!
//! The statement walker drives a `ModuleBuilder` with a flat sequence of
//! calls. `add_*` registers a statement under the node on top of the actual
//! path stack; `enter_node`/`exit_node` push and pop that stack. Every
//! structural rule (sibling uniqueness, valid parents, well-formed keywords)
//! is checked at registration, and the first violation is returned as a
//! [`CompileError`].
//!
//! References between statements (uses, augment, types, identity bases) are
//! only recorded here; the resolver in [`crate::resolver`] settles them.

use std::collections::BTreeSet;
use std::sync::Arc;

use yangforge_foundation::{
    CompileError, ErrorKind, NodeRef, QName, RawPath, Result, SchemaPath, Status,
};
use yangforge_model::{DeviateKind, Module, ModuleImport, MustDefinition};

use crate::arena::{BuilderCommon, BuilderKind, ContainerRole, NodeBuilder, NodeId};
use crate::deviate::DeviateProperties;
use crate::refine::Refine;
use crate::type_spec::TypeSpec;

/// Top-level statements of a module.
#[derive(Clone, Debug, Default)]
pub(crate) struct RootScope {
    pub children: Vec<NodeId>,
    pub typedefs: Vec<NodeId>,
    pub groupings: Vec<NodeId>,
    pub uses: Vec<NodeId>,
    pub features: Vec<NodeId>,
    pub notifications: Vec<NodeId>,
    pub augments: Vec<NodeId>,
    pub rpcs: Vec<NodeId>,
    pub deviations: Vec<NodeId>,
    pub extensions: Vec<NodeId>,
    pub identities: Vec<NodeId>,
    pub unknown_nodes: Vec<NodeId>,
}

/// The per-scope lists that uses expansion copies into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Children,
    Typedefs,
    Groupings,
    Uses,
}

/// Builder for one module.
#[derive(Clone, Debug)]
pub struct ModuleBuilder {
    pub(crate) name: Arc<str>,
    pub(crate) namespace: String,
    pub(crate) prefix: String,
    pub(crate) revision: Option<String>,
    pub(crate) yang_version: Option<String>,
    pub(crate) organization: Option<String>,
    pub(crate) contact: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) reference: Option<String>,
    /// Imports with the line of their statement.
    pub(crate) imports: Vec<(ModuleImport, u32)>,

    pub(crate) arena: Vec<NodeBuilder>,
    pub(crate) root: RootScope,
    actual_path: Vec<NodeId>,

    /// Builders whose type still names a typedef or identity.
    pub(crate) dirty_nodes: BTreeSet<NodeId>,
    /// Top-level augments, in declaration order.
    pub(crate) all_augments: Vec<NodeId>,
    /// Every uses, in declaration order.
    pub(crate) all_uses: Vec<NodeId>,
    /// Every extension usage, in declaration order.
    pub(crate) all_unknown: Vec<NodeId>,
    pub(crate) augments_resolved: usize,

    pub(crate) snapshot: Option<Arc<Module>>,
}

impl ModuleBuilder {
    /// Creates a builder for a module.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        namespace: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            prefix: prefix.into(),
            revision: None,
            yang_version: None,
            organization: None,
            contact: None,
            description: None,
            reference: None,
            imports: Vec::new(),
            arena: Vec::new(),
            root: RootScope::default(),
            actual_path: Vec::new(),
            dirty_nodes: BTreeSet::new(),
            all_augments: Vec::new(),
            all_uses: Vec::new(),
            all_unknown: Vec::new(),
            augments_resolved: 0,
            snapshot: None,
        }
    }

    /// Sets the revision.
    ///
    /// The revision is part of every QName of the module, so it must be set
    /// before any statement is added.
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Module prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Module revision.
    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Imports, in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ModuleImport> {
        self.imports.iter().map(|(import, _)| import)
    }

    /// QName of `local_name` in this module.
    #[must_use]
    pub fn qname(&self, local_name: &str) -> QName {
        QName::new(
            self.namespace.as_str(),
            self.revision.as_deref().map(Arc::from),
            local_name,
        )
        .with_prefix(self.prefix.as_str())
    }

    /// Sets `yang-version`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] once the module has been built.
    pub fn set_yang_version(&mut self, version: impl Into<String>) -> Result<()> {
        self.ensure_open(0)?;
        self.yang_version = Some(version.into());
        Ok(())
    }

    /// Sets `organization`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] once the module has been built.
    pub fn set_organization(&mut self, organization: impl Into<String>) -> Result<()> {
        self.ensure_open(0)?;
        self.organization = Some(organization.into());
        Ok(())
    }

    /// Sets `contact`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] once the module has been built.
    pub fn set_contact(&mut self, contact: impl Into<String>) -> Result<()> {
        self.ensure_open(0)?;
        self.contact = Some(contact.into());
        Ok(())
    }

    /// Sets the module `description`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] once the module has been built.
    pub fn set_module_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.ensure_open(0)?;
        self.description = Some(description.into());
        Ok(())
    }

    /// Sets the module `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] once the module has been built.
    pub fn set_module_reference(&mut self, reference: impl Into<String>) -> Result<()> {
        self.ensure_open(0)?;
        self.reference = Some(reference.into());
        Ok(())
    }

    /// Registers an `import`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if another import already took the
    /// prefix and [`ErrorKind::PrefixClash`] if it is the module's own.
    pub fn add_module_import(
        &mut self,
        line: u32,
        module_name: impl Into<String>,
        revision: Option<&str>,
        prefix: impl Into<String>,
    ) -> Result<()> {
        self.ensure_open(line)?;
        let prefix = prefix.into();
        if let Some((_, first_line)) = self.imports.iter().find(|(i, _)| i.prefix == prefix) {
            return Err(CompileError::duplicate(
                &*self.name,
                line,
                "import",
                prefix,
                *first_line,
            ));
        }
        if prefix == self.prefix {
            return Err(ErrorKind::PrefixClash(prefix).at(&*self.name, line));
        }
        self.imports.push((
            ModuleImport {
                module_name: module_name.into(),
                revision: revision.map(str::to_string),
                prefix,
            },
            line,
        ));
        Ok(())
    }

    // =========================================================================
    // Actual path
    // =========================================================================

    /// Makes `id` the parent of subsequently added statements.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`] for an id of another module.
    pub fn enter_node(&mut self, id: NodeId) -> Result<()> {
        self.node_ref(id)?;
        self.actual_path.push(id);
        Ok(())
    }

    /// Leaves the node entered last.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`] if no node is entered.
    pub fn exit_node(&mut self) -> Result<NodeId> {
        self.actual_path
            .pop()
            .ok_or_else(|| CompileError::internal(&*self.name, 0, "exit without enter"))
    }

    /// The node on top of the actual path stack; `None` at module top level.
    #[must_use]
    pub fn actual_node(&self) -> Option<NodeId> {
        self.actual_path.last().copied()
    }

    /// Queues the actual node for type resolution.
    ///
    /// `add_leaf_node`, `add_typedef` and `set_type` already do this for
    /// types that name a typedef or identity.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Internal`] at module top level.
    pub fn mark_actual_node_dirty(&mut self) -> Result<()> {
        let id = self.actual_node().ok_or_else(|| {
            CompileError::internal(&*self.name, 0, "no actual node to mark dirty")
        })?;
        self.dirty_nodes.insert(id);
        Ok(())
    }

    // =========================================================================
    // Data nodes
    // =========================================================================

    /// Adds a `container`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if a sibling has the same name and
    /// [`ErrorKind::InvalidParent`] if the actual node cannot hold data.
    pub fn add_container_node(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.add_data_node(
            line,
            qname,
            BuilderKind::Container {
                role: ContainerRole::Data,
                presence: None,
            },
        )
    }

    /// Adds a `list`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_container_node`].
    pub fn add_list_node(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.add_data_node(
            line,
            qname,
            BuilderKind::List {
                keys: Vec::new(),
                user_ordered: false,
            },
        )
    }

    /// Adds a `leaf` of type `ty`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_container_node`].
    pub fn add_leaf_node(&mut self, line: u32, qname: QName, ty: TypeSpec) -> Result<NodeId> {
        let dirty = ty.needs_resolution();
        let id = self.add_data_node(
            line,
            qname,
            BuilderKind::Leaf {
                ty,
                default: None,
                units: None,
            },
        )?;
        if dirty {
            self.dirty_nodes.insert(id);
        }
        Ok(id)
    }

    /// Adds a `leaf-list` of type `ty`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_container_node`].
    pub fn add_leaf_list_node(&mut self, line: u32, qname: QName, ty: TypeSpec) -> Result<NodeId> {
        let dirty = ty.needs_resolution();
        let id = self.add_data_node(
            line,
            qname,
            BuilderKind::LeafList {
                ty,
                user_ordered: false,
                units: None,
            },
        )?;
        if dirty {
            self.dirty_nodes.insert(id);
        }
        Ok(id)
    }

    /// Adds a `choice`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_container_node`].
    pub fn add_choice(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.add_data_node(line, qname, BuilderKind::Choice { default_case: None })
    }

    /// Adds an `anyxml`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_container_node`].
    pub fn add_anyxml(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.add_data_node(line, qname, BuilderKind::Anyxml)
    }

    /// Adds a `case` to the actual choice, or to an augment of a choice.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if the choice already has a case
    /// with this name and [`ErrorKind::InvalidParent`] anywhere else.
    pub fn add_case(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_open(line)?;
        let parent = self
            .actual_node()
            .ok_or_else(|| self.invalid_parent(line, "case", &qname))?;
        let node = self.open_node(parent, line)?;
        if !matches!(
            node.kind,
            BuilderKind::Choice { .. } | BuilderKind::Augment { .. }
        ) {
            return Err(self.invalid_parent(line, "case", &qname));
        }
        self.check_unique(&node.children, "case", &qname, line)?;
        let id = self.alloc(line, qname, Some(parent), BuilderKind::Case);
        self.arena[parent.index()].children.push(id);
        Ok(id)
    }

    fn add_data_node(&mut self, line: u32, qname: QName, kind: BuilderKind) -> Result<NodeId> {
        self.ensure_open(line)?;
        let statement = kind.keyword();
        let Some(parent) = self.actual_node() else {
            self.check_unique_top_level(statement, &qname, line)?;
            let id = self.alloc(line, qname, None, kind);
            self.root.children.push(id);
            return Ok(id);
        };

        let node = self.open_node(parent, line)?;
        if matches!(node.kind, BuilderKind::Choice { .. }) {
            return self.add_shorthand(parent, line, qname, kind);
        }
        if !node.kind.holds_data() {
            return Err(self.invalid_parent(line, statement, &qname));
        }
        self.check_unique(&node.children, statement, &qname, line)?;
        let id = self.alloc(line, qname, Some(parent), kind);
        self.arena[parent.index()].children.push(id);
        Ok(id)
    }

    /// Wraps a node declared directly under a choice in a case of the same
    /// name.
    fn add_shorthand(
        &mut self,
        choice: NodeId,
        line: u32,
        qname: QName,
        kind: BuilderKind,
    ) -> Result<NodeId> {
        let statement = kind.keyword();
        self.check_unique(&self.arena[choice.index()].children, statement, &qname, line)?;
        let case = self.alloc(line, qname.clone(), Some(choice), BuilderKind::Case);
        self.arena[choice.index()].children.push(case);
        let id = self.alloc(line, qname, Some(case), kind);
        self.arena[case.index()].children.push(id);
        Ok(id)
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Adds a `grouping`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if a grouping with this name is
    /// already declared in the same scope and [`ErrorKind::InvalidParent`]
    /// under a node that cannot declare groupings.
    pub fn add_grouping(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_open(line)?;
        let parent = self.definition_parent(line, "grouping", &qname)?;
        let scope = match parent {
            Some(p) => &self.arena[p.index()].groupings,
            None => &self.root.groupings,
        };
        self.check_unique(scope, "grouping", &qname, line)?;
        let id = self.alloc(line, qname, parent, BuilderKind::Grouping);
        match parent {
            Some(p) => self.arena[p.index()].groupings.push(id),
            None => self.root.groupings.push(id),
        }
        Ok(id)
    }

    /// Adds a `typedef` of type `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if a typedef with this name is
    /// already declared in the same scope and [`ErrorKind::InvalidParent`]
    /// under a node that cannot declare typedefs.
    pub fn add_typedef(&mut self, line: u32, qname: QName, ty: TypeSpec) -> Result<NodeId> {
        self.ensure_open(line)?;
        let parent = self.definition_parent(line, "typedef", &qname)?;
        let scope = match parent {
            Some(p) => &self.arena[p.index()].typedefs,
            None => &self.root.typedefs,
        };
        self.check_unique(scope, "typedef", &qname, line)?;
        let id = self.alloc(
            line,
            qname,
            parent,
            BuilderKind::Typedef {
                ty,
                units: None,
                default: None,
                resolved: None,
            },
        );
        match parent {
            Some(p) => self.arena[p.index()].typedefs.push(id),
            None => self.root.typedefs.push(id),
        }
        // Typedefs are always resolved by the types phase so that every
        // typedef, even an unrestricted builtin one, gets its own link.
        self.dirty_nodes.insert(id);
        Ok(id)
    }

    fn definition_parent(
        &self,
        line: u32,
        statement: &'static str,
        qname: &QName,
    ) -> Result<Option<NodeId>> {
        match self.actual_node() {
            None => Ok(None),
            Some(parent) => {
                let node = self.open_node(parent, line)?;
                if node.kind.holds_definitions() {
                    Ok(Some(parent))
                } else {
                    Err(self.invalid_parent(line, statement, qname))
                }
            }
        }
    }

    /// Adds a `uses` of the grouping named `grouping` (`name` or
    /// `prefix:name`).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] for a malformed name and
    /// [`ErrorKind::InvalidParent`] under a node that cannot hold data.
    pub fn add_uses_node(&mut self, line: u32, grouping: &str) -> Result<NodeId> {
        self.ensure_open(line)?;
        let reference = NodeRef::parse(grouping).map_err(|kind| kind.at(&*self.name, line))?;
        let qname = self.reference_qname(&reference);
        let parent = self.actual_node();
        if let Some(p) = parent {
            let node = self.open_node(p, line)?;
            if !node.kind.holds_data() {
                return Err(self.invalid_parent(line, "uses", &qname));
            }
        }
        let path = self.scope_path(parent);
        let id = self.alloc_at(
            line,
            qname,
            path,
            parent,
            BuilderKind::Uses {
                grouping: reference,
                grouping_path: None,
                refines: Vec::new(),
                augments: Vec::new(),
                expanded: false,
            },
        );
        match parent {
            Some(p) => self.arena[p.index()].uses.push(id),
            None => self.root.uses.push(id),
        }
        self.all_uses.push(id);
        Ok(id)
    }

    /// Adds a `refine` to the actual uses.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] outside a uses and
    /// [`ErrorKind::InvalidPath`] for a malformed target.
    pub fn add_refine(&mut self, line: u32, mut refine: Refine) -> Result<()> {
        self.ensure_open(line)?;
        refine.line = line;
        refine.parsed_target(&self.name)?;
        let qname = QName::unqualified(refine.target.as_str());
        let parent = self
            .actual_node()
            .ok_or_else(|| self.invalid_parent(line, "refine", &qname))?;
        self.open_node(parent, line)?;
        match &mut self.arena[parent.index()].kind {
            BuilderKind::Uses { refines, .. } => {
                refines.push(refine);
                Ok(())
            }
            _ => Err(self.invalid_parent(line, "refine", &qname)),
        }
    }

    /// Adds an `augment` of `target`.
    ///
    /// At module top level the target must be absolute; inside a uses it is
    /// relative to the node the uses instantiates into.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] for a malformed target and
    /// [`ErrorKind::InvalidParent`] anywhere but top level or a uses.
    pub fn add_augment(&mut self, line: u32, target: &str) -> Result<NodeId> {
        self.ensure_open(line)?;
        let raw = RawPath::parse(target).map_err(|kind| kind.at(&*self.name, line))?;
        let parent = self.actual_node();
        let base = match parent {
            None => SchemaPath::root(),
            Some(p) => {
                let node = self.open_node(p, line)?;
                if !matches!(node.kind, BuilderKind::Uses { .. }) {
                    let qname = QName::unqualified(target);
                    return Err(self.invalid_parent(line, "augment", &qname));
                }
                node.common.path.clone()
            }
        };
        if raw.absolute != parent.is_none() {
            return Err(ErrorKind::InvalidPath(target.to_string()).at(&*self.name, line));
        }
        let path = self.raw_path_guess(&raw, &base);
        let qname = path
            .last()
            .cloned()
            .unwrap_or_else(|| QName::unqualified(target));
        let id = self.alloc_at(
            line,
            qname,
            path,
            parent,
            BuilderKind::Augment {
                target: raw,
                when: None,
                resolved: false,
            },
        );
        match parent {
            Some(p) => {
                if let BuilderKind::Uses { augments, .. } = &mut self.arena[p.index()].kind {
                    augments.push(id);
                }
            }
            None => {
                self.root.augments.push(id);
                self.all_augments.push(id);
            }
        }
        Ok(id)
    }

    // =========================================================================
    // Top-level statements
    // =========================================================================

    /// Adds an `rpc`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if a data node, rpc or
    /// notification has the same name and [`ErrorKind::InvalidParent`] below
    /// top level.
    pub fn add_rpc(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_top_level(line, "rpc", &qname)?;
        self.check_unique_top_level("rpc", &qname, line)?;
        let id = self.alloc(line, qname, None, BuilderKind::Rpc);
        self.root.rpcs.push(id);
        Ok(id)
    }

    /// Adds the `input` of the actual rpc.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] outside an rpc and
    /// [`ErrorKind::DuplicateName`] for a second input.
    pub fn add_rpc_input(&mut self, line: u32) -> Result<NodeId> {
        self.add_rpc_io(line, ContainerRole::Input, "input")
    }

    /// Adds the `output` of the actual rpc.
    ///
    /// # Errors
    ///
    /// See [`Self::add_rpc_input`].
    pub fn add_rpc_output(&mut self, line: u32) -> Result<NodeId> {
        self.add_rpc_io(line, ContainerRole::Output, "output")
    }

    fn add_rpc_io(&mut self, line: u32, role: ContainerRole, keyword: &'static str) -> Result<NodeId> {
        self.ensure_open(line)?;
        let placeholder = self.qname(keyword);
        let parent = self
            .actual_node()
            .ok_or_else(|| self.invalid_parent(line, keyword, &placeholder))?;
        let node = self.open_node(parent, line)?;
        if !matches!(node.kind, BuilderKind::Rpc) {
            return Err(self.invalid_parent(line, keyword, &placeholder));
        }
        let qname = node.common.qname.sibling(keyword);
        self.check_unique(&node.children, keyword, &qname, line)?;
        let id = self.alloc(
            line,
            qname,
            Some(parent),
            BuilderKind::Container {
                role,
                presence: None,
            },
        );
        self.arena[parent.index()].children.push(id);
        Ok(id)
    }

    /// Adds a `notification`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_rpc`].
    pub fn add_notification(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_top_level(line, "notification", &qname)?;
        self.check_unique_top_level("notification", &qname, line)?;
        let id = self.alloc(line, qname, None, BuilderKind::Notification);
        self.root.notifications.push(id);
        Ok(id)
    }

    /// Adds a `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] for a second feature of the same
    /// name and [`ErrorKind::InvalidParent`] below top level.
    pub fn add_feature(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_top_level(line, "feature", &qname)?;
        self.check_unique(&self.root.features, "feature", &qname, line)?;
        let id = self.alloc(line, qname, None, BuilderKind::Feature);
        self.root.features.push(id);
        Ok(id)
    }

    /// Adds an `identity`.
    ///
    /// # Errors
    ///
    /// See [`Self::add_feature`].
    pub fn add_identity(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_top_level(line, "identity", &qname)?;
        self.check_unique(&self.root.identities, "identity", &qname, line)?;
        let id = self.alloc(
            line,
            qname,
            None,
            BuilderKind::Identity {
                base: None,
                resolved: None,
            },
        );
        self.root.identities.push(id);
        Ok(id)
    }

    /// Adds an `extension` definition.
    ///
    /// # Errors
    ///
    /// See [`Self::add_feature`].
    pub fn add_extension(&mut self, line: u32, qname: QName) -> Result<NodeId> {
        self.ensure_top_level(line, "extension", &qname)?;
        self.check_unique(&self.root.extensions, "extension", &qname, line)?;
        let id = self.alloc(
            line,
            qname,
            None,
            BuilderKind::Extension {
                argument: None,
                yin_element: false,
            },
        );
        self.root.extensions.push(id);
        Ok(id)
    }

    /// Adds a `deviation` of `target` with the given `deviate` keyword.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidDeviate`] for an unknown keyword,
    /// [`ErrorKind::InvalidPath`] for a malformed or relative target and
    /// [`ErrorKind::InvalidParent`] below top level.
    pub fn add_deviation(&mut self, line: u32, target: &str, deviate: &str) -> Result<NodeId> {
        let raw = RawPath::parse(target).map_err(|kind| kind.at(&*self.name, line))?;
        if !raw.absolute {
            return Err(ErrorKind::InvalidPath(target.to_string()).at(&*self.name, line));
        }
        let path = self.raw_path_guess(&raw, &SchemaPath::root());
        let qname = path
            .last()
            .cloned()
            .unwrap_or_else(|| QName::unqualified(target));
        self.ensure_top_level(line, "deviation", &qname)?;
        let deviate = DeviateKind::parse(deviate).map_err(|kind| kind.at(&*self.name, line))?;
        let id = self.alloc_at(
            line,
            qname,
            path,
            None,
            BuilderKind::Deviation {
                target: raw,
                deviate,
                properties: DeviateProperties::default(),
            },
        );
        self.root.deviations.push(id);
        Ok(id)
    }

    /// Adds an extension usage (`prefix:keyword argument;`) under the actual
    /// node.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] for a malformed node type.
    pub fn add_unknown_schema_node(
        &mut self,
        line: u32,
        node_type: &str,
        argument: Option<&str>,
    ) -> Result<NodeId> {
        self.ensure_open(line)?;
        let reference = NodeRef::parse(node_type).map_err(|kind| kind.at(&*self.name, line))?;
        let parent = self.actual_node();
        if let Some(p) = parent {
            self.open_node(p, line)?;
        }
        let qname = self.reference_qname(&reference);
        let id = self.alloc(
            line,
            qname,
            parent,
            BuilderKind::Unknown {
                node_type: reference,
                argument: argument.map(str::to_string),
                resolved: false,
            },
        );
        match parent {
            Some(p) => self.arena[p.index()].unknown_nodes.push(id),
            None => self.root.unknown_nodes.push(id),
        }
        self.all_unknown.push(id);
        Ok(id)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Sets `description`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] for a built node.
    pub fn set_description(&mut self, id: NodeId, description: impl Into<String>) -> Result<()> {
        let description = description.into();
        self.update(id, "description", |node| {
            node.common.description = Some(description);
            true
        })
    }

    /// Sets `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] for a built node.
    pub fn set_reference(&mut self, id: NodeId, reference: impl Into<String>) -> Result<()> {
        let reference = reference.into();
        self.update(id, "reference", |node| {
            node.common.reference = Some(reference);
            true
        })
    }

    /// Sets `status`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Frozen`] for a built node.
    pub fn set_status(&mut self, id: NodeId, status: Status) -> Result<()> {
        self.update(id, "status", |node| {
            node.common.status = status;
            true
        })
    }

    /// Sets `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for anything but a data node and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_config(&mut self, id: NodeId, config: bool) -> Result<()> {
        self.update(id, "config", |node| {
            if !node.kind.is_data_node() {
                return false;
            }
            node.common.config = Some(config);
            true
        })
    }

    /// Sets `when` on a data node or an augment.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_when(&mut self, id: NodeId, condition: impl Into<String>) -> Result<()> {
        let condition = condition.into();
        self.update(id, "when", |node| match &mut node.kind {
            BuilderKind::Augment { when, .. } => {
                *when = Some(condition);
                true
            }
            kind if kind.is_data_node() => {
                node.common.constraints.when = Some(condition);
                true
            }
            _ => false,
        })
    }

    /// Adds a `must`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for kinds without `must` and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn add_must(&mut self, id: NodeId, must: MustDefinition) -> Result<()> {
        self.update(id, "must", |node| {
            let allowed = matches!(
                node.kind,
                BuilderKind::Container { .. }
                    | BuilderKind::List { .. }
                    | BuilderKind::Leaf { .. }
                    | BuilderKind::LeafList { .. }
                    | BuilderKind::Anyxml
            );
            if allowed {
                node.common.constraints.must.push(must);
            }
            allowed
        })
    }

    /// Sets `mandatory` on a leaf, choice or anyxml.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_mandatory(&mut self, id: NodeId, mandatory: bool) -> Result<()> {
        self.update(id, "mandatory", |node| {
            let allowed = matches!(
                node.kind,
                BuilderKind::Leaf { .. } | BuilderKind::Choice { .. } | BuilderKind::Anyxml
            );
            if allowed {
                node.common.constraints.mandatory = mandatory;
            }
            allowed
        })
    }

    /// Sets `min-elements` on a list or leaf-list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_min_elements(&mut self, id: NodeId, min: u32) -> Result<()> {
        self.update(id, "min-elements", |node| {
            let allowed = matches!(
                node.kind,
                BuilderKind::List { .. } | BuilderKind::LeafList { .. }
            );
            if allowed {
                node.common.constraints.min_elements = Some(min);
            }
            allowed
        })
    }

    /// Sets `max-elements` on a list or leaf-list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_max_elements(&mut self, id: NodeId, max: u32) -> Result<()> {
        self.update(id, "max-elements", |node| {
            let allowed = matches!(
                node.kind,
                BuilderKind::List { .. } | BuilderKind::LeafList { .. }
            );
            if allowed {
                node.common.constraints.max_elements = Some(max);
            }
            allowed
        })
    }

    /// Sets `presence` on a container.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_presence(&mut self, id: NodeId, presence: impl Into<String>) -> Result<()> {
        let presence = presence.into();
        self.update(id, "presence", |node| match &mut node.kind {
            BuilderKind::Container {
                role: ContainerRole::Data,
                presence: p,
            } => {
                *p = Some(presence);
                true
            }
            _ => false,
        })
    }

    /// Sets the `key` of a list from its space-separated argument.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_keys(&mut self, id: NodeId, keys: &str) -> Result<()> {
        self.update(id, "key", |node| match &mut node.kind {
            BuilderKind::List { keys: k, .. } => {
                *k = keys.split_whitespace().map(str::to_string).collect();
                true
            }
            _ => false,
        })
    }

    /// Sets `ordered-by user` on a list or leaf-list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_ordered_by_user(&mut self, id: NodeId, user: bool) -> Result<()> {
        self.update(id, "ordered-by", |node| match &mut node.kind {
            BuilderKind::List { user_ordered, .. } | BuilderKind::LeafList { user_ordered, .. } => {
                *user_ordered = user;
                true
            }
            _ => false,
        })
    }

    /// Replaces the type of a leaf, leaf-list or typedef.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_type(&mut self, id: NodeId, spec: TypeSpec) -> Result<()> {
        let dirty = spec.needs_resolution();
        let mut is_typedef = false;
        self.update(id, "type", |node| match &mut node.kind {
            BuilderKind::Leaf { ty, .. } | BuilderKind::LeafList { ty, .. } => {
                *ty = spec;
                true
            }
            BuilderKind::Typedef { ty, resolved, .. } => {
                *ty = spec;
                *resolved = None;
                is_typedef = true;
                true
            }
            _ => false,
        })?;
        if dirty || is_typedef {
            self.dirty_nodes.insert(id);
        } else {
            self.dirty_nodes.remove(&id);
        }
        Ok(())
    }

    /// Sets `default` on a leaf or typedef, or the default case of a choice.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_default(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(id, "default", |node| match &mut node.kind {
            BuilderKind::Leaf { default, .. } | BuilderKind::Typedef { default, .. } => {
                *default = Some(value);
                true
            }
            BuilderKind::Choice { default_case } => {
                *default_case = Some(value);
                true
            }
            _ => false,
        })
    }

    /// Sets `units` on a leaf, leaf-list or typedef.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_units(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(id, "units", |node| match &mut node.kind {
            BuilderKind::Leaf { units, .. }
            | BuilderKind::LeafList { units, .. }
            | BuilderKind::Typedef { units, .. } => {
                *units = Some(value);
                true
            }
            _ => false,
        })
    }

    /// Sets the `base` of an identity (`name` or `prefix:name`).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] for a malformed name,
    /// [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_identity_base(&mut self, id: NodeId, base: &str) -> Result<()> {
        let line = self.node_ref(id)?.common.line;
        let reference = NodeRef::parse(base).map_err(|kind| kind.at(&*self.name, line))?;
        self.update(id, "base", |node| match &mut node.kind {
            BuilderKind::Identity { base, resolved } => {
                *base = Some(reference);
                *resolved = None;
                true
            }
            _ => false,
        })
    }

    /// Sets `argument` and `yin-element` of an extension definition.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_extension_argument(
        &mut self,
        id: NodeId,
        argument: impl Into<String>,
        yin_element: bool,
    ) -> Result<()> {
        let value = argument.into();
        self.update(id, "argument", |node| match &mut node.kind {
            BuilderKind::Extension {
                argument,
                yin_element: yin,
            } => {
                *argument = Some(value);
                *yin = yin_element;
                true
            }
            _ => false,
        })
    }

    /// Sets the properties of a deviation's `deviate` statement.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParent`] for other kinds and
    /// [`ErrorKind::Frozen`] for a built node.
    pub fn set_deviate_properties(
        &mut self,
        id: NodeId,
        properties: DeviateProperties,
    ) -> Result<()> {
        self.update(id, "deviate", |node| match &mut node.kind {
            BuilderKind::Deviation { properties: p, .. } => {
                *p = properties;
                true
            }
            _ => false,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The builder with this id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeBuilder> {
        self.arena.get(id.index())
    }

    /// Number of builders in the arena, including removed ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Top-level data nodes, in declaration order.
    #[must_use]
    pub fn top_level_children(&self) -> &[NodeId] {
        &self.root.children
    }

    /// Top-level typedefs.
    #[must_use]
    pub fn top_level_typedefs(&self) -> &[NodeId] {
        &self.root.typedefs
    }

    /// Top-level groupings.
    #[must_use]
    pub fn top_level_groupings(&self) -> &[NodeId] {
        &self.root.groupings
    }

    /// Rpcs.
    #[must_use]
    pub fn rpcs(&self) -> &[NodeId] {
        &self.root.rpcs
    }

    /// Identities.
    #[must_use]
    pub fn identities(&self) -> &[NodeId] {
        &self.root.identities
    }

    /// Deviations.
    #[must_use]
    pub fn deviations(&self) -> &[NodeId] {
        &self.root.deviations
    }

    /// Top-level augments, in declaration order.
    #[must_use]
    pub fn all_augments(&self) -> &[NodeId] {
        &self.all_augments
    }

    /// Every uses, in declaration order.
    #[must_use]
    pub fn all_uses_nodes(&self) -> &[NodeId] {
        &self.all_uses
    }

    /// Every extension usage, in declaration order.
    #[must_use]
    pub fn all_unknown_nodes(&self) -> &[NodeId] {
        &self.all_unknown
    }

    /// Number of top-level augments grafted so far.
    #[must_use]
    pub fn augments_resolved(&self) -> usize {
        self.augments_resolved
    }

    /// Builders still waiting for type resolution.
    pub fn dirty_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty_nodes.iter().copied()
    }

    /// Finds a child by local name; `None` as parent means top level, where
    /// rpcs and notifications are found as well.
    #[must_use]
    pub fn find_child(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        match parent {
            None => self
                .find_named(&self.root.children, name)
                .or_else(|| self.find_named(&self.root.rpcs, name))
                .or_else(|| self.find_named(&self.root.notifications, name)),
            Some(p) => {
                let node = self.node(p)?;
                self.find_named(&node.children, name)
            }
        }
    }

    /// Follows local names from the top level.
    #[must_use]
    pub fn find_path(&self, names: &[&str]) -> Option<NodeId> {
        let mut current = None;
        for name in names {
            current = Some(self.find_child(current, name)?);
        }
        current
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn find_named(&self, ids: &[NodeId], name: &str) -> Option<NodeId> {
        ids.iter()
            .copied()
            .find(|id| self.arena[id.index()].common.qname.local_name() == name)
    }

    fn check_unique(
        &self,
        ids: &[NodeId],
        statement: &'static str,
        qname: &QName,
        line: u32,
    ) -> Result<()> {
        match self.find_named(ids, qname.local_name()) {
            Some(first) => Err(CompileError::duplicate(
                &*self.name,
                line,
                statement,
                qname.local_name(),
                self.arena[first.index()].common.line,
            )),
            None => Ok(()),
        }
    }

    /// Data nodes, rpcs and notifications share one namespace at top level.
    fn check_unique_top_level(&self, statement: &'static str, qname: &QName, line: u32) -> Result<()> {
        self.check_unique(&self.root.children, statement, qname, line)?;
        self.check_unique(&self.root.rpcs, statement, qname, line)?;
        self.check_unique(&self.root.notifications, statement, qname, line)
    }

    fn ensure_open(&self, line: u32) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(ErrorKind::Frozen.at(&*self.name, line));
        }
        Ok(())
    }

    fn ensure_top_level(&self, line: u32, statement: &'static str, qname: &QName) -> Result<()> {
        self.ensure_open(line)?;
        if self.actual_node().is_some() {
            return Err(self.invalid_parent(line, statement, qname));
        }
        Ok(())
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&NodeBuilder> {
        self.arena.get(id.index()).ok_or_else(|| {
            CompileError::internal(&*self.name, 0, format!("unknown builder {id:?}"))
        })
    }

    /// A parent that new statements may be added to.
    fn open_node(&self, id: NodeId, line: u32) -> Result<&NodeBuilder> {
        let node = self.node_ref(id)?;
        if node.snapshot.is_some() {
            return Err(ErrorKind::Frozen.at(&*self.name, line));
        }
        Ok(node)
    }

    fn update(
        &mut self,
        id: NodeId,
        statement: &'static str,
        f: impl FnOnce(&mut NodeBuilder) -> bool,
    ) -> Result<()> {
        let line = self.open_node(id, 0)?.common.line;
        self.ensure_open(line)?;
        let node = &mut self.arena[id.index()];
        if f(node) {
            Ok(())
        } else {
            let qname = node.common.qname.clone();
            Err(self.invalid_parent(line, statement, &qname))
        }
    }

    fn invalid_parent(&self, line: u32, statement: &'static str, qname: &QName) -> CompileError {
        CompileError::invalid_parent(&*self.name, line, statement, qname.local_name())
    }

    /// Path of nodes declared directly under `parent`.
    pub(crate) fn scope_path(&self, parent: Option<NodeId>) -> SchemaPath {
        parent.map_or_else(SchemaPath::root, |p| self.arena[p.index()].common.path.clone())
    }

    pub(crate) fn alloc(
        &mut self,
        line: u32,
        qname: QName,
        parent: Option<NodeId>,
        kind: BuilderKind,
    ) -> NodeId {
        let path = self.scope_path(parent).child(qname.clone());
        self.alloc_at(line, qname, path, parent, kind)
    }

    fn alloc_at(
        &mut self,
        line: u32,
        qname: QName,
        path: SchemaPath,
        parent: Option<NodeId>,
        kind: BuilderKind,
    ) -> NodeId {
        let id = NodeId::from_index(self.arena.len());
        self.arena.push(NodeBuilder::new(
            BuilderCommon {
                module: self.name.clone(),
                line,
                qname,
                path,
                description: None,
                reference: None,
                status: Status::Current,
                parent,
                config: None,
                constraints: yangforge_model::Constraints::default(),
                augmenting: false,
                added_by_uses: false,
            },
            kind,
        ));
        id
    }

    /// One of the lists of a scope; `None` is module top level.
    pub(crate) fn scope_list(&self, parent: Option<NodeId>, slot: Slot) -> &[NodeId] {
        match parent {
            Some(p) => {
                let node = &self.arena[p.index()];
                match slot {
                    Slot::Children => &node.children,
                    Slot::Typedefs => &node.typedefs,
                    Slot::Groupings => &node.groupings,
                    Slot::Uses => &node.uses,
                }
            }
            None => match slot {
                Slot::Children => &self.root.children,
                Slot::Typedefs => &self.root.typedefs,
                Slot::Groupings => &self.root.groupings,
                Slot::Uses => &self.root.uses,
            },
        }
    }

    pub(crate) fn scope_list_mut(&mut self, parent: Option<NodeId>, slot: Slot) -> &mut Vec<NodeId> {
        match parent {
            Some(p) => {
                let node = &mut self.arena[p.index()];
                match slot {
                    Slot::Children => &mut node.children,
                    Slot::Typedefs => &mut node.typedefs,
                    Slot::Groupings => &mut node.groupings,
                    Slot::Uses => &mut node.uses,
                }
            }
            None => match slot {
                Slot::Children => &mut self.root.children,
                Slot::Typedefs => &mut self.root.typedefs,
                Slot::Groupings => &mut self.root.groupings,
                Slot::Uses => &mut self.root.uses,
            },
        }
    }

    /// Adds an extension usage below `parent` during resolution.
    pub(crate) fn attach_unknown(
        &mut self,
        parent: NodeId,
        line: u32,
        node_type: NodeRef,
        argument: Option<String>,
    ) -> NodeId {
        let qname = self.reference_qname(&node_type);
        let id = self.alloc(
            line,
            qname,
            Some(parent),
            BuilderKind::Unknown {
                node_type,
                argument,
                resolved: false,
            },
        );
        self.arena[parent.index()].unknown_nodes.push(id);
        self.all_unknown.push(id);
        id
    }

    /// QName of a reference, assuming the module's own namespace for
    /// unprefixed names and the own prefix. Other prefixes stay unqualified
    /// until the resolver knows the imported module.
    pub(crate) fn reference_qname(&self, reference: &NodeRef) -> QName {
        match reference.prefix.as_deref() {
            None => self.qname(&reference.name),
            Some(prefix) if prefix == self.prefix => self.qname(&reference.name),
            Some(prefix) => QName::unqualified(reference.name.as_str()).with_prefix(prefix),
        }
    }

    /// Best-effort path of a raw path before imports are resolved.
    pub(crate) fn raw_path_guess(&self, raw: &RawPath, base: &SchemaPath) -> SchemaPath {
        let mut path = if raw.absolute {
            SchemaPath::root()
        } else {
            base.clone()
        };
        for segment in &raw.segments {
            path = path.child(self.reference_qname(segment));
        }
        path
    }
}
