//! `refine` statements of a `uses`.
//!
//! A refine overrides properties of one node copied in from the grouping.
//! It is applied to the copy only, never to the grouping itself.

use yangforge_foundation::{CompileError, NodeRef, RawPath, Result};
use yangforge_model::MustDefinition;

use crate::arena::{BuilderKind, NodeBuilder};

/// A `refine` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Refine {
    pub(crate) target: String,
    pub(crate) line: u32,
    pub(crate) description: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) config: Option<bool>,
    pub(crate) mandatory: Option<bool>,
    pub(crate) presence: Option<String>,
    pub(crate) default: Option<String>,
    pub(crate) min_elements: Option<u32>,
    pub(crate) max_elements: Option<u32>,
    pub(crate) must: Vec<MustDefinition>,
    pub(crate) extensions: Vec<(NodeRef, Option<String>)>,
}

impl Refine {
    /// Creates a refine of the node at `target`, relative to the using node.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            line: 0,
            description: None,
            reference: None,
            config: None,
            mandatory: None,
            presence: None,
            default: None,
            min_elements: None,
            max_elements: None,
            must: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// The target as written.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Source line of the refine statement.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Overrides `description`.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides `reference`.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Overrides `config`.
    #[must_use]
    pub fn with_config(mut self, config: bool) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides `mandatory`.
    #[must_use]
    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = Some(mandatory);
        self
    }

    /// Overrides `presence`.
    #[must_use]
    pub fn with_presence(mut self, presence: impl Into<String>) -> Self {
        self.presence = Some(presence.into());
        self
    }

    /// Overrides `default`.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Overrides `min-elements`.
    #[must_use]
    pub fn with_min_elements(mut self, min: u32) -> Self {
        self.min_elements = Some(min);
        self
    }

    /// Overrides `max-elements`.
    #[must_use]
    pub fn with_max_elements(mut self, max: u32) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Adds a `must`.
    #[must_use]
    pub fn with_must(mut self, must: MustDefinition) -> Self {
        self.must.push(must);
        self
    }

    /// Adds an extension usage, e.g. `("ext:hidden", None)`.
    ///
    /// # Errors
    ///
    /// Returns [`yangforge_foundation::ErrorKind::InvalidPath`] if the node
    /// type is not `name` or `prefix:name`.
    pub fn with_extension(
        mut self,
        node_type: &str,
        argument: Option<&str>,
    ) -> std::result::Result<Self, yangforge_foundation::ErrorKind> {
        let node_type = NodeRef::parse(node_type)?;
        self.extensions
            .push((node_type, argument.map(str::to_string)));
        Ok(self)
    }

    pub(crate) fn parsed_target(&self, module: &str) -> Result<RawPath> {
        RawPath::parse(&self.target).map_err(|kind| kind.at(module, self.line))
    }

    /// Applies every property to `node`.
    ///
    /// Extension usages are left to the caller, since they need new builders.
    pub(crate) fn apply(&self, node: &mut NodeBuilder, module: &str) -> Result<()> {
        let name = node.common.qname.local_name().to_string();
        let not_here = |statement: &'static str| {
            CompileError::invalid_parent(module, self.line, statement, name.clone())
        };

        if let Some(description) = &self.description {
            node.common.description = Some(description.clone());
        }
        if let Some(reference) = &self.reference {
            node.common.reference = Some(reference.clone());
        }
        if let Some(config) = self.config {
            node.common.config = Some(config);
        }
        if let Some(mandatory) = self.mandatory {
            match node.kind {
                BuilderKind::Leaf { .. } | BuilderKind::Choice { .. } | BuilderKind::Anyxml => {
                    node.common.constraints.mandatory = mandatory;
                }
                _ => return Err(not_here("mandatory")),
            }
        }
        if let Some(presence) = &self.presence {
            match &mut node.kind {
                BuilderKind::Container { presence: p, .. } => *p = Some(presence.clone()),
                _ => return Err(not_here("presence")),
            }
        }
        if let Some(value) = &self.default {
            match &mut node.kind {
                BuilderKind::Leaf { default, .. } => *default = Some(value.clone()),
                BuilderKind::Choice { default_case } => *default_case = Some(value.clone()),
                _ => return Err(not_here("default")),
            }
        }
        if self.min_elements.is_some() || self.max_elements.is_some() {
            if !matches!(node.kind, BuilderKind::List { .. } | BuilderKind::LeafList { .. }) {
                let statement = if self.min_elements.is_some() {
                    "min-elements"
                } else {
                    "max-elements"
                };
                return Err(not_here(statement));
            }
            if let Some(min) = self.min_elements {
                node.common.constraints.min_elements = Some(min);
            }
            if let Some(max) = self.max_elements {
                node.common.constraints.max_elements = Some(max);
            }
        }
        if !self.must.is_empty() {
            match node.kind {
                BuilderKind::Container { .. }
                | BuilderKind::List { .. }
                | BuilderKind::Leaf { .. }
                | BuilderKind::LeafList { .. }
                | BuilderKind::Anyxml => {
                    node.common.constraints.must.extend(self.must.iter().cloned());
                }
                _ => return Err(not_here("must")),
            }
        }
        Ok(())
    }
}
