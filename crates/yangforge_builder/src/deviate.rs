//! Properties carried by `deviate add`, `deviate replace` and `deviate delete`.

use yangforge_foundation::{CompileError, Result};
use yangforge_model::{DeviateKind, MustDefinition};

use crate::arena::{BuilderKind, NodeBuilder};
use crate::type_spec::TypeSpec;

/// The substatements of a `deviate` statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviateProperties {
    pub(crate) config: Option<bool>,
    pub(crate) default: Option<String>,
    pub(crate) mandatory: Option<bool>,
    pub(crate) min_elements: Option<u32>,
    pub(crate) max_elements: Option<u32>,
    pub(crate) units: Option<String>,
    pub(crate) must: Vec<MustDefinition>,
    pub(crate) ty: Option<TypeSpec>,
}

impl DeviateProperties {
    /// Creates empty properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `config`.
    #[must_use]
    pub fn with_config(mut self, config: bool) -> Self {
        self.config = Some(config);
        self
    }

    /// `default`.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// `mandatory`.
    #[must_use]
    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = Some(mandatory);
        self
    }

    /// `min-elements`.
    #[must_use]
    pub fn with_min_elements(mut self, min: u32) -> Self {
        self.min_elements = Some(min);
        self
    }

    /// `max-elements`.
    #[must_use]
    pub fn with_max_elements(mut self, max: u32) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// `units`.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// `must`.
    #[must_use]
    pub fn with_must(mut self, must: MustDefinition) -> Self {
        self.must.push(must);
        self
    }

    /// `type`; only meaningful for `deviate replace`.
    #[must_use]
    pub fn with_type(mut self, ty: TypeSpec) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Applies the properties to `node`.
    ///
    /// `add` and `replace` set what is given, `add` appending `must`s;
    /// `delete` clears what is given, removing `must`s by expression. A
    /// replacement type must already be resolved by the caller.
    pub(crate) fn apply(
        &self,
        deviate: DeviateKind,
        node: &mut NodeBuilder,
        module: &str,
        line: u32,
    ) -> Result<()> {
        let name = node.common.qname.local_name().to_string();
        let not_here = |statement: &'static str| {
            CompileError::invalid_parent(module, line, statement, name.clone())
        };
        let delete = deviate == DeviateKind::Delete;

        if let Some(config) = self.config {
            node.common.config = (!delete).then_some(config);
        }
        if let Some(mandatory) = self.mandatory {
            node.common.constraints.mandatory = !delete && mandatory;
        }
        if let Some(min) = self.min_elements {
            node.common.constraints.min_elements = (!delete).then_some(min);
        }
        if let Some(max) = self.max_elements {
            node.common.constraints.max_elements = (!delete).then_some(max);
        }
        if let Some(value) = &self.default {
            let value = (!delete).then(|| value.clone());
            match &mut node.kind {
                BuilderKind::Leaf { default, .. } | BuilderKind::Typedef { default, .. } => {
                    *default = value;
                }
                BuilderKind::Choice { default_case } => *default_case = value,
                _ => return Err(not_here("default")),
            }
        }
        if let Some(value) = &self.units {
            let value = (!delete).then(|| value.clone());
            match &mut node.kind {
                BuilderKind::Leaf { units, .. } | BuilderKind::LeafList { units, .. } => {
                    *units = value;
                }
                _ => return Err(not_here("units")),
            }
        }
        if !self.must.is_empty() {
            let must = &mut node.common.constraints.must;
            match deviate {
                DeviateKind::Delete => {
                    must.retain(|m| !self.must.iter().any(|d| d.xpath == m.xpath));
                }
                DeviateKind::Replace => *must = self.must.clone(),
                _ => must.extend(self.must.iter().cloned()),
            }
        }
        if let Some(spec) = &self.ty {
            match &mut node.kind {
                BuilderKind::Leaf { ty, .. } | BuilderKind::LeafList { ty, .. } => {
                    *ty = spec.clone();
                }
                _ => return Err(not_here("type")),
            }
        }
        Ok(())
    }
}
