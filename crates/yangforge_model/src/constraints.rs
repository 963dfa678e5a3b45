//! Cardinality, `when` and `must` constraints attached to data nodes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A `must` statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MustDefinition {
    /// The XPath expression.
    pub xpath: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional reference.
    pub reference: Option<String>,
    /// `error-app-tag` substatement.
    pub error_app_tag: Option<String>,
    /// `error-message` substatement.
    pub error_message: Option<String>,
}

impl MustDefinition {
    /// Creates a `must` with just an expression.
    #[must_use]
    pub fn new(xpath: impl Into<String>) -> Self {
        Self {
            xpath: xpath.into(),
            ..Self::default()
        }
    }

    /// Sets the error message.
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Sets the error app tag.
    #[must_use]
    pub fn with_error_app_tag(mut self, tag: impl Into<String>) -> Self {
        self.error_app_tag = Some(tag.into());
        self
    }
}

/// Constraints of a data node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constraints {
    /// `min-elements`, for lists and leaf-lists.
    pub min_elements: Option<u32>,
    /// `max-elements`, for lists and leaf-lists. `None` means unbounded.
    pub max_elements: Option<u32>,
    /// `mandatory`, for leaves, choices and anyxml.
    pub mandatory: bool,
    /// The `when` condition.
    pub when: Option<String>,
    /// All `must` statements, in declaration order.
    pub must: Vec<MustDefinition>,
}

impl Constraints {
    /// Creates empty constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `min-elements`.
    #[must_use]
    pub fn with_min_elements(mut self, min: u32) -> Self {
        self.min_elements = Some(min);
        self
    }

    /// Sets `max-elements`.
    #[must_use]
    pub fn with_max_elements(mut self, max: u32) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Sets `mandatory`.
    #[must_use]
    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Sets the `when` condition.
    #[must_use]
    pub fn with_when(mut self, when: impl Into<String>) -> Self {
        self.when = Some(when.into());
        self
    }

    /// Adds a `must` statement.
    #[must_use]
    pub fn with_must(mut self, must: MustDefinition) -> Self {
        self.must.push(must);
        self
    }

    /// Returns true if `count` instances satisfy min/max-elements.
    #[must_use]
    pub fn allows_count(&self, count: u32) -> bool {
        self.min_elements.is_none_or(|min| count >= min)
            && self.max_elements.is_none_or(|max| count <= max)
    }
}
