//! Qualified names.
//!
//! Every schema construct is identified by a [`QName`]: the namespace of the
//! module that defines it, that module's revision, and a local name. The
//! prefix is carried along for diagnostics and for resolving references that
//! were written as `prefix:name`, but it never takes part in equality.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A module revision date in `YYYY-MM-DD` form.
///
/// Revisions compare lexicographically, which matches chronological order for
/// well-formed dates.
pub type Revision = Arc<str>;

/// A namespace-qualified identifier.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QName {
    namespace: Arc<str>,
    revision: Option<Revision>,
    local_name: Arc<str>,
    prefix: Option<Arc<str>>,
}

impl QName {
    /// Creates a new qualified name without a prefix.
    #[must_use]
    pub fn new(
        namespace: impl Into<Arc<str>>,
        revision: Option<Revision>,
        local_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            revision,
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Creates a qualified name with an empty namespace.
    ///
    /// Used for names whose namespace is filled in later, e.g. the node type
    /// of an extension usage before its prefix is resolved.
    #[must_use]
    pub fn unqualified(local_name: impl Into<Arc<str>>) -> Self {
        Self::new("", None, local_name)
    }

    /// Sets the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<Arc<str>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns a copy of this name with a different local name, in the same
    /// namespace and revision.
    #[must_use]
    pub fn sibling(&self, local_name: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            revision: self.revision.clone(),
            local_name: local_name.into(),
            prefix: self.prefix.clone(),
        }
    }

    /// The module namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The module revision, if the module declares one.
    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// The local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The prefix this name was written with, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns true if the namespace has not been filled in.
    #[must_use]
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.revision == other.revision
            && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.revision.hash(state);
        self.local_name.hash(state);
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    /// Local name first so that sorted sibling sets read alphabetically.
    fn cmp(&self, other: &Self) -> Ordering {
        self.local_name
            .cmp(&other.local_name)
            .then_with(|| self.namespace.cmp(&other.namespace))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.namespace)?;
        if let Some(rev) = &self.revision {
            write!(f, "?revision={rev}")?;
        }
        write!(f, "){}", self.local_name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}
