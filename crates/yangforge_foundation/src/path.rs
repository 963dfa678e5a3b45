//! Schema paths and unresolved node references.
//!
//! [`SchemaPath`] is the resolved form: a sequence of [`QName`]s from the
//! schema root. [`RawPath`] and [`NodeRef`] are the textual forms produced by
//! the statement walker (`"/if:interfaces/if:interface"`, `"pfx:grouping"`),
//! which the resolution engine turns into `SchemaPath`s once the referenced
//! modules are known.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::qname::QName;

// =============================================================================
// SchemaPath
// =============================================================================

/// Ordered path of qualified names locating a node in the schema tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaPath {
    segments: Vec<QName>,
    absolute: bool,
}

impl SchemaPath {
    /// The absolute path of the schema root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            absolute: true,
        }
    }

    /// Creates a path from segments.
    #[must_use]
    pub fn new(segments: Vec<QName>, absolute: bool) -> Self {
        Self { segments, absolute }
    }

    /// Returns a new path with `qname` appended.
    #[must_use]
    pub fn child(&self, qname: QName) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(qname);
        Self {
            segments,
            absolute: self.absolute,
        }
    }

    /// Returns the path of the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            absolute: self.absolute,
        })
    }

    /// The last segment.
    #[must_use]
    pub fn last(&self) -> Option<&QName> {
        self.segments.last()
    }

    /// All segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[QName] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path is anchored at the schema root.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Returns true if `prefix` is an ancestor-or-self of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &SchemaPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if self.absolute || i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

// =============================================================================
// NodeRef
// =============================================================================

/// An unresolved `prefix:name` reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRef {
    /// The prefix, if the reference was written with one.
    pub prefix: Option<String>,
    /// The local name.
    pub name: String,
}

impl NodeRef {
    /// Creates a reference without a prefix.
    #[must_use]
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
        }
    }

    /// Creates a prefixed reference.
    #[must_use]
    pub fn prefixed(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            name: name.into(),
        }
    }

    /// Parses `name` or `prefix:name`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] for empty input, an empty prefix or
    /// name, or more than one `:`.
    pub fn parse(text: &str) -> Result<Self, ErrorKind> {
        let text = text.trim();
        let mut parts = text.split(':');
        let first = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (None, _) if !first.is_empty() => Ok(Self::local(first)),
            (Some(name), None) if !first.is_empty() && !name.is_empty() => {
                Ok(Self::prefixed(first, name))
            }
            _ => Err(ErrorKind::InvalidPath(text.to_string())),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

// =============================================================================
// RawPath
// =============================================================================

/// An unresolved schema node identifier such as `/a:top/a:inner` or `inner/leaf`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawPath {
    /// Whether the path started with `/`.
    pub absolute: bool,
    /// Path segments in order.
    pub segments: Vec<NodeRef>,
}

impl RawPath {
    /// Parses a slash-separated path.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] if the path has no segments or any
    /// segment is malformed.
    pub fn parse(text: &str) -> Result<Self, ErrorKind> {
        let trimmed = text.trim();
        let absolute = trimmed.starts_with('/');
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(ErrorKind::InvalidPath(text.to_string()));
        }
        let segments = body
            .split('/')
            .map(|segment| {
                NodeRef::parse(segment).map_err(|_| ErrorKind::InvalidPath(text.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { absolute, segments })
    }

    /// The first segment's prefix, if any.
    #[must_use]
    pub fn first_prefix(&self) -> Option<&str> {
        self.segments.first().and_then(|s| s.prefix.as_deref())
    }

    /// The last segment.
    #[must_use]
    pub fn last(&self) -> Option<&NodeRef> {
        self.segments.last()
    }
}

impl fmt::Display for RawPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if self.absolute || i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
