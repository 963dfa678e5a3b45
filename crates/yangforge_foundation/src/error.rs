//! Error types for schema compilation.
//!
//! Uses `thiserror` for ergonomic error definition. Every error carries the
//! module it was raised in and the source line of the offending statement.

use std::fmt;

use thiserror::Error;

/// Result type for builder and resolution operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// A compilation error located at a statement of a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{module}:{line}: {kind}")]
pub struct CompileError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Name of the module being compiled.
    pub module: String,
    /// Source line of the statement that caused the error.
    pub line: u32,
}

impl CompileError {
    /// Creates a new error.
    #[must_use]
    pub fn new(kind: ErrorKind, module: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            module: module.into(),
            line,
        }
    }

    /// Creates a duplicate-name error.
    #[must_use]
    pub fn duplicate(
        module: impl Into<String>,
        line: u32,
        statement: &'static str,
        name: impl Into<String>,
        first_line: u32,
    ) -> Self {
        Self::new(
            ErrorKind::DuplicateName {
                statement,
                name: name.into(),
                first_line,
            },
            module,
            line,
        )
    }

    /// Creates an invalid-parent error.
    #[must_use]
    pub fn invalid_parent(
        module: impl Into<String>,
        line: u32,
        statement: &'static str,
        name: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorKind::InvalidParent {
                statement,
                name: name.into(),
            },
            module,
            line,
        )
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(module: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()), module, line)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A sibling with the same local name already exists in the same scope.
    #[error("{statement} with same name '{name}' already declared at line {first_line}")]
    DuplicateName {
        /// The statement keyword being added.
        statement: &'static str,
        /// The conflicting local name.
        name: String,
        /// Line of the first declaration.
        first_line: u32,
    },

    /// A statement appeared under a parent that cannot hold it.
    #[error("{statement} '{name}' can not be defined here")]
    InvalidParent {
        /// The statement keyword being added.
        statement: &'static str,
        /// Name or argument of the statement.
        name: String,
    },

    /// A `uses` names a grouping that does not exist.
    #[error("grouping '{0}' not found")]
    UnresolvedGrouping(String),

    /// A `uses` chain never becomes expandable (grouping uses itself).
    #[error("grouping '{0}' is used recursively")]
    CyclicGrouping(String),

    /// An augmentation target could not be located.
    #[error("failed to resolve augment target '{0}'")]
    UnresolvedAugment(String),

    /// An augmentation target exists but cannot hold children.
    #[error("augment target '{0}' can not be augmented")]
    InvalidAugmentTarget(String),

    /// A type reference could not be resolved.
    #[error("failed to resolve type '{0}'")]
    UnresolvedType(String),

    /// An identity reference could not be resolved.
    #[error("failed to resolve identity '{0}'")]
    UnresolvedIdentity(String),

    /// Identity bases form a cycle.
    #[error("identity '{0}' is its own base")]
    CyclicIdentity(String),

    /// A deviation target could not be located.
    #[error("failed to resolve deviation target '{0}'")]
    UnresolvedDeviation(String),

    /// A leafref path names no leaf or leaf-list.
    #[error("failed to resolve leafref path '{0}'")]
    UnresolvedLeafref(String),

    /// An unknown `deviate` keyword.
    #[error("unsupported deviate value '{0}'")]
    InvalidDeviate(String),

    /// An unknown `status` keyword.
    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    /// A prefix is neither the module's own nor an import's.
    #[error("no import found with prefix '{0}'")]
    UnknownPrefix(String),

    /// An import uses the module's own prefix.
    #[error("import prefix '{0}' is the module's own prefix")]
    PrefixClash(String),

    /// An imported module is not part of the compilation.
    #[error("failed to find dependent module '{0}'")]
    MissingModule(String),

    /// A path or reference is malformed.
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    /// A refine names a node the grouping does not contain.
    #[error("refine target '{0}' not found")]
    RefineTargetNotFound(String),

    /// The builder was already built; it must be rebuilt explicitly.
    #[error("builder is frozen; call rebuild to modify it")]
    Frozen,

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Attaches a location, producing a [`CompileError`].
    #[must_use]
    pub fn at(self, module: impl Into<String>, line: u32) -> CompileError {
        CompileError::new(self, module, line)
    }
}

/// The non-empty list of errors a failed compilation reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CompileErrors {
    errors: Vec<CompileError>,
}

impl CompileErrors {
    /// Wraps a list of errors.
    ///
    /// Returns `None` if the list is empty, since a failed compilation always
    /// has at least one cause.
    #[must_use]
    pub fn new(errors: Vec<CompileError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// All errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// The first error.
    #[must_use]
    pub fn first(&self) -> &CompileError {
        &self.errors[0]
    }

    /// Number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any error matches `pred`.
    pub fn any(&self, pred: impl Fn(&ErrorKind) -> bool) -> bool {
        self.errors.iter().any(|e| pred(&e.kind))
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, CompileError> {
        self.errors.iter()
    }

    /// Source lines of all errors, sorted.
    #[must_use]
    pub fn lines(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self.errors.iter().map(|e| e.line).collect();
        lines.sort_unstable();
        lines
    }
}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a CompileError;
    type IntoIter = std::slice::Iter<'a, CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<CompileError> for CompileErrors {
    fn from(error: CompileError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for CompileErrors {
    type Item = CompileError;
    type IntoIter = std::vec::IntoIter<CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
