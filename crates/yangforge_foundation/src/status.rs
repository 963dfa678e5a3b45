//! Definition status.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// The `status` of a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Valid in new implementations.
    #[default]
    Current,
    /// Still valid, but may be removed.
    Deprecated,
    /// No longer valid.
    Obsolete,
}

impl Status {
    /// Parses a status keyword.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidStatus`] for anything other than `current`,
    /// `deprecated` or `obsolete`.
    pub fn parse(keyword: &str) -> Result<Self, ErrorKind> {
        match keyword.trim() {
            "current" => Ok(Self::Current),
            "deprecated" => Ok(Self::Deprecated),
            "obsolete" => Ok(Self::Obsolete),
            other => Err(ErrorKind::InvalidStatus(other.to_string())),
        }
    }

    /// The keyword for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Deprecated => "deprecated",
            Self::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
