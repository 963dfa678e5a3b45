//! Qualified names, schema paths, and compile errors for yangforge.
//!
//! This crate provides:
//! - [`QName`] - Namespace-qualified identifiers used as node identity
//! - [`SchemaPath`] - Resolved paths from the schema root
//! - [`RawPath`] / [`NodeRef`] - Unresolved textual references
//! - [`Status`] - Definition status
//! - [`CompileError`] - Located compilation errors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod path;
pub mod qname;
pub mod status;

pub use error::{CompileError, CompileErrors, ErrorKind, Result};
pub use path::{NodeRef, RawPath, SchemaPath};
pub use qname::{QName, Revision};
pub use status::Status;
