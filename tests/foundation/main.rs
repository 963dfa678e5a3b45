//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: QName, SchemaPath, NodeRef/RawPath, Status, and errors.

mod errors;
mod paths;
mod qnames;
