//! Property-based tests
//!
//! Resolution must not depend on declaration order, and textual references
//! must parse back to what they were built from.

mod ordering;
mod references;
