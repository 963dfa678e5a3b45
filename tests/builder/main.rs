//! Integration tests for Layer 2: Builders
//!
//! Tests for statement registration, uniqueness, nesting rules, and freezing.

mod freezing;
mod registration;
