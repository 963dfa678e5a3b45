//! Yangforge - YANG schema compiler
//!
//! This crate re-exports all layers of the yangforge system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: yangforge_builder    — Builders, resolution engine, compiler driver
//! Layer 1: yangforge_model      — Immutable schema model, type chains, constraints
//! Layer 0: yangforge_foundation — Core types (QName, SchemaPath, CompileError)
//! ```

pub use yangforge_builder as builder;
pub use yangforge_foundation as foundation;
pub use yangforge_model as model;
