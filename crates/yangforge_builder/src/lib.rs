//! Schema builders and the resolution engine for yangforge.
//!
//! This crate provides:
//! - [`ModuleBuilder`] - Arena of mutable builders fed by a statement walker
//! - [`TypeSpec`] / [`Refine`] / [`DeviateProperties`] - Statement payloads
//! - [`SchemaCompiler`] - Multi-pass resolution and freezing of a module set
//! - [`CompilerConfig`] - Pass cap and strictness switches

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
mod build;
pub mod compiler;
pub mod config;
pub mod deviate;
pub mod module_builder;
pub mod refine;
mod resolver;
pub mod type_spec;

pub use arena::{
    AugmentRecord, BuilderCommon, BuilderKind, BuiltNode, ContainerRole, NodeBuilder, NodeId,
};
pub use compiler::SchemaCompiler;
pub use config::CompilerConfig;
pub use deviate::DeviateProperties;
pub use module_builder::ModuleBuilder;
pub use refine::Refine;
pub use type_spec::TypeSpec;
