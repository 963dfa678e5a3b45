//! Integration tests for Layer 2: Resolution
//!
//! Tests for compiling module sets: uses, augments, types, identities,
//! deviations, and imports.

mod deviations;
mod identities;
mod imports;

use yangforge_builder::{ModuleBuilder, SchemaCompiler};
use yangforge_foundation::CompileErrors;
use yangforge_model::SchemaSet;

/// Routes compiler logs to the test output; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compiles `modules` with the default configuration.
pub fn compile(modules: Vec<ModuleBuilder>) -> Result<SchemaSet, CompileErrors> {
    init_tracing();
    let mut compiler = SchemaCompiler::new();
    for module in modules {
        compiler.add_module(module).unwrap();
    }
    compiler.compile()
}
