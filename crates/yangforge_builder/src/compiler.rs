//! The compilation driver.
//!
//! A [`SchemaCompiler`] owns the module builders of one compilation, runs
//! the resolution phases over all of them and freezes the result into a
//! [`SchemaSet`].

use yangforge_foundation::{CompileError, CompileErrors, ErrorKind, Result};
use yangforge_model::SchemaSet;

use crate::config::CompilerConfig;
use crate::module_builder::ModuleBuilder;
use crate::resolver::{
    Context, apply_deviations, check_imports, check_leafrefs, expand_uses, resolve_augments,
    resolve_identities, resolve_types, resolve_unknown_nodes,
};

type Phase = fn(&mut Context<'_>) -> Vec<CompileError>;

/// Resolution phases, in the order they run.
const PHASES: [(&str, Phase); 7] = [
    ("imports", imports_and_unknown_nodes),
    ("types", resolve_types),
    ("identities", resolve_identities),
    ("uses", expand_uses),
    ("augments", resolve_augments),
    ("deviations", apply_deviations),
    ("leafrefs", check_leafrefs),
];

fn imports_and_unknown_nodes(ctx: &mut Context<'_>) -> Vec<CompileError> {
    let mut errors = check_imports(ctx);
    errors.extend(resolve_unknown_nodes(ctx));
    errors
}

/// Compiles a set of modules.
///
/// # Example
///
/// ```
/// use yangforge_builder::{ModuleBuilder, SchemaCompiler, TypeSpec};
/// use yangforge_model::BuiltinType;
///
/// let mut m = ModuleBuilder::new("example", "urn:example", "ex");
/// let top = m.add_container_node(1, m.qname("top")).unwrap();
/// m.enter_node(top).unwrap();
/// m.add_leaf_node(2, m.qname("name"), TypeSpec::builtin(BuiltinType::String))
///     .unwrap();
/// m.exit_node().unwrap();
///
/// let mut compiler = SchemaCompiler::new();
/// compiler.add_module(m).unwrap();
/// let schema = compiler.compile().unwrap();
/// assert!(schema.module("example", None).unwrap().find_node(&["top", "name"]).is_some());
/// ```
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    config: CompilerConfig,
    modules: Vec<ModuleBuilder>,
    outcome: Option<std::result::Result<(), CompileErrors>>,
}

impl SchemaCompiler {
    /// Creates a compiler with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler with the given configuration.
    #[must_use]
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Adds a module to the compilation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`](yangforge_foundation::ErrorKind::DuplicateName)
    /// if a module with the same name and revision was already added, and
    /// [`ErrorKind::Frozen`](yangforge_foundation::ErrorKind::Frozen) once
    /// resolution has run.
    pub fn add_module(&mut self, module: ModuleBuilder) -> Result<()> {
        if self.outcome.is_some() {
            return Err(ErrorKind::Frozen.at(module.name(), 0));
        }
        if self
            .modules
            .iter()
            .any(|m| m.name() == module.name() && m.revision() == module.revision())
        {
            return Err(CompileError::duplicate(
                module.name(),
                0,
                "module",
                module.name(),
                0,
            ));
        }
        self.modules.push(module);
        Ok(())
    }

    /// The module builders, in the order they were added.
    #[must_use]
    pub fn modules(&self) -> &[ModuleBuilder] {
        &self.modules
    }

    /// The builder of a module; the latest revision if `revision` is `None`.
    #[must_use]
    pub fn module(&self, name: &str, revision: Option<&str>) -> Option<&ModuleBuilder> {
        let mut candidates = self.modules.iter().filter(|m| m.name() == name);
        match revision {
            Some(rev) => candidates.find(|m| m.revision() == Some(rev)),
            None => candidates.max_by(|a, b| a.revision().cmp(&b.revision())),
        }
    }

    /// Runs every resolution phase over the module set.
    ///
    /// Stops after the first phase that reports errors. Resolution runs once;
    /// later calls return the first outcome.
    ///
    /// # Errors
    ///
    /// Returns every error of the failing phase.
    pub fn resolve(&mut self) -> std::result::Result<(), CompileErrors> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        for module in &mut self.modules {
            module.unfreeze();
        }
        let outcome = self.run_phases();
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn run_phases(&mut self) -> std::result::Result<(), CompileErrors> {
        let mut ctx = Context::new(&mut self.modules, &self.config);
        for (phase, run) in PHASES {
            tracing::debug!(phase, "phase started");
            let errors = run(&mut ctx);
            tracing::debug!(phase, errors = errors.len(), "phase finished");
            if let Some(errors) = CompileErrors::new(errors) {
                return Err(errors);
            }
        }
        Ok(())
    }

    /// Resolves and builds every module.
    ///
    /// # Errors
    ///
    /// Returns the errors of the first failing resolution phase. No partial
    /// schema is returned.
    pub fn compile(mut self) -> std::result::Result<SchemaSet, CompileErrors> {
        self.resolve()?;
        let mut schema = SchemaSet::new();
        for module in &mut self.modules {
            schema.insert(module.build());
        }
        tracing::debug!(modules = schema.len(), "compilation finished");
        Ok(schema)
    }
}
