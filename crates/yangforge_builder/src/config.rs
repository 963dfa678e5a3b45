//! Configuration for the schema compiler.

/// Configuration for a [`SchemaCompiler`](crate::SchemaCompiler).
///
/// Controls how long fixpoint loops may run and how strict the resolver is
/// about constructs that do not affect the data tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Hard cap on the passes of any fixpoint loop.
    ///
    /// Loops stop earlier on a pass that resolves nothing.
    pub max_passes: usize,

    /// Fail on extension usages whose prefix cannot be resolved.
    pub strict_unknown_nodes: bool,

    /// Report identities whose bases form a cycle as `CyclicIdentity`.
    ///
    /// When false they are reported as unresolved instead.
    pub check_identity_cycles: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_passes: 256,
            strict_unknown_nodes: false,
            check_identity_cycles: true,
        }
    }
}

impl CompilerConfig {
    /// Creates a configuration that rejects anything it cannot resolve.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_unknown_nodes: true,
            ..Self::default()
        }
    }

    /// Builder method to set the pass cap.
    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    /// Builder method to set strict handling of extension usages.
    #[must_use]
    pub fn with_strict_unknown_nodes(mut self, strict: bool) -> Self {
        self.strict_unknown_nodes = strict;
        self
    }

    /// Builder method to set identity cycle reporting.
    #[must_use]
    pub fn with_check_identity_cycles(mut self, check: bool) -> Self {
        self.check_identity_cycles = check;
        self
    }
}
