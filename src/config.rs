//! Rewriter settings

/// Default bound on the internal convergence loops of a single rule
pub const DEFAULT_MAX_ITERATIONS: usize = 256;

/// Settings shared by every rule of a `Rewriter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Iterations a rule may spend reaching its fixpoint before giving up
    pub max_iterations: usize,
    /// Check head/children links before and after rewriting
    pub validate: bool,
}

impl Config {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            validate: true,
        }
    }
}
