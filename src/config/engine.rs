//! Engine configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Engine tuning parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on largest-fragment repair passes during diagram
    /// validation. Exceeding it is a fatal configuration error.
    #[serde(default = "default_max_reconstructions")]
    pub max_reconstructions: u32,

    /// Cap on ancestor-chain walks during tree annotation. A materialized
    /// tree deeper than this indicates a runaway expansion.
    #[serde(default = "default_max_ancestor_depth")]
    pub max_ancestor_depth: usize,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_reconstructions == 0 {
            return Err(ValidationError::InvalidReconstructionBound);
        }
        if self.max_ancestor_depth == 0 {
            return Err(ValidationError::InvalidAncestorDepth);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reconstructions: default_max_reconstructions(),
            max_ancestor_depth: default_max_ancestor_depth(),
        }
    }
}

fn default_max_reconstructions() -> u32 {
    5
}

fn default_max_ancestor_depth() -> usize {
    1000
}
