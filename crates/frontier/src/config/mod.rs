//! Run configuration
//!
//! A run is described by an optional YAML file whose fields all have
//! defaults; command-line flags are applied on top of it.
//!
//! ```yaml
//! min_coverage: 0.6
//! gap_fill_limit: 7
//! optimization:
//!   risk_ceiling: 0.18
//!   simulation:
//!     trials: 5000
//!     risk_free_rate: 0.03   # annual fraction
//!     scheme: Dirichlet
//!   swarm:
//!     particles: 40
//!     max_iterations: 300
//! ```

use std::fs;
use std::path::Path;

use frontier_core::model::{DEFAULT_MIN_COVERAGE, GAP_FILL_LIMIT};
use frontier_core::optimization::OptimizationConfig;
use serde::{Deserialize, Serialize};

use crate::data::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Asset columns with a smaller fraction of present prices are dropped
    #[serde(default = "default_min_coverage")]
    pub min_coverage: f64,

    /// Longest price gap (in rows) filled by interpolation or back-fill
    #[serde(default = "default_gap_fill_limit")]
    pub gap_fill_limit: usize,

    #[serde(default)]
    pub optimization: OptimizationConfig,
}

fn default_min_coverage() -> f64 {
    DEFAULT_MIN_COVERAGE
}

fn default_gap_fill_limit() -> usize {
    GAP_FILL_LIMIT
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_coverage: default_min_coverage(),
            gap_fill_limit: default_gap_fill_limit(),
            optimization: OptimizationConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub trials: Option<usize>,
    /// Annual risk-free rate in percent (3.0 = 3%)
    pub risk_free_rate_pct: Option<f64>,
    pub risk_ceiling: Option<f64>,
    /// Seeds both the simulation and the swarm
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, StorageError> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| StorageError::Parse(format!("Failed to parse run config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, StorageError> {
        serde_saphyr::to_string(self)
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize run config: {e}")))
    }

    /// Apply command-line overrides. The CLI rate is a percentage and is
    /// converted to the annual fraction the engine expects.
    pub fn apply(&mut self, overrides: &Overrides) {
        let opt = &mut self.optimization;
        if let Some(trials) = overrides.trials {
            opt.simulation.trials = trials;
        }
        if let Some(pct) = overrides.risk_free_rate_pct {
            opt.simulation.risk_free_rate = pct / 100.0;
        }
        if let Some(ceiling) = overrides.risk_ceiling {
            opt.risk_ceiling = Some(ceiling);
        }
        if let Some(seed) = overrides.seed {
            opt.simulation.seed = Some(seed);
            opt.swarm.seed = Some(seed);
        }
    }
}
