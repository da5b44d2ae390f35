//! Optimization configuration types
//!
//! Swarm coefficients, the risk-band penalty and the end-to-end pipeline
//! settings. Every field has a serde default so partial YAML/JSON documents
//! load cleanly.

use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};
use crate::simulation::SimulationConfig;

/// Soft penalty keeping the refined volatility inside a band under the ceiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Multiplier `k` on the squared distance from the ceiling
    #[serde(default = "default_penalty_weight")]
    pub weight: f64,

    /// Lower edge of the penalty-free band as a fraction of the ceiling
    #[serde(default = "default_band_floor")]
    pub band_floor: f64,
}

fn default_penalty_weight() -> f64 {
    10_000.0
}

fn default_band_floor() -> f64 {
    0.9
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            weight: default_penalty_weight(),
            band_floor: default_band_floor(),
        }
    }
}

impl PenaltyConfig {
    /// Zero on `[band_floor * ceiling, ceiling]`, `k * (vol - ceiling)²`
    /// anywhere else.
    pub fn penalty(&self, volatility: f64, risk_ceiling: f64) -> f64 {
        let floor = self.band_floor * risk_ceiling;
        if (floor..=risk_ceiling).contains(&volatility) {
            0.0
        } else {
            self.weight * (volatility - risk_ceiling).powi(2)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(PortfolioError::invalid(format!(
                "penalty weight must be finite and non-negative, got {}",
                self.weight
            )));
        }
        if !(0.0..=1.0).contains(&self.band_floor) {
            return Err(PortfolioError::invalid(format!(
                "penalty band floor must lie in [0, 1], got {}",
                self.band_floor
            )));
        }
        Ok(())
    }
}

/// Particle swarm coefficients and budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    #[serde(default = "default_particles")]
    pub particles: usize,

    /// Maximum swarm iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Inertia weight ω
    #[serde(default = "default_inertia")]
    pub inertia: f64,

    /// Pull toward each particle's own best (c₁)
    #[serde(default = "default_acceleration")]
    pub cognitive: f64,

    /// Pull toward the swarm best (c₂)
    #[serde(default = "default_acceleration")]
    pub social: f64,

    /// Per-component speed cap as a fraction of the bound width
    #[serde(default = "default_velocity_limit")]
    pub velocity_limit: f64,

    /// Half-width of the uniform jitter applied to the seed for particles 1..
    #[serde(default = "default_init_spread")]
    pub init_spread: f64,

    /// Stop once every particle is within this distance of the swarm best
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Per-asset `(lower, upper)` bounds; `[0, 1]` everywhere when absent
    #[serde(default)]
    pub bounds: Option<Vec<(f64, f64)>>,

    #[serde(default)]
    pub penalty: PenaltyConfig,

    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_particles() -> usize {
    30
}

fn default_max_iterations() -> usize {
    200
}

fn default_inertia() -> f64 {
    0.7
}

fn default_acceleration() -> f64 {
    1.5
}

fn default_velocity_limit() -> f64 {
    0.2
}

fn default_init_spread() -> f64 {
    0.05
}

fn default_tolerance() -> f64 {
    1e-6
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particles: default_particles(),
            max_iterations: default_max_iterations(),
            inertia: default_inertia(),
            cognitive: default_acceleration(),
            social: default_acceleration(),
            velocity_limit: default_velocity_limit(),
            init_spread: default_init_spread(),
            tolerance: default_tolerance(),
            bounds: None,
            penalty: PenaltyConfig::default(),
            seed: None,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particles == 0 {
            return Err(PortfolioError::invalid("swarm needs at least one particle"));
        }
        if self.max_iterations == 0 {
            return Err(PortfolioError::invalid("max_iterations must be positive"));
        }
        let coefficients = [
            ("inertia", self.inertia),
            ("cognitive", self.cognitive),
            ("social", self.social),
            ("velocity_limit", self.velocity_limit),
            ("init_spread", self.init_spread),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() || value < 0.0 {
                return Err(PortfolioError::invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        self.penalty.validate()
    }

    /// Bounds for `n` assets, checked against the long-only box.
    pub fn resolve_bounds(&self, n: usize) -> Result<Vec<(f64, f64)>> {
        let Some(bounds) = &self.bounds else {
            return Ok(vec![(0.0, 1.0); n]);
        };
        if bounds.len() != n {
            return Err(PortfolioError::invalid(format!(
                "{} bounds given for {n} assets",
                bounds.len()
            )));
        }
        for (i, &(lower, upper)) in bounds.iter().enumerate() {
            if !(0.0 <= lower && lower <= upper && upper <= 1.0) {
                return Err(PortfolioError::invalid(format!(
                    "bounds for asset {i} must satisfy 0 <= lower <= upper <= 1, got ({lower}, {upper})"
                )));
            }
        }
        if bounds.iter().all(|(lower, upper)| lower == upper) {
            return Err(PortfolioError::invalid(
                "bounds leave no free asset to optimize",
            ));
        }
        Ok(bounds.clone())
    }
}

/// Settings for one simulate → select → refine run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizationConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Annualized volatility ceiling. Without one, the minimum-variance
    /// record seeds the swarm and its volatility becomes the ceiling.
    #[serde(default)]
    pub risk_ceiling: Option<f64>,

    #[serde(default)]
    pub swarm: SwarmConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_band() {
        let p = PenaltyConfig::default();
        assert_eq!(p.penalty(0.19, 0.2), 0.0);
        assert_eq!(p.penalty(0.2, 0.2), 0.0);
        // The band floor is inclusive
        assert_eq!(p.penalty(0.9 * 0.2, 0.2), 0.0);
        // Just below the floor the full distance to the ceiling counts
        assert!((p.penalty(0.179, 0.2) - 10_000.0 * 0.021f64.powi(2)).abs() < 1e-9);
        assert!((p.penalty(0.3, 0.2) - 100.0).abs() < 1e-9);
        // Below the band is penalized on the distance to the ceiling
        assert!((p.penalty(0.1, 0.2) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_validation() {
        let mut config = SwarmConfig::default();
        assert_eq!(config.resolve_bounds(2).unwrap(), vec![(0.0, 1.0); 2]);

        config.bounds = Some(vec![(0.0, 0.5)]);
        assert!(config.resolve_bounds(2).is_err());

        config.bounds = Some(vec![(0.6, 0.5), (0.0, 1.0)]);
        assert!(config.resolve_bounds(2).is_err());

        config.bounds = Some(vec![(0.5, 0.5), (0.5, 0.5)]);
        assert!(config.resolve_bounds(2).is_err());

        config.bounds = Some(vec![(0.1, 0.5), (0.0, 1.0)]);
        assert_eq!(config.resolve_bounds(2).unwrap()[0], (0.1, 0.5));
    }

    #[test]
    fn test_validate_rejects_bad_coefficients() {
        let config = SwarmConfig {
            particles: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SwarmConfig {
            inertia: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(SwarmConfig::default().validate().is_ok());
    }
}
