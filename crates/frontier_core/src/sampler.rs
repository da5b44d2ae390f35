//! Random long-only weight vectors

use rand::Rng;
use rand_distr::{Distribution, Exp1};
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};
use crate::model::WeightVector;

/// How raw weights are drawn before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingScheme {
    /// N uniform draws in [0, 1) divided by their sum. Concentrates mass
    /// toward the simplex center.
    #[default]
    Uniform,
    /// N `Exp(1)` draws divided by their sum, i.e. Dirichlet(1, ..., 1):
    /// uniform over the simplex.
    Dirichlet,
}

impl SamplingScheme {
    /// Draw a weight vector for `n` assets.
    ///
    /// Fails for zero assets. A draw whose raw sum is zero is discarded and
    /// redrawn.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<WeightVector> {
        if n == 0 {
            return Err(PortfolioError::invalid("cannot sample weights for zero assets"));
        }
        loop {
            let raw: Vec<f64> = match self {
                SamplingScheme::Uniform => (0..n).map(|_| rng.random::<f64>()).collect(),
                SamplingScheme::Dirichlet => (0..n).map(|_| Exp1.sample(rng)).collect(),
            };
            if let Ok(weights) = WeightVector::normalize(&raw) {
                return Ok(weights);
            }
        }
    }
}

/// Uniform-then-normalize draw, the default scheme
pub fn sample_weights<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<WeightVector> {
    SamplingScheme::Uniform.sample(n, rng)
}
