//! Long-only, fully invested allocation vectors

use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};

/// A point on the probability simplex: every weight is non-negative and the
/// weights sum to one. Transformations always produce a new vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// Allowed deviation of the sum from one
    pub const SUM_TOLERANCE: f64 = 1e-9;

    /// Wrap weights that already lie on the simplex.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        validate_raw(&weights)?;
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(PortfolioError::invalid(format!(
                "weights must sum to 1, got {sum}"
            )));
        }
        Ok(Self(weights))
    }

    /// Project a non-negative raw vector onto the simplex as `x / sum(x)`.
    pub fn normalize(raw: &[f64]) -> Result<Self> {
        validate_raw(raw)?;
        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            return Err(PortfolioError::invalid("cannot normalize weights with zero sum"));
        }
        Ok(Self(raw.iter().map(|w| w / sum).collect()))
    }

    /// Equal allocation across `n` assets
    pub fn equal(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(PortfolioError::invalid("weight vector is empty"));
        }
        Ok(Self(vec![1.0 / n as f64; n]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

fn validate_raw(weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(PortfolioError::invalid("weight vector is empty"));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(PortfolioError::invalid(format!(
            "weights must be finite and non-negative, got {w}"
        )));
    }
    Ok(())
}

impl AsRef<[f64]> for WeightVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = PortfolioError;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(value: WeightVector) -> Self {
        value.0
    }
}
