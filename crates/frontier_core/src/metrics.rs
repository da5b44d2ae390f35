//! Portfolio return, risk and Sharpe ratio
//!
//! The per-asset means and the sample covariance matrix are estimated once
//! into [`AssetMoments`]; evaluating a weight vector against them costs
//! O(N²) and never touches the raw series again.

use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};
use crate::model::{PortfolioMetrics, ReturnSeries, WeightVector};

/// Trading periods used to annualize volatility and the risk-free rate
pub const TRADING_PERIODS_PER_YEAR: f64 = 250.0;

/// Mean vector and sample covariance matrix of a return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMoments {
    means: Vec<f64>,
    /// Row-major N x N
    covariance: Vec<f64>,
    periods: usize,
}

impl AssetMoments {
    /// Estimate moments with a two-pass algorithm (means, then centered
    /// cross products over `T - 1`).
    ///
    /// Requires a complete series with at least two periods.
    pub fn estimate(returns: &ReturnSeries) -> Result<Self> {
        let (periods, n) = returns.shape();
        if n == 0 {
            return Err(PortfolioError::insufficient("return series has no assets"));
        }
        if periods < 2 {
            return Err(PortfolioError::insufficient(format!(
                "need at least 2 return periods, got {periods}"
            )));
        }
        let missing = returns.missing_count();
        if missing > 0 {
            return Err(PortfolioError::insufficient(format!(
                "return series has {missing} missing values; drop incomplete rows first"
            )));
        }

        let cells: Vec<f64> = returns.cells().iter().map(|c| c.unwrap_or(0.0)).collect();

        let mut means = vec![0.0; n];
        for row in cells.chunks(n) {
            for (m, r) in means.iter_mut().zip(row) {
                *m += r;
            }
        }
        for m in &mut means {
            *m /= periods as f64;
        }

        let mut covariance = vec![0.0; n * n];
        let mut centered = vec![0.0; n];
        for row in cells.chunks(n) {
            for ((c, r), m) in centered.iter_mut().zip(row).zip(&means) {
                *c = r - m;
            }
            for i in 0..n {
                for j in i..n {
                    covariance[i * n + j] += centered[i] * centered[j];
                }
            }
        }
        let denom = (periods - 1) as f64;
        for i in 0..n {
            for j in i..n {
                let value = covariance[i * n + j] / denom;
                covariance[i * n + j] = value;
                covariance[j * n + i] = value;
            }
        }

        Ok(Self {
            means,
            covariance,
            periods,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.means.len()
    }

    /// Number of periods the moments were estimated from
    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn covariance(&self, i: usize, j: usize) -> f64 {
        self.covariance[i * self.means.len() + j]
    }

    /// `dot(means, w)`
    pub fn expected_return(&self, weights: &[f64]) -> f64 {
        weights.iter().zip(&self.means).map(|(w, m)| w * m).sum()
    }

    /// Per-period portfolio variance `wᵀ Σ w`, floored at zero
    pub fn variance(&self, weights: &[f64]) -> f64 {
        let n = self.means.len();
        let mut var = 0.0;
        for (i, wi) in weights.iter().enumerate() {
            let row = &self.covariance[i * n..(i + 1) * n];
            let inner: f64 = row.iter().zip(weights).map(|(c, wj)| c * wj).sum();
            var += wi * inner;
        }
        var.max(0.0)
    }

    /// Annualized volatility `sqrt(wᵀ Σ w) * sqrt(250)`
    pub fn volatility(&self, weights: &[f64]) -> f64 {
        self.variance(weights).sqrt() * TRADING_PERIODS_PER_YEAR.sqrt()
    }

    /// Evaluate all three metrics for `weights`.
    pub fn metrics(&self, weights: &WeightVector, risk_free_rate: f64) -> Result<PortfolioMetrics> {
        self.check_len(weights.len())?;
        let expected_return = self.expected_return(weights.as_slice());
        let volatility = self.volatility(weights.as_slice());
        let sharpe_ratio = sharpe_ratio(expected_return, volatility, risk_free_rate)?;
        Ok(PortfolioMetrics {
            expected_return,
            volatility,
            sharpe_ratio,
        })
    }

    pub(crate) fn check_len(&self, len: usize) -> Result<()> {
        if len != self.means.len() {
            return Err(PortfolioError::invalid(format!(
                "weight vector has {len} entries for {} assets",
                self.means.len()
            )));
        }
        Ok(())
    }
}

/// Weighted mean per-period return of the portfolio
pub fn expected_return(returns: &ReturnSeries, weights: &WeightVector) -> Result<f64> {
    let moments = AssetMoments::estimate(returns)?;
    moments.check_len(weights.len())?;
    Ok(moments.expected_return(weights.as_slice()))
}

/// Annualized portfolio volatility from the sample covariance of `returns`
pub fn volatility(returns: &ReturnSeries, weights: &WeightVector) -> Result<f64> {
    let moments = AssetMoments::estimate(returns)?;
    moments.check_len(weights.len())?;
    Ok(moments.volatility(weights.as_slice()))
}

/// `(return - rfr / 250) / volatility`
///
/// Fails with [`PortfolioError::DegenerateMetrics`] when the volatility is
/// zero or the ratio is not finite.
pub fn sharpe_ratio(portfolio_return: f64, volatility: f64, risk_free_rate: f64) -> Result<f64> {
    if volatility == 0.0 {
        return Err(PortfolioError::DegenerateMetrics);
    }
    let ratio = (portfolio_return - risk_free_rate / TRADING_PERIODS_PER_YEAR) / volatility;
    if !ratio.is_finite() {
        return Err(PortfolioError::DegenerateMetrics);
    }
    Ok(ratio)
}

/// All three metrics computed straight from a return series
pub fn portfolio_metrics(
    returns: &ReturnSeries,
    weights: &WeightVector,
    risk_free_rate: f64,
) -> Result<PortfolioMetrics> {
    AssetMoments::estimate(returns)?.metrics(weights, risk_free_rate)
}

/// Risk-free rate is an annual fraction and must lie in `[-1, 1]`.
pub fn validate_risk_free_rate(risk_free_rate: f64) -> Result<()> {
    if !risk_free_rate.is_finite() || !(-1.0..=1.0).contains(&risk_free_rate) {
        return Err(PortfolioError::invalid(format!(
            "risk-free rate must be an annual fraction within [-1, 1], got {risk_free_rate}"
        )));
    }
    Ok(())
}
