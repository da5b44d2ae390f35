//! Cost function minimized by the swarm
//!
//! A raw position is projected onto the simplex as `x / sum(x)` before it is
//! scored, so the swarm can move freely inside its bounding box.

use crate::error::Result;
use crate::metrics::{AssetMoments, sharpe_ratio};
use crate::model::{PortfolioMetrics, WeightVector};

use super::config::PenaltyConfig;

/// A scored candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub weights: WeightVector,
    pub metrics: PortfolioMetrics,
    pub penalty: f64,
    pub cost: f64,
}

/// `-sharpe + penalty` against fixed moments, ceiling and rate
#[derive(Debug, Clone, Copy)]
pub struct Objective<'a> {
    moments: &'a AssetMoments,
    risk_ceiling: f64,
    risk_free_rate: f64,
    penalty: PenaltyConfig,
}

impl<'a> Objective<'a> {
    pub fn new(
        moments: &'a AssetMoments,
        risk_ceiling: f64,
        risk_free_rate: f64,
        penalty: PenaltyConfig,
    ) -> Self {
        Self {
            moments,
            risk_ceiling,
            risk_free_rate,
            penalty,
        }
    }

    /// Score a raw position.
    ///
    /// Fails when the position cannot be normalized (zero sum) or the
    /// resulting portfolio has zero volatility.
    pub fn evaluate(&self, position: &[f64]) -> Result<Evaluation> {
        let weights = WeightVector::normalize(position)?;
        let expected_return = self.moments.expected_return(weights.as_slice());
        let volatility = self.moments.volatility(weights.as_slice());
        let sharpe_ratio = sharpe_ratio(expected_return, volatility, self.risk_free_rate)?;
        let penalty = self.penalty.penalty(volatility, self.risk_ceiling);
        Ok(Evaluation {
            weights,
            metrics: PortfolioMetrics {
                expected_return,
                volatility,
                sharpe_ratio,
            },
            penalty,
            cost: -sharpe_ratio + penalty,
        })
    }

    /// Cost of a raw position; `+∞` for positions [`Self::evaluate`] rejects.
    pub fn cost(&self, position: &[f64]) -> f64 {
        self.evaluate(position)
            .map_or(f64::INFINITY, |evaluation| evaluation.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReturnSeries;

    fn moments() -> AssetMoments {
        let returns = ReturnSeries::from_rows(
            vec!["A".into(), "B".into()],
            vec![
                vec![0.02, -0.02],
                vec![-0.01, 0.01],
                vec![0.03, -0.03],
                vec![-0.02, 0.02],
            ],
        )
        .unwrap();
        AssetMoments::estimate(&returns).unwrap()
    }

    #[test]
    fn test_scale_invariant() {
        let m = moments();
        let objective = Objective::new(&m, 0.2, 0.0, PenaltyConfig::default());
        let a = objective.cost(&[0.2, 0.6]);
        let b = objective.cost(&[0.1, 0.3]);
        assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    }

    #[test]
    fn test_zero_sum_and_zero_volatility_cost_infinity() {
        let m = moments();
        let objective = Objective::new(&m, 0.2, 0.0, PenaltyConfig::default());
        assert_eq!(objective.cost(&[0.0, 0.0]), f64::INFINITY);
        // Perfectly anti-correlated pair cancels at equal weights
        assert_eq!(objective.cost(&[0.5, 0.5]), f64::INFINITY);
    }

    #[test]
    fn test_cost_includes_penalty() {
        let m = moments();
        let objective = Objective::new(&m, 0.01, 0.0, PenaltyConfig::default());
        let eval = objective.evaluate(&[1.0, 0.0]).unwrap();
        assert!(eval.penalty > 0.0);
        assert!((eval.cost - (-eval.metrics.sharpe_ratio + eval.penalty)).abs() < 1e-12);
    }
}
