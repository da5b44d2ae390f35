//! Allocation refinement and the end-to-end optimization pipeline
//!
//! The pipeline simulates a cloud of random portfolios, selects a seed from
//! it and hands that seed to the particle swarm.
//!
//! # Example
//!
//! ```ignore
//! use frontier_core::optimization::{OptimizationConfig, optimize};
//!
//! let config = OptimizationConfig {
//!     risk_ceiling: Some(0.18),
//!     ..Default::default()
//! };
//! let report = optimize(&returns, &config)?;
//! println!("sharpe {:.4}", report.refinement.metrics.sharpe_ratio);
//! ```

mod config;
mod objective;
mod result;
mod swarm;

pub use config::{OptimizationConfig, PenaltyConfig, SwarmConfig};
pub use objective::{Evaluation, Objective};
pub use result::{ConvergenceHistory, OptimizationReport, Refinement, TerminationReason};
pub use swarm::{Particle, refine, refine_with_moments, refine_with_rng};

use crate::cache::MomentsCache;
use crate::error::Result;
use crate::frontier::{constrained_max_return, min_variance_portfolio};
use crate::model::ReturnSeries;
use crate::simulation::simulate_with_moments;

/// Main optimization entry point
///
/// Simulates, selects the constrained max-return record when a ceiling is
/// configured (the minimum-variance record otherwise) and refines it.
pub fn optimize(returns: &ReturnSeries, config: &OptimizationConfig) -> Result<OptimizationReport> {
    let mut cache = MomentsCache::new();
    optimize_with_cache(returns, config, &mut cache)
}

/// [`optimize`] reusing moments from `cache` when `returns` is unchanged.
pub fn optimize_with_cache(
    returns: &ReturnSeries,
    config: &OptimizationConfig,
    cache: &mut MomentsCache,
) -> Result<OptimizationReport> {
    let moments = cache.get_or_compute(returns)?;
    let table = simulate_with_moments(returns.assets(), moments, &config.simulation)?;

    let selected = match config.risk_ceiling {
        Some(ceiling) => constrained_max_return(&table, ceiling)?,
        None => min_variance_portfolio(&table)?,
    }
    .clone();
    let risk_ceiling = config
        .risk_ceiling
        .unwrap_or(selected.metrics.volatility);

    tracing::info!(
        risk_ceiling,
        seed_volatility = selected.metrics.volatility,
        seed_return = selected.metrics.expected_return,
        "refining selected portfolio"
    );

    let refinement = refine_with_moments(
        moments,
        &selected.weights,
        risk_ceiling,
        config.simulation.risk_free_rate,
        &config.swarm,
    )?;

    Ok(OptimizationReport {
        table,
        selected,
        refinement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortfolioError;
    use crate::simulation::SimulationConfig;

    fn returns() -> ReturnSeries {
        ReturnSeries::from_rows(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec![0.011, -0.003, 0.002],
                vec![-0.005, 0.009, 0.001],
                vec![0.006, 0.001, -0.001],
                vec![0.010, -0.007, 0.003],
                vec![-0.002, 0.005, 0.000],
                vec![0.003, 0.002, 0.002],
            ],
        )
        .unwrap()
    }

    fn config(risk_ceiling: Option<f64>) -> OptimizationConfig {
        OptimizationConfig {
            simulation: SimulationConfig {
                trials: 400,
                seed: Some(8),
                ..Default::default()
            },
            risk_ceiling,
            swarm: SwarmConfig {
                particles: 10,
                max_iterations: 40,
                seed: Some(8),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_optimize_without_ceiling_uses_min_variance() {
        let report = optimize(&returns(), &config(None)).unwrap();
        let min_var = min_variance_portfolio(&report.table).unwrap();

        assert_eq!(&report.selected, min_var);
        assert_eq!(report.refinement.risk_ceiling, min_var.metrics.volatility);
        assert_eq!(report.table.len(), 400);
    }

    #[test]
    fn test_optimize_with_ceiling_selects_feasible_seed() {
        let baseline = optimize(&returns(), &config(None)).unwrap();
        let ceiling = baseline.table.min_volatility().unwrap() * 1.5;

        let report = optimize(&returns(), &config(Some(ceiling))).unwrap();
        assert!(report.selected.metrics.volatility <= ceiling);
        assert_eq!(report.refinement.risk_ceiling, ceiling);
    }

    #[test]
    fn test_optimize_reports_infeasible_ceiling() {
        let err = optimize(&returns(), &config(Some(1e-6))).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::NoFeasiblePortfolio {
                min_volatility: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_cache_is_reused_across_runs() {
        let mut cache = MomentsCache::new();
        let returns = returns();
        let a = optimize_with_cache(&returns, &config(None), &mut cache).unwrap();
        let b = optimize_with_cache(&returns, &config(None), &mut cache).unwrap();

        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(a.refinement, b.refinement);
    }
}
