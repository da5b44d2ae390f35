//! Portfolio statistics and efficient-frontier estimation library
//!
//! This crate turns historical daily prices into an allocation across assets.
//! It supports:
//! - Price cleaning (sparse column removal, bounded gap filling)
//! - Log-return series with bounded backward fill
//! - Expected return, annualized volatility and Sharpe ratio
//! - Monte Carlo sampling of long-only weight vectors
//! - Frontier selection (minimum variance, max return under a risk ceiling)
//! - Particle swarm refinement with a soft risk-band penalty
//!
//! # Pipeline
//!
//! ```ignore
//! use frontier_core::model::{PriceTable, ReturnSeries};
//! use frontier_core::optimization::{OptimizationConfig, optimize};
//!
//! let prices = prices.drop_sparse_assets(0.6)?.fill_gaps(7);
//! let returns = ReturnSeries::from_prices(&prices).drop_incomplete_rows();
//! let report = optimize(&returns, &OptimizationConfig::default())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod cache;
pub mod error;
pub mod frontier;
pub mod metrics;
pub mod optimization;
pub mod sampler;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{PortfolioError, Result};
pub use frontier::{
    constrained_max_return, efficient_frontier, max_sharpe_portfolio, min_variance_portfolio,
};
pub use metrics::{expected_return, portfolio_metrics, sharpe_ratio, volatility};
pub use optimization::{optimize, refine};
pub use simulation::{SimulationConfig, simulate};
