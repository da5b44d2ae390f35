//! Optimization result types
//!
//! Contains types for tracking swarm progress and final results.

use serde::{Deserialize, Serialize};

use crate::model::{PortfolioMetrics, SimulationRecord, SimulationTable, WeightVector};

/// Per-iteration trace of the swarm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    /// Swarm-best cost after each iteration (monotonically non-increasing)
    pub best_costs: Vec<f64>,

    /// Largest particle distance from the swarm best after each iteration
    pub radii: Vec<f64>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, best_cost: f64, radius: f64) {
        self.best_costs.push(best_cost);
        self.radii.push(radius);
    }

    #[must_use]
    pub fn num_iterations(&self) -> usize {
        self.best_costs.len()
    }
}

/// Reason why optimization terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Swarm radius fell below the tolerance
    Converged,

    /// Iteration budget exhausted
    MaxIterationsReached,
}

/// Outcome of one swarm refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    /// Best position found, normalized onto the simplex
    pub weights: WeightVector,

    pub metrics: PortfolioMetrics,

    /// `-sharpe + penalty` at `weights`
    pub objective: f64,

    /// Risk-band penalty at `weights`
    pub penalty: f64,

    /// Ceiling the penalty was measured against
    pub risk_ceiling: f64,

    pub iterations: usize,

    pub termination_reason: TerminationReason,

    pub history: ConvergenceHistory,
}

impl Refinement {
    pub fn converged(&self) -> bool {
        self.termination_reason == TerminationReason::Converged
    }
}

/// Everything produced by [`super::optimize`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub table: SimulationTable,

    /// Simulation record that seeded the swarm
    pub selected: SimulationRecord,

    pub refinement: Refinement,
}
