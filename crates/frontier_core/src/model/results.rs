//! Portfolio metrics and Monte Carlo simulation tables

use serde::{Deserialize, Serialize};

use super::weights::WeightVector;
use crate::error::{PortfolioError, Result};

/// Return, risk and risk-adjusted return of one allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Weighted mean per-period log return
    pub expected_return: f64,
    /// Annualized standard deviation of portfolio returns
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// One Monte Carlo trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub weights: WeightVector,
    pub metrics: PortfolioMetrics,
}

/// All trials of one simulation run, in trial order.
///
/// A table is produced wholesale by a single run and never modified; a new
/// run produces a new table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTable {
    /// Asset names in weight order
    assets: Vec<String>,
    records: Vec<SimulationRecord>,
}

impl SimulationTable {
    /// Assemble a table, checking that every weight vector matches the asset list.
    pub fn new(assets: Vec<String>, records: Vec<SimulationRecord>) -> Result<Self> {
        if let Some((i, r)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.weights.len() != assets.len())
        {
            return Err(PortfolioError::invalid(format!(
                "record {i} has {} weights for {} assets",
                r.weights.len(),
                assets.len()
            )));
        }
        Ok(Self { assets, records })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest volatility in the table
    pub fn min_volatility(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.metrics.volatility)
            .reduce(f64::min)
    }
}

impl<'a> IntoIterator for &'a SimulationTable {
    type Item = &'a SimulationRecord;
    type IntoIter = std::slice::Iter<'a, SimulationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
