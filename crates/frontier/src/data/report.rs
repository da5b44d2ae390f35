//! Simulation table CSV and allocation YAML encodings

use frontier_core::model::{PortfolioMetrics, SimulationTable, WeightVector};
use frontier_core::optimization::{OptimizationReport, TerminationReason};
use serde::{Deserialize, Serialize};

use super::storage::StorageError;

/// Metric columns appended after the asset weight columns
pub const SIMULATION_METRIC_COLUMNS: [&str; 3] = [
    "portfolio return",
    "portfolio standard dev",
    "portfolio sharp ratio",
];

/// Encode a simulation table: one column per asset in table order, then the
/// three metric columns; one row per trial in trial order.
pub fn simulation_csv(table: &SimulationTable) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_err = |e: csv::Error| StorageError::Serialize(format!("Failed to encode CSV: {e}"));

    let header = table
        .assets()
        .iter()
        .map(String::as_str)
        .chain(SIMULATION_METRIC_COLUMNS);
    writer.write_record(header).map_err(to_err)?;

    for record in table {
        let m = &record.metrics;
        let fields = record
            .weights
            .iter()
            .chain([&m.expected_return, &m.volatility, &m.sharpe_ratio])
            .map(f64::to_string);
        writer.write_record(fields).map_err(to_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| StorageError::Serialize(format!("Failed to flush CSV: {e}")))
}

/// One asset's share of the allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    pub asset: String,
    pub weight: f64,
}

/// Summary written to `allocation.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub generated_at: jiff::Timestamp,
    pub trials: usize,
    /// Annual risk-free rate as a fraction
    pub risk_free_rate: f64,
    pub risk_ceiling: f64,

    /// Simulation record that seeded the swarm
    pub seed_weights: Vec<AssetWeight>,
    pub seed_metrics: PortfolioMetrics,

    /// Refined allocation
    pub weights: Vec<AssetWeight>,
    pub metrics: PortfolioMetrics,
    pub objective: f64,
    pub penalty: f64,
    pub iterations: usize,
    pub termination_reason: TerminationReason,
}

impl AllocationReport {
    pub fn from_optimization(report: &OptimizationReport, risk_free_rate: f64) -> Self {
        let assets = report.table.assets();
        let refinement = &report.refinement;
        Self {
            generated_at: jiff::Timestamp::now(),
            trials: report.table.len(),
            risk_free_rate,
            risk_ceiling: refinement.risk_ceiling,
            seed_weights: label(assets, &report.selected.weights),
            seed_metrics: report.selected.metrics,
            weights: label(assets, &refinement.weights),
            metrics: refinement.metrics,
            objective: refinement.objective,
            penalty: refinement.penalty,
            iterations: refinement.iterations,
            termination_reason: refinement.termination_reason,
        }
    }
}

fn label(assets: &[String], weights: &WeightVector) -> Vec<AssetWeight> {
    assets
        .iter()
        .zip(weights.iter())
        .map(|(asset, &weight)| AssetWeight {
            asset: asset.clone(),
            weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_core::model::SimulationRecord;

    fn table() -> SimulationTable {
        let record = |w: f64, ret: f64, vol: f64| SimulationRecord {
            weights: WeightVector::new(vec![w, 1.0 - w]).unwrap(),
            metrics: PortfolioMetrics {
                expected_return: ret,
                volatility: vol,
                sharpe_ratio: ret / vol,
            },
        };
        SimulationTable::new(
            vec!["SPY".into(), "TLT".into()],
            vec![record(0.25, 0.001, 0.2), record(0.5, 0.002, 0.25)],
        )
        .unwrap()
    }

    #[test]
    fn test_simulation_csv_layout() {
        let bytes = simulation_csv(&table()).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            [
                "SPY",
                "TLT",
                "portfolio return",
                "portfolio standard dev",
                "portfolio sharp ratio"
            ]
        );

        let rows: Vec<Vec<f64>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][..3], [0.25, 0.75, 0.001]);
        assert_eq!(rows[1][..3], [0.5, 0.5, 0.002]);
    }
}
