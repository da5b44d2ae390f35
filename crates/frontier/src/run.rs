//! The `run` command: prices in, simulation table and allocation out

use std::path::PathBuf;

use color_eyre::eyre::{WrapErr, eyre};
use frontier_core::model::ReturnSeries;
use frontier_core::optimization::optimize;

use crate::config::{Overrides, RunConfig};
use crate::data::{AllocationReport, OutputDirectory, read_prices};

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub prices: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub output: OutputDirectory,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub simulation_path: PathBuf,
    pub allocation_path: PathBuf,
    pub allocation: AllocationReport,
}

pub fn execute(request: &RunRequest) -> color_eyre::Result<RunOutcome> {
    let mut config = match &request.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    config.apply(&request.overrides);

    let prices = read_prices(&request.prices)?;
    let cleaned = prices
        .drop_sparse_assets(config.min_coverage)?
        .fill_gaps(config.gap_fill_limit);
    let dropped = prices.num_assets() - cleaned.num_assets();
    if dropped > 0 {
        tracing::warn!(dropped, kept = cleaned.num_assets(), "dropped sparse asset columns");
    }

    let returns = ReturnSeries::from_prices_with_limit(&cleaned, config.gap_fill_limit)
        .drop_incomplete_rows();
    if returns.num_periods() < 2 {
        return Err(eyre!(
            "only {} complete return periods remain after cleaning {}",
            returns.num_periods(),
            request.prices.display()
        ));
    }

    let report = optimize(&returns, &config.optimization).wrap_err("optimization failed")?;
    let allocation =
        AllocationReport::from_optimization(&report, config.optimization.simulation.risk_free_rate);

    let simulation_path = request.output.save_simulation(&report.table)?;
    let allocation_path = request.output.save_allocation(&allocation)?;

    tracing::info!(
        output = %request.output.root().display(),
        volatility = allocation.metrics.volatility,
        sharpe_ratio = allocation.metrics.sharpe_ratio,
        "run complete"
    );

    Ok(RunOutcome {
        simulation_path,
        allocation_path,
        allocation,
    })
}
