//! Selection rules over a simulation table
//!
//! Every selector scans the table in trial order and keeps the first record
//! among equals, so results are stable for a given table.

use crate::error::{PortfolioError, Result};
use crate::model::{SimulationRecord, SimulationTable};

/// Record with the smallest volatility in the table.
pub fn min_variance_portfolio(table: &SimulationTable) -> Result<&SimulationRecord> {
    first_best(table.iter(), |candidate, best| {
        candidate.metrics.volatility < best.metrics.volatility
    })
    .ok_or_else(|| empty_table(None))
}

/// Highest-return record whose volatility does not exceed `risk_ceiling`.
pub fn constrained_max_return(
    table: &SimulationTable,
    risk_ceiling: f64,
) -> Result<&SimulationRecord> {
    if !risk_ceiling.is_finite() {
        return Err(PortfolioError::invalid(format!(
            "risk ceiling must be finite, got {risk_ceiling}"
        )));
    }
    if table.is_empty() {
        return Err(empty_table(Some(risk_ceiling)));
    }

    let feasible = table
        .iter()
        .filter(|r| r.metrics.volatility <= risk_ceiling);
    let selected = first_best(feasible, |candidate, best| {
        candidate.metrics.expected_return > best.metrics.expected_return
    })
    .ok_or(PortfolioError::NoFeasiblePortfolio {
        risk_ceiling: Some(risk_ceiling),
        min_volatility: table.min_volatility(),
    })?;

    tracing::debug!(
        risk_ceiling,
        volatility = selected.metrics.volatility,
        expected_return = selected.metrics.expected_return,
        "selected constrained max-return portfolio"
    );
    Ok(selected)
}

/// Record with the highest Sharpe ratio.
pub fn max_sharpe_portfolio(table: &SimulationTable) -> Result<&SimulationRecord> {
    first_best(table.iter(), |candidate, best| {
        candidate.metrics.sharpe_ratio > best.metrics.sharpe_ratio
    })
    .ok_or_else(|| empty_table(None))
}

/// Upper-left envelope of the sampled cloud.
///
/// Records are ordered by ascending volatility (ties keep table order) and a
/// record is kept only if its return is strictly above every record with
/// lower or equal volatility that precedes it.
pub fn efficient_frontier(table: &SimulationTable) -> Vec<&SimulationRecord> {
    let mut sorted: Vec<&SimulationRecord> = table.iter().collect();
    sorted.sort_by(|a, b| a.metrics.volatility.total_cmp(&b.metrics.volatility));

    let mut frontier = Vec::new();
    let mut best_return = f64::NEG_INFINITY;
    for record in sorted {
        if record.metrics.expected_return > best_return {
            best_return = record.metrics.expected_return;
            frontier.push(record);
        }
    }
    frontier
}

fn first_best<'a, I, F>(records: I, better: F) -> Option<&'a SimulationRecord>
where
    I: Iterator<Item = &'a SimulationRecord>,
    F: Fn(&SimulationRecord, &SimulationRecord) -> bool,
{
    records.fold(None, |best, candidate| match best {
        Some(b) if !better(candidate, b) => Some(b),
        _ => Some(candidate),
    })
}

fn empty_table(risk_ceiling: Option<f64>) -> PortfolioError {
    PortfolioError::NoFeasiblePortfolio {
        risk_ceiling,
        min_volatility: None,
    }
}
