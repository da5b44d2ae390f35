//! Monte Carlo sampling of the risk/return plane
//!
//! Each trial draws a random weight vector and records its metrics. The
//! covariance matrix is estimated once per run. Trials are grouped into
//! fixed-size batches, each with its own generator seeded from the run seed,
//! so the table is identical whether batches run sequentially or on the
//! rayon pool.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};
use crate::metrics::{AssetMoments, validate_risk_free_rate};
use crate::model::{ReturnSeries, SimulationRecord, SimulationTable};
use crate::sampler::SamplingScheme;

/// Trials per batch; each batch owns one generator
const MAX_BATCH_SIZE: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of random portfolios to evaluate
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Annual risk-free rate as a fraction (0.03 = 3%)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    #[serde(default)]
    pub scheme: SamplingScheme,

    /// Fixed seed for reproducible runs; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_trials() -> usize {
    1000
}

fn default_risk_free_rate() -> f64 {
    0.03
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            risk_free_rate: default_risk_free_rate(),
            scheme: SamplingScheme::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(PortfolioError::invalid("trials must be a positive integer"));
        }
        validate_risk_free_rate(self.risk_free_rate)
    }
}

/// Sample `trials` random portfolios with the default scheme.
pub fn simulate(returns: &ReturnSeries, trials: usize, risk_free_rate: f64) -> Result<SimulationTable> {
    simulate_with_config(
        returns,
        &SimulationConfig {
            trials,
            risk_free_rate,
            ..Default::default()
        },
    )
}

pub fn simulate_with_config(returns: &ReturnSeries, config: &SimulationConfig) -> Result<SimulationTable> {
    config.validate()?;
    let moments = estimate_for_simulation(returns)?;
    simulate_with_moments(returns.assets(), &moments, config)
}

/// Run the batched simulation against moments estimated elsewhere (e.g. from
/// a [`crate::cache::MomentsCache`]).
pub fn simulate_with_moments(
    assets: &[String],
    moments: &AssetMoments,
    config: &SimulationConfig,
) -> Result<SimulationTable> {
    config.validate()?;
    if moments.num_assets() != assets.len() {
        return Err(PortfolioError::invalid(format!(
            "moments cover {} assets but {} names were given",
            moments.num_assets(),
            assets.len()
        )));
    }
    if assets.len() < 2 {
        return Err(PortfolioError::insufficient(format!(
            "need at least 2 assets to simulate portfolios, got {}",
            assets.len()
        )));
    }

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let num_batches = config.trials.div_ceil(MAX_BATCH_SIZE);
    let mut seeder = SmallRng::seed_from_u64(seed);
    let batches: Vec<(usize, u64)> = (0..num_batches)
        .map(|i| {
            let size = if i == num_batches - 1 {
                config.trials - i * MAX_BATCH_SIZE
            } else {
                MAX_BATCH_SIZE
            };
            (size, seeder.next_u64())
        })
        .collect();

    tracing::info!(
        trials = config.trials,
        assets = assets.len(),
        batches = num_batches,
        seed,
        "running monte carlo simulation"
    );

    let run_batch = |(size, batch_seed): (usize, u64)| -> Result<Vec<SimulationRecord>> {
        let mut rng = SmallRng::seed_from_u64(batch_seed);
        (0..size)
            .map(|_| run_trial(moments, config.scheme, config.risk_free_rate, &mut rng))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let batch_records: Vec<Vec<SimulationRecord>> =
        batches.into_par_iter().map(run_batch).collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let batch_records: Vec<Vec<SimulationRecord>> =
        batches.into_iter().map(run_batch).collect::<Result<_>>()?;

    let records: Vec<SimulationRecord> = batch_records.into_iter().flatten().collect();
    let table = SimulationTable::new(assets.to_vec(), records)?;

    tracing::debug!(
        records = table.len(),
        min_volatility = table.min_volatility(),
        "simulation complete"
    );
    Ok(table)
}

/// Sequential simulation drawing every trial from a caller-supplied generator.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    trials: usize,
    risk_free_rate: f64,
    scheme: SamplingScheme,
    rng: &mut R,
) -> Result<SimulationTable> {
    let config = SimulationConfig {
        trials,
        risk_free_rate,
        scheme,
        seed: None,
    };
    config.validate()?;
    let moments = estimate_for_simulation(returns)?;

    let records = (0..trials)
        .map(|_| run_trial(&moments, scheme, risk_free_rate, rng))
        .collect::<Result<Vec<_>>>()?;
    SimulationTable::new(returns.assets().to_vec(), records)
}

fn estimate_for_simulation(returns: &ReturnSeries) -> Result<AssetMoments> {
    if returns.num_assets() < 2 {
        return Err(PortfolioError::insufficient(format!(
            "need at least 2 assets to simulate portfolios, got {}",
            returns.num_assets()
        )));
    }
    AssetMoments::estimate(returns)
}

fn run_trial<R: Rng + ?Sized>(
    moments: &AssetMoments,
    scheme: SamplingScheme,
    risk_free_rate: f64,
    rng: &mut R,
) -> Result<SimulationRecord> {
    let weights = scheme.sample(moments.num_assets(), rng)?;
    let metrics = moments.metrics(&weights, risk_free_rate)?;
    Ok(SimulationRecord { weights, metrics })
}
