//! Particle swarm refinement of a frontier seed
//!
//! The swarm starts around the seed weights (particle 0 exactly on it) and
//! minimizes [`Objective`] inside per-asset bounds. Particle costs may be
//! evaluated on the rayon pool; every random draw happens on the calling
//! thread in particle order, so a seeded run is reproducible regardless of
//! the `parallel` feature.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::{PortfolioError, Result};
use crate::metrics::{AssetMoments, validate_risk_free_rate};
use crate::model::{ReturnSeries, WeightVector};

use super::config::SwarmConfig;
use super::objective::Objective;
use super::result::{ConvergenceHistory, Refinement, TerminationReason};

/// One swarm member
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub best_position: Vec<f64>,
    pub best_cost: f64,
}

impl Particle {
    fn at(position: Vec<f64>) -> Self {
        let n = position.len();
        Self {
            best_position: position.clone(),
            position,
            velocity: vec![0.0; n],
            best_cost: f64::INFINITY,
        }
    }
}

/// Refine `seed` against `risk_ceiling`, seeding the generator from
/// `config.seed` (or the OS when unset).
pub fn refine(
    returns: &ReturnSeries,
    seed: &WeightVector,
    risk_ceiling: f64,
    risk_free_rate: f64,
    config: &SwarmConfig,
) -> Result<Refinement> {
    let moments = AssetMoments::estimate(returns)?;
    refine_with_moments(&moments, seed, risk_ceiling, risk_free_rate, config)
}

/// [`refine`] against precomputed moments.
pub fn refine_with_moments(
    moments: &AssetMoments,
    seed: &WeightVector,
    risk_ceiling: f64,
    risk_free_rate: f64,
    config: &SwarmConfig,
) -> Result<Refinement> {
    let mut rng = match config.seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    run_swarm(moments, seed, risk_ceiling, risk_free_rate, config, &mut rng)
}

/// [`refine`] drawing from a caller-supplied generator; `config.seed` is
/// ignored.
pub fn refine_with_rng<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    seed: &WeightVector,
    risk_ceiling: f64,
    risk_free_rate: f64,
    config: &SwarmConfig,
    rng: &mut R,
) -> Result<Refinement> {
    let moments = AssetMoments::estimate(returns)?;
    run_swarm(&moments, seed, risk_ceiling, risk_free_rate, config, rng)
}

fn run_swarm<R: Rng + ?Sized>(
    moments: &AssetMoments,
    seed: &WeightVector,
    risk_ceiling: f64,
    risk_free_rate: f64,
    config: &SwarmConfig,
    rng: &mut R,
) -> Result<Refinement> {
    config.validate()?;
    validate_risk_free_rate(risk_free_rate)?;
    if !risk_ceiling.is_finite() || risk_ceiling < 0.0 {
        return Err(PortfolioError::invalid(format!(
            "risk ceiling must be finite and non-negative, got {risk_ceiling}"
        )));
    }
    let n = moments.num_assets();
    if n < 2 {
        return Err(PortfolioError::insufficient(format!(
            "need at least 2 assets to refine an allocation, got {n}"
        )));
    }
    moments.check_len(seed.len())?;
    let bounds = config.resolve_bounds(n)?;
    let speed_limits: Vec<f64> = bounds
        .iter()
        .map(|(lower, upper)| config.velocity_limit * (upper - lower))
        .collect();

    let objective = Objective::new(moments, risk_ceiling, risk_free_rate, config.penalty);

    let mut swarm = initialize_swarm(seed, &bounds, config, rng);
    let costs = evaluate_positions(&swarm, &objective);
    update_bests(&mut swarm, &costs);
    let (mut best_position, _) = swarm_best(&swarm);

    let mut history = ConvergenceHistory::new();
    let mut termination_reason = TerminationReason::MaxIterationsReached;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;

        for particle in &mut swarm {
            step(particle, &best_position, &bounds, &speed_limits, config, rng);
        }
        let costs = evaluate_positions(&swarm, &objective);
        update_bests(&mut swarm, &costs);
        let (position, best_cost) = swarm_best(&swarm);
        best_position = position;

        let radius = swarm_radius(&swarm, &best_position);
        history.record(best_cost, radius);

        if radius < config.tolerance {
            termination_reason = TerminationReason::Converged;
            break;
        }
    }

    let evaluation = objective.evaluate(&best_position)?;

    tracing::info!(
        iterations,
        ?termination_reason,
        volatility = evaluation.metrics.volatility,
        sharpe_ratio = evaluation.metrics.sharpe_ratio,
        penalty = evaluation.penalty,
        "swarm refinement finished"
    );

    Ok(Refinement {
        weights: evaluation.weights,
        metrics: evaluation.metrics,
        objective: evaluation.cost,
        penalty: evaluation.penalty,
        risk_ceiling,
        iterations,
        termination_reason,
        history,
    })
}

fn initialize_swarm<R: Rng + ?Sized>(
    seed: &WeightVector,
    bounds: &[(f64, f64)],
    config: &SwarmConfig,
    rng: &mut R,
) -> Vec<Particle> {
    let mut anchor = seed.as_slice().to_vec();
    clamp_to_bounds(&mut anchor, bounds);

    let mut swarm = Vec::with_capacity(config.particles);
    swarm.push(Particle::at(anchor.clone()));
    for _ in 1..config.particles {
        let mut position: Vec<f64> = anchor
            .iter()
            .map(|x| x + config.init_spread * rng.random_range(-1.0..=1.0))
            .collect();
        clamp_to_bounds(&mut position, bounds);
        swarm.push(Particle::at(position));
    }
    swarm
}

fn step<R: Rng + ?Sized>(
    particle: &mut Particle,
    global_best: &[f64],
    bounds: &[(f64, f64)],
    speed_limits: &[f64],
    config: &SwarmConfig,
    rng: &mut R,
) {
    for d in 0..particle.position.len() {
        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let x = particle.position[d];
        let v = config.inertia * particle.velocity[d]
            + config.cognitive * r1 * (particle.best_position[d] - x)
            + config.social * r2 * (global_best[d] - x);
        particle.velocity[d] = v.clamp(-speed_limits[d], speed_limits[d]);
        particle.position[d] = x + particle.velocity[d];
    }
    clamp_to_bounds(&mut particle.position, bounds);
}

fn evaluate_positions(swarm: &[Particle], objective: &Objective<'_>) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    let costs = swarm.par_iter().map(|p| objective.cost(&p.position)).collect();
    #[cfg(not(feature = "parallel"))]
    let costs = swarm.iter().map(|p| objective.cost(&p.position)).collect();
    costs
}

fn update_bests(swarm: &mut [Particle], costs: &[f64]) {
    for (particle, &cost) in swarm.iter_mut().zip(costs) {
        if cost < particle.best_cost {
            particle.best_cost = cost;
            particle.best_position.clone_from(&particle.position);
        }
    }
}

/// Lowest personal best; the first particle wins ties.
fn swarm_best(swarm: &[Particle]) -> (Vec<f64>, f64) {
    let mut best = &swarm[0];
    for particle in &swarm[1..] {
        if particle.best_cost < best.best_cost {
            best = particle;
        }
    }
    (best.best_position.clone(), best.best_cost)
}

/// Clamp values to bounds
fn clamp_to_bounds(values: &mut [f64], bounds: &[(f64, f64)]) {
    for (val, (min, max)) in values.iter_mut().zip(bounds.iter()) {
        *val = val.clamp(*min, *max);
    }
}

/// Largest Euclidean distance of any particle from `center`
fn swarm_radius(swarm: &[Particle], center: &[f64]) -> f64 {
    swarm
        .iter()
        .map(|p| {
            p.position
                .iter()
                .zip(center.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .fold(0.0_f64, |a, b| a.max(b))
}
