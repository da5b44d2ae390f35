//! Tests for swarm refinement of simulated seeds
//!
//! These tests verify:
//! - A ceiling below the achievable minimum yields a penalized but finite result
//! - Refinement inside the band improves on the seed's objective
//! - Injected generators reproduce runs exactly

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::fixtures::three_asset_returns;
use crate::frontier::{constrained_max_return, min_variance_portfolio};
use crate::metrics::AssetMoments;
use crate::optimization::{Objective, PenaltyConfig, SwarmConfig, refine, refine_with_rng};
use crate::simulation::{SimulationConfig, simulate_with_config};

fn swarm(seed: u64) -> SwarmConfig {
    SwarmConfig {
        particles: 20,
        max_iterations: 100,
        seed: Some(seed),
        ..Default::default()
    }
}

fn table(seed: u64) -> crate::model::SimulationTable {
    simulate_with_config(
        &three_asset_returns(),
        &SimulationConfig {
            trials: 1000,
            risk_free_rate: 0.0,
            seed: Some(seed),
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn test_ceiling_below_minimum_is_penalized_not_fatal() {
    let returns = three_asset_returns();
    let table = table(31);
    let seed = min_variance_portfolio(&table).unwrap();
    let ceiling = seed.metrics.volatility * 0.5;

    let refined = refine(&returns, &seed.weights, ceiling, 0.0, &swarm(31)).unwrap();

    assert!(refined.penalty > 0.0, "ceiling cannot be met, penalty must bite");
    assert!(refined.objective.is_finite());
    assert!(refined.metrics.volatility.is_finite());
    assert!(
        refined.metrics.volatility <= seed.metrics.volatility,
        "refined volatility {} drifted above seed {}",
        refined.metrics.volatility,
        seed.metrics.volatility
    );
    let seed_penalty = PenaltyConfig::default().penalty(seed.metrics.volatility, ceiling);
    assert!(
        refined.penalty <= seed_penalty,
        "refined penalty {} exceeds the seed's {seed_penalty}",
        refined.penalty
    );
    assert!((refined.weights.sum() - 1.0).abs() < 1e-9);
    assert!(refined.weights.iter().all(|&w| w >= 0.0));
}

#[test]
fn test_refinement_improves_on_constrained_seed() {
    let returns = three_asset_returns();
    let moments = AssetMoments::estimate(&returns).unwrap();
    let table = table(32);
    let ceiling = table.min_volatility().unwrap() * 1.4;
    let seed = constrained_max_return(&table, ceiling).unwrap();

    let config = swarm(32);
    let seed_cost =
        Objective::new(&moments, ceiling, 0.0, config.penalty).cost(seed.weights.as_slice());
    let refined = refine(&returns, &seed.weights, ceiling, 0.0, &config).unwrap();

    assert!(refined.objective <= seed_cost);
    assert!(
        refined.metrics.volatility <= ceiling * 1.05,
        "volatility {} should stay near the ceiling {}",
        refined.metrics.volatility,
        ceiling
    );
}

#[test]
fn test_injected_rng_reproduces_refinement() {
    let returns = three_asset_returns();
    let table = table(33);
    let seed = min_variance_portfolio(&table).unwrap();
    let ceiling = seed.metrics.volatility;
    let config = SwarmConfig {
        seed: None,
        ..swarm(0)
    };

    let a = refine_with_rng(
        &returns,
        &seed.weights,
        ceiling,
        0.0,
        &config,
        &mut SmallRng::seed_from_u64(5),
    )
    .unwrap();
    let b = refine_with_rng(
        &returns,
        &seed.weights,
        ceiling,
        0.0,
        &config,
        &mut SmallRng::seed_from_u64(5),
    )
    .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.history.num_iterations(), a.iterations);
}
