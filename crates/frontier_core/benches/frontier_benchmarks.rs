//! Criterion benchmarks for frontier_core
//!
//! Run with: cargo bench -p frontier_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use frontier_core::frontier::min_variance_portfolio;
use frontier_core::metrics::AssetMoments;
use frontier_core::model::{ReturnSeries, WeightVector};
use frontier_core::optimization::{SwarmConfig, refine};
use frontier_core::simulation::{SimulationConfig, simulate_with_config};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

fn create_returns(assets: usize, periods: usize) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(42);
    let dists: Vec<Normal<f64>> = (0..assets)
        .map(|i| Normal::new(0.0002 * (i + 1) as f64, 0.005 * (i + 1) as f64).unwrap())
        .collect();
    let rows = (0..periods)
        .map(|_| dists.iter().map(|d| d.sample(&mut rng)).collect())
        .collect();
    let names = (0..assets).map(|i| format!("A{i}")).collect();
    ReturnSeries::from_rows(names, rows).unwrap()
}

fn bench_moments(c: &mut Criterion) {
    let mut group = c.benchmark_group("moments");

    for assets in [5, 20, 50].iter() {
        let returns = create_returns(*assets, 1250);
        group.bench_with_input(BenchmarkId::new("assets", assets), assets, |b, _| {
            b.iter(|| AssetMoments::estimate(black_box(&returns)))
        });
    }

    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let returns = create_returns(10, 1250);

    for trials in [1_000, 10_000, 50_000].iter() {
        let config = SimulationConfig {
            trials: *trials,
            seed: Some(7),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::new("trials", trials), trials, |b, _| {
            b.iter(|| simulate_with_config(black_box(&returns), black_box(&config)))
        });
    }

    group.finish();
}

fn bench_refine(c: &mut Criterion) {
    let returns = create_returns(10, 1250);
    let table = simulate_with_config(
        &returns,
        &SimulationConfig {
            trials: 2_000,
            seed: Some(7),
            ..Default::default()
        },
    )
    .unwrap();
    let seed: WeightVector = min_variance_portfolio(&table).unwrap().weights.clone();
    let ceiling = table.min_volatility().unwrap() * 1.2;
    let config = SwarmConfig {
        seed: Some(7),
        ..Default::default()
    };

    c.bench_function("refine_10_assets", |b| {
        b.iter(|| refine(black_box(&returns), &seed, ceiling, 0.03, &config))
    });
}

criterion_group!(benches, bench_moments, bench_monte_carlo, bench_refine);
criterion_main!(benches);
