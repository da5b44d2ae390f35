//! Deterministic synthetic data shared by the integration tests

use jiff::civil::Date;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::model::{PriceTable, ReturnSeries};

/// Daily log returns with per-asset drift and volatility, drawn from a
/// seeded normal distribution.
pub fn synthetic_returns(params: &[(f64, f64)], periods: usize, seed: u64) -> ReturnSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let dists: Vec<Normal<f64>> = params
        .iter()
        .map(|&(mean, std_dev)| Normal::new(mean, std_dev).unwrap())
        .collect();
    let rows = (0..periods)
        .map(|_| dists.iter().map(|d| d.sample(&mut rng)).collect())
        .collect();
    let assets = (0..params.len()).map(|i| format!("ASSET{i}")).collect();
    ReturnSeries::from_rows(assets, rows).unwrap()
}

/// Three assets: low, medium and high risk with increasing drift
pub fn three_asset_returns() -> ReturnSeries {
    synthetic_returns(&[(0.0002, 0.004), (0.0005, 0.010), (0.0009, 0.018)], 500, 17)
}

/// Consecutive calendar days starting at `start`
pub fn daily_dates(start: Date, count: usize) -> Vec<Date> {
    (0..count)
        .map(|i| start.checked_add(jiff::Span::new().days(i as i64)).unwrap())
        .collect()
}

/// A price table compounded from synthetic returns, with optional holes
pub fn synthetic_prices(params: &[(f64, f64)], periods: usize, seed: u64) -> PriceTable {
    let returns = synthetic_returns(params, periods, seed);
    let mut price = vec![100.0; params.len()];
    let mut rows = vec![price.iter().copied().map(Some).collect::<Vec<_>>()];
    for t in 0..periods {
        for (a, p) in price.iter_mut().enumerate() {
            *p *= returns.get(t, a).unwrap().exp();
        }
        rows.push(price.iter().copied().map(Some).collect());
    }
    PriceTable::new(
        returns.assets().to_vec(),
        daily_dates(jiff::civil::date(2023, 1, 2), periods + 1),
        rows,
    )
    .unwrap()
}
