//! Adjusted close price table
//!
//! Rows are trading dates in strictly increasing order, columns are assets.
//! A missing price is stored as `None`. The table is immutable: the cleaning
//! helpers return a new table.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};

/// Default bound on the length of a gap that cleaning is allowed to fill
pub const GAP_FILL_LIMIT: usize = 7;

/// Default minimum fraction of present prices an asset needs to be kept
pub const DEFAULT_MIN_COVERAGE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Asset names in column order
    assets: Vec<String>,
    /// Row dates, strictly increasing
    dates: Vec<Date>,
    /// Prices in row-major order (`dates.len() * assets.len()` cells)
    prices: Vec<Option<f64>>,
}

impl PriceTable {
    /// Build a table from rows of prices, one row per date.
    ///
    /// Fails if dates are not strictly increasing, if a row has the wrong
    /// number of cells, or if a present price is not finite and positive.
    pub fn new(assets: Vec<String>, dates: Vec<Date>, rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        if assets.is_empty() {
            return Err(PortfolioError::invalid("price table has no assets"));
        }
        if dates.len() != rows.len() {
            return Err(PortfolioError::invalid(format!(
                "price table has {} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(pos) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(PortfolioError::invalid(format!(
                "dates must be strictly increasing: {} is followed by {}",
                dates[pos],
                dates[pos + 1]
            )));
        }

        let n = assets.len();
        let mut prices = Vec::with_capacity(rows.len() * n);
        for (date, row) in dates.iter().zip(rows) {
            if row.len() != n {
                return Err(PortfolioError::invalid(format!(
                    "row {date} has {} prices, expected {n}",
                    row.len()
                )));
            }
            for price in &row {
                if let Some(p) = price
                    && !(p.is_finite() && *p > 0.0)
                {
                    return Err(PortfolioError::invalid(format!(
                        "row {date} contains a non-positive or non-finite price {p}"
                    )));
                }
            }
            prices.extend(row);
        }

        Ok(Self {
            assets,
            dates,
            prices,
        })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn num_periods(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Price of `asset` on row `period`, `None` if missing or out of range
    pub fn price(&self, period: usize, asset: usize) -> Option<f64> {
        if asset >= self.assets.len() {
            return None;
        }
        self.prices
            .get(period * self.assets.len() + asset)
            .copied()
            .flatten()
    }

    pub fn row(&self, period: usize) -> &[Option<f64>] {
        let n = self.assets.len();
        &self.prices[period * n..(period + 1) * n]
    }

    /// All cells of one asset in date order
    pub fn column(&self, asset: usize) -> Vec<Option<f64>> {
        (0..self.num_periods())
            .map(|t| self.price(t, asset))
            .collect()
    }

    /// Fraction of rows that carry a price for `asset`
    pub fn coverage(&self, asset: usize) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let present = (0..self.num_periods())
            .filter(|&t| self.price(t, asset).is_some())
            .count();
        present as f64 / self.num_periods() as f64
    }

    /// Drop every asset whose coverage is below `min_coverage`.
    pub fn drop_sparse_assets(&self, min_coverage: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_coverage) {
            return Err(PortfolioError::invalid(format!(
                "min_coverage must be within [0, 1], got {min_coverage}"
            )));
        }

        let keep: Vec<usize> = (0..self.num_assets())
            .filter(|&a| self.coverage(a) >= min_coverage)
            .collect();

        let dropped = self.num_assets() - keep.len();
        if dropped > 0 {
            tracing::debug!(dropped, min_coverage, "dropping sparse asset columns");
        }

        Ok(self.select_assets(&keep))
    }

    /// Fill short gaps in every asset column.
    ///
    /// Interior runs of at most `limit` missing prices are filled by linear
    /// interpolation in calendar days between the surrounding prices. A leading
    /// run of at most `limit` missing prices is back-filled from the first
    /// present price. Longer runs, and trailing runs, stay missing.
    pub fn fill_gaps(&self, limit: usize) -> Self {
        let n = self.num_assets();
        let mut prices = self.prices.clone();

        for asset in 0..n {
            let column = self.column(asset);
            let filled = fill_column(&column, &self.dates, limit);
            for (t, value) in filled.into_iter().enumerate() {
                prices[t * n + asset] = value;
            }
        }

        Self {
            assets: self.assets.clone(),
            dates: self.dates.clone(),
            prices,
        }
    }

    fn select_assets(&self, keep: &[usize]) -> Self {
        let assets = keep.iter().map(|&a| self.assets[a].clone()).collect();
        let prices = (0..self.num_periods())
            .flat_map(|t| keep.iter().map(move |&a| (t, a)))
            .map(|(t, a)| self.price(t, a))
            .collect();
        Self {
            assets,
            dates: self.dates.clone(),
            prices,
        }
    }
}

fn fill_column(column: &[Option<f64>], dates: &[Date], limit: usize) -> Vec<Option<f64>> {
    let mut out = column.to_vec();
    let len = column.len();
    let mut t = 0;

    while t < len {
        if column[t].is_some() {
            t += 1;
            continue;
        }

        let start = t;
        while t < len && column[t].is_none() {
            t += 1;
        }
        let end = t; // first present index after the run, or len
        let run = end - start;
        if run > limit {
            continue;
        }

        match (start.checked_sub(1).and_then(|i| column[i]), column.get(end).copied().flatten()) {
            (Some(left), Some(right)) => {
                let t0 = dates[start - 1];
                let total = (dates[end] - t0).get_days() as f64;
                for (i, slot) in out.iter_mut().enumerate().take(end).skip(start) {
                    let elapsed = (dates[i] - t0).get_days() as f64;
                    let frac = if total > 0.0 { elapsed / total } else { 0.0 };
                    *slot = Some(left + (right - left) * frac);
                }
            }
            (None, Some(right)) if start == 0 => {
                for slot in out.iter_mut().take(end) {
                    *slot = Some(right);
                }
            }
            _ => {}
        }
    }

    out
}
