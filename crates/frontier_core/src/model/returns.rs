//! Log-return series derived from a [`PriceTable`]
//!
//! Cells are stored in a flat row-major buffer where the asset index varies
//! fastest. A missing cell is `None` and must be dropped before moments are
//! estimated.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::prices::{GAP_FILL_LIMIT, PriceTable};
use crate::error::{PortfolioError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    /// Asset names in column order
    assets: Vec<String>,
    /// Date of each row, when the series came from a dated price table
    dates: Option<Vec<Date>>,
    /// Cells in row-major order
    values: Vec<Option<f64>>,
}

impl ReturnSeries {
    /// Convert prices into log returns.
    ///
    /// Each cell is `ln(p_t / p_prev)` where `p_prev` is the last available
    /// price of that asset. A row without a price carries the previous price
    /// forward and gets a zero return, so the return that closes a gap is
    /// counted once. Rows before the first return of an asset are
    /// back-filled from it for at most [`GAP_FILL_LIMIT`] periods.
    pub fn from_prices(prices: &PriceTable) -> Self {
        Self::from_prices_with_limit(prices, GAP_FILL_LIMIT)
    }

    pub fn from_prices_with_limit(prices: &PriceTable, fill_limit: usize) -> Self {
        let n = prices.num_assets();
        let periods = prices.num_periods();
        let mut values = vec![None; periods * n];

        for asset in 0..n {
            let mut last_price: Option<f64> = None;
            let mut column = Vec::with_capacity(periods);
            for t in 0..periods {
                let cell = match (prices.price(t, asset), last_price) {
                    (Some(p), Some(prev)) => Some((p / prev).ln()),
                    (None, Some(_)) => Some(0.0),
                    (_, None) => None,
                };
                if let Some(p) = prices.price(t, asset) {
                    last_price = Some(p);
                }
                column.push(cell);
            }

            backfill(&mut column, fill_limit);
            for (t, cell) in column.into_iter().enumerate() {
                values[t * n + asset] = cell;
            }
        }

        Self {
            assets: prices.assets().to_vec(),
            dates: Some(prices.dates().to_vec()),
            values,
        }
    }

    /// Build a complete, undated series directly from per-period return rows.
    pub fn from_rows(assets: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if assets.is_empty() {
            return Err(PortfolioError::invalid("return series has no assets"));
        }
        let n = assets.len();
        let mut values = Vec::with_capacity(rows.len() * n);
        for (t, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(PortfolioError::invalid(format!(
                    "return row {t} has {} values, expected {n}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|r| !r.is_finite()) {
                return Err(PortfolioError::invalid(format!(
                    "return row {t} contains a non-finite value {bad}"
                )));
            }
            values.extend(row.into_iter().map(Some));
        }
        Ok(Self {
            assets,
            dates: None,
            values,
        })
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> Option<&[Date]> {
        self.dates.as_deref()
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn num_periods(&self) -> usize {
        self.values.len().checked_div(self.assets.len()).unwrap_or(0)
    }

    /// Shape as `(periods, assets)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_periods(), self.num_assets())
    }

    pub fn get(&self, period: usize, asset: usize) -> Option<f64> {
        if asset >= self.assets.len() {
            return None;
        }
        self.values
            .get(period * self.assets.len() + asset)
            .copied()
            .flatten()
    }

    pub fn row(&self, period: usize) -> &[Option<f64>] {
        let n = self.assets.len();
        &self.values[period * n..(period + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.values.chunks(self.assets.len().max(1))
    }

    /// Number of missing cells
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Remove every row that still has a missing cell.
    pub fn drop_incomplete_rows(&self) -> Self {
        let keep: Vec<usize> = self
            .rows()
            .enumerate()
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(t, _)| t)
            .collect();

        let dropped = self.num_periods() - keep.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = keep.len(), "dropping incomplete return rows");
        }

        let values = keep
            .iter()
            .flat_map(|&t| self.row(t).iter().copied())
            .collect();
        let dates = self
            .dates
            .as_ref()
            .map(|d| keep.iter().map(|&t| d[t]).collect());

        Self {
            assets: self.assets.clone(),
            dates,
            values,
        }
    }

    /// Raw cell buffer, row-major
    pub(crate) fn cells(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Backward fill: each missing cell takes the next available value if that
/// value is at most `limit` rows ahead. Return columns only have leading
/// gaps left by the time this runs.
fn backfill(column: &mut [Option<f64>], limit: usize) {
    let mut next: Option<f64> = None;
    let mut filled_run = 0;
    for cell in column.iter_mut().rev() {
        match cell {
            Some(v) => {
                next = Some(*v);
                filled_run = 0;
            }
            None => {
                if filled_run < limit
                    && let Some(v) = next
                {
                    *cell = Some(v);
                    filled_run += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    fn table(rows: Vec<Vec<Option<f64>>>) -> PriceTable {
        let start = jiff::civil::date(2022, 6, 1);
        let dates = (0..rows.len())
            .map(|i| start.saturating_add((i as i64).days()))
            .collect();
        let assets = (0..rows[0].len()).map(|i| format!("A{i}")).collect();
        PriceTable::new(assets, dates, rows).unwrap()
    }

    #[test]
    fn test_log_returns_and_first_row_backfilled() {
        let prices = table(vec![vec![Some(100.0)], vec![Some(110.0)], vec![Some(99.0)]]);
        let returns = ReturnSeries::from_prices(&prices);

        let r1 = (110.0f64 / 100.0).ln();
        let r2 = (99.0f64 / 110.0).ln();
        assert_eq!(returns.shape(), (3, 1));
        assert_eq!(returns.get(0, 0), Some(r1), "first row takes the next return");
        assert_eq!(returns.get(1, 0), Some(r1));
        assert_eq!(returns.get(2, 0), Some(r2));
        assert!(returns.is_complete());
    }

    #[test]
    fn test_return_spans_price_gap() {
        let prices = table(vec![
            vec![Some(100.0)],
            vec![None],
            vec![Some(121.0)],
        ]);
        let returns = ReturnSeries::from_prices(&prices);

        let r = (121.0f64 / 100.0).ln();
        assert_eq!(returns.get(1, 0), Some(0.0), "gap row carries the last price");
        assert_eq!(returns.get(2, 0), Some(r));
    }

    #[test]
    fn test_long_gap_jump_counted_once() {
        let mut rows = vec![vec![Some(100.0), Some(10.0)]];
        rows.extend(std::iter::repeat_n(vec![None, Some(10.0)], 10));
        rows.push(vec![Some(200.0), Some(10.0)]);
        rows.push(vec![Some(210.0), Some(10.5)]);
        let prices = table(rows).fill_gaps(GAP_FILL_LIMIT);

        let returns = ReturnSeries::from_prices(&prices).drop_incomplete_rows();
        let total: f64 = (0..returns.num_periods())
            .map(|t| returns.get(t, 0).unwrap())
            .sum();

        // The first row is back-filled from the second, every later row
        // contributes its own return exactly once.
        let first = returns.get(0, 0).unwrap();
        let expected = (210.0f64 / 100.0).ln() + first;
        assert!(
            (total - expected).abs() < 1e-12,
            "summed log returns {total}, expected {expected}"
        );
        let jumps = (0..returns.num_periods())
            .filter(|&t| (returns.get(t, 0).unwrap() - 2.0f64.ln()).abs() < 1e-12)
            .count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_log_returns_telescope_over_gaps() {
        let prices = table(vec![
            vec![Some(50.0)],
            vec![Some(55.0)],
            vec![None],
            vec![None],
            vec![Some(40.0)],
            vec![Some(44.0)],
        ]);
        let returns = ReturnSeries::from_prices(&prices);

        // Row 0 is a back-filled copy of row 1
        let total: f64 = (1..returns.num_periods())
            .map(|t| returns.get(t, 0).unwrap())
            .sum();
        assert!((total - (44.0f64 / 50.0).ln()).abs() < 1e-12);
        assert!(returns.is_complete());
    }

    #[test]
    fn test_backfill_limit_leaves_older_cells_missing() {
        let mut column = vec![None; 10];
        column.push(Some(0.5));
        backfill(&mut column, 7);

        assert_eq!(column.iter().filter(|c| c.is_none()).count(), 3);
        assert!(column[..3].iter().all(Option::is_none));
        assert!(column[3..].iter().all(|c| *c == Some(0.5)));
    }

    #[test]
    fn test_drop_incomplete_rows_keeps_dates_aligned() {
        // B is listed late: its first return arrives in row 11 and the
        // back-fill only reaches seven rows before it.
        let mut rows: Vec<Vec<Option<f64>>> =
            std::iter::repeat_n(vec![Some(1.0), None], 10).collect();
        rows.push(vec![Some(1.0), Some(2.0)]);
        rows.push(vec![Some(1.1), Some(2.2)]);
        let prices = table(rows);

        let returns = ReturnSeries::from_prices(&prices);
        assert!(!returns.is_complete());
        assert_eq!(returns.missing_count(), 4);

        let clean = returns.drop_incomplete_rows();
        assert!(clean.is_complete());
        assert_eq!(clean.num_periods(), 8);
        assert_eq!(clean.dates().unwrap().len(), clean.num_periods());
        assert_eq!(clean.dates().unwrap().last(), prices.dates().last());
    }

    #[test]
    fn test_from_rows_validates_shape() {
        let assets = vec!["X".to_string(), "Y".to_string()];
        assert!(ReturnSeries::from_rows(assets.clone(), vec![vec![0.1]]).is_err());
        assert!(ReturnSeries::from_rows(assets.clone(), vec![vec![0.1, f64::NAN]]).is_err());

        let ok = ReturnSeries::from_rows(assets, vec![vec![0.1, 0.2], vec![0.0, -0.1]]).unwrap();
        assert_eq!(ok.shape(), (2, 2));
        assert!(ok.dates().is_none());
    }
}
