//! Price table CSV input
//!
//! Layout: a header `Date,<asset>...` followed by one row per trading day with
//! ISO dates (`2024-03-01`) in the first column. An empty cell is a missing
//! price. Rows may arrive in any order; they are sorted by date.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use frontier_core::model::PriceTable;
use jiff::civil::Date;

use super::storage::StorageError;

/// Load a price table from a CSV file.
pub fn read_prices(path: &Path) -> Result<PriceTable, StorageError> {
    let file = File::open(path)
        .map_err(|e| StorageError::Io(format!("Failed to open {}: {e}", path.display())))?;
    let table = parse_prices(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        assets = table.num_assets(),
        periods = table.num_periods(),
        "loaded price table"
    );
    Ok(table)
}

/// Parse a price table from any CSV source.
pub fn parse_prices<R: Read>(source: R) -> Result<PriceTable, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| StorageError::Parse(format!("Failed to read CSV header: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(StorageError::Parse(
            "price CSV needs a date column and at least one asset column".into(),
        ));
    }
    let assets: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut rows: Vec<(Date, Vec<Option<f64>>)> = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = result.map_err(|e| StorageError::Parse(format!("line {line}: {e}")))?;
        if record.len() != headers.len() {
            return Err(StorageError::Parse(format!(
                "line {line}: expected {} fields, found {}",
                headers.len(),
                record.len()
            )));
        }

        let date_field = record.get(0).unwrap_or_default();
        let date: Date = date_field
            .parse()
            .map_err(|e| StorageError::Parse(format!("line {line}: bad date {date_field:?}: {e}")))?;

        let prices = record
            .iter()
            .skip(1)
            .map(|field| parse_cell(field, line))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((date, prices));
    }

    rows.sort_by_key(|(date, _)| *date);
    let (dates, prices): (Vec<Date>, Vec<Vec<Option<f64>>>) = rows.into_iter().unzip();

    PriceTable::new(assets, dates, prices).map_err(|e| StorageError::Parse(e.to_string()))
}

fn parse_cell(field: &str, line: usize) -> Result<Option<f64>, StorageError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<f64>()
        .map(Some)
        .map_err(|e| StorageError::Parse(format!("line {line}: bad price {field:?}: {e}")))
}
