//! File formats read and written by the CLI

mod prices;
mod report;
mod storage;

pub use prices::{parse_prices, read_prices};
pub use report::{AllocationReport, AssetWeight, SIMULATION_METRIC_COLUMNS, simulation_csv};
pub use storage::{ALLOCATION_FILE, OutputDirectory, SIMULATION_FILE, StorageError};
