//! Output directory layout and storage errors
//!
//! Directory structure:
//! ~/.frontier/
//!   frontier.log
//!   runs/
//!     20250101-093000/
//!       simulation.csv     # one row per Monte Carlo trial
//!       allocation.yaml    # selected and refined allocation

use std::fs;
use std::path::{Path, PathBuf};

use frontier_core::model::SimulationTable;

use super::report::{AllocationReport, simulation_csv};
use crate::util::{atomic_write, atomic_write_bytes};

pub const SIMULATION_FILE: &str = "simulation.csv";
pub const ALLOCATION_FILE: &str = "allocation.yaml";

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {msg}"),
            StorageError::Parse(msg) => write!(f, "Parse error: {msg}"),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Directory receiving the files of one run
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
}

impl OutputDirectory {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the default data directory path (~/.frontier/)
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".frontier")
    }

    /// Timestamped run directory under `<data_dir>/runs/`
    pub fn timestamped(data_dir: &Path) -> Self {
        let stamp = jiff::Zoned::now().strftime("%Y%m%d-%H%M%S").to_string();
        Self::new(data_dir.join("runs").join(stamp))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn simulation_path(&self) -> PathBuf {
        self.root.join(SIMULATION_FILE)
    }

    pub fn allocation_path(&self) -> PathBuf {
        self.root.join(ALLOCATION_FILE)
    }

    pub fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| StorageError::Io(format!("Failed to create output directory: {e}")))
    }

    /// Write the simulation table as CSV
    pub fn save_simulation(&self, table: &SimulationTable) -> Result<PathBuf, StorageError> {
        self.init()?;
        let bytes = simulation_csv(table)?;
        let path = self.simulation_path();
        atomic_write_bytes(&path, &bytes)
            .map_err(|e| StorageError::Io(format!("Failed to write {SIMULATION_FILE}: {e}")))?;
        tracing::debug!(path = %path.display(), rows = table.len(), "saved simulation table");
        Ok(path)
    }

    /// Write the allocation report as YAML
    pub fn save_allocation(&self, report: &AllocationReport) -> Result<PathBuf, StorageError> {
        self.init()?;
        let yaml = serde_saphyr::to_string(report).map_err(|e| {
            StorageError::Serialize(format!("Failed to serialize allocation: {e}"))
        })?;
        let path = self.allocation_path();
        atomic_write(&path, &yaml)
            .map_err(|e| StorageError::Io(format!("Failed to write {ALLOCATION_FILE}: {e}")))?;
        tracing::debug!(path = %path.display(), "saved allocation");
        Ok(path)
    }

    /// Read back a previously written allocation report
    pub fn load_allocation(&self) -> Result<AllocationReport, StorageError> {
        let content = fs::read_to_string(self.allocation_path())
            .map_err(|e| StorageError::Io(format!("Failed to read {ALLOCATION_FILE}: {e}")))?;
        serde_saphyr::from_str(&content)
            .map_err(|e| StorageError::Parse(format!("Failed to parse allocation: {e}")))
    }
}
