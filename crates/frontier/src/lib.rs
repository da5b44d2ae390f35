//! Command-line driver for the frontier allocation engine
//!
//! Reads a price CSV, runs the simulate → select → refine pipeline from
//! `frontier_core` and writes the simulation table and the refined
//! allocation to an output directory.

pub mod config;
pub mod data;
pub mod logging;
pub mod run;
pub mod util;

pub use logging::init_logging;
pub use run::{RunOutcome, RunRequest, execute};
