//! Cross-module tests for the frontier engine
//!
//! Tests are organized by topic:
//! - `fixtures` - Deterministic synthetic price and return data
//! - `selection` - Frontier selection against brute force and closed forms
//! - `simulation` - Monte Carlo table properties and reproducibility
//! - `refinement` - Swarm refinement scenarios
//! - `pipeline` - Prices through to a refined allocation

mod fixtures;
mod refinement;
