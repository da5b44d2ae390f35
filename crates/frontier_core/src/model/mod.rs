mod prices;
mod results;
mod returns;
mod weights;

pub use prices::{DEFAULT_MIN_COVERAGE, GAP_FILL_LIMIT, PriceTable};
pub use results::{PortfolioMetrics, SimulationRecord, SimulationTable};
pub use returns::ReturnSeries;
pub use weights::WeightVector;
