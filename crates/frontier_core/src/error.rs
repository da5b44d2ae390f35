use std::fmt;

/// Errors surfaced by the statistics engine and the optimizers
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// A caller-supplied parameter is out of range or malformed
    InvalidParameter(String),
    /// Not enough periods or assets to estimate a covariance matrix
    InsufficientData { reason: String },
    /// No sampled portfolio satisfies the selection. `risk_ceiling` is set
    /// only for ceiling-constrained selections.
    NoFeasiblePortfolio {
        risk_ceiling: Option<f64>,
        /// Smallest volatility present in the table, if any
        min_volatility: Option<f64>,
    },
    /// Zero (or non-finite) volatility leaves the Sharpe ratio undefined
    DegenerateMetrics,
}

impl PortfolioError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PortfolioError::InvalidParameter(msg.into())
    }

    pub fn insufficient(reason: impl Into<String>) -> Self {
        PortfolioError::InsufficientData {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            PortfolioError::InsufficientData { reason } => {
                write!(f, "insufficient data: {reason}")
            }
            PortfolioError::NoFeasiblePortfolio {
                risk_ceiling: Some(ceiling),
                min_volatility: Some(min),
            } => write!(
                f,
                "no feasible portfolio: risk ceiling {ceiling:.6} is below the minimum sampled volatility {min:.6}"
            ),
            PortfolioError::NoFeasiblePortfolio {
                risk_ceiling: Some(ceiling),
                min_volatility: None,
            } => write!(
                f,
                "no feasible portfolio for risk ceiling {ceiling:.6}: simulation table is empty"
            ),
            PortfolioError::NoFeasiblePortfolio { risk_ceiling: None, .. } => {
                write!(f, "no feasible portfolio: simulation table is empty")
            }
            PortfolioError::DegenerateMetrics => {
                write!(f, "portfolio volatility is zero; sharpe ratio is undefined")
            }
        }
    }
}

impl std::error::Error for PortfolioError {}

pub type Result<T> = std::result::Result<T, PortfolioError>;
