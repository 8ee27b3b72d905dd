pub mod aggregate;
pub mod annualize;
pub mod cashflow;
pub mod timeseries;

pub use aggregate::{
    aggregate, approximate_sharpe, Frequency, PerPeriodReturns, VolatilityResult,
    TRADING_DAYS_PER_YEAR,
};
pub use annualize::{annualize, cagr, cagr_from_returns, AnnualizationResult, DAYS_PER_YEAR};
pub use cashflow::{cashflow_adjusted_returns, xirr, ContributionSummary};
pub use timeseries::{
    calculate_returns, dated_returns, max_drawdown, max_drawdown_period, trim, yearly_returns,
    DrawdownPeriod, TrimmedSeries,
};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

//why a figure could not be computed
//these are expected outcomes of odd inputs, carried in the result rather than returned as errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anomaly {
    #[error("no data after warm-up")]
    EmptyPostWarmup,
    #[error("span of zero or negative length")]
    DegenerateSpan,
    #[error("start or end value is not a positive number")]
    NonPositiveValue,
    #[error("fewer than two samples")]
    InsufficientSamples,
    #[error("returns have zero variance")]
    ZeroVariance,
}

//a numeric result that may be explicitly non-computable
//"n/a" and 0.0 are different answers and must stay distinguishable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Value(f64),
    Undefined(Anomaly),
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn anomaly(&self) -> Option<Anomaly> {
        match self {
            Metric::Value(_) => None,
            Metric::Undefined(anomaly) => Some(*anomaly),
        }
    }

    //renders a ratio as a percentage, or n/a
    pub fn display_pct(&self) -> String {
        match self {
            Metric::Value(v) => format!("{:.2}%", v * 100.0),
            Metric::Undefined(_) => "n/a".to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.2}", v),
            Metric::Undefined(_) => write!(f, "n/a"),
        }
    }
}
