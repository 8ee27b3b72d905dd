//warm-up aware performance statistics for bar-by-bar portfolio backtests

pub mod config;
pub mod data;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod warmup;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ReportConfig;
    pub use crate::data::{
        load_cashflows_csv, load_equity_csv, load_per_year_csv, load_positions_csv,
        load_returns_csv, EquityPoint, EquitySeries, SeriesError,
    };
    pub use crate::metrics::{
        aggregate, annualize, approximate_sharpe, cagr, cashflow_adjusted_returns, trim, xirr,
        AnnualizationResult, Anomaly, Frequency, Metric, PerPeriodReturns, TrimmedSeries,
        VolatilityResult,
    };
    pub use crate::portfolio::OpenPosition;
    pub use crate::report::{PerformanceReport, ReportInputs};
    pub use crate::warmup::{resolve, ResolvedWarmup, StrategyIntrospection, WarmupSpec};
}
