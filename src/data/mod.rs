pub mod equity;
pub mod loader;

pub use equity::{EquityPoint, EquitySeries, SeriesError};
pub use loader::{
    load_cashflows_csv, load_equity_csv, load_per_year_csv, load_positions_csv, load_returns_csv,
    parse_timestamp,
};
