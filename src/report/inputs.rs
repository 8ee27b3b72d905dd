use crate::data::EquitySeries;
use crate::portfolio::OpenPosition;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//max drawdown as reported by the engine's analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxDrawdown {
    //in percent, eg 23.5 for a 23.5% decline
    pub pct: f64,
    //length of the drawdown in bars, when the analyzer tracks it
    pub len: Option<usize>,
}

//everything the finished backtest hands over for reporting
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub final_value: f64,
    pub cash: f64,
    pub equity: EquitySeries,

    //calendar-year returns from the engine; derived from the equity curve when absent
    pub per_year_returns: Option<IndexMap<i32, f64>>,

    //per-bar returns from the engine; derived from the equity curve when absent
    pub period_returns: Option<Vec<(DateTime<Utc>, f64)>>,

    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<MaxDrawdown>,
    pub open_positions: Vec<OpenPosition>,

    //external deposits (+) and withdrawals (-) by date
    pub cashflows: IndexMap<NaiveDate, f64>,
}

impl ReportInputs {
    //final value defaults to the last point of the equity curve
    pub fn new(equity: EquitySeries, cash: f64) -> Self {
        ReportInputs {
            final_value: equity.last().value,
            cash,
            equity,
            per_year_returns: None,
            period_returns: None,
            sharpe_ratio: None,
            max_drawdown: None,
            open_positions: Vec::new(),
            cashflows: IndexMap::new(),
        }
    }

    pub fn with_final_value(mut self, final_value: f64) -> Self {
        self.final_value = final_value;
        self
    }

    pub fn with_per_year_returns(mut self, per_year_returns: IndexMap<i32, f64>) -> Self {
        self.per_year_returns = Some(per_year_returns);
        self
    }

    pub fn with_period_returns(mut self, returns: Vec<(DateTime<Utc>, f64)>) -> Self {
        self.period_returns = Some(returns);
        self
    }

    pub fn with_sharpe_ratio(mut self, sharpe_ratio: f64) -> Self {
        self.sharpe_ratio = Some(sharpe_ratio);
        self
    }

    pub fn with_max_drawdown(mut self, pct: f64, len: Option<usize>) -> Self {
        self.max_drawdown = Some(MaxDrawdown { pct, len });
        self
    }

    pub fn with_open_positions(mut self, positions: Vec<OpenPosition>) -> Self {
        self.open_positions = positions;
        self
    }

    pub fn with_cashflows(mut self, cashflows: IndexMap<NaiveDate, f64>) -> Self {
        self.cashflows = cashflows;
        self
    }

    //true when any non-zero external flow was recorded
    pub fn has_cashflows(&self) -> bool {
        self.cashflows.values().any(|amount| amount.abs() > 0.0)
    }
}
