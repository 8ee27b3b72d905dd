use crate::metrics::{Anomaly, Metric};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const TRADING_WEEKS_PER_YEAR: f64 = 52.0;

//sampling frequency of the return series being annualized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Daily => TRADING_DAYS_PER_YEAR,
            Frequency::Weekly => TRADING_WEEKS_PER_YEAR,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "d" => Some(Frequency::Daily),
            "weekly" | "w" => Some(Frequency::Weekly),
            _ => None,
        }
    }
}

//calendar year -> return ratio, ascending by year
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerPeriodReturns {
    by_year: BTreeMap<i32, f64>,
}

impl PerPeriodReturns {
    pub fn get(&self, year: i32) -> Option<f64> {
        self.by_year.get(&year).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.by_year.iter().map(|(year, ret)| (*year, *ret))
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

impl FromIterator<(i32, f64)> for PerPeriodReturns {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        PerPeriodReturns {
            by_year: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolatilityResult {
    pub annualized_volatility: Metric,
    pub sample_count: usize,
}

//orders the per-period table and annualizes the volatility of the period returns
//volatility = sample stdev * sqrt(periods per year)
pub fn aggregate(
    per_period_returns: &IndexMap<i32, f64>,
    daily_returns: &[f64],
    frequency: Frequency,
) -> (PerPeriodReturns, VolatilityResult) {
    let table = per_period_returns
        .iter()
        .map(|(year, ret)| (*year, *ret))
        .collect();

    let annualized_volatility = if daily_returns.len() < 2 {
        Metric::Undefined(Anomaly::InsufficientSamples)
    } else {
        Metric::Value(daily_returns.std_dev() * frequency.periods_per_year().sqrt())
    };

    (
        table,
        VolatilityResult {
            annualized_volatility,
            sample_count: daily_returns.len(),
        },
    )
}

//sharpe from the return series itself, for runs where the engine's figure is missing or
//distorted by external cashflows
//per-period risk-free rate is the geometric share of the annual rate
//population stdev here, unlike the sample stdev of the volatility line
pub fn approximate_sharpe(returns: &[f64], risk_free_annual: f64, frequency: Frequency) -> Metric {
    if returns.len() < 2 {
        return Metric::Undefined(Anomaly::InsufficientSamples);
    }

    let periods = frequency.periods_per_year();
    let rf_period = (1.0 + risk_free_annual).powf(1.0 / periods) - 1.0;
    let excess: Vec<f64> = returns.iter().map(|r| r - rf_period).collect();

    let std_dev = excess.iter().population_std_dev();
    if std_dev.is_nan() || std_dev <= 0.0 {
        return Metric::Undefined(Anomaly::ZeroVariance);
    }

    Metric::Value(excess.iter().mean() / std_dev * periods.sqrt())
}
