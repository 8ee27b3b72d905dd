use crate::data::EquityPoint;
use crate::warmup::ResolvedWarmup;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

//the part of an equity curve that remains after the warm-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimmedSeries<'a> {
    pub points: &'a [EquityPoint],
    pub dropped: usize,
}

impl<'a> TrimmedSeries<'a> {
    //first post-warm-up point, the baseline for annualization
    //none means the warm-up consumed the whole series
    pub fn baseline(&self) -> Option<&'a EquityPoint> {
        self.points.first()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

//drops the warm-up from the front of a series
//bars: the first n points, durations: every point before first timestamp + duration
pub fn trim(points: &[EquityPoint], warmup: ResolvedWarmup) -> TrimmedSeries<'_> {
    let dropped = match warmup {
        ResolvedWarmup::Bars(bars) => bars.min(points.len()),
        ResolvedWarmup::Duration(duration) => match points.first() {
            None => 0,
            Some(first) => match first.timestamp.checked_add_signed(duration) {
                Some(cutoff) => points.partition_point(|p| p.timestamp < cutoff),
                //cutoff beyond the representable range, nothing survives
                None => points.len(),
            },
        },
    };

    let trimmed = TrimmedSeries {
        points: &points[dropped..],
        dropped,
    };

    if trimmed.is_empty() && !points.is_empty() {
        warn!(
            %warmup,
            series_len = points.len(),
            "warm-up covers the whole equity series"
        );
    } else {
        debug!(%warmup, dropped, remaining = trimmed.points.len(), "trimmed warm-up");
    }

    trimmed
}

//calculates returns from equity values
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    if equity_values.len() < 2 {
        return vec![];
    }

    let mut returns = Vec::with_capacity(equity_values.len() - 1);
    for i in 1..equity_values.len() {
        let ret = if equity_values[i - 1] == 0.0 {
            0.0
        } else {
            (equity_values[i] - equity_values[i - 1]) / equity_values[i - 1]
        };
        returns.push(ret);
    }
    returns
}

//returns stamped with the bar they end on
pub fn dated_returns(points: &[EquityPoint]) -> Vec<(DateTime<Utc>, f64)> {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    points
        .iter()
        .skip(1)
        .map(|p| p.timestamp)
        .zip(calculate_returns(&values))
        .collect()
}

//compounds period returns into calendar-year returns, in year order
pub fn yearly_returns(returns: &[(DateTime<Utc>, f64)]) -> IndexMap<i32, f64> {
    let mut growth: IndexMap<i32, f64> = IndexMap::new();

    for (timestamp, ret) in returns {
        *growth.entry(timestamp.year()).or_insert(1.0) *= 1.0 + ret;
    }

    growth.sort_keys();
    growth.into_iter().map(|(year, g)| (year, g - 1.0)).collect()
}

//the deepest peak-to-trough decline of an equity curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPeriod {
    //decline from peak, in percent
    pub max_drawdown_pct: f64,
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
    //first date after the trough back at or above the peak
    pub recovery_date: Option<NaiveDate>,
    pub peak_value: f64,
    pub trough_value: f64,
}

//finds the max drawdown and when it started, bottomed and recovered
//none for an empty or never-declining curve
pub fn max_drawdown_period(points: &[EquityPoint]) -> Option<DrawdownPeriod> {
    let first = points.first()?;

    let mut peak = first;
    let mut deepest = 0.0;
    let mut worst: Option<(&EquityPoint, &EquityPoint)> = None;

    for point in points {
        if point.value >= peak.value {
            peak = point;
            continue;
        }
        if peak.value <= 0.0 {
            continue;
        }

        let drawdown = point.value / peak.value - 1.0;
        if drawdown < deepest {
            deepest = drawdown;
            worst = Some((peak, point));
        }
    }

    let (peak, trough) = worst?;

    let recovery_date = points
        .iter()
        .filter(|p| p.timestamp >= trough.timestamp)
        .find(|p| p.value >= peak.value)
        .map(|p| p.timestamp.date_naive());

    Some(DrawdownPeriod {
        max_drawdown_pct: -deepest * 100.0,
        peak_date: peak.timestamp.date_naive(),
        trough_date: trough.timestamp.date_naive(),
        recovery_date,
        peak_value: peak.value,
        trough_value: trough.value,
    })
}

//max drawdown in percent, 0 when the curve never declines
pub fn max_drawdown(points: &[EquityPoint]) -> f64 {
    max_drawdown_period(points)
        .map(|period| period.max_drawdown_pct)
        .unwrap_or(0.0)
}
