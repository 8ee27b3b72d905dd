use crate::data::EquityPoint;
use crate::metrics::timeseries::TrimmedSeries;
use crate::metrics::{Anomaly, Metric};
use chrono::{DateTime, Utc};
use serde::Serialize;

//calendar days per year used for every span in this crate
pub const DAYS_PER_YEAR: f64 = 365.25;

//compound annual growth between a post-warm-up baseline and the end of the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualizationResult {
    pub cagr: Metric,
    //none when the warm-up left no data to start from
    pub start_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_value: f64,
    pub end_date: DateTime<Utc>,
    pub span_years: Option<f64>,
}

impl AnnualizationResult {
    //nothing left after the warm-up to annualize
    pub fn empty(end_value: f64, end_date: DateTime<Utc>) -> Self {
        AnnualizationResult {
            cagr: Metric::Undefined(Anomaly::EmptyPostWarmup),
            start_value: None,
            start_date: None,
            end_value,
            end_date,
            span_years: None,
        }
    }
}

//years between two instants, fractional days included
pub fn span_years(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let days = (end - start).num_seconds() as f64 / 86_400.0;
    days / DAYS_PER_YEAR
}

//cagr = (end / start) ^ (1 / years) - 1
//undefined for a non-positive span or non-positive or non-finite values, never nan
pub fn cagr(
    start_value: f64,
    start_date: DateTime<Utc>,
    end_value: f64,
    end_date: DateTime<Utc>,
) -> AnnualizationResult {
    let years = span_years(start_date, end_date);

    let cagr = if years <= 0.0 {
        Metric::Undefined(Anomaly::DegenerateSpan)
    } else if !is_positive_finite(start_value) || !is_positive_finite(end_value) {
        Metric::Undefined(Anomaly::NonPositiveValue)
    } else {
        Metric::Value((end_value / start_value).powf(1.0 / years) - 1.0)
    };

    AnnualizationResult {
        cagr,
        start_value: Some(start_value),
        start_date: Some(start_date),
        end_value,
        end_date,
        span_years: Some(years),
    }
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

//cagr from the first post-warm-up point to the final valuation
pub fn annualize(
    trimmed: &TrimmedSeries<'_>,
    end_value: f64,
    end_date: DateTime<Utc>,
) -> AnnualizationResult {
    match trimmed.baseline() {
        Some(baseline) => cagr(baseline.value, baseline.timestamp, end_value, end_date),
        None => AnnualizationResult::empty(end_value, end_date),
    }
}

//time-weighted cagr: compounds the returns after the baseline instead of
//comparing raw values, so deposits and withdrawals do not count as growth
//the end value reported is the baseline grown by those returns
pub fn cagr_from_returns(
    returns: &[(DateTime<Utc>, f64)],
    baseline: &EquityPoint,
    end_date: DateTime<Utc>,
) -> AnnualizationResult {
    let growth: f64 = returns
        .iter()
        .filter(|(timestamp, _)| *timestamp > baseline.timestamp && *timestamp <= end_date)
        .map(|(_, ret)| 1.0 + ret)
        .product();

    cagr(
        baseline.value,
        baseline.timestamp,
        baseline.value * growth,
        end_date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::timeseries::trim;
    use crate::warmup::ResolvedWarmup;
    use chrono::{TimeDelta, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    #[test]
    fn one_year_of_ten_percent() {
        let start = day(0);
        let end = start + TimeDelta::seconds((DAYS_PER_YEAR * 86_400.0) as i64);
        let result = cagr(100.0, start, 110.0, end);

        assert!((result.span_years.unwrap() - 1.0).abs() < 1e-12);
        assert!((result.cagr.value().unwrap() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn flat_values_give_exact_zero() {
        let result = cagr(100_000.0, day(0), 100_000.0, day(400));
        assert_eq!(result.cagr, Metric::Value(0.0));
    }

    #[test]
    fn degenerate_span_is_undefined() {
        let result = cagr(100.0, day(5), 200.0, day(5));
        assert_eq!(result.cagr, Metric::Undefined(Anomaly::DegenerateSpan));

        let result = cagr(100.0, day(5), 200.0, day(1));
        assert_eq!(result.cagr, Metric::Undefined(Anomaly::DegenerateSpan));
        assert!(result.span_years.unwrap() < 0.0);
    }

    #[test]
    fn non_positive_values_are_undefined() {
        let result = cagr(0.0, day(0), 200.0, day(100));
        assert_eq!(result.cagr, Metric::Undefined(Anomaly::NonPositiveValue));

        let result = cagr(100.0, day(0), -5.0, day(100));
        assert_eq!(result.cagr, Metric::Undefined(Anomaly::NonPositiveValue));
    }

    #[test]
    fn non_finite_values_are_undefined() {
        for (start, end) in [
            (f64::NAN, 110.0),
            (100.0, f64::NAN),
            (f64::INFINITY, 110.0),
            (100.0, f64::INFINITY),
        ] {
            let result = cagr(start, day(0), end, day(365));
            assert_eq!(result.cagr, Metric::Undefined(Anomaly::NonPositiveValue));
        }
    }

    #[test]
    fn annualizes_after_duration_warmup() {
        let points = vec![
            EquityPoint::new(day(0), 100_000.0),
            EquityPoint::new(day(30), 100_000.0),
            EquityPoint::new(day(365), 110_000.0),
        ];
        let trimmed = trim(&points, ResolvedWarmup::Duration(TimeDelta::days(30)));
        let result = annualize(&trimmed, 110_000.0, day(365));

        assert_eq!(result.start_date, Some(day(30)));
        assert_eq!(result.start_value, Some(100_000.0));
        assert!((result.span_years.unwrap() - 335.0 / 365.25).abs() < 1e-12);

        let expected = 1.1_f64.powf(365.25 / 335.0) - 1.0;
        assert!((result.cagr.value().unwrap() - expected).abs() < 1e-9);
        assert!((result.cagr.value().unwrap() - 0.1095).abs() < 1e-3);
    }

    #[test]
    fn empty_trim_is_undefined() {
        let points = vec![EquityPoint::new(day(0), 100.0)];
        let trimmed = trim(&points, ResolvedWarmup::Bars(3));
        let result = annualize(&trimmed, 100.0, day(0));

        assert_eq!(result.cagr, Metric::Undefined(Anomaly::EmptyPostWarmup));
        assert_eq!(result.start_value, None);
        assert_eq!(result.span_years, None);
    }

    #[test]
    fn returns_based_cagr_ignores_deposits() {
        let baseline = EquityPoint::new(day(0), 1_000.0);
        //value doubled by a deposit, but the flow-adjusted returns are flat
        let returns = vec![(day(100), 0.0), (day(200), 0.0)];
        let result = cagr_from_returns(&returns, &baseline, day(200));

        assert_eq!(result.cagr, Metric::Value(0.0));
        assert_eq!(result.end_value, 1_000.0);
    }

    #[test]
    fn returns_before_baseline_are_excluded() {
        let baseline = EquityPoint::new(day(10), 100.0);
        let returns = vec![(day(5), 1.0), (day(10), 1.0), (day(375), 0.21)];
        let end = day(375);
        let result = cagr_from_returns(&returns, &baseline, end);

        let years = 365.0 / DAYS_PER_YEAR;
        let expected = 1.21_f64.powf(1.0 / years) - 1.0;
        assert!((result.cagr.value().unwrap() - expected).abs() < 1e-9);
    }
}
