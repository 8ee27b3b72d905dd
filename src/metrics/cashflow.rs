use crate::data::EquityPoint;
use crate::metrics::annualize::DAYS_PER_YEAR;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

const XIRR_LOWER_BOUND: f64 = -0.9999;
const XIRR_UPPER_CANDIDATES: [f64; 11] = [0.0, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];
const XIRR_TOLERANCE: f64 = 1e-10;
const XIRR_MAX_ITERATIONS: usize = 200;

//returns net of external cashflows
//a flow recorded on a bar's date shows up in the value of the following bar, so
//r_t = (v_t - flow(previous date)) / v_(t-1) - 1, and 0 when v_(t-1) is 0
//flows use the broker-side sign: deposits positive
pub fn cashflow_adjusted_returns(
    points: &[EquityPoint],
    flows: &IndexMap<NaiveDate, f64>,
) -> Vec<(DateTime<Utc>, f64)> {
    points
        .windows(2)
        .map(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            let flow = flows
                .get(&prev.timestamp.date_naive())
                .copied()
                .unwrap_or(0.0);

            let ret = if prev.value == 0.0 {
                0.0
            } else {
                (current.value - flow) / prev.value - 1.0
            };

            (current.timestamp, ret)
        })
        .collect()
}

//net present value of dated flows, discounted to the first flow's date
fn xnpv(rate: f64, cashflows: &[(NaiveDate, f64)]) -> f64 {
    let Some((t0, _)) = cashflows.first() else {
        return 0.0;
    };
    if rate <= -1.0 {
        return f64::INFINITY;
    }

    cashflows
        .iter()
        .map(|(date, amount)| {
            let years = (*date - *t0).num_days() as f64 / DAYS_PER_YEAR;
            amount / (1.0 + rate).powf(years)
        })
        .sum()
}

fn opposite_signs(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

//annualized internal rate of return of dated cashflows, found by bisection
//investor sign: contributions negative, inflows positive
//none with fewer than two flows, flows of a single sign, or no bracketing rate
pub fn xirr(cashflows: &[(NaiveDate, f64)]) -> Option<f64> {
    if cashflows.len() < 2 {
        return None;
    }

    let mut flows = cashflows.to_vec();
    flows.sort_by_key(|(date, _)| *date);

    let has_inflow = flows.iter().any(|(_, amount)| *amount > 0.0);
    let has_outflow = flows.iter().any(|(_, amount)| *amount < 0.0);
    if !(has_inflow && has_outflow) {
        return None;
    }

    let mut lo = XIRR_LOWER_BOUND;
    let mut f_lo = xnpv(lo, &flows);
    if f_lo == 0.0 {
        return Some(lo);
    }

    let mut hi = None;
    for candidate in XIRR_UPPER_CANDIDATES {
        let f_candidate = xnpv(candidate, &flows);
        if f_candidate == 0.0 {
            return Some(candidate);
        }
        if opposite_signs(f_lo, f_candidate) {
            hi = Some(candidate);
            break;
        }
    }
    let mut hi = hi?;

    for _ in 0..XIRR_MAX_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let f_mid = xnpv(mid, &flows);
        if f_mid.abs() < XIRR_TOLERANCE {
            return Some(mid);
        }

        if opposite_signs(f_lo, f_mid) {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Some((lo + hi) / 2.0)
}

//what was put into a portfolio that received deposits, and what it earned per year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionSummary {
    pub start_value: f64,
    pub deposits: f64,
    pub total_contributed: f64,
    //money-weighted return, none when xirr finds no root
    pub money_weighted_return: Option<f64>,
    pub years: f64,
}

impl ContributionSummary {
    //start value and each deposit leave the investor's pocket, the end value comes back
    pub fn compute(
        start_value: f64,
        start_date: NaiveDate,
        flows: &IndexMap<NaiveDate, f64>,
        end_value: f64,
        end_date: NaiveDate,
    ) -> Self {
        let deposits: f64 = flows.values().sum();

        let mut dated = Vec::with_capacity(flows.len() + 2);
        dated.push((start_date, -start_value));
        dated.extend(flows.iter().map(|(date, amount)| (*date, -amount)));
        dated.push((end_date, end_value));

        let money_weighted_return = xirr(&dated);
        let years = ((end_date - start_date).num_days() as f64 / DAYS_PER_YEAR).max(1e-9);

        debug!(deposits, ?money_weighted_return, years, "computed contributions");

        ContributionSummary {
            start_value,
            deposits,
            total_contributed: start_value + deposits,
            money_weighted_return,
            years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    #[test]
    fn deposits_are_not_returns() {
        let points = vec![
            EquityPoint::new(day(0), 1_000.0),
            EquityPoint::new(day(1), 1_500.0),
            EquityPoint::new(day(2), 1_650.0),
        ];
        let mut flows = IndexMap::new();
        flows.insert(day(0).date_naive(), 500.0);

        let returns = cashflow_adjusted_returns(&points, &flows);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0], (day(1), 0.0));
        assert!((returns[1].1 - 0.10).abs() < 1e-12);
    }

    #[test]
    fn zero_previous_value_gives_zero_return() {
        let points = vec![
            EquityPoint::new(day(0), 0.0),
            EquityPoint::new(day(1), 100.0),
        ];
        let returns = cashflow_adjusted_returns(&points, &IndexMap::new());
        assert_eq!(returns, vec![(day(1), 0.0)]);
    }

    #[test]
    fn xirr_of_single_year() {
        //365.25-day years, so place the inflow 366 days later and compare against that span
        let flows = vec![(date(2020, 1, 1), -100.0), (date(2021, 1, 1), 110.0)];
        let rate = xirr(&flows).unwrap();
        let expected = 1.1_f64.powf(DAYS_PER_YEAR / 366.0) - 1.0;
        assert!((rate - expected).abs() < 1e-6);
    }

    #[test]
    fn xirr_handles_unsorted_flows() {
        let flows = vec![(date(2021, 1, 1), 110.0), (date(2020, 1, 1), -100.0)];
        assert!(xirr(&flows).is_some());
    }

    #[test]
    fn xirr_needs_both_signs() {
        assert_eq!(xirr(&[(date(2020, 1, 1), -100.0)]), None);
        assert_eq!(
            xirr(&[(date(2020, 1, 1), -100.0), (date(2021, 1, 1), -5.0)]),
            None
        );
    }

    #[test]
    fn summarizes_contributions() {
        let mut flows = IndexMap::new();
        flows.insert(date(2020, 7, 1), 1_000.0);

        let summary = ContributionSummary::compute(
            10_000.0,
            date(2020, 1, 1),
            &flows,
            12_000.0,
            date(2021, 1, 1),
        );

        assert_eq!(summary.deposits, 1_000.0);
        assert_eq!(summary.total_contributed, 11_000.0);
        let irr = summary.money_weighted_return.unwrap();
        assert!(irr > 0.0 && irr < 0.2);
    }
}
