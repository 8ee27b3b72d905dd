use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use indexmap::IndexMap;
use proptest::prelude::*;
use warmstats::prelude::*;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
}

fn daily_series(values: &[f64]) -> EquitySeries {
    EquitySeries::from_pairs(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (day(i as i64), *v)),
    )
    .unwrap()
}

fn as_spec(resolved: ResolvedWarmup) -> WarmupSpec {
    match resolved {
        ResolvedWarmup::Bars(bars) => WarmupSpec::Bars(bars),
        ResolvedWarmup::Duration(duration) => WarmupSpec::Duration(duration),
    }
}

proptest! {
    #[test]
    fn warmup_longer_than_run_leaves_nothing(
        values in prop::collection::vec(1.0f64..1e6, 1..40),
        extra in 0usize..100,
    ) {
        let series = daily_series(&values);
        let bars = series.len() + extra;
        let trimmed = trim(series.points(), ResolvedWarmup::Bars(bars));

        prop_assert!(trimmed.is_empty());
        prop_assert_eq!(trimmed.dropped, series.len());

        let result = annualize(&trimmed, series.last().value, series.last().timestamp);
        prop_assert_eq!(result.cagr, Metric::Undefined(Anomaly::EmptyPostWarmup));
    }

    #[test]
    fn trimming_never_reorders_or_invents_points(
        values in prop::collection::vec(1.0f64..1e6, 1..40),
        bars in 0usize..50,
    ) {
        let series = daily_series(&values);
        let trimmed = trim(series.points(), ResolvedWarmup::Bars(bars));

        prop_assert_eq!(trimmed.dropped + trimmed.points.len(), series.len());
        prop_assert_eq!(trimmed.points, &series.points()[trimmed.dropped..]);
    }

    #[test]
    fn unchanged_value_compounds_to_zero(value in 0.01f64..1e9, days in 1i64..20_000) {
        let result = cagr(value, day(0), value, day(days));
        prop_assert_eq!(result.cagr, Metric::Value(0.0));
    }

    #[test]
    fn non_positive_span_is_undefined(
        start_value in -1e6f64..1e6,
        end_value in -1e6f64..1e6,
        back in 0i64..5_000,
    ) {
        let result = cagr(start_value, day(back), end_value, day(0));
        prop_assert_eq!(result.cagr, Metric::Undefined(Anomaly::DegenerateSpan));
    }

    #[test]
    fn resolving_is_idempotent(
        periods in prop::collection::vec(1usize..500, 0..6),
        named in prop::option::of(1u64..1_000),
    ) {
        let mut introspection = StrategyIntrospection::new();
        for period in &periods {
            introspection = introspection.with_indicator_period(*period);
        }
        if let Some(bars) = named {
            introspection = introspection.with_parameter("warmup_bars", bars);
        }

        let first = resolve(&WarmupSpec::Absent, Some(&introspection), 1.0);
        let again = resolve(&WarmupSpec::Absent, Some(&introspection), 1.0);
        prop_assert_eq!(first, again);

        let settled = resolve(&as_spec(first), Some(&introspection), 1.0);
        prop_assert_eq!(settled, first);
    }

    #[test]
    fn named_parameter_beats_indicators(
        periods in prop::collection::vec(1usize..500, 1..6),
        named in 1u64..1_000,
    ) {
        let mut introspection = StrategyIntrospection::new().with_parameter("warm_up", named);
        for period in &periods {
            introspection = introspection.with_indicator_period(*period);
        }

        let resolved = resolve(&WarmupSpec::Absent, Some(&introspection), 1.0);
        prop_assert_eq!(resolved, ResolvedWarmup::Bars(named as usize));
    }

    #[test]
    fn identical_samples_have_zero_volatility(quarters in -40i32..40, count in 2usize..16) {
        let sample = quarters as f64 * 0.25;
        let returns = vec![sample; count];
        let (_, volatility) = aggregate(&IndexMap::new(), &returns, Frequency::Daily);

        prop_assert_eq!(volatility.annualized_volatility, Metric::Value(0.0));
        prop_assert_eq!(volatility.sample_count, count);
    }

    #[test]
    fn single_sample_volatility_is_undefined(sample in -1.0f64..1.0) {
        let (_, volatility) = aggregate(&IndexMap::new(), &[sample], Frequency::Weekly);
        prop_assert_eq!(
            volatility.annualized_volatility,
            Metric::Undefined(Anomaly::InsufficientSamples)
        );
    }
}
