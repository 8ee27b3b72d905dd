use crate::warmup::{ResolvedWarmup, StrategyIntrospection, WarmupSpec};
use serde_json::Value;
use tracing::{debug, warn};

//parameter names containing one of these (case-insensitive) declare a warm-up in bars
//anything ending in "period" is an indicator setting, not a warm-up
pub const WARMUP_NAME_MARKERS: [&str; 3] = ["warmup", "warm_up", "warm-up"];

//turns the caller's request into one concrete cutoff
//explicit bars/durations pass through; an absent request is inferred from
//a declared warm-up parameter, then from the slowest indicator, then zero
pub fn resolve(
    spec: &WarmupSpec,
    introspection: Option<&StrategyIntrospection>,
    bars_per_calendar_day: f64,
) -> ResolvedWarmup {
    let resolved = match spec {
        WarmupSpec::Bars(bars) => ResolvedWarmup::Bars(*bars),
        WarmupSpec::Duration(duration) => ResolvedWarmup::Duration(*duration),
        WarmupSpec::Absent => infer(introspection),
    };

    debug!(
        %spec,
        %resolved,
        approx_calendar_days = resolved
            .calendar_span(bars_per_calendar_day)
            .map(|span| span.num_seconds() as f64 / 86_400.0),
        "resolved warm-up"
    );

    resolved
}

fn infer(introspection: Option<&StrategyIntrospection>) -> ResolvedWarmup {
    let Some(snapshot) = introspection else {
        debug!("no strategy introspection, assuming no warm-up");
        return ResolvedWarmup::Bars(0);
    };

    let candidates: Vec<(&str, usize)> = snapshot
        .parameters
        .iter()
        .filter(|(name, _)| is_warmup_name(name))
        .filter_map(|(name, value)| positive_bar_count(value).map(|bars| (name.as_str(), bars)))
        .collect();

    match candidates.as_slice() {
        [(name, bars)] => {
            debug!(parameter = name, bars, "warm-up taken from declared parameter");
            return ResolvedWarmup::Bars(*bars);
        }
        [] => {}
        many => {
            warn!(
                parameters = ?many.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
                "ambiguous warm-up parameters, falling back to indicator periods"
            );
        }
    }

    //indicators run side by side on the same bars, so the slowest one dominates
    match snapshot.indicator_periods.iter().max() {
        Some(&slowest) => {
            debug!(bars = slowest, "warm-up taken from slowest indicator");
            ResolvedWarmup::Bars(slowest)
        }
        None => ResolvedWarmup::Bars(0),
    }
}

fn is_warmup_name(name: &str) -> bool {
    let name = name.to_lowercase();
    WARMUP_NAME_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

//positive whole numbers only, 200 and 200.0 both count
fn positive_bar_count(value: &Value) -> Option<usize> {
    if let Some(bars) = value.as_u64() {
        return usize::try_from(bars).ok().filter(|bars| *bars > 0);
    }

    value
        .as_f64()
        .filter(|v| v.is_finite() && *v > 0.0 && v.fract() == 0.0 && *v <= usize::MAX as f64)
        .map(|v| v as usize)
}
