pub mod introspection;
pub mod resolver;

pub use introspection::StrategyIntrospection;
pub use resolver::{resolve, WARMUP_NAME_MARKERS};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarmupParseError {
    #[error("Empty warm-up amount in '{0}'")]
    MissingAmount(String),
    #[error("Invalid warm-up amount '{0}'")]
    InvalidAmount(String),
    #[error("Unknown warm-up unit '{unit}' in '{input}' (expected d, h, m, s or w)")]
    UnknownUnit { input: String, unit: String },
    #[error("Warm-up duration '{0}' is out of range")]
    OutOfRange(String),
}

//how much of the start of a run to exclude, as requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WarmupSpec {
    //infer from the strategy introspection snapshot
    #[default]
    Absent,
    Bars(usize),
    Duration(TimeDelta),
}

//a concrete cutoff, exactly one representation per resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedWarmup {
    Bars(usize),
    Duration(#[serde(serialize_with = "serialize_seconds")] TimeDelta),
}

impl ResolvedWarmup {
    //calendar time covered by the warm-up
    //bar counts are converted with the caller's bars-per-day compression
    pub fn calendar_span(&self, bars_per_calendar_day: f64) -> Option<TimeDelta> {
        match self {
            ResolvedWarmup::Duration(duration) => Some(*duration),
            ResolvedWarmup::Bars(bars) => {
                if !(bars_per_calendar_day.is_finite() && bars_per_calendar_day > 0.0) {
                    return None;
                }
                let seconds = (*bars as f64 / bars_per_calendar_day * 86_400.0).round();
                TimeDelta::try_seconds(seconds as i64)
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            ResolvedWarmup::Bars(bars) => *bars == 0,
            ResolvedWarmup::Duration(duration) => *duration <= TimeDelta::zero(),
        }
    }
}

impl fmt::Display for ResolvedWarmup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedWarmup::Bars(bars) => write!(f, "{} bars", bars),
            ResolvedWarmup::Duration(duration) => write!(f, "{}", format_duration(*duration)),
        }
    }
}

fn serialize_seconds<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_seconds())
}

//renders with the largest unit that divides the duration exactly
fn format_duration(duration: TimeDelta) -> String {
    let seconds = duration.num_seconds();
    if seconds != 0 && seconds % 604_800 == 0 {
        format!("{}w", seconds / 604_800)
    } else if seconds != 0 && seconds % 86_400 == 0 {
        format!("{}d", seconds / 86_400)
    } else if seconds != 0 && seconds % 3_600 == 0 {
        format!("{}h", seconds / 3_600)
    } else if seconds != 0 && seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

impl fmt::Display for WarmupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupSpec::Absent => write!(f, "auto"),
            WarmupSpec::Bars(bars) => write!(f, "{}", bars),
            WarmupSpec::Duration(duration) => write!(f, "{}", format_duration(*duration)),
        }
    }
}

//parses "auto" or "" (absent), "30" (bars), "30d" / "12h" / "90m" / "45s" / "2w" (duration)
impl FromStr for WarmupSpec {
    type Err = WarmupParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("auto") {
            return Ok(WarmupSpec::Absent);
        }

        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (amount, unit) = input.split_at(split);

        if amount.is_empty() {
            return Err(WarmupParseError::MissingAmount(input.to_string()));
        }

        let amount: i64 = amount
            .parse()
            .map_err(|_| WarmupParseError::InvalidAmount(amount.to_string()))?;

        let duration = match unit.trim().to_lowercase().as_str() {
            "" => {
                return usize::try_from(amount)
                    .map(WarmupSpec::Bars)
                    .map_err(|_| WarmupParseError::InvalidAmount(input.to_string()))
            }
            "w" => TimeDelta::try_weeks(amount),
            "d" => TimeDelta::try_days(amount),
            "h" => TimeDelta::try_hours(amount),
            "m" => TimeDelta::try_minutes(amount),
            "s" => TimeDelta::try_seconds(amount),
            other => {
                return Err(WarmupParseError::UnknownUnit {
                    input: input.to_string(),
                    unit: other.to_string(),
                })
            }
        };

        duration
            .map(WarmupSpec::Duration)
            .ok_or_else(|| WarmupParseError::OutOfRange(input.to_string()))
    }
}

impl TryFrom<String> for WarmupSpec {
    type Error = WarmupParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WarmupSpec> for String {
    fn from(spec: WarmupSpec) -> Self {
        spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bar_counts_and_durations() {
        assert_eq!("".parse::<WarmupSpec>(), Ok(WarmupSpec::Absent));
        assert_eq!("Auto".parse::<WarmupSpec>(), Ok(WarmupSpec::Absent));
        assert_eq!("200".parse::<WarmupSpec>(), Ok(WarmupSpec::Bars(200)));
        assert_eq!(
            "30d".parse::<WarmupSpec>(),
            Ok(WarmupSpec::Duration(TimeDelta::days(30)))
        );
        assert_eq!(
            "12H".parse::<WarmupSpec>(),
            Ok(WarmupSpec::Duration(TimeDelta::hours(12)))
        );
        assert_eq!(
            "2w".parse::<WarmupSpec>(),
            Ok(WarmupSpec::Duration(TimeDelta::weeks(2)))
        );
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(
            "d".parse::<WarmupSpec>(),
            Err(WarmupParseError::MissingAmount(_))
        ));
        assert!(matches!(
            "-5".parse::<WarmupSpec>(),
            Err(WarmupParseError::MissingAmount(_))
        ));
        assert!(matches!(
            "30y".parse::<WarmupSpec>(),
            Err(WarmupParseError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["auto", "50", "30d", "12h", "2w", "90m"] {
            let spec: WarmupSpec = text.parse().unwrap();
            assert_eq!(spec.to_string(), text);
        }
    }

    #[test]
    fn bar_counts_convert_to_calendar_span() {
        let daily = ResolvedWarmup::Bars(30).calendar_span(1.0);
        assert_eq!(daily, Some(TimeDelta::days(30)));

        //hourly bars, 24 per day
        let hourly = ResolvedWarmup::Bars(48).calendar_span(24.0);
        assert_eq!(hourly, Some(TimeDelta::days(2)));

        assert_eq!(ResolvedWarmup::Bars(5).calendar_span(0.0), None);
    }
}
