use crate::metrics::Frequency;
use crate::warmup::WarmupSpec;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

//settings for one report computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    //frequency of the period returns (daily bars: 252/yr, weekly bars: 52/yr)
    pub frequency: Frequency,

    //annual risk-free rate for the approximate sharpe ratio
    pub risk_free_rate: f64,

    //bar compression, 1.0 for daily bars
    pub bars_per_calendar_day: f64,

    //compute sharpe and max drawdown from the equity curve when the engine supplies none
    pub compute_missing_ratios: bool,

    //"auto", a bar count ("200") or a duration ("30d")
    pub warmup: WarmupSpec,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            frequency: Frequency::Daily,
            risk_free_rate: 0.04,
            bars_per_calendar_day: 1.0,
            compute_missing_ratios: false,
            warmup: WarmupSpec::Absent,
        }
    }
}

impl ReportConfig {
    //one weekly bar spans seven calendar days
    pub fn weekly() -> Self {
        ReportConfig {
            frequency: Frequency::Weekly,
            bars_per_calendar_day: 1.0 / 7.0,
            ..Self::default()
        }
    }

    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config: ReportConfig = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
