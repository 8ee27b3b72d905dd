use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

//read-only snapshot of what a strategy declares about itself
//populated deliberately by the strategy or the engine, never by reflection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyIntrospection {
    //declared parameters by name, in declaration order
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,

    //bars each attached indicator needs before it produces valid output
    #[serde(default)]
    pub indicator_periods: Vec<usize>,
}

impl StrategyIntrospection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_indicator_period(mut self, period: usize) -> Self {
        self.indicator_periods.push(period);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.indicator_periods.is_empty()
    }

    //load a snapshot exported by the engine as json
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read introspection file: {:?}", path))?;
        let snapshot = serde_json::from_str(&contents)
            .context(format!("Failed to parse introspection file: {:?}", path))?;
        Ok(snapshot)
    }
}
