use serde::{Deserialize, Serialize};

//a position still open when the backtest ended, as reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    //instrument symbol (eg spmo, qqq)
    pub symbol: String,

    //signed size: positive for long, negative for short
    pub size: f64,

    //last close seen for the instrument, if the feed had any bars
    #[serde(default)]
    pub last_price: Option<f64>,
}

impl OpenPosition {
    pub fn new(symbol: impl Into<String>, size: f64, last_price: Option<f64>) -> Self {
        OpenPosition {
            symbol: symbol.into(),
            size,
            last_price,
        }
    }

    //returns true if the position is flat (nothing to report)
    pub fn is_flat(&self) -> bool {
        self.size == 0.0
    }

    //size * last price, none without a price
    pub fn market_value(&self) -> Option<f64> {
        self.last_price.map(|price| self.size * price)
    }
}
