use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Equity series is empty")]
    Empty,
    #[error("Non-finite equity value {value} at {timestamp}")]
    NonFiniteValue {
        timestamp: DateTime<Utc>,
        value: f64,
    },
    #[error("Timestamps not strictly increasing: {current} follows {previous}")]
    NonIncreasingTimestamp {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

//one valuation of the portfolio at the close of a bar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        EquityPoint { timestamp, value }
    }
}

//valuation curve for a whole run
//always non-empty, timestamps strictly increasing, values finite
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EquitySeries {
    points: Vec<EquityPoint>,
}

impl EquitySeries {
    //creates a series with validation
    pub fn new(points: Vec<EquityPoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }

        for point in &points {
            if !point.value.is_finite() {
                return Err(SeriesError::NonFiniteValue {
                    timestamp: point.timestamp,
                    value: point.value,
                });
            }
        }

        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp {
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        Ok(EquitySeries { points })
    }

    //creates a series from (timestamp, value) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| EquityPoint::new(timestamp, value))
                .collect(),
        )
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn first(&self) -> &EquityPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &EquityPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    //never true for a constructed series, kept for the len/is_empty pair
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    //the values alone, in time order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
