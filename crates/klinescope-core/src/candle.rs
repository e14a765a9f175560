//! Candle and series types.
//!
//! A `Candle` is one aggregated price observation for a time bucket; a
//! `Series` is the append-only history of candles for one subscription.

use crate::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated price observation (open/high/low/close) for a time bucket.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, milliseconds since the Unix epoch.
    #[serde(rename = "time")]
    pub open_time_ms: i64,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

impl Candle {
    pub fn new(open_time_ms: i64, open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            open_time_ms,
            open,
            high,
            low,
            close,
        }
    }

    /// Bucket open time as a UTC timestamp.
    ///
    /// None if the millisecond value is outside the representable range.
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time_ms)
    }
}

/// Ordered, append-only history of candles for one subscription.
///
/// Points are kept in arrival order; there is no reordering, no
/// de-duplication, and no length bound. Serializes as a plain JSON array
/// of candles, which is exactly the persisted representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<Candle>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one candle at the end.
    pub fn push(&mut self, candle: Candle) {
        self.points.push(candle);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Candle] {
        &self.points
    }

    pub fn last(&self) -> Option<&Candle> {
        self.points.last()
    }
}

impl From<Vec<Candle>> for Series {
    fn from(points: Vec<Candle>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
