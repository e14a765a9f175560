//! Stream and persistence identity types.
//!
//! A live subscription is identified by a (symbol, interval) pair. The pair
//! determines both the feed channel to subscribe to and the namespace the
//! accumulated series is persisted under.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for a tradable pair (e.g. "ethusdt").
///
/// Always lowercase ASCII alphanumeric; the constructor validates and
/// normalizes, so a `Symbol` in hand is a usable channel component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

/// Candle granularity.
///
/// The variants carry the feed's wire spelling ("1m", "3m", "5m") in
/// serde, `Display`, and `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
}

impl Interval {
    /// All supported granularities, in ascending order.
    pub const ALL: [Interval; 3] = [Self::OneMinute, Self::ThreeMinutes, Self::FiveMinutes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "3m" => Ok(Self::ThreeMinutes),
            "5m" => Ok(Self::FiveMinutes),
            other => Err(CoreError::InvalidInterval(other.to_string())),
        }
    }
}

/// Unique identifier for one stream subscription.
///
/// Format: `{symbol}:{interval}` (e.g. "ethusdt:1m").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub symbol: Symbol,
    pub interval: Interval,
}

impl SubscriptionKey {
    pub fn new(symbol: Symbol, interval: Interval) -> Self {
        Self { symbol, interval }
    }

    /// Feed channel name, e.g. "ethusdt@kline_1m".
    pub fn channel(&self) -> String {
        format!("{}@kline_{}", self.symbol, self.interval)
    }

    /// Persistence namespace for the accumulated series.
    ///
    /// Keyed by the full (symbol, interval) pair so series for different
    /// granularities of the same symbol never overwrite each other.
    pub fn namespace(&self) -> String {
        format!("{}:{}", self.symbol, self.interval)
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(symbol: &str, interval: &str) -> SubscriptionKey {
        SubscriptionKey::new(
            Symbol::new(symbol).unwrap(),
            interval.parse().unwrap(),
        )
    }

    #[test]
    fn test_symbol_normalizes_case() {
        let s = Symbol::new("ETHUSDT").unwrap();
        assert_eq!(s.as_str(), "ethusdt");
    }

    #[test]
    fn test_symbol_rejects_invalid() {
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("eth/usdt").is_err());
        assert!(Symbol::new("eth usdt").is_err());
    }

    #[test]
    fn test_interval_round_trip() {
        for interval in Interval::ALL {
            let parsed: Interval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, interval);
        }
        assert!("2m".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_serde_uses_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&Interval::ThreeMinutes).unwrap(),
            "\"3m\""
        );
        let parsed: Interval = serde_json::from_str("\"5m\"").unwrap();
        assert_eq!(parsed, Interval::FiveMinutes);
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(key("ethusdt", "1m").channel(), "ethusdt@kline_1m");
        assert_eq!(key("bnbusdt", "5m").channel(), "bnbusdt@kline_5m");
    }

    #[test]
    fn test_namespace_includes_interval() {
        assert_eq!(key("ethusdt", "1m").namespace(), "ethusdt:1m");
        assert_ne!(
            key("ethusdt", "1m").namespace(),
            key("ethusdt", "3m").namespace()
        );
    }
}
