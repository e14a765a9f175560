//! Kline message parsing.
//!
//! The feed sends one JSON text frame per update. The candle payload sits
//! under the wrapper key `"k"`, with the bucket open time in `t`
//! (milliseconds) and the open/high/low/close prices as strings in
//! `o`/`h`/`l`/`c`.

use crate::error::{FeedError, FeedResult};
use klinescope_core::{Candle, Price};
use serde::Deserialize;
use tracing::debug;

/// Wire envelope for one kline update.
#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    k: RawKline,
}

/// Raw candle fields as the feed sends them.
///
/// Prices arrive as strings. The symbol and interval echoes (`s`, `i`)
/// are not required by the accumulator but are kept for debug logging
/// when present.
#[derive(Debug, Deserialize)]
struct RawKline {
    t: i64,
    o: String,
    h: String,
    l: String,
    c: String,
    #[serde(default)]
    s: Option<String>,
    #[serde(default)]
    i: Option<String>,
}

/// Parser for kline text frames.
#[derive(Debug, Default)]
pub struct KlineParser;

impl KlineParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one text frame into a candle.
    ///
    /// Malformed JSON, a missing `k` wrapper, or an unparseable price all
    /// fail with a typed error; the caller drops the frame and the
    /// connection stays up.
    pub fn parse(&self, payload: &str) -> FeedResult<Candle> {
        let envelope: KlineEnvelope = serde_json::from_str(payload)?;
        let raw = envelope.k;

        let candle = Candle::new(
            raw.t,
            parse_price(&raw.o, "o")?,
            parse_price(&raw.h, "h")?,
            parse_price(&raw.l, "l")?,
            parse_price(&raw.c, "c")?,
        );

        debug!(
            time = candle.open_time_ms,
            close = %candle.close,
            symbol = raw.s.as_deref().unwrap_or("-"),
            interval = raw.i.as_deref().unwrap_or("-"),
            "Parsed kline frame"
        );

        Ok(candle)
    }
}

fn parse_price(s: &str, field: &str) -> FeedResult<Price> {
    s.parse()
        .map_err(|_| FeedError::ParseError(format!("Invalid price in field {field}: {s}")))
}
