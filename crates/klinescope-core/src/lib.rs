//! Core domain types for the klinescope market-data viewer.
//!
//! This crate provides the fundamental types used throughout the viewer:
//! - `Symbol`, `Interval`, `SubscriptionKey`: stream and persistence identity
//! - `Price`: precision-safe decimal price
//! - `Candle`, `Series`: one price observation and its accumulated history

pub mod candle;
pub mod error;
pub mod market;
pub mod price;

pub use candle::{Candle, Series};
pub use error::{CoreError, Result};
pub use market::{Interval, SubscriptionKey, Symbol};
pub use price::Price;
