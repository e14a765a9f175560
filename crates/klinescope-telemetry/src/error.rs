//! Telemetry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Logging init error: {0}")]
    Init(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
