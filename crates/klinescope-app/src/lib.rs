//! Klinescope market-data viewer.
//!
//! Main application that wires the components together:
//! - WebSocket stream subscription for the selected (symbol, interval)
//! - Kline frame parsing
//! - Series accumulation and file-backed persistence
//! - Chart-view rendering

pub mod app;
pub mod chart;
pub mod config;
pub mod error;

pub use app::{Application, Command};
pub use chart::ChartView;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
