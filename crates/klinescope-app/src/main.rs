//! Klinescope - real-time market-data viewer entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Real-time kline market-data viewer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via KLINESCOPE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    klinescope_ws::init_crypto();

    let args = Args::parse();

    klinescope_telemetry::init_logging()?;

    info!("Starting klinescope v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > KLINESCOPE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("KLINESCOPE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        info!(config_path = %config_path, "Loading configuration");
        klinescope_app::AppConfig::from_file(&config_path)?
    } else {
        info!(config_path = %config_path, "No configuration file, using defaults");
        klinescope_app::AppConfig::default()
    };

    let app = klinescope_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
