//! Application configuration.

use crate::error::{AppError, AppResult};
use klinescope_core::{Interval, SubscriptionKey, Symbol};
use serde::{Deserialize, Serialize};

/// One selectable trading pair: display label plus feed symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolOption {
    /// Display label (e.g. "ETH/USDT").
    pub label: String,
    /// Feed symbol (e.g. "ethusdt").
    pub symbol: String,
}

/// Application configuration.
///
/// Every field has a default, so a missing or partial config file still
/// yields a runnable viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base stream endpoint; the channel name is appended to it.
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,

    /// Directory the persisted series live under.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Symbol selected at startup. Must be one of `symbols`.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    /// Interval selected at startup.
    #[serde(default = "default_interval")]
    pub default_interval: Interval,

    /// Capacity of the stream event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Fixed set of selectable trading pairs.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolOption>,
}

fn default_ws_base_url() -> String {
    "wss://stream.binance.com:9443/ws/".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_symbols() -> Vec<SymbolOption> {
    [
        ("ETH/USDT", "ethusdt"),
        ("BNB/USDT", "bnbusdt"),
        ("DOT/USDT", "dotusdt"),
    ]
    .into_iter()
    .map(|(label, symbol)| SymbolOption {
        label: label.to_string(),
        symbol: symbol.to_string(),
    })
    .collect()
}

fn default_symbol() -> String {
    "ethusdt".to_string()
}

fn default_interval() -> Interval {
    Interval::OneMinute
}

fn default_event_buffer() -> usize {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
            data_dir: default_data_dir(),
            default_symbol: default_symbol(),
            default_interval: default_interval(),
            event_buffer: default_event_buffer(),
            symbols: default_symbols(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency: at least one symbol option, each option
    /// is a valid symbol, and the startup symbol is in the set.
    pub fn validate(&self) -> AppResult<()> {
        if self.symbols.is_empty() {
            return Err(AppError::Config("No symbol options configured".to_string()));
        }

        for option in &self.symbols {
            Symbol::new(&option.symbol)
                .map_err(|e| AppError::Config(format!("Bad symbol option: {e}")))?;
        }

        if !self.symbols.iter().any(|o| o.symbol == self.default_symbol) {
            return Err(AppError::Config(format!(
                "Default symbol {} is not among the configured options",
                self.default_symbol
            )));
        }

        Ok(())
    }

    /// Subscription selected at startup.
    pub fn default_key(&self) -> AppResult<SubscriptionKey> {
        let symbol = Symbol::new(&self.default_symbol)?;
        Ok(SubscriptionKey::new(symbol, self.default_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let key = config.default_key().unwrap();
        assert_eq!(key.channel(), "ethusdt@kline_1m");
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("ws_base_url"));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_symbol, config.default_symbol);
        assert_eq!(parsed.default_interval, config.default_interval);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("default_interval = \"5m\"").unwrap();
        assert_eq!(parsed.default_interval, Interval::FiveMinutes);
        assert_eq!(parsed.ws_base_url, default_ws_base_url());
        assert_eq!(parsed.symbols.len(), 3);
    }

    #[test]
    fn test_validate_rejects_unknown_default_symbol() {
        let config = AppConfig {
            default_symbol: "solusdt".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_symbol_option() {
        let mut config = AppConfig::default();
        config.symbols.push(SymbolOption {
            label: "BAD".to_string(),
            symbol: "not a symbol".to_string(),
        });
        assert!(config.validate().is_err());
    }
}
