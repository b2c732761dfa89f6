//! Configuration management

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token for the update feed (only needed by `start`)
    pub bot_token: Option<String>,
    /// Bot API base URL
    #[serde(default = "default_telegram_url")]
    pub api_url: String,
    /// Long-poll timeout in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Maximum updates per fetch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerConfig {
    /// Bittrex public API base URL
    #[serde(default = "default_bittrex_url")]
    pub bittrex_url: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_ticker_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Local currency catalog; fetched from the exchange when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    /// Coin monitor executable; forwarding is disabled when unset
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of recent message bodies remembered for de-duplication
    #[serde(default = "default_duplicate_capacity")]
    pub duplicate_capacity: usize,
}

fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_batch_limit() -> u32 {
    50
}

fn default_bittrex_url() -> String {
    "https://bittrex.com/api/v1.1".to_string()
}

fn default_ticker_timeout() -> u64 {
    10
}

fn default_duplicate_capacity() -> usize {
    crate::dedup::DEFAULT_CAPACITY
}

impl Config {
    /// Load configuration from file, overlaid with `SIGNAL_RELAY__*` env vars
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("SIGNAL_RELAY").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = [
            "signal-relay.toml",
            "config.toml",
            "~/.config/signal-relay/config.toml",
        ];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        tracing::debug!("No configuration file found, using defaults and environment");
        Self::load("signal-relay.toml")
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: default_telegram_url(),
            poll_timeout_secs: default_poll_timeout(),
            batch_limit: default_batch_limit(),
        }
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            bittrex_url: default_bittrex_url(),
            timeout_secs: default_ticker_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            duplicate_capacity: default_duplicate_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.ticker.bittrex_url, "https://bittrex.com/api/v1.1");
        assert_eq!(config.pipeline.duplicate_capacity, 100);
        assert!(config.monitor.command.is_none());
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            batch_limit = 10

            [monitor]
            command = "/usr/local/bin/coin-monitor"

            [catalog]
            path = "currencies.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.batch_limit, 10);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.monitor.command.as_deref(), Some("/usr/local/bin/coin-monitor"));
        assert_eq!(config.catalog.path.as_deref(), Some("currencies.json"));
        assert_eq!(config.ticker.timeout_secs, 10);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/signal-relay.toml").unwrap();
        assert_eq!(config.pipeline.duplicate_capacity, 100);
    }
}
