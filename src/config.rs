use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::conversation::DEFAULT_HISTORY_WINDOW;

/// Environment variable overriding `[backend] url`.
pub const BACKEND_URL_ENV: &str = "CRYPTO_CHAT_BACKEND_URL";

/// Environment variable overriding `[market] api_base`.
pub const MARKET_URL_ENV: &str = "CRYPTO_CHAT_MARKET_URL";

/// Chat backend endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// URL that accepts the wire messages and answers with the reply
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4943/chat".to_string(),
        }
    }
}

/// Market data provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Base URL of the CoinGecko-compatible API
    pub api_base: String,
    /// Whether messages are enriched with prices at all
    pub enabled: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.coingecko.com/api/v3".to_string(),
            enabled: true,
        }
    }
}

/// Conversation texts and limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// First message of every conversation
    pub greeting: String,
    /// Text of the pending reply placeholder
    pub placeholder: String,
    /// Number of prior messages sent with each request
    pub history_window: usize,
    /// Notice shown when the backend request fails
    pub failure_notice: String,
    /// Hint shown in the empty input box
    pub input_hint: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "I'm a crypto trading assistant. Ask me anything!".to_string(),
            placeholder: "Thinking ...".to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            failure_notice: "Error processing your request. Please try again.".to_string(),
            input_hint: "Ask about Bitcoin, Ethereum...".to_string(),
        }
    }
}

/// Behavior configuration for the UI.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Number of lines to scroll with Page Up/Down
    pub scroll_page_size: usize,
    /// Redraw interval in milliseconds
    pub tick_ms: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            scroll_page_size: 10,
            tick_ms: 250,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    /// Log file path; defaults to the local data directory
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve the log file path: ~/.local/share/crypto-chat/crypto-chat.log
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            dirs::data_local_dir().map(|p| p.join("crypto-chat").join("crypto-chat.log"))
        })
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub market: MarketConfig,
    pub chat: ChatConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Returns the default config file path: ~/.config/crypto-chat/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crypto-chat").join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults.
    ///
    /// Also returns a description of the problem when a config file exists
    /// but could not be read or parsed. A missing file is not a problem.
    pub fn load_reporting() -> (Self, Option<String>) {
        let Some(path) = Self::default_path().filter(|p| p.exists()) else {
            return (Self::default().with_env_overrides(), None);
        };

        match Self::load_from_path(&path) {
            Ok(config) => (config.with_env_overrides(), None),
            Err(e) => (
                Self::default().with_env_overrides(),
                Some(format!("Ignoring {}: {}", path.display(), e)),
            ),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            self.backend.url = url;
        }

        if let Ok(base) = std::env::var(MARKET_URL_ENV) {
            self.market.api_base = base;
        }

        self
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
