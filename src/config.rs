//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `FINTRACK_*` environment variable overrides.

use crate::import::DateOrderSetting;
use crate::ledger::{normalize_currency, LedgerOptions, Theme, DEFAULT_HISTORY_MONTHS};
use crate::remote::RemoteConfig;
use crate::storage::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub finance: FinanceConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where data lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Months of net worth history to keep
    #[serde(default = "default_history_months")]
    pub history_months: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("fintrack").to_string_lossy().to_string())
        .unwrap_or_else(|| "./fintrack_data".to_string())
}

fn default_history_months() -> usize {
    DEFAULT_HISTORY_MONTHS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_months: default_history_months(),
        }
    }
}

impl StorageConfig {
    /// `data_dir` with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }

    /// Directory for the JSON key/value files
    pub fn local_path(&self) -> PathBuf {
        self.data_path().join("local")
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body, CSV uploads included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults for settings the user has not changed yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "Settings::default_categories")]
    pub categories: Vec<String>,

    #[serde(default = "default_rollover_enabled")]
    pub rollover_enabled: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_rollover_enabled() -> bool {
    true
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            categories: Settings::default_categories(),
            rollover_enabled: default_rollover_enabled(),
        }
    }
}

impl FinanceConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            categories: self.categories.clone(),
            currency: self.currency.clone(),
            rollover_enabled: self.rollover_enabled,
        }
    }
}

/// CSV import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// `auto`, `dmy` or `mdy`; decides ambiguous dates when sampling is tied
    #[serde(default)]
    pub date_order: DateOrderSetting,

    #[serde(default = "default_import_category")]
    pub default_category: String,
}

fn default_import_category() -> String {
    "Other".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrderSetting::default(),
            default_category: default_import_category(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("fintrack={},tower_http=info", self.level))
        });
        let json = self.format.eq_ignore_ascii_case("json");

        let result = tracing_subscriber::registry()
            .with(filter)
            .with(json.then(|| fmt::layer().json()))
            .with((!json).then(|| fmt::layer()))
            .try_init();
        if let Err(e) = result {
            eprintln!("Logging already initialised: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        config.finance.currency =
            normalize_currency(&config.finance.currency).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("fintrack").join("config.toml")),
            Some(PathBuf::from("./fintrack.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage
        if let Some(data_dir) = var("FINTRACK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API
        if let Some(host) = var("FINTRACK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("FINTRACK_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Finance
        match var("FINTRACK_CURRENCY").map(|v| normalize_currency(&v)) {
            Some(Ok(currency)) => self.finance.currency = currency,
            Some(Err(e)) => tracing::warn!("Ignoring FINTRACK_CURRENCY: {}", e),
            None => {}
        }
        if let Some(enabled) = var("FINTRACK_ROLLOVER_ENABLED").and_then(|v| parse_bool(&v)) {
            self.finance.rollover_enabled = enabled;
        }

        // Import
        match var("FINTRACK_DATE_ORDER").map(|v| v.parse::<DateOrderSetting>()) {
            Some(Ok(order)) => self.import.date_order = order,
            Some(Err(e)) => tracing::warn!("Ignoring FINTRACK_DATE_ORDER: {}", e),
            None => {}
        }

        // Remote
        if let Some(url) = var("FINTRACK_REMOTE_URL") {
            self.remote.url = url;
        }
        if let Some(key) = var("FINTRACK_REMOTE_KEY") {
            self.remote.api_key = key;
        }

        // Logging
        if let Some(level) = var("FINTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FINTRACK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Options for building a `Ledger` from this config
    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            defaults: self.finance.settings(),
            history_months: self.storage.history_months.max(1),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# Fintrack Configuration
#
# Environment variables override these settings:
# - FINTRACK_DATA_DIR
# - FINTRACK_API_HOST
# - FINTRACK_API_PORT
# - FINTRACK_CURRENCY
# - FINTRACK_ROLLOVER_ENABLED
# - FINTRACK_DATE_ORDER
# - FINTRACK_REMOTE_URL
# - FINTRACK_REMOTE_KEY
# - FINTRACK_LOG_LEVEL
# - FINTRACK_LOG_FORMAT

[storage]
# Directory holding fintrack.db and the local/ key-value files
data_dir = "~/.local/share/fintrack"

# Months of net worth history to keep
history_months = 12

[api]
host = "127.0.0.1"
port = 8086
cors_origins = ["http://localhost:5173"]
request_timeout_secs = 30

# Largest accepted request body (bytes), CSV uploads included
max_body_bytes = 5242880

[finance]
# Used until changed through the settings endpoint or CLI
currency = "USD"
categories = ["Housing", "Groceries", "Dining", "Transport", "Utilities",
              "Health", "Entertainment", "Shopping", "Savings", "Other"]
rollover_enabled = true

[import]
# How to read dates like 01/02/2024 when the file gives no hint:
# auto (USD -> month first, otherwise day first), dmy or mdy
date_order = "auto"

# Category for rows without one
default_category = "Other"

[remote]
# Supabase-style REST endpoint used to flush the offline queue.
# Leave empty to keep actions queued locally.
url = ""
api_key = ""
request_timeout_ms = 5000
max_retries = 3
retry_backoff_ms = 1000

[theme]
accent = "#4f7cff"
muted = "#8a94a6"
surface = "#ffffff"
text = "#1f2430"
font_family = "system-ui, sans-serif"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_template_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8086);
        assert_eq!(config.finance.categories.len(), 10);
        assert_eq!(config.import.date_order, DateOrderSetting::Auto);
        assert!(!config.remote.is_configured());
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [finance]
            currency = "EUR"

            [import]
            date_order = "mdy"
            "#,
        )
        .unwrap();
        assert_eq!(config.finance.currency, "EUR");
        assert!(config.finance.rollover_enabled);
        assert_eq!(config.import.date_order, DateOrderSetting::Mdy);
        assert_eq!(config.storage.history_months, 12);
        assert_eq!(config.ledger_options().defaults.currency, "EUR");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FINTRACK_API_PORT", "9000"),
            ("FINTRACK_CURRENCY", "gbp"),
            ("FINTRACK_ROLLOVER_ENABLED", "off"),
            ("FINTRACK_DATE_ORDER", "dmy"),
            ("FINTRACK_REMOTE_URL", "https://demo.supabase.co"),
            ("FINTRACK_REMOTE_KEY", "anon"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.finance.currency, "GBP");
        assert!(!config.finance.rollover_enabled);
        assert_eq!(config.import.date_order, DateOrderSetting::Dmy);
        assert!(config.remote.is_configured());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "FINTRACK_API_PORT" => Some("not-a-port".to_string()),
            "FINTRACK_DATE_ORDER" => Some("ymd".to_string()),
            "FINTRACK_CURRENCY" => Some("dollars".to_string()),
            _ => None,
        });
        assert_eq!(config.api.port, 8086);
        assert_eq!(config.finance.currency, "USD");
        assert_eq!(config.import.date_order, DateOrderSetting::Auto);
    }

    #[test]
    fn test_load_normalizes_currency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fintrack.toml");

        std::fs::write(&path, "[finance]\ncurrency = \" eur \"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().finance.currency, "EUR");

        std::fs::write(&path, "[finance]\ncurrency = \"euro\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_data_path_expands_home() {
        let storage = StorageConfig {
            data_dir: "~/fintrack-test".to_string(),
            history_months: 12,
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(storage.data_path(), home.join("fintrack-test"));
        }
        assert!(storage.local_path().ends_with("fintrack-test/local"));
    }
}
