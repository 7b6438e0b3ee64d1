use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub key_manager: KeyManagerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key lifecycle engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeyManagerConfig {
    /// Prefix for all issued keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Random bytes per key
    #[serde(default = "default_entropy_bytes")]
    pub entropy_bytes: usize,
    /// Hard ceiling on generation attempts under collision pressure
    #[serde(default = "default_max_generation_retries")]
    pub max_generation_retries: u32,
    /// Default key lifetime when the caller does not pick one
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: i64,
    /// Page size when the caller does not pick one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound on requested page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Bound on every store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_key_prefix() -> String {
    "ak_".to_string()
}

fn default_entropy_bytes() -> usize {
    32
}

fn default_max_generation_retries() -> u32 {
    5
}

fn default_expiry_days() -> i64 {
    365
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    100
}

fn default_store_timeout_ms() -> u64 {
    5000
}

impl Default for KeyManagerConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            entropy_bytes: default_entropy_bytes(),
            max_generation_retries: default_max_generation_retries(),
            default_expiry_days: default_expiry_days(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl KeyManagerConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn default_expiry(&self) -> chrono::Duration {
        chrono::Duration::days(self.default_expiry_days)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("KEYMINT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
