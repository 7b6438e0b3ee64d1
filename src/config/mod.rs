//! Configuration loading and defaults

mod app_config;

pub use app_config::{AppConfig, KeyManagerConfig, LogFormat, LoggingConfig};
