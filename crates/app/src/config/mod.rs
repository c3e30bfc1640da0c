//! Application configuration

use clap::Args;
use thiserror::Error;

pub use crate::config::{
    api::ApiConfig,
    observability::{LogFormat, LoggingConfig},
    store::StoreConfig,
};

mod api;
mod observability;
mod store;

/// Errors raised while interpreting configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured currency is not an ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Bakehouse configuration, read from CLI flags, the environment and `.env`.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Bakery API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Local storage settings.
    #[command(flatten)]
    pub store: StoreConfig,
}
