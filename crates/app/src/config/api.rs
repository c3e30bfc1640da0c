//! Bakery API Config

use std::time::Duration;

use clap::Args;
use rusty_money::{Findable, iso::Currency};

use super::ConfigError;

/// Bakery API settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the bakery REST API
    #[arg(
        long,
        env = "BAKEHOUSE_API_URL",
        default_value = "http://localhost:8000/api/v1",
        global = true
    )]
    pub api_url: String,

    /// Bearer token for the bakery API
    #[arg(long, env = "BAKEHOUSE_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// ISO 4217 code prices and payments are expressed in
    #[arg(long, env = "BAKEHOUSE_CURRENCY", default_value = "ETB", global = true)]
    pub currency: String,

    /// Request timeout in seconds
    #[arg(
        long,
        env = "BAKEHOUSE_REQUEST_TIMEOUT_SECONDS",
        default_value_t = 30_u64,
        global = true
    )]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not an ISO 4217 code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Currency::find(self.currency.trim())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
