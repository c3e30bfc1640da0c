//! Bakery API client
//!
//! Thin wrapper over `reqwest` that knows the base URL, sends the bearer
//! token on every request and turns non-2xx responses into [`ClientError`]s
//! carrying the backend's own message when it sent one.

use reqwest::{
    Client, Response, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::ApiConfig;

pub use crate::client::{
    envelope::{ItemEnvelope, ListEnvelope},
    errors::error_message,
};

mod envelope;
mod errors;

/// Errors that can occur when talking to the bakery API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An HTTP transport, timeout or body decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured token cannot be sent as a header.
    #[error("invalid API token: {0}")]
    InvalidToken(#[from] InvalidHeaderValue),

    /// The token was missing, expired or revoked.
    #[error("unauthorized; sign in again")]
    Unauthorized,

    /// The API answered with a non-2xx status.
    #[error("request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code.
        status: u16,

        /// Message extracted from the error body, if any.
        message: Option<String>,
    },
}

impl ClientError {
    /// The message the backend sent with a rejection, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            ClientError::Http(_) | ClientError::InvalidToken(_) | ClientError::Unauthorized => {
                None
            }
        }
    }
}

/// HTTP client for the bakery REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// Every request carries the bearer token (when configured) and fails
    /// once the configured timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// underlying client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = config.api_token.as_deref().filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))?;

            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let timeout = config.request_timeout();

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Absolute URL for an API path such as `/sales/sales/`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an unexpected body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;

        read_json(response).await
    }

    /// `POST` a JSON body and read the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an unexpected body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str(&text)
            .ok()
            .and_then(|body| error_message(&body));

        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(url: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            api_url: url.to_string(),
            api_token: token.map(str::to_string),
            currency: "ETB".to_string(),
            request_timeout_seconds: 30,
        }
    }

    #[test]
    fn url_joins_base_and_path() -> TestResult {
        let client = ApiClient::new(&config("http://localhost:8000/api/v1/", None))?;

        assert_eq!(
            client.url("/sales/sales/"),
            "http://localhost:8000/api/v1/sales/sales/"
        );
        assert_eq!(
            client.url("production/products/3/"),
            "http://localhost:8000/api/v1/production/products/3/"
        );

        Ok(())
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let result = ApiClient::new(&config("http://localhost", Some("abc\ndef")));

        assert!(matches!(result, Err(ClientError::InvalidToken(_))));
    }

    #[test]
    fn backend_message_only_for_api_errors() {
        let rejected = ClientError::Api {
            status: 400,
            message: Some("Insufficient stock".to_string()),
        };

        assert_eq!(rejected.backend_message(), Some("Insufficient stock"));
        assert_eq!(ClientError::Unauthorized.backend_message(), None);
    }
}
