//! HTTP transport for the accounting service.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

use crate::domain::gateway::{AccountingTransport, GatewayError};

/// Posts request documents to the accounting service endpoint.
///
/// Holds a single [`reqwest::Client`] so connections are pooled across
/// login attempts. Every request is bounded by the configured timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built
    /// (for example when the TLS backend fails to initialize).
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tempus-fugit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AccountingTransport for HttpTransport {
    async fn send(&self, body: String) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}
