use std::time::Duration;

use async_trait::async_trait;
use estatelens_models::config::ApiConfig;
use tracing::{debug, warn};

use crate::error::TransportError;

/// Read-only access to the transaction API. Mockable for testing.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` (relative to the API base) with query parameters and return the JSON body.
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, TransportError> {
        let url = self.url(path);
        debug!(url = %url, params = params.len(), "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout.as_secs())
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<serde_json::Value>().await.ok();
            warn!(url = %url, status = status.as_u16(), "API request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.as_secs())
            } else {
                TransportError::Decode(e.to_string())
            }
        })
    }
}
