use std::time::Duration;

use log::{debug, error};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::types::{ErrorBody, GenerateRequest, GenerationResult, HealthStatus};
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP side of the backend client.
///
/// Cheap to clone: clones share the underlying connection pool, so request
/// futures can be moved onto the runtime while the controller keeps its copy.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts a generation or refinement request to its endpoint.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerationResult> {
        let url = self.url(request.endpoint());
        debug!(
            "POST {} (session {}, refinement: {})",
            url, request.session_id, request.is_refinement
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.parse(&url, response).await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url("/health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        self.parse(&url, response).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn parse<T: DeserializeOwned>(&self, url: &str, response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            let err = Error::Http {
                status: status.as_u16(),
                detail,
            };
            error!("API request failed: {} ({})", err, url);
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        serde_json::from_slice(&body).map_err(|e| {
            let err = Error::Network(format!("invalid response body: {}", e));
            error!("API request failed: {} ({})", err, url);
            err
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> Error {
        let err = if err.is_timeout() {
            Error::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            Error::Network(err.to_string())
        };
        error!("API request failed: {} ({})", err, url);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:7860/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:7860");
        assert_eq!(transport.url("/health"), "http://localhost:7860/health");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = transport.health().await.unwrap_err();
        assert!(
            matches!(err, Error::Network(_) | Error::Timeout { .. }),
            "unexpected error: {err:?}"
        );
    }
}
