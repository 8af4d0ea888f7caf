//! Transport seam between adapters and the network.
//!
//! Adapters depend on the [`HttpClient`] trait rather than `reqwest`
//! directly, so tests can replay canned provider payloads.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) sinotick/0.1";

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Minimal GET-only transport used by provider adapters.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| HttpError::new(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| HttpError::new(error.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// In-memory transport replaying queued responses, for adapter tests.
#[derive(Default)]
pub struct ReplayHttpClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    requested: Mutex<Vec<String>>,
}

impl ReplayHttpClient {
    pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .expect("replay client mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl HttpClient for ReplayHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requested
            .lock()
            .expect("replay client mutex poisoned")
            .push(url.to_owned());

        self.responses
            .lock()
            .expect("replay client mutex poisoned")
            .pop_front()
            .ok_or_else(|| HttpError::permanent("replay queue exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_client_returns_queued_responses_in_order() {
        let client = ReplayHttpClient::new([
            HttpResponse::ok_json("{\"a\":1}"),
            HttpResponse::ok_json("{\"b\":2}"),
        ]);

        let first = client.get("http://example/one").await.expect("queued");
        assert_eq!(first.body, "{\"a\":1}");

        let second = client.get("http://example/two").await.expect("queued");
        assert_eq!(second.body, "{\"b\":2}");

        let err = client.get("http://example/three").await.expect_err("empty");
        assert!(!err.retryable());
        assert_eq!(client.requested().len(), 3);
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(HttpResponse::ok_json("{}").is_success());
        assert!(!HttpResponse {
            status: 500,
            body: String::new()
        }
        .is_success());
    }
}
