//! Fetching raw provider payloads over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Given a URL, returns the response body.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, url))]
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = res.status();
        let body = res.text().await.map_err(TransportError::Request)?;
        debug!(%status, bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                body: truncate_body(&body),
            });
        }
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
