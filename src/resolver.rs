//! Frame state resolution.
//!
//! The resolver decides which frame follows which; its internals live
//! upstream. The gateway only forwards `(frame, input, button)` and returns
//! the rendered bytes untouched.

use crate::error::Error;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Computes the next frame for a validated, ungated action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameResolver: Send + Sync {
    async fn resolve(&self, frame: &str, input: &str, button: u32) -> Result<Bytes, Error>;
}

/// Production resolver backed by an HTTP frame-state endpoint.
pub struct HttpResolver {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpResolver {
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl FrameResolver for HttpResolver {
    async fn resolve(&self, frame: &str, input: &str, button: u32) -> Result<Bytes, Error> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "frame": frame,
                "input": input,
                "button": button,
            }))
            .send()
            .await
            .map_err(|e| Error::Resolver(format!("resolve request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Resolver(format!("resolver returned {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::Resolver(format!("resolver body read failed: {e}")))
    }
}
