//! Social graph follow checks.
//!
//! Every check is a fresh query against the upstream graph — follow state
//! can change between interactions and the gate is a security boundary, so
//! nothing here is cached or memoized.

use crate::error::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One follow relationship answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCheck {
    pub target: u64,
    pub is_following: bool,
}

/// Answers follow-relationship queries against an external social graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Does `fid` follow each of `targets`? A transport or protocol error is
    /// returned as `Err` and must never be coerced into either boolean.
    async fn check_following(&self, fid: u64, targets: &[u64]) -> Result<Vec<FollowCheck>, Error>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowQuery<'a> {
    fid: u64,
    is_following: &'a [u64],
}

#[derive(Deserialize)]
struct FollowReply {
    #[serde(default)]
    data: Option<Vec<FollowCheck>>,
    #[serde(default)]
    error: Option<String>,
}

/// Production gate backed by an HTTP graph endpoint.
pub struct HttpGraph {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGraph {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl SocialGraph for HttpGraph {
    async fn check_following(&self, fid: u64, targets: &[u64]) -> Result<Vec<FollowCheck>, Error> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&FollowQuery {
                fid,
                is_following: targets,
            })
            .send()
            .await
            .map_err(|e| Error::Graph(format!("follow check failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Graph(format!("graph endpoint returned {status}")));
        }

        let reply: FollowReply = response
            .json()
            .await
            .map_err(|e| Error::Graph(format!("malformed graph response: {e}")))?;

        // An explicit error field outranks any data that came with it.
        if let Some(err) = reply.error {
            return Err(Error::Graph(err));
        }

        let checks = reply.data.unwrap_or_default();
        debug!(fid, results = checks.len(), "Follow check completed");
        Ok(checks)
    }
}
