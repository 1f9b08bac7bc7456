//! Action message verification.
//!
//! The gateway never checks signatures itself; it forwards the raw payload
//! to the validation upstream together with the trust key and acts on the
//! verdict. The trust key is injected at construction, not read from
//! ambient process state.

use crate::error::Error;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Decoded action message. Produced once per request, never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedMessage {
    /// 1-based index of the pressed button. Absence is a protocol violation.
    pub button: Option<u32>,
    /// Free text the viewer entered, if the frame had an input field.
    #[serde(default)]
    pub input: Option<String>,
    /// Numeric identity of the presser.
    pub fid: u64,
}

/// Verifier output: validity plus the decoded message when decoding worked.
#[derive(Debug, Clone, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<DecodedMessage>,
}

/// Checks that an action payload was produced by a legitimate client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageVerifier: Send + Sync {
    /// Verify one raw payload. `Err` means the check itself could not run;
    /// an authoritative "invalid" comes back as `Ok` with `valid == false`.
    async fn verify(&self, payload: &Bytes) -> Result<Verdict, Error>;
}

/// Production verifier backed by an HTTP validation endpoint.
pub struct HttpVerifier {
    http: reqwest::Client,
    endpoint: String,
    trust_key: String,
}

impl HttpVerifier {
    pub fn new(endpoint: &str, trust_key: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            trust_key: trust_key.to_string(),
        })
    }
}

#[async_trait]
impl MessageVerifier for HttpVerifier {
    async fn verify(&self, payload: &Bytes) -> Result<Verdict, Error> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.trust_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.clone())
            .send()
            .await
            .map_err(|e| Error::Verifier(format!("verify request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Verifier(format!("verify endpoint returned {status}")));
        }

        response
            .json::<Verdict>()
            .await
            .map_err(|e| Error::Verifier(format!("malformed verify response: {e}")))
    }
}
