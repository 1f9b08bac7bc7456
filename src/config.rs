//! Gateway configuration.
//!
//! Loaded from an optional `gateway.toml` plus `GATEWAY_*` environment
//! overrides. The trust key lives here and is handed to the verifier and
//! graph clients at construction; no component reads it from the process
//! environment on its own.

use serde::Deserialize;

/// Configuration for the frame gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Base URL this gateway is reachable at; used for image and post-back
    /// URLs inside rendered frames.
    #[serde(default = "defaults::public_url")]
    pub public_url: String,

    /// Message validation endpoint.
    #[serde(default = "defaults::verifier_url")]
    pub verifier_url: String,

    /// Social graph follow-check endpoint.
    #[serde(default = "defaults::graph_url")]
    pub graph_url: String,

    /// Frame-state resolver endpoint.
    #[serde(default = "defaults::resolver_url")]
    pub resolver_url: String,

    /// Credential for the verifier and graph upstreams.
    #[serde(default)]
    pub trust_key: String,

    /// Gated frames. Empty means every frame routes to the resolver.
    #[serde(default = "defaults::gated")]
    pub gated: Vec<GateConfig>,
}

/// One gated frame: the precondition plus the two fixed outcomes.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Frame id the gate protects.
    pub frame: String,

    /// Account the actor must follow.
    pub target_fid: u64,

    /// Image shown on the follow prompt. Paths are resolved against
    /// `public_url`.
    #[serde(default = "defaults::prompt_image")]
    pub prompt_image: String,

    #[serde(default = "defaults::prompt_label")]
    pub prompt_label: String,

    /// Image shown to followers on the gated entry frame.
    #[serde(default = "defaults::entry_image")]
    pub entry_image: String,

    #[serde(default = "defaults::entry_label")]
    pub entry_label: String,

    /// Placeholder for the text input on the entry frame, if any.
    #[serde(default)]
    pub entry_input: Option<String>,

    #[serde(default = "defaults::aspect_ratio")]
    pub aspect_ratio: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            public_url: defaults::public_url(),
            verifier_url: defaults::verifier_url(),
            graph_url: defaults::graph_url(),
            resolver_url: defaults::resolver_url(),
            trust_key: String::new(),
            gated: defaults::gated(),
        }
    }
}

mod defaults {
    use super::GateConfig;

    pub fn bind_address() -> String {
        "0.0.0.0:3060".into()
    }

    pub fn public_url() -> String {
        "http://localhost:3060".into()
    }

    pub fn verifier_url() -> String {
        "http://localhost:4010/verify".into()
    }

    pub fn graph_url() -> String {
        "http://localhost:4020/following".into()
    }

    pub fn resolver_url() -> String {
        "http://localhost:4030/resolve".into()
    }

    pub fn prompt_image() -> String {
        "/sorry.png".into()
    }

    pub fn prompt_label() -> String {
        "Follow to unlock".into()
    }

    pub fn entry_image() -> String {
        "/enter.png".into()
    }

    pub fn entry_label() -> String {
        "Submit".into()
    }

    pub fn aspect_ratio() -> String {
        "1:1".into()
    }

    pub fn gated() -> Vec<GateConfig> {
        vec![GateConfig {
            frame: "guess".into(),
            target_fid: 5653,
            prompt_image: prompt_image(),
            prompt_label: prompt_label(),
            entry_image: entry_image(),
            entry_label: entry_label(),
            entry_input: Some("Enter the password".into()),
            aspect_ratio: aspect_ratio(),
        }]
    }
}
