//! Application state shared across handlers.

use crate::config::{Config, GateConfig};
use crate::frames::{render_frame, FrameSpec};
use crate::gatekeeper::Gatekeeper;
use crate::graph::HttpGraph;
use crate::resolver::HttpResolver;
use crate::routes::{GatedRoute, RouteTable};
use crate::verifier::HttpVerifier;
use bytes::Bytes;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gatekeeper: Gatekeeper,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration, wiring the production
    /// HTTP collaborators.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let verifier = HttpVerifier::new(&config.verifier_url, &config.trust_key)?;
        let graph = HttpGraph::new(&config.graph_url, &config.trust_key)?;
        let resolver = HttpResolver::new(&config.resolver_url)?;

        let routes = build_routes(&config);
        info!(gated_frames = routes.gated_count(), "Route table built");

        let gatekeeper = Gatekeeper::new(
            Arc::new(verifier),
            Arc::new(graph),
            Arc::new(resolver),
            routes,
        );
        Ok(Self::with_gatekeeper(config, gatekeeper))
    }

    /// Assemble state around an existing gatekeeper. Lets tests substitute
    /// deterministic collaborators without network access.
    pub fn with_gatekeeper(config: Config, gatekeeper: Gatekeeper) -> Self {
        Self {
            config,
            gatekeeper,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }
}

/// Materialize the gated routes from configuration. The two outcomes per
/// gate are rendered once here and served as-is afterwards.
fn build_routes(config: &Config) -> RouteTable {
    let mut table = RouteTable::new();
    for gate in &config.gated {
        table = table.gate(
            gate.frame.clone(),
            GatedRoute {
                target_fid: gate.target_fid,
                following: Bytes::from(render_entry_frame(config, gate)),
                not_following: Bytes::from(render_follow_prompt(config, gate)),
            },
        );
    }
    table
}

fn render_follow_prompt(config: &Config, gate: &GateConfig) -> String {
    render_frame(&FrameSpec {
        image: absolute_url(&config.public_url, &gate.prompt_image),
        buttons: vec![gate.prompt_label.clone()],
        // Pressing the button retries the gate once the actor follows.
        post_url: Some(format!(
            "{}/api/frame?frame={}",
            config.public_url, gate.frame
        )),
        aspect_ratio: Some(gate.aspect_ratio.clone()),
        ..Default::default()
    })
}

fn render_entry_frame(config: &Config, gate: &GateConfig) -> String {
    render_frame(&FrameSpec {
        image: absolute_url(&config.public_url, &gate.entry_image),
        buttons: vec![gate.entry_label.clone()],
        input_text: gate.entry_input.clone(),
        aspect_ratio: Some(gate.aspect_ratio.clone()),
        ..Default::default()
    })
}

fn absolute_url(public_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", public_url.trim_end_matches('/'), path)
    } else {
        path.to_string()
    }
}
