//! # Frame Gateway
//!
//! Server-side handler for signed frame actions. Every button press on a
//! frame arrives as a signed action message; the gateway verifies it,
//! enforces a follow-gate on protected frames, and forwards everything else
//! to the upstream frame-state resolver.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin frame-gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with request counters
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/frame` - Signed frame action

pub mod config;
mod error;
pub mod frames;
pub mod gatekeeper;
pub mod graph;
mod handlers;
pub mod metrics;
mod middleware;
pub mod resolver;
mod response;
mod router;
pub mod routes;
mod state;
pub mod verifier;

pub use config::Config;
pub use error::Error;
pub use gatekeeper::{ActionQuery, Gatekeeper};
pub use router::create as create_router;
pub use state::AppState;
