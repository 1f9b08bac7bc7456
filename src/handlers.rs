//! HTTP request handlers.

use crate::error::Error;
use crate::gatekeeper::ActionQuery;
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{FrameResponse, HealthResponse};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bytes::Bytes;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Health check with basic metrics.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        gated_frames: state.gatekeeper.gated_count(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = METRICS.render(state.gatekeeper.gated_count());
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}

/// Handle one signed frame action. `POST /api/frame?frame=...&fid=...`
pub async fn frame_action(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
    Extension(RequestId(req_id)): Extension<RequestId>,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    METRICS.actions_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    match state.gatekeeper.handle_action(&query, body).await {
        Ok(frame) => {
            METRICS.actions_ok.fetch_add(1, Ordering::Relaxed);
            METRICS.record_action_duration(start);
            FrameResponse(frame).into_response()
        }
        Err(e) => {
            match &e {
                Error::Verifier(_) => METRICS.verifier_errors.fetch_add(1, Ordering::Relaxed),
                Error::Graph(_) => METRICS.graph_errors.fetch_add(1, Ordering::Relaxed),
                Error::Resolver(_) => METRICS.resolver_errors.fetch_add(1, Ordering::Relaxed),
                _ => 0,
            };
            METRICS.actions_error.fetch_add(1, Ordering::Relaxed);
            METRICS.record_action_duration(start);
            warn!(
                req_id = %req_id,
                frame = query.frame.as_deref().unwrap_or("-"),
                error = %e,
                "Frame action rejected"
            );
            e.into_response()
        }
    }
}
