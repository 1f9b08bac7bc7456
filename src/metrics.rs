//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub actions_total: AtomicU64,
    pub actions_ok: AtomicU64,
    pub actions_error: AtomicU64,

    // --- Gate outcomes ---
    pub gate_granted: AtomicU64,
    pub gate_denied: AtomicU64,

    // --- Upstream failures ---
    pub verifier_errors: AtomicU64,
    pub graph_errors: AtomicU64,
    pub resolver_errors: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub action_duration_us_sum: AtomicU64,
    pub action_duration_us_max: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            actions_total: AtomicU64::new(0),
            actions_ok: AtomicU64::new(0),
            actions_error: AtomicU64::new(0),
            gate_granted: AtomicU64::new(0),
            gate_denied: AtomicU64::new(0),
            verifier_errors: AtomicU64::new(0),
            graph_errors: AtomicU64::new(0),
            resolver_errors: AtomicU64::new(0),
            action_duration_us_sum: AtomicU64::new(0),
            action_duration_us_max: AtomicU64::new(0),
        }
    }

    pub fn record_action_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.action_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.action_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.action_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, gated_frames: usize) -> String {
        let actions_total = self.actions_total.load(Ordering::Relaxed);
        let actions_ok = self.actions_ok.load(Ordering::Relaxed);
        let actions_error = self.actions_error.load(Ordering::Relaxed);
        let gate_granted = self.gate_granted.load(Ordering::Relaxed);
        let gate_denied = self.gate_denied.load(Ordering::Relaxed);
        let verifier_errors = self.verifier_errors.load(Ordering::Relaxed);
        let graph_errors = self.graph_errors.load(Ordering::Relaxed);
        let resolver_errors = self.resolver_errors.load(Ordering::Relaxed);
        let dur_sum = self.action_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.action_duration_us_max.swap(0, Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP gateway_actions_total Total frame actions received.\n\
# TYPE gateway_actions_total counter\n\
gateway_actions_total {actions_total}\n\
# HELP gateway_actions_ok_total Frame actions answered with a rendered frame.\n\
# TYPE gateway_actions_ok_total counter\n\
gateway_actions_ok_total {actions_ok}\n\
# HELP gateway_actions_error_total Frame actions rejected or failed.\n\
# TYPE gateway_actions_error_total counter\n\
gateway_actions_error_total {actions_error}\n\
# HELP gateway_gate_granted_total Follow-gate checks that passed.\n\
# TYPE gateway_gate_granted_total counter\n\
gateway_gate_granted_total {gate_granted}\n\
# HELP gateway_gate_denied_total Follow-gate checks that prompted a follow.\n\
# TYPE gateway_gate_denied_total counter\n\
gateway_gate_denied_total {gate_denied}\n\
# HELP gateway_verifier_errors_total Verification upstream failures.\n\
# TYPE gateway_verifier_errors_total counter\n\
gateway_verifier_errors_total {verifier_errors}\n\
# HELP gateway_graph_errors_total Social graph upstream failures.\n\
# TYPE gateway_graph_errors_total counter\n\
gateway_graph_errors_total {graph_errors}\n\
# HELP gateway_resolver_errors_total Resolver upstream failures.\n\
# TYPE gateway_resolver_errors_total counter\n\
gateway_resolver_errors_total {resolver_errors}\n\
# HELP gateway_action_duration_seconds_sum Total handler time (seconds).\n\
# TYPE gateway_action_duration_seconds_sum counter\n\
gateway_action_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP gateway_action_duration_seconds_max Max handler time since last scrape (seconds).\n\
# TYPE gateway_action_duration_seconds_max gauge\n\
gateway_action_duration_seconds_max {dur_max_s:.6}\n\
# HELP gateway_gated_frames Configured gated frames.\n\
# TYPE gateway_gated_frames gauge\n\
gateway_gated_frames {gated_frames}\n"
        )
    }
}
