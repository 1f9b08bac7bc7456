//! Declarative frame routing.
//!
//! Gating policy is data, not control flow: each frame id maps to either an
//! open route (forwarded to the resolver) or a gated route carrying its two
//! fixed outcomes. Built once at startup, immutable afterwards.

use bytes::Bytes;
use std::collections::HashMap;

/// A gated route's precondition and fixed outcomes.
#[derive(Debug, Clone)]
pub struct GatedRoute {
    /// Account the actor must follow.
    pub target_fid: u64,
    /// Frame served to followers.
    pub following: Bytes,
    /// Follow prompt served to everyone else.
    pub not_following: Bytes,
}

/// How an action for a given frame id is dispatched.
#[derive(Debug, Clone)]
pub enum FrameRoute {
    /// Forward to the frame-state resolver.
    Open,
    /// Short-circuit on a follow check; the resolver is never consulted.
    Gated(GatedRoute),
}

/// Frame id → route. Unknown ids are open.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    gated: HashMap<String, GatedRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gated frame.
    pub fn gate(mut self, frame: impl Into<String>, route: GatedRoute) -> Self {
        self.gated.insert(frame.into(), route);
        self
    }

    pub fn lookup(&self, frame: &str) -> FrameRoute {
        match self.gated.get(frame) {
            Some(route) => FrameRoute::Gated(route.clone()),
            None => FrameRoute::Open,
        }
    }

    pub fn gated_count(&self) -> usize {
        self.gated.len()
    }
}
