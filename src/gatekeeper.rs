//! Frame action gatekeeping.
//!
//! The only component with branching protocol logic. Each action goes
//! through the same sequence: route check, signature verification, button
//! check, then either the follow gate (for protected frames) or the
//! frame-state resolver. Collaborator calls are sequential — each step's
//! input depends on the previous step's output — and nothing is retried;
//! every failure is terminal for the request.

use crate::error::Error;
use crate::graph::SocialGraph;
use crate::metrics::METRICS;
use crate::resolver::FrameResolver;
use crate::routes::{FrameRoute, RouteTable};
use crate::verifier::MessageVerifier;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Query parameters accompanying a frame action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionQuery {
    /// Which frame sent the action. Required; checked before any other work.
    pub frame: Option<String>,
    /// Actor id, required only on gated routes.
    pub fid: Option<String>,
}

/// Orchestrates verification, follow gating, and next-frame dispatch.
///
/// Holds no per-request state; one instance serves all requests.
pub struct Gatekeeper {
    verifier: Arc<dyn MessageVerifier>,
    graph: Arc<dyn SocialGraph>,
    resolver: Arc<dyn FrameResolver>,
    routes: RouteTable,
}

impl Gatekeeper {
    pub fn new(
        verifier: Arc<dyn MessageVerifier>,
        graph: Arc<dyn SocialGraph>,
        resolver: Arc<dyn FrameResolver>,
        routes: RouteTable,
    ) -> Self {
        Self {
            verifier,
            graph,
            resolver,
            routes,
        }
    }

    pub fn gated_count(&self) -> usize {
        self.routes.gated_count()
    }

    /// Handle one signed frame action. Exactly one rendered frame or one
    /// error per call, never both, never partial.
    pub async fn handle_action(&self, query: &ActionQuery, payload: Bytes) -> Result<Bytes, Error> {
        // An unidentified frame cannot be routed regardless of message
        // validity, so this rejection precedes verification.
        let frame = query.frame.as_deref().ok_or(Error::FrameNotFound)?;

        let verdict = self.verifier.verify(&payload).await?;
        if !verdict.valid {
            warn!(frame, "Rejected frame action: invalid message");
            return Err(Error::InvalidMessage);
        }
        let message = verdict.message.ok_or_else(|| {
            warn!(frame, "Verifier accepted a message it did not decode");
            Error::InvalidMessage
        })?;

        // A frame action always carries a button index.
        let button = message.button.ok_or(Error::ButtonNotFound)?;
        let input = message.input.as_deref().unwrap_or("");
        debug!(frame, fid = message.fid, button, input, "Verified frame action");

        match self.routes.lookup(frame) {
            FrameRoute::Gated(route) => {
                let actor = query
                    .fid
                    .as_deref()
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or(Error::MissingActor)?;

                let checks = self.graph.check_following(actor, &[route.target_fid]).await?;
                // Closed-world default: no explicit "following" means no.
                let following = checks.first().map(|c| c.is_following).unwrap_or(false);

                if following {
                    METRICS.gate_granted.fetch_add(1, Ordering::Relaxed);
                    info!(frame, actor, target = route.target_fid, "Follow gate passed");
                    Ok(route.following)
                } else {
                    METRICS.gate_denied.fetch_add(1, Ordering::Relaxed);
                    info!(frame, actor, target = route.target_fid, "Follow gate denied");
                    Ok(route.not_following)
                }
            }
            FrameRoute::Open => self.resolver.resolve(frame, input, button).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FollowCheck, MockSocialGraph};
    use crate::resolver::MockFrameResolver;
    use crate::routes::GatedRoute;
    use crate::verifier::{DecodedMessage, MockMessageVerifier, Verdict};

    const FOLLOW_PROMPT: &[u8] = b"<follow-prompt>";
    const GATED_ENTRY: &[u8] = b"<gated-entry>";

    fn verdict(button: Option<u32>, input: Option<&str>) -> Verdict {
        Verdict {
            valid: true,
            message: Some(DecodedMessage {
                button,
                input: input.map(str::to_string),
                fid: 777,
            }),
        }
    }

    fn query(frame: Option<&str>, fid: Option<&str>) -> ActionQuery {
        ActionQuery {
            frame: frame.map(str::to_string),
            fid: fid.map(str::to_string),
        }
    }

    fn gatekeeper(
        verifier: MockMessageVerifier,
        graph: MockSocialGraph,
        resolver: MockFrameResolver,
    ) -> Gatekeeper {
        let routes = RouteTable::new().gate(
            "guess",
            GatedRoute {
                target_fid: 5653,
                following: Bytes::from_static(GATED_ENTRY),
                not_following: Bytes::from_static(FOLLOW_PROMPT),
            },
        );
        Gatekeeper::new(Arc::new(verifier), Arc::new(graph), Arc::new(resolver), routes)
    }

    #[tokio::test]
    async fn test_missing_frame_rejected_before_verification() {
        let mut verifier = MockMessageVerifier::new();
        verifier.expect_verify().times(0);
        let mut graph = MockSocialGraph::new();
        graph.expect_check_following().times(0);
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, graph, resolver);
        let result = gk
            .handle_action(&query(None, None), Bytes::from_static(b"{}"))
            .await;
        assert!(matches!(result, Err(Error::FrameNotFound)));
    }

    #[tokio::test]
    async fn test_invalid_message_rejected() {
        let mut verifier = MockMessageVerifier::new();
        verifier.expect_verify().times(1).returning(|_| {
            Ok(Verdict {
                valid: false,
                message: None,
            })
        });
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, MockSocialGraph::new(), resolver);
        let result = gk
            .handle_action(&query(Some("intro"), None), Bytes::from_static(b"{}"))
            .await;
        assert!(matches!(result, Err(Error::InvalidMessage)));
    }

    #[tokio::test]
    async fn test_missing_button_rejected() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(None, Some("text"))));
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, MockSocialGraph::new(), resolver);
        let result = gk
            .handle_action(&query(Some("intro"), None), Bytes::from_static(b"{}"))
            .await;
        assert!(matches!(result, Err(Error::ButtonNotFound)));
    }

    #[tokio::test]
    async fn test_gated_non_follower_gets_follow_prompt_without_resolver() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph
            .expect_check_following()
            .withf(|fid, targets| *fid == 5653 && targets.len() == 1 && targets[0] == 5653)
            .times(1)
            .returning(|_, targets| {
                Ok(vec![FollowCheck {
                    target: targets[0],
                    is_following: false,
                }])
            });
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, graph, resolver);
        let body = gk
            .handle_action(&query(Some("guess"), Some("5653")), Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), FOLLOW_PROMPT);
    }

    #[tokio::test]
    async fn test_gated_follower_gets_entry_frame_without_resolver() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph.expect_check_following().times(1).returning(|_, targets| {
            Ok(vec![FollowCheck {
                target: targets[0],
                is_following: true,
            }])
        });
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, graph, resolver);
        let body = gk
            .handle_action(&query(Some("guess"), Some("42")), Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), GATED_ENTRY);
    }

    #[tokio::test]
    async fn test_gated_without_fid_rejected_before_graph_call() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph.expect_check_following().times(0);

        let gk = gatekeeper(verifier, graph, MockFrameResolver::new());
        let result = gk
            .handle_action(&query(Some("guess"), None), Bytes::from_static(b"{}"))
            .await;
        assert!(matches!(result, Err(Error::MissingActor)));
    }

    #[tokio::test]
    async fn test_gated_non_numeric_fid_rejected() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));

        let gk = gatekeeper(verifier, MockSocialGraph::new(), MockFrameResolver::new());
        let result = gk
            .handle_action(
                &query(Some("guess"), Some("not-a-number")),
                Bytes::from_static(b"{}"),
            )
            .await;
        assert!(matches!(result, Err(Error::MissingActor)));
    }

    #[tokio::test]
    async fn test_gate_failure_propagates_not_coerced() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph
            .expect_check_following()
            .times(1)
            .returning(|_, _| Err(Error::Graph("upstream down".into())));
        let mut resolver = MockFrameResolver::new();
        resolver.expect_resolve().times(0);

        let gk = gatekeeper(verifier, graph, resolver);
        let result = gk
            .handle_action(&query(Some("guess"), Some("42")), Bytes::from_static(b"{}"))
            .await;
        // Neither the follow prompt nor the entry frame; the failure is loud.
        assert!(matches!(result, Err(Error::Graph(_))));
    }

    #[tokio::test]
    async fn test_gated_empty_result_defaults_to_not_following() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph
            .expect_check_following()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let gk = gatekeeper(verifier, graph, MockFrameResolver::new());
        let body = gk
            .handle_action(&query(Some("guess"), Some("42")), Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), FOLLOW_PROMPT);
    }

    #[tokio::test]
    async fn test_open_frame_forwarded_to_resolver_verbatim() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut resolver = MockFrameResolver::new();
        resolver
            .expect_resolve()
            .withf(|frame, input, button| frame == "intro" && input.is_empty() && *button == 1)
            .times(1)
            .returning(|_, _, _| Ok(Bytes::from_static(b"<next-frame>")));

        let gk = gatekeeper(verifier, MockSocialGraph::new(), resolver);
        let body = gk
            .handle_action(&query(Some("intro"), None), Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"<next-frame>");
    }

    #[tokio::test]
    async fn test_open_frame_passes_input_text_through() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Ok(verdict(Some(2), Some("chipotle"))));
        let mut resolver = MockFrameResolver::new();
        resolver
            .expect_resolve()
            .withf(|frame, input, button| frame == "order" && input == "chipotle" && *button == 2)
            .times(1)
            .returning(|_, _, _| Ok(Bytes::from_static(b"<ok>")));

        let gk = gatekeeper(verifier, MockSocialGraph::new(), resolver);
        let body = gk
            .handle_action(&query(Some("order"), None), Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"<ok>");
    }

    #[tokio::test]
    async fn test_identical_requests_yield_identical_responses() {
        let mut verifier = MockMessageVerifier::new();
        verifier
            .expect_verify()
            .times(2)
            .returning(|_| Ok(verdict(Some(1), None)));
        let mut graph = MockSocialGraph::new();
        graph.expect_check_following().times(2).returning(|_, targets| {
            Ok(vec![FollowCheck {
                target: targets[0],
                is_following: false,
            }])
        });

        let gk = gatekeeper(verifier, graph, MockFrameResolver::new());
        let q = query(Some("guess"), Some("5653"));
        let first = gk.handle_action(&q, Bytes::from_static(b"{}")).await.unwrap();
        let second = gk.handle_action(&q, Bytes::from_static(b"{}")).await.unwrap();
        assert_eq!(first, second);
    }
}
