//! Broadcast dispatcher.
//!
//! Fans events out to registered sessions. Every attempt is bounded by the
//! send timeout and attempts run concurrently, so one stuck display costs
//! the others at most one timeout.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, trace};

use crate::error::{HubError, HubResult};
use crate::event::{Frame, OrderEvent};
use crate::registry::ClientRegistry;
use crate::session::{Session, SessionId};

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    registry: Arc<ClientRegistry>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<ClientRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// Push `event` to every live session. Never fails.
    pub async fn broadcast(&self, event: &OrderEvent) -> BroadcastReport {
        self.fan_out(event, None).await
    }

    /// Push `event` to every live session except `sender`.
    pub async fn broadcast_except(&self, sender: SessionId, event: &OrderEvent) -> BroadcastReport {
        self.fan_out(event, Some(sender)).await
    }

    /// Push `event` to one session.
    pub async fn send_to(&self, session: &dyn Session, event: &OrderEvent) -> HubResult<()> {
        let frame = event.frame()?;
        self.deliver(session, &frame).await
    }

    async fn fan_out(&self, event: &OrderEvent, skip: Option<SessionId>) -> BroadcastReport {
        let frame = match event.frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(event = event.name(), error = %e, "Failed to encode event, nothing sent");
                return BroadcastReport::default();
            }
        };

        let sessions: Vec<Arc<dyn Session>> = self
            .registry
            .all_sessions()
            .await
            .filter(|s| Some(s.id()) != skip)
            .collect();

        let attempts = sessions.iter().map(|s| self.deliver(s.as_ref(), &frame));
        let results = join_all(attempts).await;

        let mut report = BroadcastReport {
            attempted: results.len(),
            ..BroadcastReport::default()
        };
        for (session, result) in sessions.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        session_id = %session.id(),
                        event = frame.event,
                        error = %e,
                        "Delivery to display failed"
                    );
                }
            }
        }

        debug!(
            event = frame.event,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast done"
        );
        report
    }

    async fn deliver(&self, session: &dyn Session, frame: &Frame) -> HubResult<()> {
        trace!(session_id = %session.id(), event = frame.event, "Sending frame");
        match tokio::time::timeout(self.send_timeout, session.send(frame)).await {
            Ok(result) => result,
            Err(_) => Err(HubError::Timeout {
                session: session.id(),
                after: self.send_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{device, Behavior, RecordingSession};
    use brunos_core::Order;

    fn dispatcher() -> (Dispatcher, Arc<ClientRegistry>) {
        let registry = Arc::new(ClientRegistry::new());
        let dispatcher = Dispatcher::new(registry.clone(), Duration::from_millis(50));
        (dispatcher, registry)
    }

    fn pizza() -> Order {
        Order {
            id: 1,
            article: "Pizza".to_string(),
            name: Some("Mario".to_string()),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_session() {
        let (dispatcher, registry) = dispatcher();
        let a1 = RecordingSession::new();
        let a2 = RecordingSession::new();
        let b = RecordingSession::new();
        registry.register(device(1), a1.clone()).await.unwrap();
        registry.register(device(1), a2.clone()).await.unwrap();
        registry.register(device(2), b.clone()).await.unwrap();

        let report = dispatcher.broadcast(&OrderEvent::OrderAdded(pizza())).await;
        assert_eq!(report, BroadcastReport { attempted: 3, delivered: 3, failed: 0 });
        for session in [&a1, &a2, &b] {
            assert_eq!(session.events(), vec!["order"]);
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_fan_out() {
        let (dispatcher, registry) = dispatcher();
        let ok = RecordingSession::new();
        let failing = RecordingSession::with_behavior(Behavior::Fail);
        let hung = RecordingSession::with_behavior(Behavior::Hang);
        registry.register(device(1), ok.clone()).await.unwrap();
        registry.register(device(2), failing.clone()).await.unwrap();
        registry.register(device(3), hung.clone()).await.unwrap();

        let report = dispatcher.broadcast(&OrderEvent::Reset).await;
        assert_eq!(report, BroadcastReport { attempted: 3, delivered: 1, failed: 2 });
        assert_eq!(ok.events(), vec!["reset"]);
        assert_eq!(failing.attempts(), 1);
        assert_eq!(hung.attempts(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_sessions() {
        let (dispatcher, _registry) = dispatcher();
        let report = dispatcher.broadcast(&OrderEvent::MenuUpdated).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_sender() {
        let (dispatcher, registry) = dispatcher();
        let sender = RecordingSession::new();
        let other = RecordingSession::new();
        registry.register(device(1), sender.clone()).await.unwrap();
        registry.register(device(2), other.clone()).await.unwrap();

        let event = OrderEvent::Post(serde_json::json!({ "text": "pronto!" }));
        let report = dispatcher.broadcast_except(sender.id(), &event).await;
        assert_eq!(report.attempted, 1);
        assert!(sender.events().is_empty());
        assert_eq!(other.events(), vec!["post"]);
    }

    #[tokio::test]
    async fn test_send_to_times_out() {
        let (dispatcher, _registry) = dispatcher();
        let hung = RecordingSession::with_behavior(Behavior::Hang);
        let err = dispatcher.send_to(hung.as_ref(), &OrderEvent::Init).await.unwrap_err();
        assert!(matches!(err, HubError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_sequential_events_keep_order_per_session() {
        let (dispatcher, registry) = dispatcher();
        let session = RecordingSession::new();
        registry.register(device(1), session.clone()).await.unwrap();

        dispatcher.broadcast(&OrderEvent::OrderAdded(pizza())).await;
        dispatcher.broadcast(&OrderEvent::OrderRemoved(pizza())).await;
        dispatcher.broadcast(&OrderEvent::Reset).await;
        assert_eq!(session.events(), vec!["order", "delete", "reset"]);
    }
}
