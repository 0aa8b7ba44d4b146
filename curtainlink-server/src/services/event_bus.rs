use curtainlink_api::CurtainEvent;
use tokio::sync::broadcast;

pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of curtain events to every interested listener.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CurtainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of receivers the event reached. Having none is not an error.
    pub fn publish(&self, event: CurtainEvent) -> usize {
        tracing::trace!(
            curtain_id = event.curtain_id,
            kind = event.kind.as_str(),
            "publishing curtain event"
        );
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CurtainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use curtainlink_api::{CurtainStatus, EventKind, MotionState};
    use time::OffsetDateTime;

    use super::*;

    fn event(curtain_id: u32, kind: EventKind) -> CurtainEvent {
        CurtainEvent {
            curtain_id,
            kind,
            status: CurtainStatus {
                id: curtain_id,
                name: "Test".to_string(),
                position: 0,
                target_position: None,
                motion_state: MotionState::Idle,
                move_time: 30,
                is_closed: true,
                last_manual_update: None,
            },
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let event_bus = EventBus::default();

        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        let receiver_count = event_bus.publish(event(1, EventKind::Completed));
        assert_eq!(receiver_count, 2);

        assert!(matches!(
            receiver1.recv().await,
            Ok(CurtainEvent { kind: EventKind::Completed, .. })
        ));
        assert!(matches!(
            receiver2.recv().await,
            Ok(CurtainEvent { kind: EventKind::Completed, .. })
        ));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let event_bus = EventBus::default();

        assert_eq!(event_bus.publish(event(1, EventKind::Synced)), 0);
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let event_bus = EventBus::default();
        let mut receiver = event_bus.subscribe();

        event_bus.publish(event(1, EventKind::StateChanged));
        event_bus.publish(event(1, EventKind::Progress));
        event_bus.publish(event(1, EventKind::Completed));

        let kinds: Vec<_> = [
            receiver.recv().await.unwrap().kind,
            receiver.recv().await.unwrap().kind,
            receiver.recv().await.unwrap().kind,
        ]
        .into();
        assert_eq!(
            kinds,
            vec![EventKind::StateChanged, EventKind::Progress, EventKind::Completed]
        );
    }
}
