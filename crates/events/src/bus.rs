//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DashboardEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use cabinet_core::types::{EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const ASSIGNMENT_UPSERTED: &str = "assignment.upserted";
pub const ASSIGNMENT_REMOVED: &str = "assignment.removed";
pub const PROSPECT_ASSIGNED: &str = "prospect.assigned";
pub const ANNOTATION_CREATED: &str = "annotation.created";
pub const ANNOTATION_DELETED: &str = "annotation.deleted";

// ---------------------------------------------------------------------------
// DashboardEvent
// ---------------------------------------------------------------------------

/// A domain event raised by a mutation.
///
/// Constructed via [`DashboardEvent::new`] and enriched with
/// [`with_entity`](DashboardEvent::with_entity) and
/// [`with_payload`](DashboardEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEvent {
    /// Dot-separated event name, e.g. `"assignment.upserted"`.
    pub event_type: String,

    /// Optional entity kind (e.g. `"assignment"`, `"prospect"`).
    pub entity_type: Option<String>,

    /// Optional numeric entity id.
    pub entity_id: Option<EntityId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl DashboardEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: EntityId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// When the buffer is full the oldest un-consumed messages are dropped and
/// slow receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: DashboardEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DashboardEvent::new(ASSIGNMENT_UPSERTED)
            .with_entity("assignment", 42)
            .with_payload(serde_json::json!({"budgeted_hours": 40.0}));
        bus.publish(event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, ASSIGNMENT_UPSERTED);
        assert_eq!(received.entity_type.as_deref(), Some("assignment"));
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.payload["budgeted_hours"], 40.0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(DashboardEvent::new(PROSPECT_ASSIGNED));

        assert_eq!(a.recv().await.unwrap().event_type, PROSPECT_ASSIGNED);
        assert_eq!(b.recv().await.unwrap().event_type, PROSPECT_ASSIGNED);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DashboardEvent::new(ANNOTATION_CREATED));
    }

    #[test]
    fn new_event_has_empty_object_payload() {
        let event = DashboardEvent::new(ANNOTATION_DELETED);
        assert!(event.payload.as_object().unwrap().is_empty());
        assert!(event.entity_id.is_none());
    }
}
