//! Recent-activity log.
//!
//! [`ActivityLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! keeps the most recent [`DashboardEvent`]s in a bounded ring. It runs as a
//! long-lived background task and stops when the bus sender is dropped.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::bus::DashboardEvent;

/// Default number of events retained.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 200;

/// Bounded in-memory event history, newest last internally.
pub struct ActivityLog {
    capacity: usize,
    events: RwLock<VecDeque<DashboardEvent>>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event, evicting the oldest when full.
    pub async fn record(&self, event: DashboardEvent) {
        let mut events = self.events.write().await;
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Up to `limit` events, most recent first.
    pub async fn recent(&self, limit: usize) -> Vec<DashboardEvent> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Run the consumer loop until the channel closes.
    pub async fn run(log: Arc<Self>, mut receiver: broadcast::Receiver<DashboardEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        entity_type = ?event.entity_type,
                        entity_id = ?event.entity_id,
                        "Activity recorded"
                    );
                    log.record(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Activity log lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity log shutting down");
                    break;
                }
            }
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
