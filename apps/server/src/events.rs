//! Realtime fan-out.
//!
//! [`EventBus`] is a thin wrapper over a tokio broadcast channel. The
//! domain services publish through the [`Broadcaster`] trait; the SSE
//! endpoint subscribes and replays whatever arrives while the client
//! is connected. Delivery is fire-and-forget: a subscriber that falls
//! behind the channel capacity misses events and recovers by polling
//! the REST endpoints.

use bandobast_core::events::{BroadcastEvent, Broadcaster};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// One event as delivered to SSE subscribers. `target` carries the
/// officer code for events addressed to a single officer; everything
/// else goes to every subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl ServerEvent {
    /// Whether a subscriber identified by `officer_code` should see
    /// this event. Untargeted events are visible to everyone,
    /// including anonymous subscribers.
    pub fn visible_to(&self, officer_code: Option<&str>) -> bool {
        match self.target.as_deref() {
            None => true,
            Some(target) => officer_code == Some(target),
        }
    }
}

impl From<BroadcastEvent> for ServerEvent {
    fn from(event: BroadcastEvent) -> Self {
        Self {
            name: event.name,
            target: event.target,
            payload: event.payload,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send to every current subscriber. A bus with no subscribers
    /// swallows the event; that is normal between dashboard sessions.
    pub fn publish(&self, event: ServerEvent) {
        debug!(
            "[Events] Publishing {} (target: {})",
            event.name,
            event.target.as_deref().unwrap_or("all")
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }
}

impl Broadcaster for EventBus {
    fn publish(&self, event: BroadcastEvent) {
        EventBus::publish(self, ServerEvent::from(event));
    }
}
