//! Realtime event contract between the domain services and the
//! transport layer.
//!
//! Services describe *what happened*; how the event reaches connected
//! clients (SSE, tests, nothing at all) is decided by the injected
//! [`Broadcaster`] implementation.

use serde::Serialize;
use serde_json::Value;

/// An officer's position was refreshed.
pub const OFFICER_LOCATION_UPDATED: &str = "officer-location-updated";
/// An officer finished their duty and left the live map.
pub const OFFICER_WENT_OFF_DUTY: &str = "officer-went-off-duty";
/// An on-duty officer moved outside their assigned geofence.
pub const OFFICER_GEOFENCE_EXIT: &str = "officer-geofence-exit";
/// A previously outside officer moved back inside the geofence.
pub const OFFICER_GEOFENCE_ENTER: &str = "officer-geofence-enter";
/// Cumulative out-of-fence time crossed the alert threshold.
pub const SUPERVISOR_GEOFENCE_ALERT: &str = "supervisor-geofence-alert";
/// An officer asked to end their duty early.
pub const NEW_CHECKOUT_REQUEST: &str = "new-checkout-request";
/// A supervisor approved a checkout request (targeted).
pub const CHECKOUT_APPROVED: &str = "checkout-approved";
/// A supervisor denied a checkout request (targeted).
pub const CHECKOUT_DENIED: &str = "checkout-denied";
/// An officer pressed the panic button.
pub const PANIC_ALERT_TRIGGERED: &str = "panic-alert-triggered";
/// A notification was stored for a specific officer (targeted).
pub const NEW_NOTIFICATION: &str = "new-notification";

/// A single realtime event. `target` carries the officer code for
/// events addressed to one officer's private channel; `None` means the
/// event goes to every connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub payload: Value,
}

impl BroadcastEvent {
    /// Event for every connected client.
    pub fn broadcast(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            target: None,
            payload,
        }
    }

    /// Event addressed to one officer's private channel.
    pub fn to_officer(
        name: impl Into<String>,
        officer_code: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            name: name.into(),
            target: Some(officer_code.into()),
            payload,
        }
    }

    pub fn is_targeted(&self) -> bool {
        self.target.is_some()
    }
}

/// Outbound realtime channel. Publishing is fire-and-forget: the state
/// change that produced the event has already been persisted, so
/// implementations must not fail the calling operation.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, event: BroadcastEvent);
}

/// Drops every event. Default sink for services constructed without a
/// realtime channel (tests, one-off tools).
#[derive(Debug, Default, Clone)]
pub struct NoOpBroadcaster;

impl Broadcaster for NoOpBroadcaster {
    fn publish(&self, _event: BroadcastEvent) {}
}
