//! Server-sent events endpoint.
//!
//! Dashboards and officer handsets hold one `/events` stream each and
//! get pushed duty, geofence, checkout, panic and notification events.
//! Targeted events only reach the subscriber that passed the matching
//! `officerId`; everything else fans out to all subscribers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::events::ServerEvent;
use crate::main_lib::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EventsQuery {
    officer_id: Option<String>,
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let officer_id = query
        .officer_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    info!(
        "[Events] Subscriber connected ({})",
        officer_id.as_deref().unwrap_or("anonymous")
    );

    let receiver = state.event_bus.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(move |item| match item {
        Ok(event) if event.visible_to(officer_id.as_deref()) => to_sse_event(&event),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            // The subscriber fell off the back of the ring buffer; it
            // resumes from the current position.
            warn!("[Events] Slow subscriber missed {missed} events");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &ServerEvent) -> Option<Result<Event, Infallible>> {
    match Event::default().event(&event.name).json_data(event) {
        Ok(sse) => Some(Ok(sse)),
        Err(err) => {
            error!("[Events] Failed to serialize {}: {err}", event.name);
            None
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(stream_events))
}
