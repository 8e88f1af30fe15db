//! Server-sent signal stream.
//!
//! Every connected page receives each bus signal as an SSE event named after
//! the signal (`cart-updated`, `user-updated`, `storage-changed`, `resync`)
//! with the signal as JSON data.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

/// Stream bus signals to the client until it disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Event stream opened");
    let signals = state.storage().events().subscribe().into_stream();
    let events = signals.map(|signal| {
        let event = Event::default().event(signal.name());
        Ok(event.json_data(&signal).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode signal");
            Event::default().event(signal.name())
        }))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
