//! Server-Sent Events (SSE) stream of outbound notices.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// `GET /api/outbox/stream` — SSE stream of messages queued for subscribers.
///
/// Each [`OutboundMessage`](gdoormon_app::outbox::OutboundMessage) is sent
/// as a JSON `data:` frame. A chat bridge consumes this to deliver notices.
/// The stream continues until the client disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let outbox_rx = state.outbox.subscribe();
    let message_stream = BroadcastStream::new(outbox_rx).filter_map(|result| match result {
        Ok(message) => match serde_json::to_string(&message) {
            Ok(json) => Some(Ok(Event::default().event("message").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize outbound message for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some messages were dropped");
            None
        }
    });

    Sse::new(message_stream).keep_alive(KeepAlive::default())
}
