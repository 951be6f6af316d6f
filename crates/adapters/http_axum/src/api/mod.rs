//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod messages;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod status;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send))
        .route("/status", get(status::get))
        .route("/subscribers", get(status::subscribers))
        .route("/sensors/door", post(sensors::door))
        .route("/sensors/presence", post(sensors::presence))
        .route("/outbox/stream", get(sse::stream))
}
