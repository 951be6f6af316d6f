//! Inbound chat messages — a local transport for the command dispatcher.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gdoormon_app::dispatcher::Reply;
use gdoormon_domain::command::InboundMessage;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the send endpoint.
pub enum SendResponse {
    /// Text to deliver back to the sender.
    Reply(Json<Reply>),
    /// The message was not a command and gets no reply.
    Dropped,
}

impl IntoResponse for SendResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Reply(json) => json.into_response(),
            Self::Dropped => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /api/messages`
pub async fn send(
    State(state): State<AppState>,
    Json(message): Json<InboundMessage>,
) -> Result<SendResponse, ApiError> {
    let reply = state.controller.dispatch(message).await?;
    Ok(match reply {
        Some(reply) => SendResponse::Reply(Json(reply)),
        None => SendResponse::Dropped,
    })
}
