//! Sensor push endpoints for devices that report on their own schedule.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use gdoormon_app::poller::Mapping;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DoorReading {
    pub open: bool,
}

#[derive(Deserialize)]
pub struct PresenceReading {
    pub present: bool,
}

/// Possible responses from the sensor endpoints.
pub enum ReadingResponse {
    /// Queued for the controller; applied asynchronously.
    Accepted,
}

impl IntoResponse for ReadingResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// `POST /api/sensors/door`
pub async fn door(
    State(state): State<AppState>,
    Json(reading): Json<DoorReading>,
) -> Result<ReadingResponse, ApiError> {
    let event = Mapping::DOOR.event_for(reading.open);
    tracing::debug!(%event, "door reading pushed");
    state.controller.send_event(event).await?;
    Ok(ReadingResponse::Accepted)
}

/// `POST /api/sensors/presence`
pub async fn presence(
    State(state): State<AppState>,
    Json(reading): Json<PresenceReading>,
) -> Result<ReadingResponse, ApiError> {
    let event = Mapping::PRESENCE.event_for(reading.present);
    tracing::debug!(%event, "presence reading pushed");
    state.controller.send_event(event).await?;
    Ok(ReadingResponse::Accepted)
}

#[cfg(test)]
mod tests {
    use crate::api::test_helpers::{get, json, post_json};
    use crate::router::build;
    use crate::testing::test_state;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn should_open_door_when_reading_pushed() {
        let app = build(test_state());

        let response = post_json(&app, "/api/sensors/door", r#"{"open": true}"#).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let body = json(get(&app, "/api/status").await).await;
        assert_eq!(body["state"], "door_open");
        let timeout = body["timeout_in_secs"].as_f64().unwrap();
        assert!(timeout > 590.0 && timeout <= 600.0);
    }

    #[tokio::test]
    async fn should_alert_when_door_opens_with_nobody_home() {
        let app = build(test_state());

        post_json(&app, "/api/sensors/presence", r#"{"present": false}"#).await;
        post_json(&app, "/api/sensors/door", r#"{"open": true}"#).await;

        let body = json(get(&app, "/api/status").await).await;
        assert_eq!(body["state"], "alerting");
    }

    #[tokio::test]
    async fn should_reject_reading_without_field() {
        let app = build(test_state());
        let response = post_json(&app, "/api/sensors/door", r#"{"closed": true}"#).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
