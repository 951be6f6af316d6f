//! Read-only views: controller status and subscribers.

use axum::Json;
use axum::extract::State;

use gdoormon_app::controller::Status;
use gdoormon_domain::identity::BareIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/status`
pub async fn get(State(state): State<AppState>) -> Result<Json<Status>, ApiError> {
    let status = state.controller.status().await?;
    Ok(Json(status))
}

/// `GET /api/subscribers`
pub async fn subscribers(State(state): State<AppState>) -> Json<Vec<BareIdentity>> {
    Json(state.registry.all())
}

#[cfg(test)]
mod tests {
    use crate::api::test_helpers::{get, json, post_json};
    use crate::router::build;
    use crate::testing::test_state;

    #[tokio::test]
    async fn should_report_ok_state_initially() {
        let app = build(test_state());
        let body = json(get(&app, "/api/status").await).await;
        assert_eq!(body["state"], "ok");
        assert!(body["timeout_in_secs"].is_null());
        assert_eq!(body["subscribers"], 0);
    }

    #[tokio::test]
    async fn should_list_subscribers_in_order() {
        let app = build(test_state());
        for from in ["b@x/phone", "a@x/laptop", "b@x/laptop"] {
            post_json(
                &app,
                "/api/messages",
                &format!(r#"{{"from": "{from}", "body": "subscribe secret"}}"#),
            )
            .await;
        }

        let body = json(get(&app, "/api/subscribers").await).await;
        assert_eq!(body, serde_json::json!(["a@x", "b@x"]));
    }
}
