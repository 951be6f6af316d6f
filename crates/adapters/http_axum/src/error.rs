//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gdoormon_domain::error::GdoormonError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GdoormonError`] to an HTTP response with appropriate status code.
pub struct ApiError(GdoormonError);

impl From<GdoormonError> for ApiError {
    fn from(err: GdoormonError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            GdoormonError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            GdoormonError::Unavailable => {
                tracing::error!("controller is not running");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            GdoormonError::Storage(err) | GdoormonError::Device(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
