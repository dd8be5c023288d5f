//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ratings::RatingsError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Read model error.
    Ratings(RatingsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Ratings(err) => ratings_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn ratings_error_to_response(err: RatingsError) -> (StatusCode, String) {
    let status = match &err {
        RatingsError::Unavailable(_)
        | RatingsError::NewSession(_)
        | RatingsError::ScyllaExecution(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, %status, "ratings read failed");
    (status, err.to_string())
}

impl From<RatingsError> for ApiError {
    fn from(err: RatingsError) -> Self {
        ApiError::Ratings(err)
    }
}
