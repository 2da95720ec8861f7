//! HTTP boundary mapping for the shared error taxonomy.
//!
//! Pipeline stages stay HTTP-free; this is the only place a status code is
//! chosen. 5xx variants log full detail server-side and return a generic
//! message to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use subtrim_shared::ApiError;
use tracing::error;

/// Handler result alias: success bodies are JSON, failures map through
/// `HttpError`.
pub type HandlerResult<T> = Result<Json<T>, HttpError>;

pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Misconfigured(detail) => {
                error!("Misconfiguration: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "server misconfigured".to_string())
            }
            ApiError::UpstreamFormat { preview } => (
                StatusCode::BAD_GATEWAY,
                format!("upstream output had no usable JSON: {preview}"),
            ),
            ApiError::Upstream(detail) => {
                error!("Upstream failure: {}", detail);
                (StatusCode::BAD_GATEWAY, "upstream request failed".to_string())
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
