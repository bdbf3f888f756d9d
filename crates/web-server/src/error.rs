use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry::ServiceError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The request itself is malformed: bad id, bad query string or body.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Downstream failures are passed through verbatim in the body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::Service(ServiceError::Validation(_)) => {
                tracing::warn!(error = %self, "Rejected invalid request.");
                StatusCode::BAD_REQUEST
            }
            AppError::Service(ServiceError::NotFound(_)) => {
                tracing::warn!(error = %self, "Person not found.");
                StatusCode::NOT_FOUND
            }
            AppError::Service(ServiceError::Enrichment(err)) => {
                tracing::error!(error = ?err, "Enrichment error.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Service(ServiceError::Storage(err)) => {
                tracing::error!(error = ?err, "Database error.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
