use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("feature provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("random source failed: {0}")]
    RandomSource(#[from] getrandom::Error),
}

/// Errors that can occur while serving rollout requests
#[derive(Error, Debug)]
pub enum RolloutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("feature provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("identifier generation error: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] crate::config::ValidationError),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for RolloutError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
