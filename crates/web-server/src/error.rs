use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Benchmark error: {0}")]
    Orchestrator(#[from] orchestrator::error::OrchestratorError),
    #[error("Invalid request parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid request: {0}")]
    Validation(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Orchestrator(run_err) => {
                tracing::error!(error = ?run_err, "Benchmark run error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while running the benchmark".to_string(),
                )
            }
            AppError::InvalidParameter(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
