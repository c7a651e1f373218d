use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Pipeline-level error type shared by every unit.
///
/// `status_code` maps unreadable input to 400 and everything upstream to 500.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, PipelineError>`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Payload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PipelineError::Payload(_) => "INVALID_PAYLOAD",
            PipelineError::Storage(_) => "STORAGE_ERROR",
            PipelineError::Ocr(_) => "OCR_ERROR",
            PipelineError::Pdf(_) => "PDF_ERROR",
            PipelineError::Database(_) => "DATABASE_ERROR",
            PipelineError::Redis(_) => "REDIS_ERROR",
            PipelineError::Llm(_) => "LLM_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Payload(e.to_string())
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}: {self}", self.code());
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
