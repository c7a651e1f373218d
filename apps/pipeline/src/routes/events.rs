use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::errors::PipelineError;
use crate::models::response::InvocationResponse;
use crate::state::AppState;

/// POST /api/v1/events/storage
///
/// Bucket-notification webhook (MinIO / S3). Runs the extractor for the first record.
/// The body is taken raw so an unreadable event is answered by the extractor (500).
pub async fn handle_storage_event(
    State(state): State<AppState>,
    body: String,
) -> InvocationResponse {
    state.extractor.handle_raw(&body).await
}

/// POST /api/v1/matches/batch
///
/// Runs the batch matcher once. 204 when there is no resume to match.
pub async fn handle_batch_match(State(state): State<AppState>) -> Result<Response, PipelineError> {
    let batch = state.batch.as_ref().ok_or_else(|| {
        PipelineError::Internal(anyhow::anyhow!(
            "batch matching is disabled: GEMINI_API_KEY is not set"
        ))
    })?;

    Ok(match batch.run().await? {
        Some(response) => response.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
