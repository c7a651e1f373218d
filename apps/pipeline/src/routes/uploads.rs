use axum::{
    http::Method,
    response::IntoResponse,
    routing::post,
    Router,
};

use crate::pipeline::upload::{validate_upload, CORS_HEADERS};

/// OPTIONS|POST /api/v1/uploads
///
/// The body is taken raw so malformed JSON is reported by the validator (500)
/// rather than rejected by an extractor.
pub async fn handle_upload(method: Method, body: String) -> impl IntoResponse {
    (CORS_HEADERS, validate_upload(&method, &body))
}

/// Stateless, so it can be merged into any router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api/v1/uploads", post(handle_upload).options(handle_upload))
}
