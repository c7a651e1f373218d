pub mod events;
pub mod health;
pub mod uploads;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/events/storage",
            post(events::handle_storage_event),
        )
        .route("/api/v1/matches/batch", post(events::handle_batch_match))
        .merge(uploads::router())
        .with_state(state)
}
