//! v1 route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/diagnose", post(handlers::diagnose))
        .route("/thresholds", get(handlers::thresholds))
        .route("/health", get(handlers::health))
        .with_state(state)
}
