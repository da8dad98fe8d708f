//! HTTP front end.
//!
//! - `POST /api/v1/diagnose`: one request in, one diagnosis out
//! - `GET  /api/v1/thresholds`: the compiled-in threshold table
//! - `GET  /api/v1/health`: liveness

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Env var holding a comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "ENGINE_SUPPORT_CORS_ORIGINS";

/// Default request body limit when none is configured.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;

/// Same-origin only unless `ENGINE_SUPPORT_CORS_ORIGINS` is set.
fn build_cors_layer() -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ORIGINS_ENV) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            cors.allow_origin(allowed)
        }
        Err(_) => cors,
    }
}

/// Router with the default body limit.
pub fn create_app(state: ApiState) -> Router {
    create_app_with_limit(state, DEFAULT_MAX_BODY_BYTES)
}

/// Router with an explicit request body limit (`server.max_body_bytes`).
pub fn create_app_with_limit(state: ApiState, max_body_bytes: usize) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .fallback(handlers::not_found)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
