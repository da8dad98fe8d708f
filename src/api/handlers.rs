//! Endpoint handlers. Every handler answers through the envelope.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Uri;
use axum::response::Response;
use serde::Serialize;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::audit::AuditSink;
use crate::diagnostician::Diagnostician;
use crate::types::{TelemetryField, ThresholdTable};
use crate::validator::allowed_range;

/// Shared router state.
#[derive(Clone)]
pub struct ApiState {
    pub diagnostician: Diagnostician,
    pub audit: Arc<dyn AuditSink>,
}

impl ApiState {
    pub fn new(diagnostician: Diagnostician, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            diagnostician,
            audit,
        }
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("diagnostician", &self.diagnostician)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PhysicalRange {
    pub field: TelemetryField,
    pub min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ThresholdsResponse {
    pub thresholds: ThresholdTable,
    pub physical_ranges: Vec<PhysicalRange>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/v1/diagnose`
///
/// Always 200: invalid and malformed readings are diagnoses too.
pub async fn diagnose(State(state): State<ApiState>, body: Bytes) -> Response {
    let body = String::from_utf8_lossy(&body);
    let diagnosis = state
        .diagnostician
        .diagnose_json(&body, state.audit.as_ref());
    ApiResponse::ok(diagnosis)
}

/// `GET /api/v1/thresholds`
pub async fn thresholds(State(state): State<ApiState>) -> Response {
    let physical_ranges = TelemetryField::ALL
        .iter()
        .map(|&field| {
            let range = allowed_range(field);
            PhysicalRange {
                field,
                min: range.min,
                max: range.max,
            }
        })
        .collect();

    ApiResponse::ok(ThresholdsResponse {
        thresholds: *state.diagnostician.limits(),
        physical_ranges,
    })
}

/// `GET /api/v1/health`
pub async fn health() -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn not_found(uri: Uri) -> Response {
    ApiErrorResponse::not_found(format!("no route for {}", uri.path()))
}
