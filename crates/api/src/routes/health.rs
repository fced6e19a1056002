//! Health check endpoint handlers.

use axum::Json;
use serde::Serialize;

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Liveness probe.
///
/// GET /api/health
pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}
