//! Health check endpoint

use super::images::iso_timestamp;
use axum::response::Json;
use chrono::Utc;
use serde::Serialize;

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"OK"`
    pub status: String,
    /// Current time, ISO 8601 UTC
    pub timestamp: String,
}

/// GET /health - Liveness probe; does not touch storage
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: iso_timestamp(Utc::now()),
    })
}
