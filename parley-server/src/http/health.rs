use crate::signaling::SignalingService;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub rooms: usize,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

pub async fn health_handler(State(service): State<SignalingService>) -> Response {
    match service.status().await {
        Ok(status) => Json(HealthReport {
            status: "ok".to_string(),
            rooms: status.rooms,
            timestamp: status.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
        .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}
