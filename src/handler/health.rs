use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize, Debug)]
pub struct HealthStatus {
    pub status: &'static str,
    pub queued: usize,
    pub capacity: usize,
    pub accepted: u64,
    pub dropped: u64,
}

/// Handler for GET /v1/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    debug!("Health check requested");
    let stats = state.queue.stats().snapshot();
    Json(HealthStatus {
        status: "Healthy",
        queued: state.queue.queued(),
        capacity: state.queue.capacity(),
        accepted: stats.accepted,
        dropped: stats.dropped,
    })
}
