use super::AppState;
use crate::config::HEALTH_PATH;
use crate::handler::health::health_handler;
use crate::handler::ingest::ingest_handler;
use crate::handler::stream::stream_handler;
use axum::Router;
use axum::routing::{get, post};

/// Build the relay router: unary ingress, streaming ingress and health.
///
/// Only POST is routed on the unary path, so other methods get 405.
pub fn main_router(state: AppState, http_path: &str, websocket_path: &str) -> Router {
    let v1_health_router = Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .with_state(state.clone());

    let ingress_router = Router::new()
        .route(http_path, post(ingest_handler))
        .route(websocket_path, get(stream_handler))
        .with_state(state);

    Router::new().merge(v1_health_router).merge(ingress_router)
}
