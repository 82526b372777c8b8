use crate::app::AppState;
use crate::error::RelayError;
use crate::handler::authorize;
use crate::pipeline::parse_and_submit;
use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use http_body_util::LengthLimitError;
use std::net::SocketAddr;
use tracing::{error, warn};

/// Upper bound for a single unary payload.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Handler for POST on the configured HTTP path.
///
/// Fire-and-forget: a 200 means the payload was authenticated and parsed,
/// not that the event was queued. Shed events are only logged.
pub async fn ingest_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Body,
) -> (StatusCode, &'static str) {
    let identity = match authorize(&headers, &state.registry) {
        Ok(identity) => identity,
        Err(rejection) => return rejection,
    };
    let source_ip = peer.to_string();

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return body_read_failure(e, &identity, &source_ip),
    };

    match parse_and_submit(&state.queue, &body, &source_ip, &identity) {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e @ RelayError::InvalidPayload(_)) => {
            warn!(%identity, %source_ip, "{e}");
            (StatusCode::BAD_REQUEST, "Invalid JSON")
        }
        Err(e @ RelayError::QueueClosed) => {
            warn!(%identity, %source_ip, "{e}");
            (StatusCode::SERVICE_UNAVAILABLE, "Shutting down")
        }
        Err(e) => {
            warn!(%identity, %source_ip, "{e}");
            (StatusCode::OK, "OK")
        }
    }
}

/// Oversized bodies are the client's fault; anything else is ours.
fn body_read_failure(
    e: axum::Error,
    identity: &str,
    source_ip: &str,
) -> (StatusCode, &'static str) {
    let source = e.into_inner();
    if source.is::<LengthLimitError>() {
        warn!(%identity, %source_ip, limit = MAX_BODY_BYTES, "Request body too large");
        return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
    }
    error!(%identity, %source_ip, "Unable to read request body: {source}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Unable to read request body",
    )
}
