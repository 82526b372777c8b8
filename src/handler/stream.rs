use crate::app::AppState;
use crate::handler::authorize;
use crate::pipeline::parse_and_submit;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

/// Why a streaming session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Close frame received or the peer went away.
    ClientClosed,
    /// The relay is shutting down.
    Shutdown,
    /// Unexpected read failure.
    ReadError,
}

/// Handler for the streaming (WebSocket) path.
///
/// Credentials are checked once before the upgrade; every frame on the
/// connection is then attributed to that identity.
pub async fn stream_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let identity = match authorize(&headers, &state.registry) {
        Ok(identity) => identity,
        Err(rejection) => return rejection.into_response(),
    };
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            warn!("Could not open websocket connection: {rejection}");
            return rejection.into_response();
        }
    };
    let source_ip = peer.to_string();

    upgrade
        .on_failed_upgrade(|e| warn!("Could not open websocket connection: {e}"))
        .on_upgrade(move |socket| async move {
            info!(%source_ip, %identity, "Client connected");
            let end = receive_loop(socket, &state, &source_ip, &identity).await;
            debug!(%source_ip, ?end, "Stream finished");
        })
}

/// Submit every data frame until the peer closes, a read fails or shutdown
/// is requested. Undecodable frames are logged and skipped.
pub async fn receive_loop<S>(
    mut frames: S,
    state: &AppState,
    source_ip: &str,
    identity: &str,
) -> StreamEnd
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            () = state.shutdown.cancelled() => {
                info!(%source_ip, %identity, "Closing stream for shutdown");
                return StreamEnd::Shutdown;
            }
            frame = frames.next() => frame,
        };

        let submitted = match frame {
            Some(Ok(Message::Text(text))) => {
                parse_and_submit(&state.queue, text.as_str().as_bytes(), source_ip, identity)
            }
            Some(Ok(Message::Binary(data))) => {
                parse_and_submit(&state.queue, &data, source_ip, identity)
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => {
                info!(%source_ip, %identity, "Client quit");
                return StreamEnd::ClientClosed;
            }
            Some(Err(e)) => {
                warn!(%source_ip, %identity, "Error reading message: {e}");
                return StreamEnd::ReadError;
            }
        };

        if let Err(e) = submitted {
            warn!(%source_ip, %identity, "{e}");
        }
    }
}
