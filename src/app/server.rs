use crate::error::RelayError;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Bind the relay listener on all interfaces.
pub async fn bind(port: u16) -> Result<TcpListener, RelayError> {
    let bind_addr = format!("0.0.0.0:{port}");
    TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| RelayError::Bind {
            address: bind_addr,
            source: e,
        })
}

/// Serve `router` until SIGINT/SIGTERM or until `shutdown_token` is cancelled.
///
/// A signal cancels the token too, so open streams stop with the server.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    shutdown_token: CancellationToken,
) -> Result<(), RelayError> {
    info!("Relay listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::select! {
            () = shutdown_signal() => {}
            () = shutdown_token.cancelled() => {}
        }
        shutdown_token.cancel();
    })
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
