mod router;
pub mod server;
mod state;
pub mod tracing;

pub use router::main_router;
pub use state::AppState;

use crate::adapter;
use crate::auth::CredentialRegistry;
use crate::config::{self, Settings};
use crate::error::RelayError;
use crate::pipeline::{Dispatcher, QueueStats, WorkerPool, queue};
use crate::port::LogSink;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Application entry point. Initializes tracing, configuration, sinks and
/// the worker pool, then serves until shutdown.
pub async fn run() -> Result<(), RelayError> {
    // Handle healthcheck subcommand (for container healthchecks)
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("healthcheck") {
        match crate::healthcheck::healthcheck_from_arg(args.next().as_deref()).await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Healthcheck failed: {e}");
                std::process::exit(1)
            }
        }
    }

    tracing::init_tracing();

    let path = config::config_path();
    let settings = config::get_configuration(&path)?;
    ::tracing::info!(path = %path.display(), "Loaded settings");

    let sinks = adapter::build_sinks(&settings.outputs)?;
    let relay = Relay::build(&settings, sinks, CancellationToken::new())?;
    let listener = server::bind(settings.port).await?;
    relay.serve_on(listener).await
}

/// A fully wired relay: router, queue and worker pool.
///
/// The router owns the only queue sender outside of open streams, so once
/// serving stops and streams close, the workers drain and exit.
pub struct Relay {
    router: Router,
    workers: WorkerPool,
    queue_stats: Arc<QueueStats>,
    shutdown: CancellationToken,
}

impl Relay {
    /// Wire up the relay. Spawns the workers, so it must run inside a Tokio
    /// runtime.
    pub fn build(
        settings: &Settings,
        sinks: Vec<Arc<dyn LogSink>>,
        shutdown: CancellationToken,
    ) -> Result<Self, RelayError> {
        let (sender, receiver) = queue::channel(settings.queue_capacity)?;
        let workers = WorkerPool::spawn(settings.workers, receiver, Dispatcher::new(sinks))?;
        let queue_stats = sender.stats();

        let registry = CredentialRegistry::from_users(&settings.users);
        ::tracing::info!(users = registry.len(), "Loaded credentials");
        let state = AppState::new(registry, sender, shutdown.clone());
        let router = main_router(state, &settings.http_path, &settings.websocket_path);

        ::tracing::info!("  - POST {}  (unary ingress)", settings.http_path);
        ::tracing::info!("  - GET  {}  (streaming ingress)", settings.websocket_path);
        ::tracing::info!("  - GET  {}  (health check)", config::HEALTH_PATH);

        Ok(Self {
            router,
            workers,
            queue_stats,
            shutdown,
        })
    }

    pub fn queue_stats(&self) -> Arc<QueueStats> {
        self.queue_stats.clone()
    }

    /// Serve on `listener` until shutdown, then wait for the workers to
    /// drain every queued event.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), RelayError> {
        let Self {
            router,
            workers,
            queue_stats,
            shutdown,
        } = self;

        let served = server::serve_listener(listener, router, shutdown.clone()).await;
        // Open streams hold queue senders; make sure they let go.
        shutdown.cancel();
        workers.join().await;

        let stats = queue_stats.snapshot();
        ::tracing::info!(
            accepted = stats.accepted,
            dropped = stats.dropped,
            "Relay stopped"
        );
        served
    }
}
