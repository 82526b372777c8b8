use crate::auth::CredentialRegistry;
use crate::pipeline::EventSender;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared by every ingress handler.
///
/// Holds a queue sender: the queue only closes once the router and every
/// open stream holding a clone have been dropped.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CredentialRegistry>,
    pub queue: EventSender,
    pub shutdown: CancellationToken,
}

impl AppState {
    #[must_use]
    pub fn new(
        registry: CredentialRegistry,
        queue: EventSender,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            queue,
            shutdown,
        }
    }
}
