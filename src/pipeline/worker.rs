use crate::error::RelayError;
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::queue::EventReceiver;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Fixed set of tasks draining the event queue.
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawn `size` workers. Each one dispatches events until the queue is
    /// closed and empty.
    pub fn spawn(
        size: usize,
        queue: EventReceiver,
        dispatcher: Dispatcher,
    ) -> Result<Self, RelayError> {
        if size == 0 {
            return Err(RelayError::Config(
                "worker pool needs at least 1 worker".into(),
            ));
        }

        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(worker_loop(id, queue.clone(), dispatcher.clone()));
        }
        info!(
            workers = size,
            sinks = dispatcher.sink_count(),
            "Worker pool started"
        );
        Ok(Self { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker to exit. Only returns after all event senders
    /// are gone and the queue has drained.
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }
        info!("Worker pool stopped");
    }
}

async fn worker_loop(id: usize, queue: EventReceiver, dispatcher: Dispatcher) {
    while let Some(event) = queue.recv().await {
        dispatcher.dispatch(event).await;
    }
    info!(worker = id, "Worker exiting");
}
