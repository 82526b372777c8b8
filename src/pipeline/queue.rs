use crate::domain::LogEvent;
use crate::error::RelayError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};

/// Create the bounded event queue.
///
/// The queue closes once every [`EventSender`] has been dropped; receivers
/// then drain what is left and see `None`.
pub fn channel(capacity: usize) -> Result<(EventSender, EventReceiver), RelayError> {
    if capacity == 0 {
        return Err(RelayError::Config(
            "queue capacity must be at least 1".into(),
        ));
    }

    let (tx, rx) = mpsc::channel(capacity);
    let sender = EventSender {
        tx,
        stats: Arc::new(QueueStats::default()),
    };
    let receiver = EventReceiver {
        rx: Arc::new(Mutex::new(rx)),
    };
    Ok((sender, receiver))
}

/// Producer side. Cloned into every ingress handler.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<LogEvent>,
    stats: Arc<QueueStats>,
}

impl EventSender {
    /// Enqueue without waiting. A full queue drops the event.
    pub fn try_enqueue(&self, event: LogEvent) -> Result<(), RelayError> {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Err(RelayError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(RelayError::QueueClosed),
        }
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Events currently waiting for a worker.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Consumer side, shared by all workers. Each event is handed to exactly one
/// caller of [`EventReceiver::recv`].
#[derive(Clone, Debug)]
pub struct EventReceiver {
    rx: Arc<Mutex<mpsc::Receiver<LogEvent>>>,
}

impl EventReceiver {
    /// Wait for the next event. Returns `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<LogEvent> {
        self.rx.lock().await.recv().await
    }
}

/// Counters for load-shedding visibility.
#[derive(Debug, Default)]
pub struct QueueStats {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub accepted: u64,
    pub dropped: u64,
}

impl QueueStats {
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
