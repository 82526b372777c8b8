//! Shared test support utilities
//!
//! Provides `RecordingSink`, a `LogSink` that captures delivered events, for
//! use in unit and integration tests.
//!
//! The module is public because the integration tests under `tests/` link
//! against the library like any other caller and cannot see `cfg(test)`
//! items. Nothing in the relay constructs a `RecordingSink`: sinks are only
//! built from configuration in `adapter::build_sinks`, which has no variant
//! for it, so it never takes part in a running daemon.

use crate::domain::LogEvent;
use crate::error::RelayError;
use crate::port::{DeliveryFuture, LogSink};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Generous number of permits handed out when the gate opens.
const OPEN_GATE_PERMITS: usize = 1 << 20;

/// Sink that records every event it receives.
///
/// A gated sink parks each delivery until [`RecordingSink::open_gate`] is
/// called, which lets tests hold a worker busy.
pub struct RecordingSink {
    name: String,
    level: i64,
    delivered: Mutex<Vec<LogEvent>>,
    calls: AtomicUsize,
    should_fail: AtomicBool,
    gate: Option<Semaphore>,
}

impl RecordingSink {
    pub fn new(name: &str, level: i64) -> Self {
        Self {
            name: name.to_string(),
            level,
            delivered: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            should_fail: AtomicBool::new(false),
            gate: None,
        }
    }

    pub fn gated(name: &str, level: i64) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(name, level)
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(OPEN_GATE_PERMITS);
        }
    }

    /// Number of times `deliver` was entered, including failed and parked calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<LogEvent> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Poll until at least `count` deliveries were entered, panicking after `timeout`.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) {
        let polled = tokio::time::timeout(timeout, async {
            while self.calls() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            polled.is_ok(),
            "sink {} saw {} calls, expected {count}",
            self.name,
            self.calls()
        );
    }

    /// Poll until at least `count` events were recorded, panicking after `timeout`.
    pub async fn wait_for_deliveries(&self, count: usize, timeout: Duration) {
        let polled = tokio::time::timeout(timeout, async {
            while self.delivered().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            polled.is_ok(),
            "sink {} recorded {} events, expected {count}",
            self.name,
            self.delivered().len()
        );
    }
}

impl LogSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                // The permit returns on drop, so an opened gate stays open.
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| RelayError::delivery(&self.name, e.to_string()))?;
            }
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(RelayError::delivery(&self.name, "mock delivery failure"));
            }
            if let Ok(mut guard) = self.delivered.lock() {
                guard.push(event.clone());
            }
            Ok(())
        })
    }
}
