use crate::domain::LogEvent;
use crate::port::LogSink;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Outcome counts for a single dispatched event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Fans each event out to the registered sinks.
///
/// The sink list is fixed at construction and shared read-only between
/// workers.
#[derive(Clone)]
pub struct Dispatcher {
    sinks: Arc<[Arc<dyn LogSink>]>,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            sinks: sinks.into(),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `event` to every sink whose minimum level it meets.
    ///
    /// Each eligible sink runs on its own task; this returns once all of them
    /// have finished. A failing or panicking sink is logged and counted but
    /// does not affect the others.
    pub async fn dispatch(&self, event: LogEvent) -> DispatchReport {
        let event = Arc::new(event);
        let mut report = DispatchReport::default();
        let mut deliveries = JoinSet::new();

        for (index, sink) in self.sinks.iter().enumerate() {
            if event.level < sink.minimum_level() {
                report.skipped += 1;
                continue;
            }
            let sink = Arc::clone(sink);
            let event = Arc::clone(&event);
            deliveries.spawn(async move { (index, sink.deliver(&event).await) });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.delivered += 1,
                Ok((index, Err(e))) => {
                    report.failed += 1;
                    warn!(
                        sink = self.sinks[index].name(),
                        level = event.level,
                        "Error processing event: {e}"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Sink task did not complete: {e}");
                }
            }
        }

        debug!(
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "Event dispatched"
        );
        report
    }
}
