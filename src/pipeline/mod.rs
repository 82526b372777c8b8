//! Ingestion-to-dispatch pipeline.
//!
//! Ingress handlers call [`ingest::parse_and_submit`], which pushes onto the
//! bounded [`queue`] without ever waiting. The [`worker`] pool drains the
//! queue and hands each event to the [`dispatcher`], which fans it out to
//! every eligible sink concurrently.

pub mod dispatcher;
pub mod ingest;
pub mod queue;
pub mod worker;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use ingest::{parse_and_submit, parse_event};
pub use queue::{EventReceiver, EventSender, QueueSnapshot, QueueStats};
pub use worker::WorkerPool;
