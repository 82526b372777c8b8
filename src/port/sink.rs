use crate::domain::LogEvent;
use crate::error::RelayError;
use std::future::Future;
use std::pin::Pin;

pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = Result<(), RelayError>> + Send + 'a>>;

/// Delivery target for log events (console, file, chat-bot, search index).
///
/// The same instance is called from several workers at once, so
/// implementations guard their own shared state. This trait is
/// dyn-compatible by using boxed futures instead of `impl Future`.
pub trait LogSink: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Events below this level are never handed to `deliver`.
    fn minimum_level(&self) -> i64;

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a>;
}
