pub mod sink;

pub use sink::{DeliveryFuture, LogSink};
