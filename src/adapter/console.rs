use crate::domain::LogEvent;
use crate::port::{DeliveryFuture, LogSink};
use chrono::{DateTime, Local};

/// Prints one line per event to stdout.
pub struct ConsoleSink {
    level: i64,
}

impl ConsoleSink {
    pub fn new(level: i64) -> Self {
        Self { level }
    }
}

fn format_line(event: &LogEvent, now: DateTime<Local>) -> String {
    format!(
        "{} {} >> {} | {} | {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        event.identity,
        event.source_ip,
        event.level,
        event.message
    )
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            println!("{}", format_line(event, Local::now()));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let now = Local.with_ymd_and_hms(2025, 1, 10, 12, 30, 5).unwrap();
        let event = LogEvent::new(40, "disk almost full", "10.1.2.3:4567", "alice");
        assert_eq!(
            format_line(&event, now),
            "2025-01-10 12:30:05 alice >> 10.1.2.3:4567 | 40 | disk almost full"
        );
    }

    #[tokio::test]
    async fn test_deliver_succeeds() {
        let sink = ConsoleSink::new(10);
        assert_eq!(sink.minimum_level(), 10);
        let event = LogEvent::new(10, "hello", "127.0.0.1:1", "alice");
        assert!(sink.deliver(&event).await.is_ok());
    }
}
