use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Invalid JSON format: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Log queue is full, discarding event")]
    QueueFull,

    #[error("Log queue is closed")]
    QueueClosed,

    #[error("Sink {sink} failed: {reason}")]
    Delivery { sink: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl RelayError {
    pub(crate) fn delivery(sink: &str, reason: impl Into<String>) -> Self {
        Self::Delivery {
            sink: sink.to_string(),
            reason: reason.into(),
        }
    }
}
