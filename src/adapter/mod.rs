pub mod console;
pub mod elastic;
pub mod file;
pub mod telegram;

pub use console::ConsoleSink;
pub use elastic::ElasticSink;
pub use file::FileSink;
pub use telegram::TelegramSink;

use crate::config::SinkSettings;
use crate::error::RelayError;
use crate::port::LogSink;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-request timeout for the HTTP-backed sinks.
const HTTP_SINK_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .timeout(HTTP_SINK_TIMEOUT)
        .build()
        .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Instantiate the configured sinks, preserving configuration order.
pub fn build_sinks(outputs: &[SinkSettings]) -> Result<Vec<Arc<dyn LogSink>>, RelayError> {
    let mut sinks: Vec<Arc<dyn LogSink>> = Vec::with_capacity(outputs.len());
    for output in outputs {
        let sink: Arc<dyn LogSink> = match output {
            SinkSettings::Stdout { level } => Arc::new(ConsoleSink::new(*level)),
            SinkSettings::File { level, path } => Arc::new(FileSink::new(*level, path.clone())),
            SinkSettings::Telegram {
                api_key,
                chats,
                api_url,
            } => Arc::new(TelegramSink::new(
                http_client()?,
                api_url,
                api_key,
                chats.clone(),
            )),
            SinkSettings::Elastic {
                level,
                host,
                index,
                login,
                password,
            } => {
                let credentials = login.clone().zip(password.clone());
                Arc::new(ElasticSink::new(
                    http_client()?,
                    *level,
                    host,
                    index,
                    credentials,
                ))
            }
        };
        info!(
            sink = sink.name(),
            minimum_level = sink.minimum_level(),
            "Registered sink"
        );
        sinks.push(sink);
    }
    Ok(sinks)
}
