use crate::domain::LogEvent;
use crate::error::RelayError;
use crate::port::{DeliveryFuture, LogSink};
use reqwest::StatusCode;
use serde_json::{Map, Value};

/// Field names for the `|`-separated head of a message, in order.
const HEAD_FIELDS: [&str; 4] = ["@timestamp", "FuncName", "LevelName", "message"];

/// Split a formatted log line into document fields.
///
/// Lines look like `asctime | funcName | levelname | message || key: value; key: value`.
/// Head fields beyond the fourth are ignored, and tail items without `": "`
/// are skipped.
pub fn parse_line(line: &str) -> Map<String, Value> {
    let mut document = Map::new();
    let mut parts = line.split("||");

    if let Some(head) = parts.next() {
        for (name, value) in HEAD_FIELDS.iter().zip(head.split('|')) {
            document.insert((*name).to_string(), Value::from(value.trim()));
        }
    }

    if let Some(tail) = parts.next() {
        for item in tail.split(';') {
            if let Some((key, value)) = item.split_once(": ") {
                document.insert(key.trim().to_string(), Value::from(value.trim()));
            }
        }
    }

    document
}

/// Indexes each event as a document in an Elasticsearch-compatible index.
pub struct ElasticSink {
    client: reqwest::Client,
    url: String,
    level: i64,
    credentials: Option<(String, String)>,
}

impl ElasticSink {
    pub fn new(
        client: reqwest::Client,
        level: i64,
        host: &str,
        index: &str,
        credentials: Option<(String, String)>,
    ) -> Self {
        let url = format!("{}/{index}/_doc", host.trim_end_matches('/'));
        Self {
            client,
            url,
            level,
            credentials,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn document(event: &LogEvent) -> Map<String, Value> {
        let mut document = parse_line(&event.message);
        document.insert("ip".to_string(), Value::from(event.source_ip.as_str()));
        document.insert("login".to_string(), Value::from(event.identity.as_str()));
        document.insert("level".to_string(), Value::from(event.level));
        document
    }
}

impl LogSink for ElasticSink {
    fn name(&self) -> &str {
        "Elastic"
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            let mut request = self.client.post(&self.url).json(&Self::document(event));
            if let Some((login, password)) = &self.credentials {
                request = request.basic_auth(login, Some(password));
            }

            let response = request.send().await?;
            if response.status() != StatusCode::CREATED {
                return Err(RelayError::delivery(
                    self.name(),
                    format!(
                        "received non-Created response from Elasticsearch: {}",
                        response.status()
                    ),
                ));
            }
            Ok(())
        })
    }
}
