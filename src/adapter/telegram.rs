use crate::domain::LogEvent;
use crate::error::RelayError;
use crate::port::{DeliveryFuture, LogSink};
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Sends event messages to Telegram chats through the Bot API.
///
/// Every chat has its own threshold. The sink-level minimum is the lowest of
/// them, so the dispatcher only calls in when at least one chat qualifies,
/// and each chat is checked again before sending.
pub struct TelegramSink {
    client: reqwest::Client,
    endpoint: String,
    chats: BTreeMap<i64, i64>,
    level: i64,
}

impl TelegramSink {
    pub fn new(
        client: reqwest::Client,
        api_url: &str,
        api_key: &str,
        chats: BTreeMap<i64, i64>,
    ) -> Self {
        let endpoint = format!("{}/bot{api_key}/sendMessage", api_url.trim_end_matches('/'));
        let level = chats.values().min().copied().unwrap_or(0);
        Self {
            client,
            endpoint,
            chats,
            level,
        }
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), String> {
        // Errors are stripped of the URL, which embeds the bot token.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| format!("chat {chat_id}: {}", e.without_url()))?;

        if response.status() != StatusCode::OK {
            return Err(format!(
                "chat {chat_id}: received non-OK response from Telegram API: {}",
                response.status()
            ));
        }
        Ok(())
    }
}

impl LogSink for TelegramSink {
    fn name(&self) -> &str {
        "TGBot"
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            let mut failures = Vec::new();
            for (&chat_id, &chat_level) in &self.chats {
                if event.level < chat_level {
                    continue;
                }
                match self.send(chat_id, &event.message).await {
                    Ok(()) => debug!(chat_id, "Notification sent"),
                    Err(reason) => failures.push(reason),
                }
            }

            if failures.is_empty() {
                Ok(())
            } else {
                Err(RelayError::delivery(self.name(), failures.join("; ")))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEND_PATH: &str = "/bottest-key/sendMessage";

    fn sink(server: &MockServer, chats: &[(i64, i64)]) -> TelegramSink {
        TelegramSink::new(
            reqwest::Client::new(),
            &server.uri(),
            "test-key",
            chats.iter().copied().collect(),
        )
    }

    fn event(level: i64) -> LogEvent {
        LogEvent::new(level, "database down", "10.0.0.1:80", "alice")
    }

    #[test]
    fn test_minimum_level_is_lowest_chat_threshold() {
        let chats: BTreeMap<i64, i64> = [(1, 40), (2, 15), (3, 90)].into_iter().collect();
        let sink = TelegramSink::new(reqwest::Client::new(), "http://x", "k", chats);
        assert_eq!(sink.minimum_level(), 15);

        let empty = TelegramSink::new(reqwest::Client::new(), "http://x", "k", BTreeMap::new());
        assert_eq!(empty.minimum_level(), 0);
    }

    #[tokio::test]
    async fn test_only_qualifying_chats_notified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_json(json!({"chat_id": 1001, "text": "database down"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_json(json!({"chat_id": 1002, "text": "database down"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sink = sink(&server, &[(1001, 10), (1002, 50)]);
        sink.deliver(&event(30)).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_ok_response_fails_but_other_chats_still_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_json(json!({"chat_id": 1, "text": "database down"})))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_json(json!({"chat_id": 2, "text": "database down"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink(&server, &[(1, 0), (2, 0)]);
        let err = sink.deliver(&event(30)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("chat 1"));
        assert!(message.contains("403"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn test_unreachable_api_does_not_leak_token() {
        let sink = TelegramSink::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "secret-token",
            [(5, 0)].into_iter().collect(),
        );
        let err = sink.deliver(&event(1)).await.unwrap_err();
        assert!(!err.to_string().contains("secret-token"));
    }
}
