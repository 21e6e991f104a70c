//! Status notifications back to the requesting conversation.
//!
//! The orchestrator only sees the narrow [`Notifier`] trait; the real
//! implementation posts to the Slack Web API. Delivery is best-effort: the
//! pipeline logs and continues when a status update cannot be sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport-level failure reaching the chat service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat service rejected the message
    #[error("Slack API error: {0}")]
    Api(String),
}

/// Posts status messages to a conversation
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to `channel`, threading under `thread` when given
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread: Option<&str>,
    ) -> Result<(), NotifyError>;
}

/// Notifier backed by the Slack Web API
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    bot_token: String,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackNotifier {
    /// Create a notifier using the given HTTP client and bot token
    pub fn new(client: reqwest::Client, bot_token: impl Into<String>) -> Self {
        Self {
            client,
            bot_token: bot_token.into(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread: Option<&str>,
    ) -> Result<(), NotifyError> {
        let payload = PostMessageRequest {
            channel,
            text,
            thread_ts: thread,
        };

        let response: PostMessageResponse = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(NotifyError::Api(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_omits_thread_when_absent() {
        let payload = PostMessageRequest {
            channel: "C123",
            text: "hello",
            thread_ts: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("thread_ts"));
    }

    #[test]
    fn payload_threads_replies_when_present() {
        let payload = PostMessageRequest {
            channel: "C123",
            text: "hello",
            thread_ts: Some("171234.5678"),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"thread_ts\":\"171234.5678\""));
    }

    #[test]
    fn api_rejection_is_surfaced_with_the_error_code() {
        let response: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("channel_not_found"));
    }
}
