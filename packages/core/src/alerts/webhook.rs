//! Slack incoming-webhook sink.
//!
//! Posts `{"text", "channel"}` to the configured webhook URL. Slack may
//! display rapid-fire posts out of order, so this sink is staggered.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::alerts::{ChatSink, Dispatch};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    channel: &'a str,
}

pub struct WebhookSink {
    url: String,
    channel: String,
    http: Client,
}

impl WebhookSink {
    pub fn new(url: String, channel: String, http: Client) -> Self {
        Self { url, channel, http }
    }
}

#[async_trait]
impl ChatSink for WebhookSink {
    fn name(&self) -> &str {
        "slack"
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Staggered
    }

    async fn deliver(&self, message: &str) -> Result<(), AppError> {
        let payload = WebhookPayload {
            text: message,
            channel: &self.channel,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Delivery(format!(
                "Slack webhook returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn deliver_posts_text_and_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T000/B000/XXX"))
            .and(body_json(serde_json::json!({
                "text": "hello",
                "channel": "#donations"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(
            format!("{}/services/T000/B000/XXX", server.uri()),
            "#donations".into(),
            Client::new(),
        );

        sink.deliver("hello").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_post_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), "#donations".into(), Client::new());

        let err = sink.deliver("hello").await.unwrap_err();
        assert!(matches!(err, AppError::Delivery(_)));
    }

    #[test]
    fn webhook_sink_is_staggered() {
        let sink = WebhookSink::new("https://hooks.slack.com/x".into(), "#d".into(), Client::new());
        assert_eq!(sink.dispatch(), Dispatch::Staggered);
    }
}
