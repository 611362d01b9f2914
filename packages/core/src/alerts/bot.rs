//! Discord webhook-client sink, addressed by webhook id and token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::alerts::{ChatSink, Dispatch};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct BotPayload<'a> {
    content: &'a str,
}

pub struct BotSink {
    api_base: String,
    id: String,
    token: String,
    http: Client,
}

impl BotSink {
    pub fn new(api_base: String, id: String, token: String, http: Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            id,
            token,
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/webhooks/{}/{}", self.api_base, self.id, self.token)
    }
}

#[async_trait]
impl ChatSink for BotSink {
    fn name(&self) -> &str {
        "discord"
    }

    fn dispatch(&self) -> Dispatch {
        Dispatch::Immediate
    }

    async fn deliver(&self, message: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&BotPayload { content: message })
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Delivery(format!(
                "Discord returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}
