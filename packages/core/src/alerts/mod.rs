//! Notification fanout.
//!
//! Renders one message per admitted transaction and hands it to every
//! configured chat sink. Deliveries run as detached tasks on a `JoinSet`;
//! call [`NotificationFanout::flush`] before the process exits.
//!
//! The webhook sink (Slack) does not preserve display order for messages
//! sent back to back, so its k-th delivery of a batch is delayed by
//! `k * 500ms`. The bot sink (Discord) is sent immediately.

pub mod bot;
pub mod webhook;

pub use bot::BotSink;
pub use webhook::WebhookSink;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::error::AppError;
use crate::types::NormalizedTransaction;

/// Delay added per sequence index on staggered sinks.
pub const STAGGER_STEP: Duration = Duration::from_millis(500);

/// Credentials of one sink, as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Webhook { url: String, channel: String },
    Bot { id: String, token: String },
    None,
}

/// How a sink wants its deliveries scheduled within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Delay by `sequence_index * STAGGER_STEP`.
    Staggered,
    Immediate,
}

#[async_trait]
pub trait ChatSink: Send + Sync {
    fn name(&self) -> &str;

    fn dispatch(&self) -> Dispatch;

    async fn deliver(&self, message: &str) -> Result<(), AppError>;
}

/// Fixed notification text for one transaction.
pub fn render_message(tx: &NormalizedTransaction) -> String {
    let currency = tx.currency.to_uppercase();
    format!(
        "New {currency} donation of {amount} {currency}! \
         The wallet now has a balance of {balance} {currency}.\
         \nView the tx here: {url}",
        currency = currency,
        amount = tx.amount,
        balance = tx.resulting_balance,
        url = tx.explorer_url,
    )
}

pub struct NotificationFanout {
    sinks: Vec<Arc<dyn ChatSink>>,
    pending: Mutex<JoinSet<()>>,
}

impl NotificationFanout {
    pub fn new(sinks: Vec<Arc<dyn ChatSink>>) -> Self {
        Self {
            sinks,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    /// Build the HTTP sinks for every present config entry.
    pub fn from_config(configs: &[SinkConfig], discord_api_base: &str, http: Client) -> Self {
        let sinks = configs
            .iter()
            .filter_map(|config| -> Option<Arc<dyn ChatSink>> {
                match config {
                    SinkConfig::Webhook { url, channel } => Some(Arc::new(WebhookSink::new(
                        url.clone(),
                        channel.clone(),
                        http.clone(),
                    ))),
                    SinkConfig::Bot { id, token } => Some(Arc::new(BotSink::new(
                        discord_api_base.to_string(),
                        id.clone(),
                        token.clone(),
                        http.clone(),
                    ))),
                    SinkConfig::None => None,
                }
            })
            .collect();

        Self::new(sinks)
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Schedule delivery of `tx` to every sink. Never fails; delivery
    /// errors are logged by the spawned tasks.
    pub async fn notify(&self, tx: &NormalizedTransaction, sequence_index: u32) {
        if self.sinks.is_empty() {
            tracing::warn!(
                txid = %tx.transaction_id,
                "No chat sinks configured; notification dropped"
            );
            return;
        }

        let message = Arc::new(render_message(tx));
        let mut pending = self.pending.lock().await;

        for sink in &self.sinks {
            let delay = match sink.dispatch() {
                Dispatch::Staggered => STAGGER_STEP * sequence_index,
                Dispatch::Immediate => Duration::ZERO,
            };
            let sink = Arc::clone(sink);
            let message = Arc::clone(&message);

            pending.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match sink.deliver(&message).await {
                    Ok(()) => tracing::info!(sink = sink.name(), "Notification sent"),
                    Err(err) => tracing::error!(sink = sink.name(), "Notification failed: {}", err),
                }
            });
        }
    }

    /// Wait for every scheduled delivery to finish.
    pub async fn flush(&self) {
        let mut pending = std::mem::replace(&mut *self.pending.lock().await, JoinSet::new());
        while let Some(joined) = pending.join_next().await {
            if let Err(err) = joined {
                tracing::error!("Notification task aborted: {}", err);
            }
        }
    }
}
