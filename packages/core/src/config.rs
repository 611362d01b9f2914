use std::env;

use crate::alerts::SinkConfig;
use crate::types::WatchTarget;

pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://donations.db";
pub const DEFAULT_CRYPTOID_BASE_URL: &str = "https://chainz.cryptoid.info";
pub const DEFAULT_BLOCK_EXPLORER_BASE_URL: &str = "https://insight.bitpay.com";
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api";
pub const DEFAULT_WATCH_TARGETS: &str = "cryptoid:ecc:516674";

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_sink: SinkConfig,
    pub bot_sink: SinkConfig,
    pub discord_api_base: String,
    pub check_interval_seconds: u64,
    pub database_url: String,
    pub cryptoid_base_url: String,
    pub block_explorer_base_url: String,
    pub targets: Vec<WatchTarget>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_sink = match (var("SLACK_WEBHOOK_URL"), var("SLACK_CHANNEL")) {
            (Some(url), Some(channel)) => SinkConfig::Webhook { url, channel },
            _ => SinkConfig::None,
        };

        let bot_sink = match (var("DISCORD_ID"), var("DISCORD_TOKEN")) {
            (Some(id), Some(token)) => SinkConfig::Bot { id, token },
            _ => SinkConfig::None,
        };

        let check_interval_seconds = match var("CHECK_INTERVAL") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| "CHECK_INTERVAL must be a valid number of seconds")?,
            None => DEFAULT_CHECK_INTERVAL_SECONDS,
        };

        let targets = var("WATCH_TARGETS")
            .unwrap_or_else(|| DEFAULT_WATCH_TARGETS.to_string())
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(str::parse::<WatchTarget>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            webhook_sink,
            bot_sink,
            discord_api_base: var("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE.to_string()),
            check_interval_seconds,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            cryptoid_base_url: var("CRYPTOID_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CRYPTOID_BASE_URL.to_string()),
            block_explorer_base_url: var("BLOCK_EXPLORER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BLOCK_EXPLORER_BASE_URL.to_string()),
            targets,
        })
    }

    /// Configured sinks in delivery order; absent ones are filtered later.
    pub fn sinks(&self) -> Vec<SinkConfig> {
        vec![self.webhook_sink.clone(), self.bot_sink.clone()]
    }
}
