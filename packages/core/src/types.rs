//! Core data types shared by the watchers, the filter, the dedup gate
//! and the notification fanout.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;

/// Upstream explorer API a target is polled through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// chainz.cryptoid.info address summaries (tuple rows, delta timestamps).
    CryptoIdApi,
    /// Insight-style block explorer (`/api/txs` + `/api/addr/:addr/balance`).
    BlockExplorerApi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::CryptoIdApi => "cryptoid",
            Provider::BlockExplorerApi => "blockexplorer",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cryptoid" => Ok(Provider::CryptoIdApi),
            "blockexplorer" => Ok(Provider::BlockExplorerApi),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// One monitored (provider, currency, address) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub provider: Provider,
    /// Ticker as the upstream expects it, e.g. `ecc`.
    pub currency: String,
    /// Address, or the provider's own address identifier (CryptoId uses a
    /// numeric id).
    pub address: String,
}

impl WatchTarget {
    pub fn new(
        provider: Provider,
        currency: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            currency: currency.into(),
            address: address.into(),
        }
    }
}

impl FromStr for WatchTarget {
    type Err = String;

    /// Parses `provider:currency:address`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let (provider, currency, address) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(c), Some(a)) if !c.is_empty() && !a.is_empty() => (p, c, a),
            _ => {
                return Err(format!(
                    "Invalid watch target '{}': expected provider:currency:address",
                    s
                ))
            }
        };

        Ok(Self::new(provider.parse()?, currency, address))
    }
}

/// Provider-agnostic record of one incoming transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    /// Where the record came from; the deposit-only rule depends on it.
    pub source: Provider,
    pub currency: String,
    /// On-chain transaction id, used as the dedup key.
    pub transaction_id: String,
    /// Unix seconds.
    pub occurred_at: i64,
    pub amount: Decimal,
    pub resulting_balance: Decimal,
    pub explorer_url: String,
}

/// Recency threshold for one invocation: `now - interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(i64);

impl Cutoff {
    pub fn new(unix_seconds: i64) -> Self {
        Self(unix_seconds)
    }

    /// Cutoff relative to an explicit `now`.
    pub fn before(now: i64, interval_seconds: u64) -> Self {
        let interval = i64::try_from(interval_seconds).unwrap_or(i64::MAX);
        Self(now.saturating_sub(interval))
    }

    /// Cutoff relative to the wall clock.
    pub fn from_now(interval_seconds: u64) -> Self {
        Self::before(Utc::now().timestamp(), interval_seconds)
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0
    }
}
