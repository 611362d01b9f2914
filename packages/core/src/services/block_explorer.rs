//! Insight-style block explorer client.
//!
//! Two read-only endpoints are used: the transaction list of an address and
//! the current balance of an address in base units.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;

use crate::error::AppError;

#[derive(Clone)]
pub struct BlockExplorerClient {
    base_url: String,
    http: Client,
}

impl BlockExplorerClient {
    pub fn new(base_url: String) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: String, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn explorer_url(&self, txid: &str) -> String {
        format!("{}/tx/{}", self.base_url, txid)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddressTransactions {
    #[serde(default)]
    pub txs: Vec<ExplorerTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerTransaction {
    pub txid: String,
    /// Absent while unconfirmed.
    #[serde(default)]
    pub blocktime: Option<i64>,
    /// First-seen time; used when there is no block time yet.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub vout: Vec<ExplorerOutput>,
}

impl ExplorerTransaction {
    pub fn occurred_at(&self) -> Option<i64> {
        self.blocktime.or(self.time)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerOutput {
    pub value: OutputValue,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

impl ExplorerOutput {
    pub fn pays_to(&self, address: &str) -> bool {
        self.script_pub_key
            .addresses
            .iter()
            .any(|candidate| candidate == address)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Insight renders output values as decimal strings, some forks as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Text(String),
    Number(Number),
}

impl OutputValue {
    pub fn as_text(&self) -> String {
        match self {
            OutputValue::Text(text) => text.clone(),
            OutputValue::Number(number) => number.to_string(),
        }
    }
}

impl BlockExplorerClient {
    pub async fn fetch_transactions(&self, address: &str) -> Result<AddressTransactions, AppError> {
        let url = format!("{}/api/txs?address={}", self.base_url, address);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::http_status("Block explorer", response.status()));
        }

        response
            .json::<AddressTransactions>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    /// Current balance of `address` in base units (1e-8 of a coin).
    pub async fn fetch_balance(&self, address: &str) -> Result<u64, AppError> {
        let url = format!("{}/api/addr/{}/balance", self.base_url, address);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::http_status("Block explorer", response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        body.trim()
            .parse::<u64>()
            .map_err(|err| AppError::Parse(format!("Invalid balance '{}': {}", body.trim(), err)))
    }
}
