use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;

use crate::error::AppError;

#[derive(Clone)]
pub struct CryptoIdClient {
    base_url: String,
    http: Client,
}

impl CryptoIdClient {
    pub fn new(base_url: String) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: String, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Link to the CryptoId page of a transaction, keyed by CryptoId's own
    /// numeric id rather than the txid.
    pub fn explorer_url(&self, currency: &str, internal_id: u64) -> String {
        format!("{}/{}/tx.dws?{}.htm", self.base_url, currency, internal_id)
    }
}

/// `address.summary.dws` response. Only the transaction list is used.
#[derive(Debug, Deserialize)]
pub struct AddressSummary {
    #[serde(default)]
    pub tx: Vec<CryptoIdTxRow>,
}

/// `[internalId, txid, block, timeField, amount, balanceAfter]`
///
/// `time_field` is absolute unix seconds on the first row and a delta to
/// the previous row on every later one.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoIdTxRow(
    pub u64,
    pub String,
    pub Option<u64>,
    pub i64,
    pub Number,
    pub Number,
);

impl CryptoIdTxRow {
    pub fn internal_id(&self) -> u64 {
        self.0
    }

    pub fn txid(&self) -> &str {
        &self.1
    }

    pub fn time_field(&self) -> i64 {
        self.3
    }

    pub fn amount(&self) -> &Number {
        &self.4
    }

    pub fn balance_after(&self) -> &Number {
        &self.5
    }
}

impl CryptoIdClient {
    pub async fn fetch_address_summary(
        &self,
        currency: &str,
        address_id: &str,
    ) -> Result<AddressSummary, AppError> {
        let url = format!(
            "{}/explorer/address.summary.dws?coin={}&id={}&all=1&fmt.js",
            self.base_url, currency, address_id
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::http_status("CryptoId", response.status()));
        }

        let summary = response
            .json::<AddressSummary>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))?;

        Ok(summary)
    }
}
