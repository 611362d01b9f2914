//! CryptoId address watcher
//!
//! CryptoId reports an address history as a flat list of tuples. Only the
//! first tuple carries an absolute timestamp; every later one carries the
//! number of seconds since the previous tuple, so rows are folded strictly
//! in the order returned.

use async_trait::async_trait;

use crate::services::cryptoid::{CryptoIdClient, CryptoIdTxRow};
use crate::types::{NormalizedTransaction, Provider, WatchTarget};
use crate::watcher::{parse_decimal, AddressWatcher, WatcherResult};

pub struct CryptoIdWatcher {
    client: CryptoIdClient,
}

impl CryptoIdWatcher {
    pub fn new(client: CryptoIdClient) -> Self {
        Self { client }
    }

    /// Map summary rows to normalized transactions, rebuilding absolute
    /// timestamps from the running delta.
    pub fn normalize(
        &self,
        currency: &str,
        rows: &[CryptoIdTxRow],
    ) -> WatcherResult<Vec<NormalizedTransaction>> {
        let time_fields: Vec<i64> = rows.iter().map(CryptoIdTxRow::time_field).collect();
        let timestamps = reconstruct_timestamps(&time_fields);

        rows.iter()
            .zip(timestamps)
            .map(|(row, occurred_at)| -> WatcherResult<NormalizedTransaction> {
                Ok(NormalizedTransaction {
                    source: Provider::CryptoIdApi,
                    currency: currency.to_string(),
                    transaction_id: row.txid().to_string(),
                    occurred_at,
                    amount: parse_decimal(&row.amount().to_string())?,
                    resulting_balance: parse_decimal(&row.balance_after().to_string())?,
                    explorer_url: self.client.explorer_url(currency, row.internal_id()),
                })
            })
            .collect()
    }
}

/// `out[0] = fields[0]`, `out[i] = out[i - 1] + fields[i]`.
pub fn reconstruct_timestamps(time_fields: &[i64]) -> Vec<i64> {
    time_fields
        .iter()
        .scan(None::<i64>, |running, &field| {
            let next = match *running {
                None => field,
                Some(previous) => previous.saturating_add(field),
            };
            *running = Some(next);
            Some(next)
        })
        .collect()
}

#[async_trait]
impl AddressWatcher for CryptoIdWatcher {
    async fn fetch(&self, target: &WatchTarget) -> WatcherResult<Vec<NormalizedTransaction>> {
        let summary = self
            .client
            .fetch_address_summary(&target.currency, &target.address)
            .await?;

        tracing::debug!(
            currency = %target.currency,
            address = %target.address,
            rows = summary.tx.len(),
            "CryptoId summary fetched"
        );

        self.normalize(&target.currency, &summary.tx)
    }

    fn provider_name(&self) -> &str {
        "CryptoId"
    }
}
