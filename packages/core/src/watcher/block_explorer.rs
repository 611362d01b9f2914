//! Block explorer address watcher
//!
//! For every listed transaction the outputs are scanned for the watched
//! address; the first paying output wins. A matched transaction then needs
//! the address's current balance before it can be reported. The balance is
//! the same for every match in one listing, so it is looked up at most once
//! per `fetch`, and only when something matched. A failed lookup drops the
//! matched transactions; it never fails the target.

use async_trait::async_trait;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::OnceCell;

use crate::services::block_explorer::{BlockExplorerClient, ExplorerOutput, ExplorerTransaction};
use crate::types::{NormalizedTransaction, Provider, WatchTarget};
use crate::watcher::{parse_decimal, AddressWatcher, WatcherError, WatcherResult};

/// Base units per coin.
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

pub struct BlockExplorerWatcher {
    client: BlockExplorerClient,
}

impl BlockExplorerWatcher {
    pub fn new(client: BlockExplorerClient) -> Self {
        Self { client }
    }

    /// Current balance of the target, fetched on first use. `None` once the
    /// lookup has failed.
    async fn balance(
        &self,
        target: &WatchTarget,
        cached: &OnceCell<Option<Decimal>>,
    ) -> Option<Decimal> {
        *cached
            .get_or_init(|| async {
                match self.client.fetch_balance(&target.address).await {
                    Ok(units) => Some(from_base_units(units)),
                    Err(err) => {
                        tracing::error!(
                            currency = %target.currency,
                            address = %target.address,
                            "Balance lookup failed, dropping matched transactions: {}",
                            err
                        );
                        None
                    }
                }
            })
            .await
    }

    /// match output -> fetch balance -> normalize.
    /// `None` when the address is not paid or any step fails.
    async fn resolve(
        &self,
        target: &WatchTarget,
        tx: &ExplorerTransaction,
        balance: &OnceCell<Option<Decimal>>,
    ) -> Option<NormalizedTransaction> {
        let output = first_output_paying(tx, &target.address)?;

        let occurred_at = match tx.occurred_at() {
            Some(ts) => ts,
            None => {
                tracing::warn!(txid = %tx.txid, "Transaction has no block time; skipping");
                return None;
            }
        };

        let amount = match parse_decimal(&output.value.as_text()) {
            Ok(amount) => amount,
            Err(err) => {
                tracing::warn!(txid = %tx.txid, "Skipping transaction: {}", err);
                return None;
            }
        };

        let Some(resulting_balance) = self.balance(target, balance).await else {
            tracing::debug!(txid = %tx.txid, "No balance available; dropping transaction");
            return None;
        };

        Some(NormalizedTransaction {
            source: Provider::BlockExplorerApi,
            currency: target.currency.clone(),
            transaction_id: tx.txid.clone(),
            occurred_at,
            amount,
            resulting_balance,
            explorer_url: self.client.explorer_url(&tx.txid),
        })
    }
}

/// First output of `tx` whose destination set contains `address`.
pub fn first_output_paying<'a>(
    tx: &'a ExplorerTransaction,
    address: &str,
) -> Option<&'a ExplorerOutput> {
    tx.vout.iter().find(|output| output.pays_to(address))
}

/// Convert integer base units into a decimal coin amount.
pub fn from_base_units(units: u64) -> Decimal {
    (Decimal::from(units) / Decimal::from(SATOSHIS_PER_COIN)).normalize()
}

#[async_trait]
impl AddressWatcher for BlockExplorerWatcher {
    async fn fetch(&self, target: &WatchTarget) -> WatcherResult<Vec<NormalizedTransaction>> {
        let listing = self
            .client
            .fetch_transactions(&target.address)
            .await
            .map_err(WatcherError::from)?;

        tracing::debug!(
            currency = %target.currency,
            address = %target.address,
            transactions = listing.txs.len(),
            "Block explorer transactions fetched"
        );

        let balance = OnceCell::new();
        let resolved = join_all(
            listing
                .txs
                .iter()
                .map(|tx| self.resolve(target, tx, &balance)),
        )
        .await;

        Ok(resolved.into_iter().flatten().collect())
    }

    fn provider_name(&self) -> &str {
        "BlockExplorer"
    }
}
