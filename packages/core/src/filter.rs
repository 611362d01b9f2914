//! Recency filter.
//!
//! Decides which normalized transactions are new since the previous
//! scheduled run. The cutoff is `now - interval`, an approximation of the
//! previous run's start time, so a transaction exactly on the cutoff is
//! treated as already seen.

use rust_decimal::Decimal;

use crate::types::{Cutoff, NormalizedTransaction, Provider};

/// `true` iff `tx` happened strictly after `cutoff`.
pub fn is_recent(tx: &NormalizedTransaction, cutoff: Cutoff) -> bool {
    tx.occurred_at > cutoff.unix_seconds()
}

/// CryptoId lists outgoing and zero-value rows alongside deposits.
fn is_deposit(tx: &NormalizedTransaction) -> bool {
    match tx.source {
        Provider::CryptoIdApi => tx.amount > Decimal::ZERO,
        Provider::BlockExplorerApi => true,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecencyFilter {
    cutoff: Cutoff,
}

impl RecencyFilter {
    pub fn new(cutoff: Cutoff) -> Self {
        Self { cutoff }
    }

    pub fn admits(&self, tx: &NormalizedTransaction) -> bool {
        is_recent(tx, self.cutoff) && is_deposit(tx)
    }

    /// Keep notifiable transactions, preserving upstream order.
    pub fn apply(&self, txs: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
        txs.into_iter().filter(|tx| self.admits(tx)).collect()
    }
}
