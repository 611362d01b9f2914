//! Dedup gate.
//!
//! Check-then-act guard against notifying the same `(currency, txid)`
//! twice: `admit` checks the store, the caller notifies, then `record`
//! writes the key. The check and the write are not atomic, so two
//! overlapping invocations can both see a key as absent and both notify.
//! Closing that window needs a conditional write in the store.

pub mod store;

pub use store::{IdempotencyStore, MemoryIdempotencyStore};

use std::fmt;
use std::sync::Arc;

use crate::types::NormalizedTransaction;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub currency: String,
    pub transaction_id: String,
}

impl DedupKey {
    pub fn new(currency: impl Into<String>, transaction_id: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            transaction_id: transaction_id.into(),
        }
    }
}

impl From<&NormalizedTransaction> for DedupKey {
    fn from(tx: &NormalizedTransaction) -> Self {
        Self::new(tx.currency.clone(), tx.transaction_id.clone())
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.currency, self.transaction_id)
    }
}

/// Outcome of a dedup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Never recorded; notify, then record.
    New,
    /// Already recorded by an earlier notification.
    Seen,
    /// The store could not be read; treated as not notifiable.
    Unknown,
}

impl Admission {
    pub fn is_new(&self) -> bool {
        matches!(self, Admission::New)
    }
}

#[derive(Clone)]
pub struct DedupGate {
    store: Arc<dyn IdempotencyStore>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn IdempotencyStore>) -> Self {
        Self { store }
    }

    /// `New` iff `tx` has never been recorded.
    ///
    /// A store failure yields `Unknown`: the dedup state cannot be
    /// confirmed and the caller must not notify.
    pub async fn admit(&self, tx: &NormalizedTransaction) -> Admission {
        let key = DedupKey::from(tx);
        match self.store.contains(&key).await {
            Ok(false) => Admission::New,
            Ok(true) => {
                tracing::debug!(key = %key, "Already notified; skipping");
                Admission::Seen
            }
            Err(err) => {
                tracing::error!(key = %key, "Idempotency check failed, not notifying: {}", err);
                Admission::Unknown
            }
        }
    }

    /// Mark `tx` as notified. Failures are logged; the notification has
    /// already gone out by the time this runs.
    pub async fn record(&self, tx: &NormalizedTransaction) {
        let key = DedupKey::from(tx);
        if let Err(err) = self.store.insert(&key).await {
            tracing::error!(key = %key, "Failed to record notified transaction: {}", err);
        }
    }
}
