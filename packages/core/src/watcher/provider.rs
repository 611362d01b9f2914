//! Address watcher interface

use async_trait::async_trait;

use crate::types::{NormalizedTransaction, WatchTarget};
use crate::watcher::error::WatcherError;

/// Fetches and normalizes the transaction history of one watch target.
#[async_trait]
pub trait AddressWatcher {
    /// Transactions for `target`, in the order the upstream reports them.
    async fn fetch(&self, target: &WatchTarget) -> WatcherResult<Vec<NormalizedTransaction>>;

    /// Name of the upstream, for logging.
    fn provider_name(&self) -> &str;
}

/// Result type for watcher operations
pub type WatcherResult<T> = Result<T, WatcherError>;
