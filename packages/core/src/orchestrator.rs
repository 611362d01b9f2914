//! One notifier invocation.
//!
//! Runs every watch target through watcher -> recency filter -> dedup gate
//! -> fanout. Targets run concurrently; within a target, admitted
//! transactions are notified in upstream order with a sequence index that
//! restarts at zero for each target. Nothing here fails the invocation:
//! every error is logged where it happens and the run carries on.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::alerts::NotificationFanout;
use crate::dedup::{Admission, DedupGate};
use crate::filter::RecencyFilter;
use crate::types::{Cutoff, NormalizedTransaction, Provider, WatchTarget};
use crate::watcher::{AddressWatcher, WatcherError};

/// Per-invocation counters, logged by the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: usize,
    pub failed_targets: usize,
    pub fetched: usize,
    pub recent: usize,
    pub duplicates: usize,
    /// Skipped because the idempotency store could not be read.
    pub unconfirmed: usize,
    pub notified: usize,
}

impl RunSummary {
    fn absorb(&mut self, other: RunSummary) {
        self.targets += other.targets;
        self.failed_targets += other.failed_targets;
        self.fetched += other.fetched;
        self.recent += other.recent;
        self.duplicates += other.duplicates;
        self.unconfirmed += other.unconfirmed;
        self.notified += other.notified;
    }
}

pub struct Orchestrator {
    targets: Vec<WatchTarget>,
    watchers: HashMap<Provider, Arc<dyn AddressWatcher + Send + Sync>>,
    gate: DedupGate,
    fanout: Arc<NotificationFanout>,
}

impl Orchestrator {
    pub fn new(
        targets: Vec<WatchTarget>,
        gate: DedupGate,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self {
            targets,
            watchers: HashMap::new(),
            gate,
            fanout,
        }
    }

    pub fn with_watcher(
        mut self,
        provider: Provider,
        watcher: Arc<dyn AddressWatcher + Send + Sync>,
    ) -> Self {
        self.watchers.insert(provider, watcher);
        self
    }

    /// Run all targets against `cutoff` and wait for every delivery.
    pub async fn run(&self, cutoff: Cutoff) -> RunSummary {
        let filter = RecencyFilter::new(cutoff);

        tracing::info!(
            targets = self.targets.len(),
            cutoff = cutoff.unix_seconds(),
            "Checking for new donations"
        );

        let per_target = join_all(
            self.targets
                .iter()
                .map(|target| self.process_target(target, filter)),
        )
        .await;

        self.fanout.flush().await;

        let mut summary = RunSummary::default();
        for target_summary in per_target {
            summary.absorb(target_summary);
        }
        summary
    }

    async fn process_target(&self, target: &WatchTarget, filter: RecencyFilter) -> RunSummary {
        let mut summary = RunSummary {
            targets: 1,
            ..RunSummary::default()
        };

        let txs = match self.fetch(target).await {
            Ok(txs) => txs,
            Err(err) => {
                tracing::error!(
                    provider = %target.provider,
                    currency = %target.currency,
                    address = %target.address,
                    "Fetch failed, skipping target: {}",
                    err
                );
                summary.failed_targets = 1;
                return summary;
            }
        };
        summary.fetched = txs.len();

        let recent = filter.apply(txs);
        summary.recent = recent.len();

        let mut sequence_index = 0u32;
        for tx in &recent {
            match self.gate.admit(tx).await {
                Admission::New => {}
                Admission::Seen => {
                    summary.duplicates += 1;
                    continue;
                }
                Admission::Unknown => {
                    summary.unconfirmed += 1;
                    continue;
                }
            }

            tracing::info!(
                currency = %tx.currency,
                txid = %tx.transaction_id,
                amount = %tx.amount,
                "New donation"
            );
            self.fanout.notify(tx, sequence_index).await;
            self.gate.record(tx).await;

            sequence_index += 1;
            summary.notified += 1;
        }

        summary
    }

    async fn fetch(
        &self,
        target: &WatchTarget,
    ) -> Result<Vec<NormalizedTransaction>, WatcherError> {
        let watcher = self
            .watchers
            .get(&target.provider)
            .ok_or_else(|| WatcherError::Unsupported {
                provider: target.provider.to_string(),
            })?;

        tracing::debug!(
            provider = watcher.provider_name(),
            address = %target.address,
            "Fetching address history"
        );

        watcher.fetch(target).await
    }
}
