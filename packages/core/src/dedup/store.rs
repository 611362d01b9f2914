use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::dedup::DedupKey;
use crate::error::AppError;

/// External key-existence store. Existence of a key means "already
/// notified"; there is no value payload.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn contains(&self, key: &DedupKey) -> Result<bool, AppError>;

    async fn insert(&self, key: &DedupKey) -> Result<(), AppError>;
}

/// Process-local store. Nothing survives the invocation, so it only
/// deduplicates within one run.
#[derive(Debug, Default)]
pub struct MemoryIdempotencyStore {
    keys: Mutex<HashSet<DedupKey>>,
}

impl MemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.keys.lock().await.len()
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn contains(&self, key: &DedupKey) -> Result<bool, AppError> {
        Ok(self.keys.lock().await.contains(key))
    }

    async fn insert(&self, key: &DedupKey) -> Result<(), AppError> {
        self.keys.lock().await.insert(key.clone());
        Ok(())
    }
}
