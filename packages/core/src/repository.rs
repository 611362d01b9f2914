//! SQLite-backed idempotency store.
//!
//! One row per notified `(currency, transaction_id)`. Rows are only ever
//! inserted; nothing here expires or deletes them.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::dedup::{DedupKey, IdempotencyStore};
use crate::error::AppError;

pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of recorded keys. Diagnostics and tests only.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notified_transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl IdempotencyStore for NotificationRepository {
    async fn contains(&self, key: &DedupKey) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM notified_transactions
             WHERE currency = ? AND transaction_id = ?",
        )
        .bind(&key.currency)
        .bind(&key.transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, key: &DedupKey) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO notified_transactions
             (currency, transaction_id, notified_at)
             VALUES (?, ?, ?)",
        )
        .bind(&key.currency)
        .bind(&key.transaction_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
