//! SQLite pool for the idempotency store.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Open (creating if needed) the SQLite database at `database_url` and
/// make sure the schema exists.
///
/// `sqlite::memory:` pools are pinned to a single connection that never
/// expires, since every new connection would otherwise see an empty
/// database.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notified_transactions (
            currency       TEXT NOT NULL,
            transaction_id TEXT NOT NULL,
            notified_at    TEXT NOT NULL,
            PRIMARY KEY (currency, transaction_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
