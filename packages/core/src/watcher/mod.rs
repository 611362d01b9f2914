//! Address watchers
//!
//! Each watcher fetches the raw history of one address from one upstream
//! explorer and maps it into `NormalizedTransaction` values, in upstream
//! order.

pub mod block_explorer;
pub mod cryptoid;
pub mod error;
pub mod provider;

pub use block_explorer::BlockExplorerWatcher;
pub use cryptoid::CryptoIdWatcher;
pub use error::WatcherError;
pub use provider::{AddressWatcher, WatcherResult};

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse an upstream decimal literal, accepting exponent notation
/// (`1e-8`) as serde_json renders very small floats that way.
pub(crate) fn parse_decimal(raw: &str) -> WatcherResult<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| WatcherError::FormatError {
            message: format!("Invalid decimal '{}': {}", raw, e),
        })
}
