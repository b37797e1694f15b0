//! Application ledger: the append-only record of listings the hunter acted on.
//!
//! The ledger outlives a single run, so listings dispatched yesterday are not
//! dispatched again today. Backends are swapped via `LEDGER_BACKEND`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::application::ApplicationRecord;

pub mod jsonl;
pub mod memory;
pub mod postgres;

pub use jsonl::JsonlLedger;
pub use memory::MemoryLedger;
pub use postgres::PgLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage abstraction so the pipeline can run against memory, a file or a database.
#[async_trait]
pub trait ApplicationLedger: Send + Sync {
    /// All records, in append order.
    async fn load(&self) -> Result<Vec<ApplicationRecord>, LedgerError>;

    async fn append(&self, record: ApplicationRecord) -> Result<(), LedgerError>;

    async fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        Ok(self.load().await?.iter().any(|r| r.id == id))
    }
}

/// Records written on the same UTC calendar day as `now`.
pub fn recorded_on_day(records: &[ApplicationRecord], now: DateTime<Utc>) -> usize {
    let today = now.date_naive();
    records
        .iter()
        .filter(|r| r.recorded_at.date_naive() == today)
        .count()
}
