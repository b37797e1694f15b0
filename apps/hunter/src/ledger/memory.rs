use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApplicationLedger, LedgerError};
use crate::models::application::ApplicationRecord;

/// In-process ledger. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<ApplicationRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_records(records: Vec<ApplicationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ApplicationRecord>> {
        // a poisoned lock still holds consistent data: appends are single pushes
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ApplicationLedger for MemoryLedger {
    async fn load(&self) -> Result<Vec<ApplicationRecord>, LedgerError> {
        Ok(self.lock().clone())
    }

    async fn append(&self, record: ApplicationRecord) -> Result<(), LedgerError> {
        self.lock().push(record);
        Ok(())
    }

    async fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        Ok(self.lock().iter().any(|r| r.id == id))
    }
}
