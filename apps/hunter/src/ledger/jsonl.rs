use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use super::{ApplicationLedger, LedgerError};
use crate::models::application::ApplicationRecord;

/// File-backed ledger: one JSON record per line, appended in order.
pub struct JsonlLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ApplicationLedger for JsonlLedger {
    async fn load(&self) -> Result<Vec<ApplicationRecord>, LedgerError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ApplicationRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping malformed ledger line {} in {}: {e}",
                    number + 1,
                    self.path.display()
                ),
            }
        }
        Ok(records)
    }

    async fn append(&self, record: ApplicationRecord) -> Result<(), LedgerError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::record;
    use chrono::Utc;

    #[tokio::test]
    async fn test_missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonlLedger::new(dir.path().join("none.jsonl"));
        assert!(ledger.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_a_new_ledger_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("applications.jsonl");

        let first = JsonlLedger::new(&path);
        first.append(record("1", Utc::now())).await.unwrap();
        first.append(record("2", Utc::now())).await.unwrap();

        let reopened = JsonlLedger::new(&path);
        let records = reopened.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert!(reopened.contains("2").await.unwrap());
        assert!(!reopened.contains("3").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.jsonl");
        let good = serde_json::to_string(&record("ok", Utc::now())).unwrap();
        std::fs::write(&path, format!("{{not json\n\n{good}\n")).unwrap();

        let records = JsonlLedger::new(&path).load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
    }
}
