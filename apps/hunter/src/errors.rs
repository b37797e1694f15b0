use thiserror::Error;

use crate::ledger::LedgerError;

/// Application-level error type.
///
/// Only startup and ledger-loading failures surface as `AppError`; failures
/// inside a hunt cycle are logged and the cycle keeps going.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
