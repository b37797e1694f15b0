//! Cover letters: template generation plus pluggable storage (filesystem or S3).

use thiserror::Error;

pub mod generator;
pub mod store;
pub mod templates;

pub use generator::{LetterGenerator, TemplateLetterGenerator};
pub use store::{FsLetterStore, LetterStore, S3LetterStore};

#[derive(Debug, Error)]
pub enum LetterError {
    #[error("Cannot generate a letter without a {0}")]
    MissingInput(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}
