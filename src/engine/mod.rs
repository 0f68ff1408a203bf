//! Word set engine
//!
//! Owns the in-memory collection and keeps it consistent with the backing
//! store. Reads work on immutable snapshots; writes are staged on a shadow
//! copy, persisted, and only then published.

mod collection;
mod manager;
pub mod query;
mod reports;

pub use collection::WordCollection;
pub use manager::{MAX_LISTING_LIMIT, WordEngine};
pub use query::{
    DEFAULT_LIMIT, MAX_LIMIT, MAX_WORD_LENGTH, MIN_WORD_LENGTH, PATTERN_RESULT_CAP, WordQuery,
};
pub use reports::{
    AddOutcome, AllWords, BackupReport, BatchOutcome, CleanupReport, CollectionStats, CollectionValidation,
    LengthListing, RemoveOutcome, StorageProbe, ValidatedAdd, ValidationOptions,
    ValidationProgress,
};

use serde::Serialize;
use thiserror::Error;

use crate::core::WordError;
use crate::dictionary::ValidationResult;
use crate::store::StoreError;

/// Lifecycle of the engine
///
/// `Uninitialized → Loading → Ready`, then `Ready ⇄ Mutating` per write.
/// Collection validation runs alongside and is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
    Mutating,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid word format: {0}")]
    InvalidFormat(#[from] WordError),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Length must be between 1 and 50, got {0}")]
    LengthOutOfRange(usize),
    #[error("Word '{}' not found in dictionary: {}", .0.word, .0.reason)]
    Rejected(Box<ValidationResult>),
    #[error("Failed to persist word list: {0}")]
    Persist(#[source] StoreError),
    #[error("Failed to load word list: {0}")]
    Load(#[source] StoreError),
    #[error("Backup failed: {0}")]
    Backup(#[source] StoreError),
}

impl EngineError {
    /// Caused by the request rather than by the service
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::InvalidQuery(_)
                | Self::LengthOutOfRange(_)
                | Self::Rejected(_)
        )
    }
}
