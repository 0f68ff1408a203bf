//! Persistent store collaborators
//!
//! A store holds the whole collection as a single text document. Reads and
//! writes are whole-collection operations: `save_all` replaces everything and
//! either fully succeeds or leaves the previous document in place.

mod file;
mod memory;
mod object;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use object::{ObjectStoreBackend, ObjectStoreSettings};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::Word;

/// Errors raised by a backing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file or object does not exist yet
    #[error("word list not found at {0}")]
    NotFound(String),
    /// Connectivity, permission or configuration failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where the collection is persisted
///
/// Fixed at construction. The live `connected` flag is tracked by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageDescriptor {
    File {
        file_path: String,
    },
    ObjectStore {
        endpoint: String,
        region: String,
        bucket: String,
        key: String,
    },
    Memory,
}

impl StorageDescriptor {
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        match self {
            Self::File { .. } => "local",
            Self::ObjectStore { .. } => "object_store",
            Self::Memory => "memory",
        }
    }

    /// Serialized `type` tag
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::ObjectStore { .. } => "object_store",
            Self::Memory => "memory",
        }
    }
}

/// Descriptor plus reachability, as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub provider: &'static str,
    #[serde(flatten)]
    pub descriptor: StorageDescriptor,
    pub connected: bool,
}

/// Whole-collection persistence
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Static description of the backend
    fn descriptor(&self) -> StorageDescriptor;

    /// Read the entire collection
    ///
    /// Backends that can create their document on first use do so here and
    /// return the seeded contents instead of `NotFound`.
    async fn load_all(&self) -> StoreResult<Vec<Word>>;

    /// Replace the entire collection
    async fn save_all(&self, words: &[Word]) -> StoreResult<()>;

    /// Check that the backend is reachable and writable
    async fn probe(&self) -> StoreResult<()>;

    /// Write a copy of `words` next to the live document
    ///
    /// `stamp` distinguishes backups from each other. The live document is
    /// never touched. Returns where the copy was written.
    async fn backup(&self, words: &[Word], stamp: &str) -> StoreResult<String>;
}
