//! In-process backend
//!
//! Keeps the rendered document in memory. Failures can be switched on to
//! exercise rollback paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{StorageDescriptor, StoreError, StoreResult, WordStore};
use crate::core::Word;
use crate::wordlists::{parse_word_list, render_word_list};

#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    backups: Mutex<Vec<(String, String)>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Empty store; `load_all` reports `NotFound` until the first save
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given words
    #[must_use]
    pub fn with_words(words: &[Word]) -> Self {
        let store = Self::new();
        *store.document.lock() = Some(render_word_list(words));
        store
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw persisted document, if any
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.document.lock().clone()
    }

    /// Backups written so far as `(location, document)` pairs
    #[must_use]
    pub fn backups(&self) -> Vec<(String, String)> {
        self.backups.lock().clone()
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    fn descriptor(&self) -> StorageDescriptor {
        StorageDescriptor::Memory
    }

    async fn load_all(&self) -> StoreResult<Vec<Word>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store load disabled".into()));
        }
        self.document
            .lock()
            .as_deref()
            .map(parse_word_list)
            .ok_or_else(|| StoreError::NotFound("memory".into()))
    }

    async fn save_all(&self, words: &[Word]) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store save disabled".into()));
        }
        *self.document.lock() = Some(render_word_list(words));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store save disabled".into()));
        }
        Ok(())
    }

    async fn backup(&self, words: &[Word], stamp: &str) -> StoreResult<String> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store save disabled".into()));
        }
        let location = format!("memory://backups/words-backup-{stamp}.txt");
        self.backups
            .lock()
            .push((location.clone(), render_word_list(words)));
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlists::words_from_slice;

    #[tokio::test]
    async fn empty_store_reports_not_found() {
        let store = MemoryStore::new();
        assert!(store.load_all().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryStore::new();
        store
            .save_all(&words_from_slice(&["eel", "dog"]))
            .await
            .unwrap();

        assert_eq!(store.document().as_deref(), Some("dog\neel\n"));
        assert_eq!(store.load_all().await.unwrap().len(), 2);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_document() {
        let store = MemoryStore::with_words(&words_from_slice(&["apple"]));
        store.fail_saves(true);

        assert!(store.save_all(&words_from_slice(&["pear"])).await.is_err());
        assert_eq!(store.document().as_deref(), Some("apple\n"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn backup_leaves_document_alone() {
        let store = MemoryStore::with_words(&words_from_slice(&["apple"]));

        let location = store.backup(&words_from_slice(&["fig"]), "1").await.unwrap();
        assert_eq!(location, "memory://backups/words-backup-1.txt");
        assert_eq!(store.backups(), [(location, "fig\n".to_string())]);
        assert_eq!(store.document().as_deref(), Some("apple\n"));
        assert_eq!(store.save_count(), 0);
    }
}
