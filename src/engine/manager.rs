//! Engine coordinating the collection, the store and the dictionary

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use super::collection::WordCollection;
use super::query::{self, MAX_WORD_LENGTH, MIN_WORD_LENGTH, WordQuery};
use super::reports::{
    AddOutcome, AllWords, BackupReport, BatchOutcome, CleanupReport, CollectionStats, CollectionValidation,
    LengthListing, RemoveOutcome, StorageProbe, ValidatedAdd, ValidationOptions,
    ValidationProgress, round2,
};
use super::{EngineError, EngineState};
use crate::core::Word;
use crate::dictionary::{CacheStats, DictionaryLookup, LookupStatus, ValidationResult};
use crate::store::{StorageInfo, WordStore};

/// Largest page served by `all_words`
pub const MAX_LISTING_LIMIT: usize = 10_000;

/// The word set engine
///
/// Readers clone an `Arc` snapshot and never wait on writers. Writers are
/// serialized by `write_gate`, stage their change on a copy of the current
/// collection, persist it, and publish the copy only once the store accepted
/// it. A failed save leaves the published collection untouched.
pub struct WordEngine {
    words: RwLock<Arc<WordCollection>>,
    write_gate: tokio::sync::Mutex<()>,
    store: Arc<dyn WordStore>,
    fallback: Option<Arc<dyn WordStore>>,
    lookup: Arc<dyn DictionaryLookup>,
    state: RwLock<EngineState>,
    connected: AtomicBool,
    /// Set while the published collection came from the fallback store
    from_fallback: AtomicBool,
    validating: AtomicUsize,
}

/// Resets the engine to `Ready` when a write finishes or is dropped
struct MutatingGuard<'a>(&'a RwLock<EngineState>);

impl<'a> MutatingGuard<'a> {
    fn enter(state: &'a RwLock<EngineState>) -> Self {
        *state.write() = EngineState::Mutating;
        Self(state)
    }
}

impl Drop for MutatingGuard<'_> {
    fn drop(&mut self) {
        *self.0.write() = EngineState::Ready;
    }
}

/// Counts running collection validations
struct ValidatingGuard<'a>(&'a AtomicUsize);

impl<'a> ValidatingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ValidatingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WordEngine {
    #[must_use]
    pub fn new(store: Arc<dyn WordStore>, lookup: Arc<dyn DictionaryLookup>) -> Self {
        Self {
            words: RwLock::new(Arc::new(WordCollection::new())),
            write_gate: tokio::sync::Mutex::new(()),
            store,
            fallback: None,
            lookup,
            state: RwLock::new(EngineState::Uninitialized),
            connected: AtomicBool::new(false),
            from_fallback: AtomicBool::new(false),
            validating: AtomicUsize::new(0),
        }
    }

    /// Secondary store read when the primary cannot be loaded at startup
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn WordStore>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Current snapshot of the collection
    #[must_use]
    pub fn snapshot(&self) -> Arc<WordCollection> {
        self.words.read().clone()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.validating.load(Ordering::SeqCst) > 0
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Initial load
    ///
    /// Never fails: an unreachable primary store falls back to the secondary
    /// store if one is configured, otherwise to an empty collection. The
    /// engine is `Ready` afterwards either way. Returns the loaded word count.
    pub async fn load(&self) -> usize {
        let _gate = self.write_gate.lock().await;
        *self.state.write() = EngineState::Loading;

        self.from_fallback.store(false, Ordering::SeqCst);
        let collection = match self.store.load_all().await {
            Ok(words) => {
                self.connected.store(true, Ordering::SeqCst);
                WordCollection::from_words(words)
            }
            Err(e) if e.is_not_found() => {
                info!("no persisted word list yet, starting empty");
                self.connected.store(true, Ordering::SeqCst);
                WordCollection::new()
            }
            Err(e) => {
                error!(error = %e, "failed to load word list from store");
                self.connected.store(false, Ordering::SeqCst);
                self.load_fallback().await
            }
        };

        let count = collection.len();
        *self.words.write() = Arc::new(collection);
        *self.state.write() = EngineState::Ready;

        info!(count, provider = self.store.descriptor().provider(), "word list loaded");
        count
    }

    async fn load_fallback(&self) -> WordCollection {
        let Some(fallback) = &self.fallback else {
            warn!("no fallback store configured, starting with an empty collection");
            return WordCollection::new();
        };

        match fallback.load_all().await {
            Ok(words) => {
                warn!(
                    count = words.len(),
                    provider = fallback.descriptor().provider(),
                    "loaded word list from fallback store"
                );
                self.from_fallback.store(true, Ordering::SeqCst);
                WordCollection::from_words(words)
            }
            Err(e) => {
                error!(error = %e, "fallback store failed too, starting with an empty collection");
                WordCollection::new()
            }
        }
    }

    /// Re-read the collection from the store
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Load` if the store cannot be read; the current
    /// collection stays in place.
    pub async fn reload(&self) -> Result<usize, EngineError> {
        let _gate = self.write_gate.lock().await;

        let collection = match self.store.load_all().await {
            Ok(words) => WordCollection::from_words(words),
            Err(e) if e.is_not_found() => WordCollection::new(),
            Err(e) => {
                error!(error = %e, "reload failed, keeping current collection");
                self.connected.store(false, Ordering::SeqCst);
                return Err(EngineError::Load(e));
            }
        };

        self.connected.store(true, Ordering::SeqCst);
        self.from_fallback.store(false, Ordering::SeqCst);
        let count = collection.len();
        *self.words.write() = Arc::new(collection);
        info!(count, "word list reloaded");
        Ok(count)
    }

    /// Stage a change on a copy, persist it, then publish
    ///
    /// `mutate` returns its value and whether the copy changed. Unchanged
    /// copies are discarded without touching the store. Returns the value and
    /// the published collection size.
    async fn commit<T, F>(&self, mutate: F) -> Result<(T, usize), EngineError>
    where
        F: FnOnce(&mut WordCollection) -> (T, bool),
    {
        let _gate = self.write_gate.lock().await;

        let mut shadow = WordCollection::clone(&self.snapshot());
        let (value, changed) = mutate(&mut shadow);
        if !changed {
            return Ok((value, shadow.len()));
        }

        let _mutating = MutatingGuard::enter(&self.state);
        if self.from_fallback.load(Ordering::SeqCst) {
            warn!(
                count = shadow.len(),
                provider = self.store.descriptor().provider(),
                "saving a collection loaded from the fallback store, \
                 this replaces the primary store's document"
            );
        }
        match self.store.save_all(shadow.words()).await {
            Ok(()) => {
                self.connected.store(true, Ordering::SeqCst);
                self.from_fallback.store(false, Ordering::SeqCst);
                let total = shadow.len();
                *self.words.write() = Arc::new(shadow);
                Ok((value, total))
            }
            Err(e) => {
                error!(error = %e, "failed to persist word list, change discarded");
                self.connected.store(false, Ordering::SeqCst);
                Err(EngineError::Persist(e))
            }
        }
    }

    /// Filtered listing
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidQuery` if the query bounds are invalid.
    pub fn query(&self, query: &WordQuery) -> Result<Vec<String>, EngineError> {
        query.validate()?;
        let snapshot = self.snapshot();
        let result = query::filter_words(snapshot.words(), query);
        debug!(matched = result.len(), "query served");
        Ok(result)
    }

    /// Every word of exactly `length` characters
    ///
    /// # Errors
    ///
    /// Returns `EngineError::LengthOutOfRange` unless `length` is within 1..=50.
    pub fn words_by_length(&self, length: usize) -> Result<LengthListing, EngineError> {
        if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length) {
            return Err(EngineError::LengthOutOfRange(length));
        }
        let words = query::words_of_length(self.snapshot().words(), length);
        Ok(LengthListing {
            length,
            count: words.len(),
            words,
        })
    }

    /// Fixed-length wildcard match, capped at 500 results
    #[must_use]
    pub fn match_pattern(&self, length: usize, pattern: &str) -> Vec<String> {
        query::match_pattern(self.snapshot().words(), length, pattern)
    }

    /// Membership test after trimming and lowercasing
    #[must_use]
    pub fn exists(&self, word: &str) -> bool {
        self.snapshot().contains(&word.trim().to_lowercase())
    }

    /// Add one word
    ///
    /// Adding a word that is already present succeeds without a store write.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidFormat` for malformed input, or
    /// `EngineError::Persist` if the store rejected the write.
    pub async fn add_word(&self, raw: &str) -> Result<AddOutcome, EngineError> {
        let word = Word::new(raw)?;
        let text = word.text().to_string();

        let (was_new, total_words) = self
            .commit(|shadow| {
                let added = shadow.insert(word);
                (added, added)
            })
            .await?;

        if was_new {
            info!(word = %text, "word added");
        } else {
            debug!(word = %text, "word already present");
        }
        Ok(AddOutcome {
            word: text,
            was_new,
            total_words,
        })
    }

    /// Add many words with a single store write
    ///
    /// Malformed entries are skipped and reported in `rejected`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persist` if the store rejected the write; nothing
    /// is added in that case.
    pub async fn add_words<S: AsRef<str>>(&self, raws: &[S]) -> Result<BatchOutcome, EngineError> {
        let mut valid = Vec::with_capacity(raws.len());
        let mut rejected = Vec::new();
        for raw in raws {
            match Word::new(raw.as_ref()) {
                Ok(word) => valid.push(word),
                Err(_) => rejected.push(raw.as_ref().to_string()),
            }
        }

        let (added, total_words) = self
            .commit(|shadow| {
                let added = shadow.insert_all(valid);
                let changed = !added.is_empty();
                (added, changed)
            })
            .await?;

        info!(
            added = added.len(),
            submitted = raws.len(),
            rejected = rejected.len(),
            "batch add complete"
        );
        Ok(BatchOutcome {
            submitted: raws.len(),
            affected: added.into_iter().map(Word::into_string).collect(),
            rejected,
            total_words,
        })
    }

    /// Add a word only if the dictionary knows it
    ///
    /// A word already in the collection is accepted without a lookup.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidFormat` for malformed input,
    /// `EngineError::Rejected` when the lookup does not confirm the word, or
    /// `EngineError::Persist` if the store rejected the write.
    pub async fn add_word_validated(
        &self,
        raw: &str,
        skip_lookup: bool,
    ) -> Result<ValidatedAdd, EngineError> {
        let word = Word::new(raw)?;
        let text = word.text().to_string();

        if self.snapshot().contains(&text) {
            return Ok(ValidatedAdd {
                word: text,
                was_new: false,
                validation: None,
                total_words: self.len(),
            });
        }

        let validation = if skip_lookup {
            None
        } else {
            let result = self.lookup.lookup(&text).await;
            if !result.is_valid {
                info!(word = %text, reason = %result.reason, "word rejected by dictionary");
                return Err(EngineError::Rejected(Box::new(result)));
            }
            Some(result)
        };

        let (was_new, total_words) = self
            .commit(|shadow| {
                let added = shadow.insert(word);
                (added, added)
            })
            .await?;

        info!(word = %text, validated = !skip_lookup, "word added");
        Ok(ValidatedAdd {
            word: text,
            was_new,
            validation,
            total_words,
        })
    }

    /// Look a word up without touching the collection
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidFormat` for malformed input.
    pub async fn lookup(&self, raw: &str) -> Result<ValidationResult, EngineError> {
        let word = Word::new(raw)?;
        Ok(self.lookup.lookup(word.text()).await)
    }

    /// Remove one word
    ///
    /// Removing an absent word succeeds without a store write.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persist` if the store rejected the write.
    pub async fn remove_word(&self, raw: &str) -> Result<RemoveOutcome, EngineError> {
        let key = raw.trim().to_lowercase();

        let (was_present, total_words) = self
            .commit(|shadow| {
                let removed = shadow.remove(&key);
                (removed, removed)
            })
            .await?;

        if was_present {
            info!(word = %key, "word removed");
        }
        Ok(RemoveOutcome {
            word: key,
            was_present,
            total_words,
        })
    }

    /// Remove many words with a single store write
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persist` if the store rejected the write; nothing
    /// is removed in that case.
    pub async fn remove_words<S: AsRef<str>>(
        &self,
        raws: &[S],
    ) -> Result<BatchOutcome, EngineError> {
        let keys: Vec<String> = raws
            .iter()
            .map(|raw| raw.as_ref().trim().to_lowercase())
            .collect();

        let (removed, total_words) = self
            .commit(|shadow| {
                let removed = shadow.remove_all(keys.iter().map(String::as_str));
                let changed = !removed.is_empty();
                (removed, changed)
            })
            .await?;

        info!(removed = removed.len(), submitted = raws.len(), "batch remove complete");
        Ok(BatchOutcome {
            submitted: raws.len(),
            affected: removed,
            rejected: Vec::new(),
            total_words,
        })
    }

    /// Check every word against the dictionary
    pub async fn validate_collection(&self, options: ValidationOptions) -> CollectionValidation {
        self.validate_collection_with_progress(options, |_| {}).await
    }

    /// Check every word against the dictionary, reporting after each batch
    ///
    /// Works on the snapshot taken at the start; concurrent writes are not
    /// observed. The collection itself is never modified here.
    pub async fn validate_collection_with_progress<F>(
        &self,
        options: ValidationOptions,
        mut on_progress: F,
    ) -> CollectionValidation
    where
        F: FnMut(ValidationProgress) + Send,
    {
        let _validating = ValidatingGuard::enter(&self.validating);
        let options = options.normalized();

        let words: Vec<String> = self
            .snapshot()
            .words()
            .iter()
            .map(|w| w.text().to_string())
            .collect();
        let total = words.len();
        if total == 0 {
            return CollectionValidation::default();
        }

        info!(
            total,
            batch_size = options.batch_size,
            concurrency = options.max_concurrency,
            "validating collection"
        );

        let mut report = CollectionValidation {
            total_words: total,
            validation_results: Vec::with_capacity(total),
            ..CollectionValidation::default()
        };

        let mut batches = words.chunks(options.batch_size).enumerate().peekable();
        while let Some((index, batch)) = batches.next() {
            debug!(batch = index + 1, size = batch.len(), "validating batch");
            let result = self.lookup.lookup_batch(batch, options.max_concurrency).await;

            for item in result.results {
                if !item.is_valid {
                    report.invalid_word_list.push(item.word.clone());
                    if item.status == LookupStatus::Error {
                        report.unverified_word_list.push(item.word.clone());
                    }
                }
                report.validation_results.push(item);
            }

            on_progress(ValidationProgress {
                checked: report.validation_results.len(),
                total,
                invalid: report.invalid_word_list.len(),
            });

            if batches.peek().is_some() && !options.batch_pause.is_zero() {
                tokio::time::sleep(options.batch_pause).await;
            }
        }

        report.invalid_words = report.invalid_word_list.len();
        report.valid_words = total - report.invalid_words;

        info!(
            valid = report.valid_words,
            invalid = report.invalid_words,
            unverified = report.unverified_word_list.len(),
            "collection validation complete"
        );
        report
    }

    /// Validate the collection and optionally drop what the dictionary rejects
    ///
    /// Words whose lookup errored are reported but never removed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persist` if removal was requested and the store
    /// rejected the write.
    pub async fn cleanup(
        &self,
        auto_remove: bool,
        options: ValidationOptions,
    ) -> Result<CleanupReport, EngineError> {
        let validation = self.validate_collection(options).await;
        self.cleanup_from(validation, auto_remove).await
    }

    /// Finish a cleanup from an already computed validation
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Persist` if removal was requested and the store
    /// rejected the write.
    pub async fn cleanup_from(
        &self,
        validation: CollectionValidation,
        auto_remove: bool,
    ) -> Result<CleanupReport, EngineError> {
        if validation.invalid_word_list.is_empty() {
            return Ok(CleanupReport {
                found_invalid: 0,
                removed_count: 0,
                invalid_words: Vec::new(),
                unverified_words: Vec::new(),
                action_taken: "No invalid words found".to_string(),
            });
        }

        let found_invalid = validation.invalid_word_list.len();
        let (removed_count, action_taken) = if auto_remove {
            let confirmed: Vec<&str> = validation.confirmed_invalid().collect();
            let outcome = self.remove_words(&confirmed).await?;
            let count = outcome.affected_count();
            (count, format!("Removed {count} invalid words"))
        } else {
            (
                0,
                "Found invalid words but auto_remove=false. Use auto_remove=true to remove them."
                    .to_string(),
            )
        };

        Ok(CleanupReport {
            found_invalid,
            removed_count,
            invalid_words: validation.invalid_word_list,
            unverified_words: validation.unverified_word_list,
            action_taken,
        })
    }

    /// Size and length distribution of the collection
    #[must_use]
    pub fn stats(&self) -> CollectionStats {
        let snapshot = self.snapshot();
        let words = snapshot.words();
        let total = words.len();

        let (min_length, max_length, avg_length) = if total == 0 {
            (None, None, None)
        } else {
            let lengths = words.iter().map(Word::len);
            let sum: usize = lengths.clone().sum();
            (
                lengths.clone().min(),
                lengths.max(),
                Some(round2(sum as f64 / total as f64)),
            )
        };

        CollectionStats {
            total_words: total,
            min_length,
            max_length,
            avg_length,
            unique_words: total,
            storage_info: self.storage_info(),
        }
    }

    /// First `limit` words in collection order
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidQuery` unless `limit` is within 1..=10000.
    pub fn all_words(&self, limit: usize) -> Result<AllWords, EngineError> {
        if !(1..=MAX_LISTING_LIMIT).contains(&limit) {
            return Err(EngineError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_LISTING_LIMIT}, got {limit}"
            )));
        }
        let snapshot = self.snapshot();
        let words: Vec<String> = snapshot
            .words()
            .iter()
            .take(limit)
            .map(|w| w.text().to_string())
            .collect();
        Ok(AllWords {
            total_words: snapshot.len(),
            returned_words: words.len(),
            words,
        })
    }

    /// True until the primary store has been read or written successfully
    /// after a startup that fell back to the secondary store
    #[must_use]
    pub fn is_serving_fallback(&self) -> bool {
        self.from_fallback.load(Ordering::SeqCst)
    }

    /// Write a timestamped copy of the current collection
    ///
    /// Reads the current snapshot only; the live document and the published
    /// collection are left alone.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Backup` if the store could not write the copy.
    pub async fn backup(&self) -> Result<BackupReport, EngineError> {
        let snapshot = self.snapshot();
        let now = Utc::now();
        let stamp = now.format("%Y%m%dT%H%M%S%.3fZ").to_string();

        let backup_location = self
            .store
            .backup(snapshot.words(), &stamp)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to write word list backup");
                EngineError::Backup(e)
            })?;

        Ok(BackupReport {
            backup_location,
            word_count: snapshot.len(),
            timestamp: now.to_rfc3339(),
        })
    }

    #[must_use]
    pub fn storage_info(&self) -> StorageInfo {
        let descriptor = self.store.descriptor();
        StorageInfo {
            provider: descriptor.provider(),
            descriptor,
            connected: self.is_connected(),
        }
    }

    /// Probe the store and refresh the connected flag
    pub async fn test_storage(&self) -> StorageProbe {
        let provider = self.store.descriptor().provider();
        match self.store.probe().await {
            Ok(()) => {
                self.connected.store(true, Ordering::SeqCst);
                StorageProbe {
                    success: true,
                    provider,
                    message: "Storage connection successful".to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "storage probe failed");
                self.connected.store(false, Ordering::SeqCst);
                StorageProbe {
                    success: false,
                    provider,
                    message: format!("Storage connection failed: {e}"),
                }
            }
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.lookup.cache_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::StaticDictionary;
    use crate::store::MemoryStore;
    use crate::wordlists::words_from_slice;
    use async_trait::async_trait;
    use std::time::Duration;

    fn dictionary(words: &[&str]) -> Arc<StaticDictionary> {
        Arc::new(StaticDictionary::new(words_from_slice(words)))
    }

    async fn engine_with(words: &[&str]) -> (WordEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_words(&words_from_slice(words)));
        let engine = WordEngine::new(store.clone(), dictionary(&["apple", "banana", "cat"]));
        engine.load().await;
        (engine, store)
    }

    fn fast() -> ValidationOptions {
        ValidationOptions {
            batch_size: 2,
            max_concurrency: 5,
            batch_pause: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn load_marks_ready_and_connected() {
        let (engine, _) = engine_with(&["apple", "banana", "cat"]).await;
        assert_eq!(engine.state(), EngineState::Ready);
        assert!(engine.is_connected());
        assert_eq!(engine.len(), 3);
    }

    #[tokio::test]
    async fn starts_uninitialized() {
        let engine = WordEngine::new(Arc::new(MemoryStore::new()), dictionary(&[]));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn load_missing_document_starts_empty() {
        let engine = WordEngine::new(Arc::new(MemoryStore::new()), dictionary(&[]));
        assert_eq!(engine.load().await, 0);
        assert!(engine.is_connected());
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn load_failure_uses_fallback() {
        let primary = Arc::new(MemoryStore::new());
        primary.fail_loads(true);
        let fallback = Arc::new(MemoryStore::with_words(&words_from_slice(&["dog"])));

        let engine = WordEngine::new(primary, dictionary(&[])).with_fallback(fallback);
        assert_eq!(engine.load().await, 1);
        assert!(!engine.is_connected());
        assert!(engine.exists("dog"));
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn load_failure_without_fallback_is_empty_and_ready() {
        let primary = Arc::new(MemoryStore::new());
        primary.fail_loads(true);

        let engine = WordEngine::new(primary, dictionary(&[]));
        assert_eq!(engine.load().await, 0);
        assert!(!engine.is_connected());
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn scenario_queries() {
        let (engine, _) = engine_with(&["apple", "banana", "cat"]).await;

        assert_eq!(engine.query(&WordQuery::default().starts_with("a")).unwrap(), ["apple"]);
        assert_eq!(engine.query(&WordQuery::default().contains("an")).unwrap(), ["banana"]);
        assert!(engine.exists("  CAT "));
        assert!(!engine.exists("dog"));
    }

    #[tokio::test]
    async fn query_rejects_bad_limit() {
        let (engine, _) = engine_with(&["apple"]).await;
        let err = engine.query(&WordQuery::default().limit(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let (engine, store) = engine_with(&["apple"]).await;

        let first = engine.add_word("Dog").await.unwrap();
        let second = engine.add_word("dog").await.unwrap();

        assert!(first.was_new);
        assert!(!second.was_new);
        assert_eq!(second.total_words, 2);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn add_rejects_malformed_word() {
        let (engine, store) = engine_with(&["apple"]).await;

        let err = engine.add_word("123abc").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidFormat(_)));
        assert!(!engine.exists("123abc"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn add_persists_before_publishing() {
        let (engine, store) = engine_with(&["apple"]).await;
        engine.add_word("pear").await.unwrap();

        assert_eq!(store.document().as_deref(), Some("apple\npear\n"));

        let reloaded = WordEngine::new(store.clone(), dictionary(&[]));
        reloaded.load().await;
        assert!(reloaded.exists("pear"));
    }

    #[tokio::test]
    async fn failed_save_rolls_back() {
        let (engine, store) = engine_with(&["apple", "banana"]).await;
        store.fail_saves(true);

        let err = engine.add_word("cherry").await.unwrap_err();
        assert!(matches!(err, EngineError::Persist(_)));
        assert!(!err.is_client_error());
        assert!(!engine.exists("cherry"));
        assert_eq!(engine.len(), 2);
        assert!(!engine.is_connected());
        assert_eq!(engine.state(), EngineState::Ready);

        assert!(engine.remove_word("apple").await.is_err());
        assert!(engine.exists("apple"));

        assert!(engine.add_words(&["fig", "kiwi"]).await.is_err());
        assert!(!engine.exists("fig"));
        assert_eq!(store.document().as_deref(), Some("apple\nbanana\n"));
    }

    #[tokio::test]
    async fn failed_batch_remove_keeps_every_word() {
        let (engine, store) = engine_with(&["apple", "banana", "cat"]).await;
        store.fail_saves(true);

        let err = engine.remove_words(&["apple", "banana"]).await.unwrap_err();
        assert!(matches!(err, EngineError::Persist(_)));
        assert!(engine.exists("apple"));
        assert!(engine.exists("banana"));
        assert_eq!(engine.len(), 3);
        assert_eq!(store.document().as_deref(), Some("apple\nbanana\ncat\n"));
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn failed_cleanup_removal_keeps_invalid_words() {
        let (engine, store) = engine_with(&["apple", "qwzx", "zzyzx"]).await;
        store.fail_saves(true);

        let err = engine.cleanup(true, fast()).await.unwrap_err();
        assert!(matches!(err, EngineError::Persist(_)));
        assert!(engine.exists("qwzx"));
        assert!(engine.exists("zzyzx"));
        assert_eq!(store.document().as_deref(), Some("apple\nqwzx\nzzyzx\n"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn added_word_survives_reload() {
        let (engine, store) = engine_with(&[]).await;

        assert!(matches!(
            engine.add_word("İstanbul").await,
            Err(EngineError::InvalidFormat(_))
        ));
        engine.add_word("Istanbul").await.unwrap();

        let reloaded = WordEngine::new(store.clone(), dictionary(&[]));
        reloaded.load().await;
        assert_eq!(reloaded.len(), engine.len());
        assert!(reloaded.exists("istanbul"));
    }

    #[tokio::test]
    async fn backup_copies_snapshot_without_saving() {
        let (engine, store) = engine_with(&["apple", "banana"]).await;

        let report = engine.backup().await.unwrap();
        assert_eq!(report.word_count, 2);
        assert!(report.backup_location.starts_with("memory://backups/words-backup-"));

        let backups = store.backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].0, report.backup_location);
        assert_eq!(backups[0].1, "apple\nbanana\n");
        assert_eq!(store.save_count(), 0);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn failed_backup_is_reported() {
        let (engine, store) = engine_with(&["apple"]).await;
        store.fail_saves(true);

        let err = engine.backup().await.unwrap_err();
        assert!(matches!(err, EngineError::Backup(_)));
        assert!(!err.is_client_error());
        assert!(engine.exists("apple"));
    }

    #[tokio::test]
    async fn fallback_flag_clears_after_first_save() {
        let primary = Arc::new(MemoryStore::new());
        primary.fail_loads(true);
        let fallback = Arc::new(MemoryStore::with_words(&words_from_slice(&["dog"])));

        let engine = WordEngine::new(primary.clone(), dictionary(&[])).with_fallback(fallback);
        engine.load().await;
        assert!(engine.is_serving_fallback());

        engine.add_word("eel").await.unwrap();
        assert!(!engine.is_serving_fallback());
        assert_eq!(primary.document().as_deref(), Some("dog\neel\n"));
    }

    #[tokio::test]
    async fn batch_add_counts_new_words() {
        let (engine, store) = engine_with(&[]).await;

        let outcome = engine.add_words(&["dog", "dog", "eel"]).await.unwrap();
        assert_eq!(outcome.affected_count(), 2);
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.total_words, 2);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn batch_add_skips_malformed_entries() {
        let (engine, _) = engine_with(&[]).await;

        let outcome = engine.add_words(&["fox", "b4d", ""]).await.unwrap();
        assert_eq!(outcome.affected, ["fox"]);
        assert_eq!(outcome.rejected, ["b4d", ""]);
    }

    #[tokio::test]
    async fn batch_without_changes_skips_save() {
        let (engine, store) = engine_with(&["dog"]).await;
        let outcome = engine.add_words(&["dog"]).await.unwrap();
        assert_eq!(outcome.affected_count(), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn remove_absent_word_is_noop() {
        let (engine, store) = engine_with(&["apple"]).await;

        let outcome = engine.remove_word("pear").await.unwrap();
        assert!(!outcome.was_present);
        assert_eq!(store.save_count(), 0);

        let outcome = engine.remove_word(" APPLE ").await.unwrap();
        assert!(outcome.was_present);
        assert_eq!(outcome.total_words, 0);
    }

    #[tokio::test]
    async fn remove_batch_reports_removed() {
        let (engine, _) = engine_with(&["ant", "bee", "cow"]).await;

        let outcome = engine.remove_words(&["bee", "yak", "Cow"]).await.unwrap();
        assert_eq!(outcome.affected, ["bee", "cow"]);
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.total_words, 1);
    }

    #[tokio::test]
    async fn validated_add_requires_dictionary_hit() {
        let (engine, store) = engine_with(&[]).await;

        let added = engine.add_word_validated("Apple", false).await.unwrap();
        assert!(added.was_new);
        assert!(added.validation.is_some_and(|v| v.is_valid));

        let err = engine.add_word_validated("qwzx", false).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected(_)));
        assert!(!engine.exists("qwzx"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn validated_add_can_skip_lookup() {
        let (engine, _) = engine_with(&[]).await;
        let added = engine.add_word_validated("qwzx", true).await.unwrap();
        assert!(added.was_new);
        assert!(added.validation.is_none());
    }

    #[tokio::test]
    async fn words_by_length_bounds() {
        let (engine, _) = engine_with(&["apple", "cat", "dog"]).await;

        let listing = engine.words_by_length(3).unwrap();
        assert_eq!(listing.words, ["cat", "dog"]);
        assert_eq!(listing.count, 2);

        assert!(matches!(
            engine.words_by_length(0),
            Err(EngineError::LengthOutOfRange(0))
        ));
        assert!(engine.words_by_length(51).is_err());
        assert!(engine.words_by_length(50).unwrap().words.is_empty());
    }

    #[tokio::test]
    async fn pattern_through_engine() {
        let (engine, _) = engine_with(&["abide", "apple", "cat"]).await;
        assert_eq!(engine.match_pattern(5, "a???e"), ["abide", "apple"]);
        assert!(engine.match_pattern(0, "").is_empty());
    }

    #[tokio::test]
    async fn validation_reports_invalid_words() {
        let (engine, _) = engine_with(&["apple", "qwzx", "cat", "zzyzx"]).await;

        let mut ticks = Vec::new();
        let report = engine
            .validate_collection_with_progress(fast(), |p| ticks.push(p.checked))
            .await;

        assert_eq!(report.total_words, 4);
        assert_eq!(report.valid_words, 2);
        assert_eq!(report.invalid_word_list, ["qwzx", "zzyzx"]);
        assert_eq!(ticks, [2, 4]);
        assert!(!engine.is_validating());
        assert_eq!(engine.len(), 4);
    }

    #[tokio::test]
    async fn cleanup_without_auto_remove_keeps_words() {
        let (engine, store) = engine_with(&["apple", "qwzx"]).await;

        let report = engine.cleanup(false, fast()).await.unwrap();
        assert_eq!(report.found_invalid, 1);
        assert_eq!(report.removed_count, 0);
        assert!(engine.exists("qwzx"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn cleanup_removes_invalid_words() {
        let (engine, _) = engine_with(&["apple", "banana", "qwzx"]).await;

        let report = engine.cleanup(true, fast()).await.unwrap();
        assert_eq!(report.removed_count, 1);
        assert_eq!(report.action_taken, "Removed 1 invalid words");
        assert!(!engine.exists("qwzx"));
        assert_eq!(engine.len(), 2);
    }

    #[tokio::test]
    async fn cleanup_of_clean_collection() {
        let (engine, _) = engine_with(&["apple"]).await;
        let report = engine.cleanup(true, fast()).await.unwrap();
        assert_eq!(report.action_taken, "No invalid words found");
    }

    struct FlakyLookup;

    #[async_trait]
    impl DictionaryLookup for FlakyLookup {
        async fn lookup(&self, word: &str) -> ValidationResult {
            match word {
                "apple" => ValidationResult::found(word, vec!["fruit".into()], vec![]),
                "flaky" => ValidationResult::failed(word, &crate::dictionary::LookupError::Status(503)),
                _ => ValidationResult::not_found(word, "Not found in dictionary"),
            }
        }

        fn batch_pause(&self) -> Duration {
            Duration::ZERO
        }
    }

    #[tokio::test]
    async fn cleanup_never_removes_unverified_words() {
        let store = Arc::new(MemoryStore::with_words(&words_from_slice(&[
            "apple", "flaky", "qwzx",
        ])));
        let engine = WordEngine::new(store, Arc::new(FlakyLookup));
        engine.load().await;

        let report = engine.cleanup(true, fast()).await.unwrap();
        assert_eq!(report.found_invalid, 2);
        assert_eq!(report.unverified_words, ["flaky"]);
        assert_eq!(report.removed_count, 1);
        assert!(engine.exists("flaky"));
        assert!(!engine.exists("qwzx"));
    }

    #[tokio::test]
    async fn stats_summarize_lengths() {
        let (engine, _) = engine_with(&["apple", "banana", "cat"]).await;
        let stats = engine.stats();

        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.min_length, Some(3));
        assert_eq!(stats.max_length, Some(6));
        assert_eq!(stats.avg_length, Some(4.67));
        assert_eq!(stats.storage_info.provider, "memory");
    }

    #[tokio::test]
    async fn stats_of_empty_collection() {
        let (engine, _) = engine_with(&[]).await;
        let stats = engine.stats();
        assert_eq!(stats.total_words, 0);
        assert!(stats.avg_length.is_none());
    }

    #[tokio::test]
    async fn all_words_limit() {
        let (engine, _) = engine_with(&["apple", "banana", "cat"]).await;

        let page = engine.all_words(2).unwrap();
        assert_eq!(page.words, ["apple", "banana"]);
        assert_eq!(page.total_words, 3);
        assert_eq!(page.returned_words, 2);

        assert!(engine.all_words(0).is_err());
        assert!(engine.all_words(10_001).is_err());
    }

    #[tokio::test]
    async fn reload_failure_keeps_collection() {
        let (engine, store) = engine_with(&["apple"]).await;
        store.fail_loads(true);

        assert!(matches!(engine.reload().await, Err(EngineError::Load(_))));
        assert!(engine.exists("apple"));

        store.fail_loads(false);
        store.save_all(&words_from_slice(&["pear"])).await.unwrap();
        assert_eq!(engine.reload().await.unwrap(), 1);
        assert!(engine.exists("pear"));
        assert!(!engine.exists("apple"));
    }

    #[tokio::test]
    async fn storage_probe_updates_connection() {
        let (engine, store) = engine_with(&["apple"]).await;

        store.fail_saves(true);
        let probe = engine.test_storage().await;
        assert!(!probe.success);
        assert!(!engine.storage_info().connected);

        store.fail_saves(false);
        assert!(engine.test_storage().await.success);
        assert!(engine.storage_info().connected);
    }

    #[tokio::test]
    async fn concurrent_adds_are_all_kept() {
        let (engine, store) = engine_with(&[]).await;
        let engine = Arc::new(engine);

        let tasks: Vec<_> = ["ant", "bee", "cow", "dog", "eel", "fox"]
            .into_iter()
            .map(|word| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.add_word(word).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(engine.len(), 6);
        assert_eq!(store.load_all().await.unwrap().len(), 6);
    }
}
