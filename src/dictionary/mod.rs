//! Dictionary lookup collaborators
//!
//! A lookup answers "is this a real word?" with definitions and word forms.
//! Lookups never fail outright: network and parse problems come back as an
//! invalid result tagged `LookupStatus::Error`, so callers can tell them apart
//! from a genuine `NotFound`.

mod cache;
mod oxford;
mod static_list;

pub use cache::{CacheStats, LookupCache};
pub use oxford::{DEFAULT_BASE_URL, OxfordLookup, OxfordSettings, parse_entry_page};
pub use static_list::StaticDictionary;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::core::Word;

/// Largest number of lookups in flight within one chunk
pub const MAX_CONCURRENT_LOOKUPS: usize = 5;

/// Tagged outcome of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Found,
    NotFound,
    InvalidFormat,
    Error,
}

impl LookupStatus {
    /// Definitive outcomes are safe to cache; errors may be transient
    #[must_use]
    pub const fn is_definitive(self) -> bool {
        matches!(self, Self::Found | Self::NotFound)
    }
}

/// Result of validating one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub word: String,
    pub is_valid: bool,
    pub status: LookupStatus,
    pub definitions: Vec<String>,
    pub word_forms: Vec<String>,
    pub reason: String,
}

impl ValidationResult {
    #[must_use]
    pub fn found(word: &str, definitions: Vec<String>, word_forms: Vec<String>) -> Self {
        let reason = format!(
            "Found in dictionary with {} definition(s)",
            definitions.len()
        );
        Self {
            word: word.to_string(),
            is_valid: true,
            status: LookupStatus::Found,
            definitions,
            word_forms,
            reason,
        }
    }

    #[must_use]
    pub fn not_found(word: &str, reason: impl Into<String>) -> Self {
        Self::invalid(word, LookupStatus::NotFound, reason)
    }

    #[must_use]
    pub fn invalid_format(word: &str) -> Self {
        Self::invalid(
            word,
            LookupStatus::InvalidFormat,
            "Invalid word format (must contain only letters)",
        )
    }

    #[must_use]
    pub fn failed(word: &str, error: &LookupError) -> Self {
        Self::invalid(word, LookupStatus::Error, format!("Error during validation: {error}"))
    }

    fn invalid(word: &str, status: LookupStatus, reason: impl Into<String>) -> Self {
        Self {
            word: word.to_string(),
            is_valid: false,
            status,
            definitions: Vec::new(),
            word_forms: Vec::new(),
            reason: reason.into(),
        }
    }
}

/// Why an outbound lookup could not produce a definitive answer
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("HTML parsing error: {0}")]
    Parse(String),
}

/// Aggregate of a batch lookup, results in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchValidation {
    pub total_words: usize,
    pub valid_words: usize,
    pub invalid_words: usize,
    pub results: Vec<ValidationResult>,
}

impl BatchValidation {
    #[must_use]
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let valid_words = results.iter().filter(|r| r.is_valid).count();
        Self {
            total_words: results.len(),
            valid_words,
            invalid_words: results.len() - valid_words,
            results,
        }
    }
}

/// Source of truth for whether a word is real
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// Validate a single word; never fails
    async fn lookup(&self, word: &str) -> ValidationResult;

    /// Pause between concurrent chunks in `lookup_batch`
    fn batch_pause(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// Validate several words with bounded concurrency
    ///
    /// Words are processed in chunks of `min(max_concurrency, 5)`; each chunk
    /// runs concurrently and chunks are separated by `batch_pause`.
    async fn lookup_batch(&self, words: &[String], max_concurrency: usize) -> BatchValidation {
        if words.is_empty() {
            return BatchValidation::default();
        }

        info!(count = words.len(), "validating words in batch");

        let chunk_size = max_concurrency.clamp(1, MAX_CONCURRENT_LOOKUPS);
        let mut results = Vec::with_capacity(words.len());
        let mut chunks = words.chunks(chunk_size).peekable();

        while let Some(chunk) = chunks.next() {
            let lookups = chunk.iter().map(|word| self.lookup(word));
            results.extend(futures::future::join_all(lookups).await);

            if chunks.peek().is_some() {
                let pause = self.batch_pause();
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
            }
        }

        BatchValidation::from_results(results)
    }

    /// Cache counters, for backends that cache
    fn cache_stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// Shared pre-check: malformed input never reaches the backend
pub(crate) fn normalize(word: &str) -> Result<Word, ValidationResult> {
    Word::new(word).map_err(|_| ValidationResult::invalid_format(&word.trim().to_lowercase()))
}
