//! Operation results and options

use std::time::Duration;

use serde::Serialize;

use crate::dictionary::{MAX_CONCURRENT_LOOKUPS, ValidationResult};
use crate::store::StorageInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub word: String,
    pub was_new: bool,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveOutcome {
    pub word: String,
    pub was_present: bool,
    pub total_words: usize,
}

/// Result of a batch add or remove
///
/// `affected` lists the words actually added (or removed); everything else
/// was already present (or absent), or malformed and listed in `rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub submitted: usize,
    pub affected: Vec<String>,
    pub rejected: Vec<String>,
    pub total_words: usize,
}

impl BatchOutcome {
    #[must_use]
    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.submitted - self.affected.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedAdd {
    pub word: String,
    pub was_new: bool,
    /// Absent when the lookup was skipped or the word already existed
    pub validation: Option<ValidationResult>,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LengthListing {
    pub length: usize,
    pub count: usize,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllWords {
    pub total_words: usize,
    pub returned_words: usize,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_words: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_length: Option<f64>,
    pub unique_words: usize,
    pub storage_info: StorageInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageProbe {
    pub success: bool,
    pub provider: &'static str,
    pub message: String,
}

/// Throttling for collection-wide validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Words handed to the dictionary per batch
    pub batch_size: usize,
    /// Simultaneous lookups within a batch, capped at 5
    pub max_concurrency: usize,
    /// Pause between batches
    pub batch_pause: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            batch_size: 20,
            max_concurrency: MAX_CONCURRENT_LOOKUPS,
            batch_pause: Duration::from_secs(2),
        }
    }
}

impl ValidationOptions {
    /// Clamp to usable values
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            batch_size: self.batch_size.max(1),
            max_concurrency: self.max_concurrency.clamp(1, MAX_CONCURRENT_LOOKUPS),
            batch_pause: self.batch_pause,
        }
    }
}

/// Progress of a running collection validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationProgress {
    pub checked: usize,
    pub total: usize,
    pub invalid: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionValidation {
    pub total_words: usize,
    pub valid_words: usize,
    pub invalid_words: usize,
    /// Every word that did not validate, in collection order
    pub invalid_word_list: Vec<String>,
    /// Subset of `invalid_word_list` whose lookup errored rather than missed
    pub unverified_word_list: Vec<String>,
    pub validation_results: Vec<ValidationResult>,
}

impl CollectionValidation {
    /// Percentage of valid words, two decimals
    #[must_use]
    pub fn validity_percentage(&self) -> f64 {
        if self.total_words == 0 {
            return 0.0;
        }
        round2(self.valid_words as f64 / self.total_words as f64 * 100.0)
    }

    /// Invalid words with a definitive lookup outcome
    pub fn confirmed_invalid(&self) -> impl Iterator<Item = &str> {
        self.invalid_word_list
            .iter()
            .filter(|w| !self.unverified_word_list.contains(w))
            .map(String::as_str)
    }
}

/// Where a collection copy was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub backup_location: String,
    pub word_count: usize,
    /// RFC 3339, UTC
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub found_invalid: usize,
    pub removed_count: usize,
    pub invalid_words: Vec<String>,
    /// Invalid only because the lookup errored; never removed
    pub unverified_words: Vec<String>,
    pub action_taken: String,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_percentage_rounds() {
        let report = CollectionValidation {
            total_words: 3,
            valid_words: 2,
            invalid_words: 1,
            ..CollectionValidation::default()
        };
        assert!((report.validity_percentage() - 66.67).abs() < 1e-9);
        assert!(CollectionValidation::default().validity_percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn confirmed_invalid_excludes_unverified() {
        let report = CollectionValidation {
            invalid_word_list: vec!["qwzx".into(), "flaky".into()],
            unverified_word_list: vec!["flaky".into()],
            ..CollectionValidation::default()
        };
        assert_eq!(report.confirmed_invalid().collect::<Vec<_>>(), ["qwzx"]);
    }

    #[test]
    fn options_are_clamped() {
        let options = ValidationOptions {
            batch_size: 0,
            max_concurrency: 50,
            batch_pause: Duration::ZERO,
        }
        .normalized();
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.max_concurrency, MAX_CONCURRENT_LOOKUPS);
    }

    #[test]
    fn batch_outcome_counts() {
        let outcome = BatchOutcome {
            submitted: 3,
            affected: vec!["dog".into(), "eel".into()],
            rejected: vec![],
            total_words: 2,
        };
        assert_eq!(outcome.affected_count(), 2);
        assert_eq!(outcome.skipped_count(), 1);
    }
}
