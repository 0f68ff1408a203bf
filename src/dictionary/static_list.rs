//! Offline lookup backed by a local word list

use std::path::Path;

use async_trait::async_trait;
use rustc_hash::FxHashSet;

use super::{DictionaryLookup, ValidationResult, normalize};
use crate::core::Word;
use crate::wordlists::load_from_file;

/// Accepts exactly the words in a reference list
///
/// Useful without network access and in tests. Carries no definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticDictionary {
    words: FxHashSet<Word>,
}

impl StaticDictionary {
    #[must_use]
    pub fn new(words: impl IntoIterator<Item = Word>) -> Self {
        Self {
            words: words.into_iter().collect(),
        }
    }

    /// Load the reference list from a text file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(load_from_file(path)?))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[async_trait]
impl DictionaryLookup for StaticDictionary {
    async fn lookup(&self, word: &str) -> ValidationResult {
        let word = match normalize(word) {
            Ok(word) => word,
            Err(rejected) => return rejected,
        };

        if self.words.contains(word.text()) {
            ValidationResult {
                reason: "Found in reference word list".to_string(),
                ..ValidationResult::found(word.text(), Vec::new(), Vec::new())
            }
        } else {
            ValidationResult::not_found(word.text(), "Not found in reference word list")
        }
    }

    fn batch_pause(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::LookupStatus;
    use crate::wordlists::words_from_slice;

    #[tokio::test]
    async fn listed_words_are_valid() {
        let dict = StaticDictionary::new(words_from_slice(&["apple", "pear"]));

        let result = dict.lookup("APPLE").await;
        assert!(result.is_valid);
        assert_eq!(result.word, "apple");

        let missing = dict.lookup("qwzx").await;
        assert!(!missing.is_valid);
        assert_eq!(missing.status, LookupStatus::NotFound);
    }

    #[tokio::test]
    async fn malformed_words_are_rejected_before_lookup() {
        let dict = StaticDictionary::default();
        let result = dict.lookup("pe4r").await;
        assert_eq!(result.status, LookupStatus::InvalidFormat);
    }

    #[test]
    fn from_file_reads_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        std::fs::write(&path, "alpha\nbeta\n").unwrap();

        let dict = StaticDictionary::from_file(&path).unwrap();
        assert_eq!(dict.len(), 2);
    }
}
