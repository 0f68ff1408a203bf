//! Dictionary word representation
//!
//! A Word is a non-empty, lowercase, purely alphabetic string. Every word held by
//! the collection goes through `Word::new`, so the invariant holds everywhere.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A validated, case-folded dictionary word
///
/// Equality, hashing and ordering only look at the text, which lets a set of
/// words be probed with a plain `&str`.
#[derive(Debug, Clone)]
pub struct Word {
    text: String,
    char_len: usize,
}

/// Error type for malformed words
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("Word cannot be empty")]
    Empty,
    #[error("Word must contain only letters, got '{0}'")]
    NonAlphabetic(String),
}

impl Word {
    /// Create a new Word from raw input
    ///
    /// Surrounding whitespace is trimmed and the text is lowercased.
    ///
    /// # Errors
    /// Returns `WordError` if:
    /// - Nothing is left after trimming
    /// - Any character is not alphabetic (digits, symbols, inner whitespace)
    ///
    /// # Examples
    /// ```
    /// use word_filter::core::Word;
    ///
    /// let word = Word::new("  Apple ").unwrap();
    /// assert_eq!(word.text(), "apple");
    ///
    /// assert!(Word::new("123abc").is_err());
    /// assert!(Word::new("ice cream").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, WordError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(WordError::Empty);
        }

        // Lowercasing can expand a letter into combining marks ('İ' -> "i\u{307}")
        let text = trimmed.to_lowercase();
        if !text.chars().all(char::is_alphabetic) {
            return Err(WordError::NonAlphabetic(trimmed.to_string()));
        }

        let char_len = text.chars().count();

        Ok(Self { text, char_len })
    }

    /// Get the word as a string slice
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters (not bytes)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.char_len
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Word {}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for Word {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Word {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Borrow<str> for Word {
    fn borrow(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl std::str::FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
