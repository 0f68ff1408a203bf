//! Word lists and the persisted text format
//!
//! Provides the embedded seed list and the one-word-per-line codec shared by
//! every storage backend.

mod embedded;
pub mod loader;

pub use embedded::{SEED_WORDS, SEED_WORDS_COUNT};
pub use loader::{load_from_file, parse_word_list, render_word_list, seed_words, words_from_slice};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_count_matches_const() {
        assert_eq!(SEED_WORDS.len(), SEED_WORDS_COUNT);
    }

    #[test]
    fn seed_words_are_valid_words() {
        for &word in SEED_WORDS {
            assert!(!word.is_empty());
            assert!(
                word.chars().all(|c| c.is_alphabetic() && !c.is_uppercase()),
                "Word '{word}' contains non-lowercase chars"
            );
        }
    }

    #[test]
    fn seed_words_are_sorted_and_unique() {
        assert!(SEED_WORDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn seed_words_survive_parsing() {
        assert_eq!(seed_words().len(), SEED_WORDS_COUNT);
    }
}
