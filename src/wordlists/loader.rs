//! Word list loading utilities
//!
//! The persisted format is plain UTF-8 text, one lowercase word per line, no
//! blank lines, sorted ascending.

use crate::core::Word;
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

use super::SEED_WORDS;

/// Parse the persisted text format
///
/// Lines are trimmed and lowercased; blank lines are skipped. Lines that are
/// not a valid word are dropped with a warning, and duplicates collapse to the
/// first occurrence.
///
/// # Examples
/// ```
/// use word_filter::wordlists::parse_word_list;
///
/// let words = parse_word_list("Banana\n\napple\nbanana\nx1\n");
/// let texts: Vec<&str> = words.iter().map(|w| w.text()).collect();
/// assert_eq!(texts, ["banana", "apple"]);
/// ```
#[must_use]
pub fn parse_word_list(content: &str) -> Vec<Word> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut rejected = 0usize;

    let words: Vec<Word> = content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            match Word::new(trimmed) {
                Ok(word) => seen.insert(word.text().to_string()).then_some(word),
                Err(_) => {
                    rejected += 1;
                    None
                }
            }
        })
        .collect();

    if rejected > 0 {
        warn!(rejected, "skipped malformed lines in word list");
    }

    words
}

/// Render words in the persisted text format
///
/// Output is sorted, newline-terminated, and empty for an empty collection.
///
/// # Examples
/// ```
/// use word_filter::wordlists::{render_word_list, words_from_slice};
///
/// let words = words_from_slice(&["cat", "apple"]);
/// assert_eq!(render_word_list(&words), "apple\ncat\n");
/// ```
#[must_use]
pub fn render_word_list(words: &[Word]) -> String {
    let mut sorted: Vec<&str> = words.iter().map(Word::text).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = String::with_capacity(sorted.iter().map(|w| w.len() + 1).sum());
    for word in sorted {
        out.push_str(word);
        out.push('\n');
    }
    out
}

/// Load words from a file
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or opened.
///
/// # Examples
/// ```no_run
/// use word_filter::wordlists::load_from_file;
///
/// let words = load_from_file("words.txt").unwrap();
/// println!("Loaded {} words", words.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<Word>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_word_list(&content))
}

/// Convert a string slice to a Word vector, skipping invalid entries
#[must_use]
pub fn words_from_slice(slice: &[&str]) -> Vec<Word> {
    slice.iter().filter_map(|&s| Word::new(s).ok()).collect()
}

/// The embedded default collection
#[must_use]
pub fn seed_words() -> Vec<Word> {
    words_from_slice(SEED_WORDS)
}
