//! Puzzle pattern representation
//!
//! A pattern describes known letters at fixed positions, with `?` marking an
//! unknown position:
//! - `a???e` matches five-letter words starting with `a` and ending with `e`
//! - `?o?` matches three-letter words with `o` in the middle
//!
//! Comparison runs position by position over the shorter of the pattern and the
//! word. Positions beyond the end of a short pattern are unconstrained.

use super::Word;

/// Wildcard marker for an unknown position
const WILDCARD: char = '?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Any,
    Letter(char),
}

/// Positional wildcard pattern for puzzle queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPattern {
    slots: Vec<Slot>,
}

impl WordPattern {
    /// Parse a pattern string
    ///
    /// Literal characters are lowercased so matching is case-insensitive.
    ///
    /// # Examples
    /// ```
    /// use word_filter::core::{Word, WordPattern};
    ///
    /// let pattern = WordPattern::parse("A???E");
    /// assert!(pattern.matches(&Word::new("apple").unwrap()));
    /// assert!(!pattern.matches(&Word::new("angel").unwrap()));
    /// ```
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let slots = pattern
            .chars()
            .map(|ch| {
                if ch == WILDCARD {
                    Slot::Any
                } else {
                    // Multi-char lowercase expansions only keep the first char
                    Slot::Letter(ch.to_lowercase().next().unwrap_or(ch))
                }
            })
            .collect();

        Self { slots }
    }

    /// Number of positions in the pattern
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check a word against the pattern
    ///
    /// Only the overlapping prefix of pattern and word is compared; the caller
    /// is responsible for the exact length check.
    #[must_use]
    pub fn matches(&self, word: &Word) -> bool {
        self.slots
            .iter()
            .zip(word.text().chars())
            .all(|(slot, ch)| match slot {
                Slot::Any => true,
                Slot::Letter(expected) => *expected == ch,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn pattern_parse_slots() {
        let pattern = WordPattern::parse("a?C");
        assert_eq!(
            pattern.slots,
            [Slot::Letter('a'), Slot::Any, Slot::Letter('c')]
        );
        assert_eq!(pattern.len(), 3);
    }

    #[test]
    fn pattern_first_and_last_letter() {
        let pattern = WordPattern::parse("a???e");
        assert!(pattern.matches(&word("apple")));
        assert!(pattern.matches(&word("abide")));
        assert!(!pattern.matches(&word("angel")));
        assert!(!pattern.matches(&word("eagle")));
    }

    #[test]
    fn pattern_is_case_insensitive() {
        let pattern = WordPattern::parse("APP??");
        assert!(pattern.matches(&word("Apple")));
    }

    #[test]
    fn pattern_all_wildcards_matches_anything() {
        let pattern = WordPattern::parse("?????");
        assert!(pattern.matches(&word("zebra")));
    }

    #[test]
    fn pattern_shorter_than_word_leaves_tail_unconstrained() {
        let pattern = WordPattern::parse("ba");
        assert!(pattern.matches(&word("banana")));
        assert!(!pattern.matches(&word("cabana")));
    }

    #[test]
    fn pattern_longer_than_word_ignores_extra_positions() {
        let pattern = WordPattern::parse("cat?x");
        assert!(pattern.matches(&word("cat")));
    }

    #[test]
    fn pattern_empty_matches_everything() {
        let pattern = WordPattern::parse("");
        assert!(pattern.is_empty());
        assert!(pattern.matches(&word("anything")));
    }

    #[test]
    fn pattern_symbol_never_matches_letter() {
        let pattern = WordPattern::parse("c.t");
        assert!(!pattern.matches(&word("cat")));
    }
}
