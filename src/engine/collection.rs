//! The authoritative word collection
//!
//! Two views of the same membership: a hash set for existence checks and a
//! sorted vector for deterministic listing. Every mutator updates both.

use rustc_hash::FxHashSet;

use crate::core::Word;

#[derive(Debug, Clone, Default)]
pub struct WordCollection {
    set: FxHashSet<Word>,
    sorted: Vec<Word>,
}

impl WordCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any words; duplicates collapse
    pub fn from_words(words: impl IntoIterator<Item = Word>) -> Self {
        let set: FxHashSet<Word> = words.into_iter().collect();
        let mut sorted: Vec<Word> = set.iter().cloned().collect();
        sorted.sort_unstable();
        Self { set, sorted }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Words in ascending order
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.sorted
    }

    /// Insert a word; returns false if it was already present
    pub fn insert(&mut self, word: Word) -> bool {
        if self.set.contains(word.text()) {
            return false;
        }
        if let Err(pos) = self.sorted.binary_search(&word) {
            self.sorted.insert(pos, word.clone());
        }
        self.set.insert(word);
        true
    }

    /// Remove a word; returns false if it was absent
    pub fn remove(&mut self, word: &str) -> bool {
        if !self.set.remove(word) {
            return false;
        }
        if let Ok(pos) = self.sorted.binary_search_by(|w| w.text().cmp(word)) {
            self.sorted.remove(pos);
        }
        true
    }

    /// Insert many words, re-sorting once; returns the newly inserted words
    pub fn insert_all(&mut self, words: impl IntoIterator<Item = Word>) -> Vec<Word> {
        let mut added = Vec::new();
        for word in words {
            if self.set.insert(word.clone()) {
                added.push(word);
            }
        }
        if !added.is_empty() {
            self.sorted.extend(added.iter().cloned());
            self.sorted.sort_unstable();
        }
        added
    }

    /// Remove many words; returns the words that were present
    pub fn remove_all<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut removed = Vec::new();
        for word in words {
            if self.set.remove(word) {
                removed.push(word.to_string());
            }
        }
        if !removed.is_empty() {
            let set = &self.set;
            self.sorted.retain(|w| set.contains(w.text()));
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlists::words_from_slice;

    fn texts(collection: &WordCollection) -> Vec<&str> {
        collection.words().iter().map(Word::text).collect()
    }

    fn assert_views_agree(collection: &WordCollection) {
        assert_eq!(collection.set.len(), collection.sorted.len());
        assert!(collection.sorted.iter().all(|w| collection.set.contains(w)));
        assert!(collection.sorted.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn from_words_sorts_and_dedups() {
        let collection = WordCollection::from_words(words_from_slice(&["cat", "apple", "cat"]));
        assert_eq!(texts(&collection), ["apple", "cat"]);
        assert_views_agree(&collection);
    }

    #[test]
    fn insert_keeps_order() {
        let mut collection = WordCollection::from_words(words_from_slice(&["apple", "cat"]));
        assert!(collection.insert(Word::new("banana").unwrap()));
        assert!(!collection.insert(Word::new("BANANA").unwrap()));

        assert_eq!(texts(&collection), ["apple", "banana", "cat"]);
        assert_views_agree(&collection);
    }

    #[test]
    fn remove_updates_both_views() {
        let mut collection = WordCollection::from_words(words_from_slice(&["apple", "cat"]));
        assert!(collection.remove("cat"));
        assert!(!collection.remove("cat"));

        assert!(!collection.contains("cat"));
        assert_eq!(texts(&collection), ["apple"]);
        assert_views_agree(&collection);
    }

    #[test]
    fn insert_all_reports_new_words_only() {
        let mut collection = WordCollection::from_words(words_from_slice(&["dog"]));
        let added = collection.insert_all(words_from_slice(&["eel", "dog", "ant", "eel"]));

        let added: Vec<&str> = added.iter().map(Word::text).collect();
        assert_eq!(added, ["eel", "ant"]);
        assert_eq!(texts(&collection), ["ant", "dog", "eel"]);
        assert_views_agree(&collection);
    }

    #[test]
    fn remove_all_reports_present_words_only() {
        let mut collection =
            WordCollection::from_words(words_from_slice(&["ant", "bee", "cow", "dog"]));
        let removed = collection.remove_all(["bee", "yak", "dog", "bee"]);

        assert_eq!(removed, ["bee", "dog"]);
        assert_eq!(texts(&collection), ["ant", "cow"]);
        assert_views_agree(&collection);
    }
}
