//! Local file backend

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{StorageDescriptor, StoreError, StoreResult, WordStore};
use crate::core::Word;
use crate::wordlists::{parse_word_list, render_word_list, seed_words};

/// Collection stored as a text file on the local filesystem
///
/// Blocking filesystem calls run on the blocking thread pool. Saves write a
/// temporary sibling file and rename it over the target.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    seed_on_missing: bool,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed_on_missing: true,
        }
    }

    /// Report `NotFound` for a missing file instead of creating it
    #[must_use]
    pub const fn without_seed(mut self) -> Self {
        self.seed_on_missing = false;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `words.txt` becomes `words.txt.backup.<stamp>`
    fn backup_path(&self, stamp: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".backup.{stamp}"));
        PathBuf::from(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn write_atomically(path: &Path, dir: &Path, content: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl WordStore for FileStore {
    fn descriptor(&self) -> StorageDescriptor {
        StorageDescriptor::File {
            file_path: self.path.display().to_string(),
        }
    }

    async fn load_all(&self) -> StoreResult<Vec<Word>> {
        let path = self.path.clone();
        let read = tokio::task::spawn_blocking(move || std::fs::read_to_string(path)).await?;

        match read {
            Ok(content) => {
                let words = parse_word_list(&content);
                info!(count = words.len(), path = %self.path.display(), "loaded words from file");
                Ok(words)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !self.seed_on_missing {
                    return Err(StoreError::NotFound(self.path.display().to_string()));
                }
                warn!(path = %self.path.display(), "words file not found, creating it with seed words");
                let seed = seed_words();
                self.save_all(&seed).await?;
                Ok(seed)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save_all(&self, words: &[Word]) -> StoreResult<()> {
        let content = render_word_list(words);
        let path = self.path.clone();
        let dir = self.parent_dir();

        tokio::task::spawn_blocking(move || write_atomically(&path, &dir, &content)).await??;

        debug!(count = words.len(), path = %self.path.display(), "saved words to file");
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        let dir = self.parent_dir();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            // Creating and dropping a temp file proves the directory is writable
            NamedTempFile::new_in(&dir)?;
            Ok(())
        })
        .await??;
        Ok(())
    }

    async fn backup(&self, words: &[Word], stamp: &str) -> StoreResult<String> {
        let content = render_word_list(words);
        let path = self.backup_path(stamp);
        let dir = self.parent_dir();
        let location = path.display().to_string();

        tokio::task::spawn_blocking(move || write_atomically(&path, &dir, &content)).await??;

        info!(count = words.len(), path = %location, "wrote word list backup");
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlists::{SEED_WORDS_COUNT, words_from_slice};

    #[tokio::test]
    async fn missing_file_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let store = FileStore::new(&path);

        let words = store.load_all().await.unwrap();

        assert_eq!(words.len(), SEED_WORDS_COUNT);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_file_without_seed_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("words.txt")).without_seed();

        let err = store.load_all().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn save_then_load_returns_sorted_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("words.txt");
        let store = FileStore::new(&path);

        store
            .save_all(&words_from_slice(&["cat", "apple", "banana"]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "apple\nbanana\ncat\n");

        let loaded = store.load_all().await.unwrap();
        let texts: Vec<&str> = loaded.iter().map(Word::text).collect();
        assert_eq!(texts, ["apple", "banana", "cat"]);
    }

    #[tokio::test]
    async fn save_replaces_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("words.txt"));

        store.save_all(&words_from_slice(&["one", "two"])).await.unwrap();
        store.save_all(&words_from_slice(&["three"])).await.unwrap();

        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeated_round_trip_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "Pear\n\nfig\napple\n").unwrap();
        let store = FileStore::new(&path);

        let first = store.load_all().await.unwrap();
        store.save_all(&first).await.unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();

        let second = store.load_all().await.unwrap();
        store.save_all(&second).await.unwrap();
        let after_second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(after_first, "apple\nfig\npear\n");
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn probe_succeeds_for_writable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("words.txt"));
        assert!(store.probe().await.is_ok());
    }

    #[tokio::test]
    async fn backup_writes_sibling_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let store = FileStore::new(&path);
        store.save_all(&words_from_slice(&["apple"])).await.unwrap();

        let location = store
            .backup(&words_from_slice(&["pear", "fig"]), "20260101T000000Z")
            .await
            .unwrap();

        let backup = dir.path().join("words.txt.backup.20260101T000000Z");
        assert_eq!(location, backup.display().to_string());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "fig\npear\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "apple\n");
    }

    #[test]
    fn descriptor_reports_path() {
        let store = FileStore::new("data/words.txt");
        assert_eq!(
            store.descriptor(),
            StorageDescriptor::File {
                file_path: "data/words.txt".to_string()
            }
        );
    }
}
