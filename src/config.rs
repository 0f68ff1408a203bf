//! Runtime configuration
//!
//! Every setting is a CLI flag with an environment variable fallback, so the
//! service can be configured either way in containers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use crate::dictionary::{
    DEFAULT_BASE_URL, DictionaryLookup, OxfordLookup, OxfordSettings, StaticDictionary,
};
use crate::engine::{ValidationOptions, WordEngine};
use crate::server::ServerConfig;
use crate::store::{FileStore, MemoryStore, ObjectStoreBackend, ObjectStoreSettings, WordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// Local text file
    File,
    /// S3-compatible object storage
    ObjectStore,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// Storage backend
    #[arg(long = "storage", env = "STORAGE_TYPE", value_enum, default_value = "file")]
    pub kind: StorageKind,

    /// Word list file for file storage, and fallback for object storage
    #[arg(long, env = "WORDS_FILE_PATH", default_value = "words.txt")]
    pub words_file: PathBuf,

    /// Object storage endpoint URL
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    #[arg(long, env = "S3_REGION", default_value = "LON1")]
    pub s3_region: String,

    #[arg(long, env = "WORDS_S3_BUCKET", default_value = "word-filter-storage")]
    pub s3_bucket: String,

    /// Object key holding the word list
    #[arg(long, env = "WORDS_S3_KEY", default_value = "words.txt")]
    pub s3_key: String,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,
}

impl StorageArgs {
    /// Object storage settings, if every required value is present
    fn object_store_settings(&self) -> Option<ObjectStoreSettings> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        Some(ObjectStoreSettings {
            endpoint: present(&self.s3_endpoint)?,
            region: self.s3_region.clone(),
            bucket: self.s3_bucket.clone(),
            key: self.s3_key.clone(),
            access_key_id: present(&self.access_key_id)?,
            secret_access_key: present(&self.secret_access_key)?,
        })
    }

    /// Primary store plus an optional fallback for the initial load
    ///
    /// Object storage with missing endpoint or credentials degrades to file
    /// storage. When object storage is used, the word file is the fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the object store client cannot be configured.
    pub fn build(&self) -> Result<(Arc<dyn WordStore>, Option<Arc<dyn WordStore>>)> {
        let file = || Arc::new(FileStore::new(&self.words_file)) as Arc<dyn WordStore>;

        match self.kind {
            StorageKind::File => {
                info!(path = %self.words_file.display(), "using local file storage");
                Ok((file(), None))
            }
            StorageKind::Memory => {
                info!("using in-memory storage");
                Ok((Arc::new(MemoryStore::new()) as Arc<dyn WordStore>, None))
            }
            StorageKind::ObjectStore => {
                let Some(settings) = self.object_store_settings() else {
                    warn!(
                        "object storage selected without endpoint or credentials, \
                         using local file storage"
                    );
                    return Ok((file(), None));
                };
                let store = ObjectStoreBackend::connect(&settings)
                    .context("failed to configure object storage")?;
                Ok((Arc::new(store) as Arc<dyn WordStore>, Some(file())))
            }
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DictionaryArgs {
    /// Base URL of the online dictionary entry pages
    #[arg(long, env = "DICTIONARY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub dictionary_url: String,

    /// Minimum milliseconds between outbound lookups
    #[arg(long, env = "LOOKUP_INTERVAL_MS", default_value_t = 1000)]
    pub lookup_interval_ms: u64,

    /// Cached lookup results; 0 disables caching
    #[arg(long, env = "LOOKUP_CACHE_SIZE", default_value_t = 10_000)]
    pub lookup_cache_size: usize,

    /// Validate against a local word list instead of the online dictionary
    #[arg(long, env = "DICTIONARY_FILE")]
    pub dictionary_file: Option<PathBuf>,
}

impl DictionaryArgs {
    /// # Errors
    ///
    /// Returns an error if the reference list cannot be read or the HTTP
    /// client cannot be built.
    pub fn build(&self) -> Result<Arc<dyn DictionaryLookup>> {
        if let Some(path) = &self.dictionary_file {
            let dictionary = StaticDictionary::from_file(path)
                .with_context(|| format!("failed to read dictionary file {}", path.display()))?;
            info!(path = %path.display(), words = dictionary.len(), "using local dictionary");
            return Ok(Arc::new(dictionary));
        }

        let lookup = OxfordLookup::new(OxfordSettings {
            base_url: self.dictionary_url.clone(),
            min_interval: Duration::from_millis(self.lookup_interval_ms),
            cache_capacity: self.lookup_cache_size,
            ..OxfordSettings::default()
        })
        .context("failed to build dictionary client")?;
        Ok(Arc::new(lookup))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ValidationArgs {
    /// Words per validation batch
    #[arg(long, default_value_t = 20)]
    pub batch_size: usize,

    /// Concurrent lookups per batch (at most 5)
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    /// Pause between validation batches in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub batch_pause_ms: u64,
}

impl ValidationArgs {
    #[must_use]
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions {
            batch_size: self.batch_size,
            max_concurrency: self.concurrency,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8001)]
    pub port: u16,

    /// Comma-separated allowed origins, or `*`
    #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl ServerArgs {
    #[must_use]
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self
                .cors_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }
}

/// Build and load an engine from storage and dictionary settings
///
/// # Errors
///
/// Returns an error if either collaborator cannot be constructed. Store
/// failures during the load itself are absorbed by the engine.
pub async fn load_engine(storage: &StorageArgs, dictionary: &DictionaryArgs) -> Result<WordEngine> {
    let (store, fallback) = storage.build()?;
    let lookup = dictionary.build()?;

    let mut engine = WordEngine::new(store, lookup);
    if let Some(fallback) = fallback {
        engine = engine.with_fallback(fallback);
    }
    engine.load().await;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        storage: StorageArgs,
        #[command(flatten)]
        dictionary: DictionaryArgs,
        #[command(flatten)]
        validation: ValidationArgs,
        #[command(flatten)]
        server: ServerArgs,
    }

    fn parse(args: &[&str]) -> TestCli {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied()))
    }

    #[test]
    fn incomplete_object_store_settings_fall_back_to_file() {
        let cli = parse(&[
            "--storage",
            "object-store",
            "--s3-endpoint",
            "https://objectstore.example.com",
            "--access-key-id",
            "key",
            "--secret-access-key",
            "",
        ]);
        assert!(cli.storage.object_store_settings().is_none());

        let (store, fallback) = cli.storage.build().unwrap();
        assert_eq!(store.descriptor().provider(), "local");
        assert!(fallback.is_none());
    }

    #[test]
    fn complete_object_store_settings() {
        let cli = parse(&[
            "--storage",
            "object-store",
            "--s3-endpoint",
            "https://objectstore.example.com",
            "--s3-bucket",
            "words",
            "--access-key-id",
            "key",
            "--secret-access-key",
            "secret",
        ]);
        let settings = cli.storage.object_store_settings().unwrap();
        assert_eq!(settings.bucket, "words");
        assert_eq!(settings.region, "LON1");
        assert_eq!(settings.key, "words.txt");
    }

    #[test]
    fn validation_options_are_normalized() {
        let cli = parse(&["--batch-size", "0", "--concurrency", "9"]);
        let options = cli.validation.options();
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.max_concurrency, 5);
        assert_eq!(options.batch_pause, Duration::from_secs(2));
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let cli = parse(&["--cors-origins", "http://a.example, http://b.example"]);
        assert_eq!(
            cli.server.config().cors_origins,
            ["http://a.example", "http://b.example"]
        );
    }

    #[tokio::test]
    async fn memory_engine_loads_empty() {
        let cli = parse(&["--storage", "memory", "--dictionary-file", "/nonexistent/words.txt"]);
        assert!(cli.dictionary.build().is_err());

        let cli = parse(&["--storage", "memory"]);
        let engine = load_engine(&cli.storage, &cli.dictionary).await.unwrap();
        assert!(engine.is_empty());
        assert!(engine.is_connected());
    }
}
