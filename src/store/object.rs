//! S3-compatible object storage backend

use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::{debug, info, warn};

use super::{StorageDescriptor, StoreError, StoreResult, WordStore};
use crate::core::Word;
use crate::wordlists::{parse_word_list, render_word_list, seed_words};

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreSettings {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub key: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Collection stored as a single object
///
/// A `put` replaces the object in one request, so readers see either the old
/// or the new document.
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
    descriptor: StorageDescriptor,
}

impl ObjectStoreBackend {
    /// Connect to an S3-compatible endpoint
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ObjectStore` if the client cannot be configured.
    pub fn connect(settings: &ObjectStoreSettings) -> StoreResult<Self> {
        let s3 = AmazonS3Builder::new()
            .with_endpoint(&settings.endpoint)
            .with_region(&settings.region)
            .with_bucket_name(&settings.bucket)
            .with_access_key_id(&settings.access_key_id)
            .with_secret_access_key(&settings.secret_access_key)
            .with_virtual_hosted_style_request(true)
            .with_allow_http(settings.endpoint.starts_with("http://"))
            .build()?;

        info!(
            endpoint = %settings.endpoint,
            bucket = %settings.bucket,
            key = %settings.key,
            "initialized object store"
        );

        let descriptor = StorageDescriptor::ObjectStore {
            endpoint: settings.endpoint.clone(),
            region: settings.region.clone(),
            bucket: settings.bucket.clone(),
            key: settings.key.clone(),
        };

        Ok(Self::from_store(Arc::new(s3), &settings.key, descriptor))
    }

    /// Wrap an already configured store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        key: &str,
        descriptor: StorageDescriptor,
    ) -> Self {
        Self {
            store,
            location: ObjectPath::from(key),
            descriptor,
        }
    }

    async fn put_words(&self, words: &[Word]) -> StoreResult<()> {
        self.put_at(&self.location, words).await
    }

    async fn put_at(&self, location: &ObjectPath, words: &[Word]) -> StoreResult<()> {
        let payload = PutPayload::from(render_word_list(words).into_bytes());
        self.store.put(location, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl WordStore for ObjectStoreBackend {
    fn descriptor(&self) -> StorageDescriptor {
        self.descriptor.clone()
    }

    async fn load_all(&self) -> StoreResult<Vec<Word>> {
        let fetched = match self.store.get(&self.location).await {
            Ok(result) => result.bytes().await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(bytes) => {
                let words = parse_word_list(&String::from_utf8_lossy(&bytes));
                info!(count = words.len(), key = %self.location, "loaded words from object store");
                Ok(words)
            }
            Err(object_store::Error::NotFound { .. }) => {
                warn!(key = %self.location, "words object not found, creating it with seed words");
                let seed = seed_words();
                self.put_words(&seed).await?;
                Ok(seed)
            }
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn save_all(&self, words: &[Word]) -> StoreResult<()> {
        self.put_words(words).await?;
        debug!(count = words.len(), key = %self.location, "saved words to object store");
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        match self.store.head(&self.location).await {
            // A missing object still proves the bucket answers
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn backup(&self, words: &[Word], stamp: &str) -> StoreResult<String> {
        let location = ObjectPath::from(format!("backups/words-backup-{stamp}.txt"));
        self.put_at(&location, words).await?;

        let qualified = match &self.descriptor {
            StorageDescriptor::ObjectStore { bucket, .. } => format!("{bucket}/{location}"),
            _ => location.to_string(),
        };
        info!(count = words.len(), location = %qualified, "wrote word list backup");
        Ok(qualified)
    }
}
