//! Typed cache of OCR results over a key-value backend.

use super::key::{decode_key, encode_key};
use super::{KeyValueStore, StorageError};
use crate::search::types::{ImageId, OcrResult};
use tracing::warn;

/// Durable cache of per-image OCR results.
///
/// Wraps a [`KeyValueStore`] backend with JSON record encoding and the
/// `img:` key namespace. This is the layer the search engine talks to;
/// it never sees raw keys or raw record strings.
///
/// A record that fails to parse is treated as a cache miss rather than an
/// error: the reconciler will re-extract the image and overwrite the bad
/// record on its next pass.
#[derive(Debug)]
pub struct OcrCache<B: KeyValueStore> {
    backend: B,
}

impl<B: KeyValueStore> OcrCache<B> {
    /// Creates a cache over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the cached result for `id`.
    ///
    /// # Returns
    ///
    /// `Some` with the cached result, or `None` if the image has no
    /// record or its record is unreadable. A present-but-empty result
    /// means the image was processed and no text was recognized.
    pub async fn get(&self, id: &ImageId) -> Result<Option<OcrResult>, StorageError> {
        let key = encode_key(id);
        let Some(raw) = self.backend.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!("Unreadable cache record for {}: {}", id, e);
                Ok(None)
            }
        }
    }

    /// Persists `result` as the record for `id`, replacing any previous
    /// record.
    pub async fn put(&self, id: &ImageId, result: &OcrResult) -> Result<(), StorageError> {
        let raw = serde_json::to_string(result).map_err(|e| {
            StorageError::SerializationError(format!(
                "Failed to serialize OCR result for {}: {}",
                id, e
            ))
        })?;
        self.backend.set(&encode_key(id), &raw).await
    }

    /// Removes the record for `id`. Removing an absent record succeeds.
    pub async fn remove(&self, id: &ImageId) -> Result<(), StorageError> {
        self.backend.remove(&encode_key(id)).await
    }

    /// Lists the ids of every cached result.
    ///
    /// Keys outside the `img:` namespace and keys with malformed
    /// escaping are skipped with a warning.
    pub async fn list_ids(&self) -> Result<Vec<ImageId>, StorageError> {
        let keys = self.backend.list_keys().await?;
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            match decode_key(&key) {
                Some(id) => ids.push(id),
                None => {
                    if key.starts_with(super::key::KEY_PREFIX) {
                        warn!("Skipping undecodable cache key {:?}", key);
                    }
                }
            }
        }
        Ok(ids)
    }

    /// Returns the number of cached results.
    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.list_ids().await?.len())
    }
}
