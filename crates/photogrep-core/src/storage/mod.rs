//! Storage layer for cached OCR results.
//!
//! # Architecture
//!
//! Persistence is split into two layers:
//!
//! - [`KeyValueStore`]: a minimal durable string key-value contract.
//!   Backends implement only this. [`MemoryStore`] backs tests and
//!   ephemeral use; [`RedbStore`] (behind the `redb-store` feature,
//!   enabled by default) persists to a local redb database.
//! - [`OcrCache`]: the typed layer the engine talks to. It owns JSON
//!   serialization of [`OcrResult`](crate::search::OcrResult) records and
//!   the reversible identifier-to-key mapping in [`key`].
//!
//! The cache is the durable source of truth for the search engine: the
//! in-memory prefix index is rebuilt from it at startup and must always
//! be derivable from it.

mod cache;
pub mod key;
#[cfg(feature = "redb-store")]
mod redb_store;

pub use cache::OcrCache;
#[cfg(feature = "redb-store")]
pub use redb_store::RedbStore;

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Abstract persistence backend for the OCR cache.
///
/// A deliberately small durable string key-value contract. The
/// [`OcrCache`] layer above owns record encoding and key naming;
/// backends only move opaque strings. Implementations must be shareable
/// across tasks behind `Arc`.
///
/// # Implementations
///
/// - [`MemoryStore`]: `RwLock<HashMap>`, no durability, for tests
/// - [`RedbStore`]: durable single-file redb database
#[async_trait::async_trait(?Send)]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    ///
    /// The value, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The write must be durable by the time this returns.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key` from the store.
    ///
    /// Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently in the store, in no particular order.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory store for testing and ephemeral sessions.
///
/// Contents are lost on drop; every operation is infallible short of a
/// poisoned lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::DatabaseError(format!("Lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::DatabaseError(format!("Lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::DatabaseError(format!("Lock poisoned: {}", e)))?;
        entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::DatabaseError(format!("Lock poisoned: {}", e)))?;
        Ok(entries.keys().cloned().collect())
    }
}

// Blanket implementation for Arc-wrapped stores
#[async_trait::async_trait(?Send)]
impl<T: KeyValueStore> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).list_keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_and_get() {
        let store = MemoryStore::new();
        store.set("img:a", "[]").await.unwrap();

        assert_eq!(store.get("img:a").await.unwrap(), Some("[]".to_string()));
        assert_eq!(store.get("img:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_set_overwrites() {
        let store = MemoryStore::new();
        store.set("img:a", "old").await.unwrap();
        store.set("img:a", "new").await.unwrap();

        assert_eq!(store.get("img:a").await.unwrap(), Some("new".to_string()));
        assert_eq!(store.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_remove_is_idempotent() {
        let store = MemoryStore::new();
        store.set("img:a", "[]").await.unwrap();

        store.remove("img:a").await.unwrap();
        store.remove("img:a").await.unwrap();

        assert_eq!(store.get("img:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_list_keys() {
        let store = MemoryStore::new();
        store.set("img:a", "1").await.unwrap();
        store.set("img:b", "2").await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["img:a".to_string(), "img:b".to_string()]);
    }

    #[tokio::test]
    async fn test_arc_wrapped_store() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set("img:a", "[]").await.unwrap();

        let clone = store.clone();
        assert_eq!(clone.get("img:a").await.unwrap(), Some("[]".to_string()));
    }
}
