//! Redb-based persistent storage for OCR results.
//!
//! Stores cache records in a single-file embedded database. Each record
//! is one row in the `ocr_results` table keyed by the encoded cache key.
//! Every write commits before returning, so a record is durable by the
//! time the engine indexes it.

use super::{KeyValueStore, StorageError};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const OCR_TABLE: TableDefinition<&str, &str> = TableDefinition::new("ocr_results");

/// Persistent key-value store backed by redb.
///
/// Safe to share across tasks; redb serializes write transactions
/// internally.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Opens the database at `path`, creating it if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Filesystem path for the database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = Database::create(path)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to open database: {}", e)))?;

        // Create the table if it doesn't exist
        let write_txn = db.begin_write().map_err(|e| {
            StorageError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;
        {
            write_txn.open_table(OCR_TABLE).map_err(|e| {
                StorageError::DatabaseError(format!("Failed to create table: {}", e))
            })?;
        }
        write_txn
            .commit()
            .map_err(|e| StorageError::DatabaseError(format!("Failed to commit: {}", e)))?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait::async_trait(?Send)]
impl KeyValueStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let read_txn = self.db.begin_read().map_err(|e| {
            StorageError::DatabaseError(format!("Failed to begin read transaction: {}", e))
        })?;
        let table = read_txn
            .open_table(OCR_TABLE)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to open table: {}", e)))?;

        let value = table
            .get(key)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to read key: {}", e)))?
            .map(|guard| guard.value().to_string());

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(|e| {
            StorageError::DatabaseError(format!("Failed to begin write transaction: {}", e))
        })?;
        {
            let mut table = write_txn
                .open_table(OCR_TABLE)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to open table: {}", e)))?;
            table
                .insert(key, value)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to insert: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| StorageError::DatabaseError(format!("Failed to commit: {}", e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write().map_err(|e| {
            StorageError::DatabaseError(format!("Failed to begin write transaction: {}", e))
        })?;
        {
            let mut table = write_txn
                .open_table(OCR_TABLE)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to open table: {}", e)))?;
            table
                .remove(key)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to remove: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| StorageError::DatabaseError(format!("Failed to commit: {}", e)))?;

        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let read_txn = self.db.begin_read().map_err(|e| {
            StorageError::DatabaseError(format!("Failed to begin read transaction: {}", e))
        })?;
        let table = read_txn
            .open_table(OCR_TABLE)
            .map_err(|e| StorageError::DatabaseError(format!("Failed to open table: {}", e)))?;

        let mut keys = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| StorageError::DatabaseError(format!("Failed to iterate table: {}", e)))?
        {
            let (key, _) = entry.map_err(|e| {
                StorageError::DatabaseError(format!("Failed to read table entry: {}", e))
            })?;
            keys.push(key.value().to_string());
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RedbStore, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = RedbStore::open(dir.path().join("test.redb")).expect("Failed to open store");
        (store, dir)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _dir) = create_test_store();

        store.set("img:a", r#"[{"text":"sunset"}]"#).await.unwrap();

        assert_eq!(
            store.get("img:a").await.unwrap(),
            Some(r#"[{"text":"sunset"}]"#.to_string())
        );
        assert_eq!(store.get("img:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let (store, _dir) = create_test_store();

        store.set("img:a", "old").await.unwrap();
        store.set("img:a", "new").await.unwrap();

        assert_eq!(store.get("img:a").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store();

        store.set("img:a", "[]").await.unwrap();
        store.remove("img:a").await.unwrap();
        store.remove("img:a").await.unwrap();

        assert_eq!(store.get("img:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys() {
        let (store, _dir) = create_test_store();

        store.set("img:b", "2").await.unwrap();
        store.set("img:a", "1").await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["img:a".to_string(), "img:b".to_string()]);
    }

    #[tokio::test]
    async fn test_persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("img:kept", "[]").await.unwrap();
        }

        {
            let store = RedbStore::open(&path).unwrap();
            assert_eq!(store.get("img:kept").await.unwrap(), Some("[]".to_string()));
            assert_eq!(store.list_keys().await.unwrap().len(), 1);
        }
    }
}
