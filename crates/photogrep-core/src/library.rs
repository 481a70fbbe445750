//! Photo library abstraction.
//!
//! The reconciler never talks to a platform photo store directly; it
//! enumerates photos through the [`PhotoLibrary`] trait so the same pass
//! logic runs against native photo frameworks, directory scanners, or
//! fixed in-memory lists in tests.

use crate::error::LibraryError;
use crate::search::types::ImageId;
use async_trait::async_trait;
use std::sync::Mutex;

/// One photo visible in the library.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoEntry {
    /// Library-assigned stable identifier.
    pub id: ImageId,
    /// Capture time in milliseconds since Unix epoch, when known.
    ///
    /// Providers that cannot determine capture time leave this unset;
    /// it only affects enumeration order, never identity.
    pub taken_at: Option<u64>,
}

impl PhotoEntry {
    /// Creates an entry with no capture time.
    pub fn new(id: impl Into<ImageId>) -> Self {
        Self {
            id: id.into(),
            taken_at: None,
        }
    }

    /// Creates an entry with a capture time.
    pub fn with_taken_at(id: impl Into<ImageId>, taken_at: u64) -> Self {
        Self {
            id: id.into(),
            taken_at: Some(taken_at),
        }
    }
}

/// Source of truth for which photos currently exist.
///
/// # Contract
///
/// - `enumerate` returns at most `limit` entries, most recent first, so
///   a bounded pass always covers the newest photos.
/// - Identifiers are stable across calls for as long as the photo
///   exists. A photo that disappears from enumeration is treated as
///   deleted and its cached OCR result is evicted.
/// - Enumeration failure must be reported as an error, never as an
///   empty list; an empty list means "the library is empty" and would
///   evict every cached result.
#[async_trait(?Send)]
pub trait PhotoLibrary: Send + Sync {
    /// Enumerates up to `limit` photos, most recent first.
    async fn enumerate(&self, limit: usize) -> Result<Vec<PhotoEntry>, LibraryError>;
}

/// Fixed in-memory photo library for tests and demos.
///
/// The visible set can be swapped between reconciliation passes to
/// simulate photos being added and deleted.
#[derive(Debug, Default)]
pub struct FixedLibrary {
    entries: Mutex<Vec<PhotoEntry>>,
}

impl FixedLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library containing the given ids, in order.
    pub fn with_ids(ids: &[&str]) -> Self {
        let library = Self::new();
        library.set_ids(ids);
        library
    }

    /// Replaces the visible set of photos.
    pub fn set_ids(&self, ids: &[&str]) {
        if let Ok(mut entries) = self.entries.lock() {
            *entries = ids.iter().map(|id| PhotoEntry::new(*id)).collect();
        }
    }
}

#[async_trait(?Send)]
impl PhotoLibrary for FixedLibrary {
    async fn enumerate(&self, limit: usize) -> Result<Vec<PhotoEntry>, LibraryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| LibraryError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(entries.iter().take(limit).cloned().collect())
    }
}

/// Library that always fails to enumerate, for failure-path tests.
#[derive(Debug, Default)]
pub struct FailingLibrary;

#[async_trait(?Send)]
impl PhotoLibrary for FailingLibrary {
    async fn enumerate(&self, _limit: usize) -> Result<Vec<PhotoEntry>, LibraryError> {
        Err(LibraryError::Unavailable(
            "photo library offline".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_library_respects_limit() {
        let library = FixedLibrary::with_ids(&["a", "b", "c"]);

        assert_eq!(library.enumerate(2).await.unwrap().len(), 2);
        assert_eq!(library.enumerate(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fixed_library_set_ids_replaces() {
        let library = FixedLibrary::with_ids(&["a", "b"]);
        library.set_ids(&["c"]);

        let entries = library.enumerate(10).await.unwrap();
        assert_eq!(entries, vec![PhotoEntry::new("c")]);
    }

    #[tokio::test]
    async fn test_failing_library_errors() {
        let err = FailingLibrary.enumerate(10).await.unwrap_err();
        assert!(matches!(err, LibraryError::Unavailable(_)));
    }
}
