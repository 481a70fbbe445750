//! Photo search engine combining a durable OCR cache with in-memory
//! search structures.
//!
//! # Architecture
//!
//! The engine owns three pieces of state:
//!
//! - An [`OcrCache`] over a pluggable [`KeyValueStore`]: the durable
//!   source of truth, holding one OCR result per known image
//! - A [`PrefixIndex`]: in-memory trie answering prefix queries
//! - A text map: in-memory copy of each image's OCR result, for display
//!
//! Both in-memory structures are derived from the cache and rebuilt from
//! it at startup; they are never persisted themselves.
//!
//! # Write Ordering
//!
//! New OCR results are persisted to the cache before they are indexed.
//! A crash between the two steps leaves an unindexed cache record, which
//! the next rebuild or reconciliation pass picks up. The reverse order
//! could surface search results that vanish on restart.
//!
//! All words of one image enter the trie under a single write lock, so a
//! concurrent search sees either none of an image's words or all of
//! them.
//!
//! # Stale Index Entries
//!
//! Evicting an image removes its cache record and display text but not
//! its trie entries; per-word removal would need reference counts on
//! every node for an entry that stops matching anything user-visible
//! anyway. Stale trie ids persist until the next rebuild from cache.
//!
//! # Example
//!
//! ```ignore
//! use photogrep_core::search::PhotoSearchEngine;
//! use photogrep_core::storage::RedbStore;
//!
//! let store = RedbStore::open(data_dir.join("photogrep.redb"))?;
//! let engine = PhotoSearchEngine::try_load_or_new(store).await?;
//!
//! engine.reconcile(&library, &pipeline).await?;
//! let matches = engine.search("sun");
//! ```

mod reconcile;

use crate::error::LibraryError;
use crate::metrics::global_metrics;
use crate::search::prefix::PrefixIndex;
use crate::search::types::{ImageId, OcrResult, SyncError};
use crate::storage::{KeyValueStore, OcrCache, StorageError};
use instant::Instant;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::{info, instrument, warn};

/// Search engine over OCR text extracted from a photo library.
///
/// Generic over the storage backend so the same engine runs on a durable
/// [`RedbStore`](crate::storage::RedbStore) in production and a
/// [`MemoryStore`](crate::storage::MemoryStore) in tests.
///
/// All methods take `&self`; interior locks guard the in-memory
/// structures and a dedicated gate serializes reconciliation passes.
pub struct PhotoSearchEngine<S: KeyValueStore> {
    pub(crate) cache: OcrCache<S>,
    pub(crate) index: RwLock<PrefixIndex>,
    pub(crate) texts: RwLock<HashMap<ImageId, OcrResult>>,
    pub(crate) sync_gate: tokio::sync::Mutex<()>,
    pub(crate) ready: AtomicBool,
    pub(crate) page_size: usize,
}

impl<S: KeyValueStore> PhotoSearchEngine<S> {
    /// Creates an engine with an empty index over the given store.
    ///
    /// Cached results already in the store are not loaded; call
    /// [`rebuild_from_cache`](Self::rebuild_from_cache) or use
    /// [`try_load_or_new`](Self::try_load_or_new).
    pub fn new(store: S) -> Self {
        Self {
            cache: OcrCache::new(store),
            index: RwLock::new(PrefixIndex::new()),
            texts: RwLock::new(HashMap::new()),
            sync_gate: tokio::sync::Mutex::new(()),
            ready: AtomicBool::new(false),
            page_size: crate::config::DEFAULT_ENUMERATION_PAGE,
        }
    }

    /// Sets how many photos a reconciliation pass requests from the
    /// library.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Creates an engine and hydrates the index from any cached results.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    pub async fn try_load_or_new(store: S) -> Result<Self, SyncError> {
        let engine = Self::new(store);
        let cached = engine.cache.count().await?;
        if cached == 0 {
            info!("No cached OCR results found, starting with empty index");
            return Ok(engine);
        }
        engine.rebuild_from_cache().await?;
        Ok(engine)
    }

    /// Rebuilds the in-memory index and text map from the cache.
    ///
    /// Discards the current in-memory state first, which also drops any
    /// stale trie entries left behind by evictions. Unreadable records
    /// are skipped with a warning; they are re-extracted on the next
    /// reconciliation pass.
    ///
    /// # Returns
    ///
    /// The number of cached results hydrated.
    #[instrument(skip_all)]
    pub async fn rebuild_from_cache(&self) -> Result<usize, SyncError> {
        let started = Instant::now();
        let ids = self.cache.list_ids().await?;

        if let Ok(mut index) = self.index.write() {
            *index = PrefixIndex::new();
        }
        if let Ok(mut texts) = self.texts.write() {
            texts.clear();
        }

        let mut hydrated = 0;
        for id in &ids {
            let fetch_started = Instant::now();
            match self.cache.get(id).await {
                Ok(Some(result)) => {
                    self.insert_result(id, &result);
                    global_metrics().record_hydration(fetch_started.elapsed().as_millis() as u64);
                    hydrated += 1;
                }
                Ok(None) => warn!("Skipping unreadable cache record for {}", id),
                Err(e) => warn!("Failed to load cached result for {}: {}", id, e),
            }
        }

        info!(
            "Hydrated {} of {} cached results in {:?}",
            hydrated,
            ids.len(),
            started.elapsed()
        );
        Ok(hydrated)
    }

    /// Returns every image containing a word starting with `term`.
    ///
    /// The term is trimmed and lowercased before lookup, mirroring the
    /// normalization applied to indexed words, so matching is
    /// case-insensitive end to end. A term that is empty after trimming
    /// returns the empty set. Search never fails and never blocks on
    /// reconciliation beyond the brief per-image index writes.
    pub fn search(&self, term: &str) -> HashSet<ImageId> {
        let normalized = term.trim().to_lowercase();
        if normalized.is_empty() {
            return HashSet::new();
        }

        let started = Instant::now();
        let results = match self.index.read() {
            Ok(index) => index.search_prefix(&normalized),
            Err(_) => HashSet::new(),
        };
        global_metrics().record_search(started.elapsed().as_millis() as u64);
        results
    }

    /// Returns the cached OCR result for `id`, if the image is tracked.
    pub fn ocr_text(&self, id: &ImageId) -> Option<OcrResult> {
        self.texts.read().ok()?.get(id).cloned()
    }

    /// Returns the number of distinct indexed words.
    pub fn indexed_word_count(&self) -> usize {
        self.index.read().map(|index| index.word_count()).unwrap_or(0)
    }

    /// Returns the number of images with an in-memory OCR result.
    pub fn tracked_image_count(&self) -> usize {
        self.texts.read().map(|texts| texts.len()).unwrap_or(0)
    }

    /// Returns true once at least one reconciliation pass has completed.
    ///
    /// Hydrating from the cache alone does not set this; readiness means
    /// the index has been checked against the live library.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Returns a reference to the OCR result cache.
    pub fn cache(&self) -> &OcrCache<S> {
        &self.cache
    }

    /// Makes `result` visible for `id`: display text first, then the
    /// trie under one write lock.
    pub(crate) fn insert_result(&self, id: &ImageId, result: &OcrResult) {
        if let Ok(mut texts) = self.texts.write() {
            texts.insert(id.clone(), result.clone());
        }

        let words = result.words();
        if words.is_empty() {
            return;
        }
        if let Ok(mut index) = self.index.write() {
            for word in &words {
                index.insert(word, id.clone());
            }
        }
    }

    /// Drops the display text for an evicted image. Trie entries remain
    /// until the next rebuild.
    pub(crate) fn forget(&self, id: &ImageId) {
        if let Ok(mut texts) = self.texts.write() {
            texts.remove(id);
        }
    }
}

// Conversion implementations for error chaining

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        SyncError::Storage(e.to_string())
    }
}

impl From<LibraryError> for SyncError {
    fn from(e: LibraryError) -> Self {
        SyncError::Library(e.to_string())
    }
}
