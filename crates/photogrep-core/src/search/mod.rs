//! Prefix search over OCR text from a photo library.
//!
//! # Architecture
//!
//! The search side of photogrep is a thin stack:
//!
//! - [`PrefixIndex`]: character trie mapping recognized words to image
//!   ids, answering prefix queries by subtree union
//! - [`PhotoSearchEngine`]: ties the trie and display-text map to the
//!   durable OCR cache and runs reconciliation passes against the
//!   photo library
//!
//! The trie and text map live only in memory; the cache is the single
//! durable artifact and the index is always rebuildable from it.
//!
//! # Usage
//!
//! ```ignore
//! use photogrep_core::search::PhotoSearchEngine;
//! use photogrep_core::storage::MemoryStore;
//!
//! let engine = PhotoSearchEngine::new(MemoryStore::new());
//! engine.reconcile(&library, &pipeline).await?;
//!
//! for id in engine.search("sun") {
//!     println!("{}: {:?}", id, engine.ocr_text(&id));
//! }
//! ```

pub mod types;

mod engine;
mod prefix;

pub use engine::PhotoSearchEngine;
pub use prefix::PrefixIndex;
pub use types::{
    get_current_timestamp, FragmentBounds, ImageId, OcrResult, SyncError, SyncReport, TextFragment,
};
