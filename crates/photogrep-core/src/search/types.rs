//! Core types for the photo search engine.

use serde::{Deserialize, Serialize};

/// Returns current timestamp in milliseconds since Unix epoch.
///
/// Uses `instant` for consistent behavior on native and wasm targets.
pub fn get_current_timestamp() -> u64 {
    instant::SystemTime::now()
        .duration_since(instant::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Stable identifier for an image in the photo library.
///
/// Wraps the library-assigned asset identifier. Identifiers are opaque
/// strings and may contain any character the platform emits, including
/// slashes, spaces, and non-ASCII text. The storage layer is responsible
/// for mapping identifiers to safe cache keys (see `storage::key`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// Creates an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Geometry of a recognized text fragment, normalized to the image size.
///
/// Coordinates are fractions in `[0, 1]` with the origin at the top-left
/// corner, matching what platform OCR frameworks report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// A single line or block of text recognized in an image.
///
/// `confidence` and `bounds` are optional because not every OCR backend
/// reports them; cached records written without them must still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text exactly as the OCR engine produced it.
    pub text: String,
    /// Recognition confidence in `[0, 1]`, if reported.
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Normalized bounding box, if reported.
    #[serde(default)]
    pub bounds: Option<FragmentBounds>,
}

impl TextFragment {
    /// Creates a fragment with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            bounds: None,
        }
    }

    /// Creates a fragment with a confidence score.
    pub fn with_confidence(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: Some(confidence),
            bounds: None,
        }
    }
}

impl From<&str> for TextFragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Full OCR output for one image, in recognition order.
///
/// An empty result is meaningful: it records that the image was processed
/// and no text was recognized, which is distinct from the image never
/// having been processed at all. Empty results are cached like any other
/// so the image is not re-run through OCR on later passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OcrResult {
    pub fragments: Vec<TextFragment>,
}

impl OcrResult {
    /// Creates a result from recognized fragments.
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }

    /// Creates the "processed, nothing recognized" result.
    pub fn empty() -> Self {
        Self { fragments: vec![] }
    }

    /// Creates a single-fragment result from plain text.
    ///
    /// Convenience for tests and simple OCR backends that return one block.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![TextFragment::new(text)],
        }
    }

    /// Returns the number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if no fragments were recognized.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns true if any fragment contains non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| !f.text.trim().is_empty())
    }

    /// Returns the lowercased, whitespace-split words across all fragments.
    ///
    /// This is the indexable view of the result. Fragment order is
    /// preserved; duplicates are kept (index insertion is idempotent, so
    /// they cost nothing downstream).
    pub fn words(&self) -> Vec<String> {
        self.fragments
            .iter()
            .flat_map(|f| f.text.split_whitespace())
            .map(|w| w.to_lowercase())
            .collect()
    }

    /// Concatenates all fragment text with newlines, for display.
    pub fn joined_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<TextFragment> for OcrResult {
    fn from_iter<I: IntoIterator<Item = TextFragment>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

/// Errors that can occur during a reconciliation pass.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    /// The photo library could not be enumerated. The pass aborts; nothing
    /// is evicted or re-extracted on this error.
    #[error("Photo library error: {0}")]
    Library(String),
    /// The cache could not list or persist results.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Another reconciliation pass is already running on this engine.
    #[error("Reconciliation already in progress")]
    SyncInProgress,
}

/// Summary of one completed reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Images currently present in the library.
    pub live: usize,
    /// Images served from the cache without running OCR.
    pub from_cache: usize,
    /// Images newly run through OCR with text recognized.
    pub extracted: usize,
    /// Images newly run through OCR with nothing recognized.
    pub no_text: usize,
    /// Images whose extraction or persistence failed this pass. They stay
    /// uncached and are retried on the next pass.
    pub failed: usize,
    /// Cached results evicted because their image left the library.
    pub evicted: usize,
    /// Wall-clock duration of the pass in milliseconds.
    pub duration_ms: u64,
}

impl SyncReport {
    /// Returns the number of images processed through OCR this pass.
    pub fn ocr_runs(&self) -> usize {
        self.extracted + self.no_text + self.failed
    }
}
