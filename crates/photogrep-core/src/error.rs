//! Error types for photo library access and OCR.
//!
//! Storage and reconciliation errors live next to the code that raises
//! them (`storage` and `search::types`); this module holds the errors
//! produced by the platform-facing traits in `ocr` and `library`.

use thiserror::Error;

/// Errors reported by an OCR engine.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// Recognition failed for this image
    #[error("OCR failed: {0}")]
    Failed(String),
    /// No OCR backend is available on this platform
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by a photo library provider.
#[derive(Debug, Clone, Error)]
pub enum LibraryError {
    /// The library could not be reached or enumerated
    #[error("Photo library unavailable: {0}")]
    Unavailable(String),
    /// Access to the photo library was not granted
    #[error("Photo library access denied: {0}")]
    Denied(String),
}
