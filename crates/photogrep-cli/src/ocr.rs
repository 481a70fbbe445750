//! Sidecar-file OCR source.
//!
//! Reads recognition output produced by an external OCR tool from
//! `<image>.ocr.json` files next to each photo, keeping the CLI free of
//! any platform OCR dependency while exercising the full pipeline.
//!
//! A sidecar holds the JSON array of recognized fragments:
//!
//! ```json
//! [
//!   { "text": "Red Car", "confidence": 0.98 },
//!   { "text": "PARKING" }
//! ]
//! ```
//!
//! An empty array means the tool processed the image and recognized
//! nothing. A missing or unreadable sidecar counts as an OCR failure, so
//! the image is retried on the next sync once the sidecar appears.

use async_trait::async_trait;
use photogrep_core::error::OcrError;
use photogrep_core::ocr::OcrEngine;
use photogrep_core::search::{ImageId, OcrResult};
use std::path::PathBuf;
use tracing::debug;

/// Suffix appended to an image path to locate its sidecar.
const SIDECAR_SUFFIX: &str = ".ocr.json";

/// OCR engine that reads pre-computed sidecar files.
#[derive(Debug, Default)]
pub struct SidecarOcr;

impl SidecarOcr {
    /// Creates a sidecar reader.
    pub fn new() -> Self {
        Self
    }

    fn sidecar_path(id: &ImageId) -> PathBuf {
        PathBuf::from(format!("{}{}", id.as_str(), SIDECAR_SUFFIX))
    }
}

#[async_trait(?Send)]
impl OcrEngine for SidecarOcr {
    async fn recognize(&self, id: &ImageId) -> Result<OcrResult, OcrError> {
        let path = Self::sidecar_path(id);
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| OcrError::Failed(format!("No sidecar at {}: {}", path.display(), e)))?;

        let result: OcrResult = serde_json::from_str(&raw)
            .map_err(|e| OcrError::Failed(format!("Invalid sidecar {}: {}", path.display(), e)))?;

        debug!("Read {} fragments from {}", result.len(), path.display());
        Ok(result)
    }
}
