//! OCR extraction pipeline.
//!
//! The `ExtractionPipeline` wraps an [`OcrEngine`] with the policy the
//! reconciler needs around every call: a hard per-image deadline, a
//! concurrency bound for batch extraction, and classification of empty
//! output.

use crate::config::{DEFAULT_OCR_CONCURRENCY, DEFAULT_OCR_TIMEOUT_SECS};
use crate::error::OcrError;
use crate::metrics::global_metrics;
use crate::ocr::OcrEngine;
use crate::search::types::{ImageId, OcrResult};
use instant::Instant;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Deadline- and concurrency-aware wrapper around an OCR engine.
///
/// # Thread Safety
///
/// The pipeline is `Send + Sync` and can be shared across tasks; the
/// engine is held through `Arc`.
///
/// # Example
///
/// ```ignore
/// use photogrep_core::processing::ExtractionPipeline;
/// use std::sync::Arc;
///
/// let pipeline = ExtractionPipeline::new(Arc::new(ocr))
///     .with_timeout(Duration::from_secs(10))
///     .with_concurrency(2);
///
/// match pipeline.extract(&id).await {
///     Ok(result) => cache.put(&id, &result).await?,
///     Err(ExtractError::NoText) => cache.put(&id, &OcrResult::empty()).await?,
///     Err(e) => warn!("extraction failed: {}", e),
/// }
/// ```
pub struct ExtractionPipeline {
    ocr: Arc<dyn OcrEngine>,
    timeout: Duration,
    concurrency: usize,
}

impl ExtractionPipeline {
    /// Creates a pipeline with the default deadline and concurrency.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            ocr,
            timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
            concurrency: DEFAULT_OCR_CONCURRENCY,
        }
    }

    /// Sets the per-image OCR deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many images the reconciler extracts concurrently.
    ///
    /// Values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns a reference to the OCR engine.
    pub fn ocr(&self) -> &dyn OcrEngine {
        self.ocr.as_ref()
    }

    /// Returns the per-image deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the extraction concurrency bound.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Extracts text from one image, bounded by the pipeline deadline.
    ///
    /// # Returns
    ///
    /// The raw OCR result when at least one fragment contains
    /// non-whitespace text. Empty output is reported as
    /// [`ExtractError::NoText`] so callers can record "processed,
    /// nothing recognized" explicitly.
    pub async fn extract(&self, id: &ImageId) -> Result<OcrResult, ExtractError> {
        let started = Instant::now();

        let result = match tokio::time::timeout(self.timeout, self.ocr.recognize(id)).await {
            Err(_) => {
                debug!("OCR timed out for {} after {:?}", id, self.timeout);
                return Err(ExtractError::Timeout(self.timeout));
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(result)) => result,
        };

        global_metrics().record_extraction(started.elapsed().as_millis() as u64);
        debug!(
            "Recognized {} fragments for {} in {:?}",
            result.len(),
            id,
            started.elapsed()
        );

        if result.has_text() {
            Ok(result)
        } else {
            Err(ExtractError::NoText)
        }
    }
}

/// Errors from a single extraction attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// The OCR engine reported an error
    #[error("{0}")]
    Ocr(#[from] OcrError),
    /// The OCR call exceeded the pipeline deadline
    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),
    /// OCR completed without recognizing any text
    #[error("No text recognized")]
    NoText,
}
