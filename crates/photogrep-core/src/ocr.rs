//! OCR engine abstraction.
//!
//! The engine and pipeline only ever see the [`OcrEngine`] trait, so the
//! same reconciliation and indexing logic runs against platform OCR
//! frameworks, remote services, or scripted fakes in tests.

use crate::error::OcrError;
use crate::search::types::{ImageId, OcrResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Text recognition backend.
///
/// Implementations load the image for `id` and run text recognition over
/// it, returning every recognized fragment in recognition order. An image
/// with no recognizable text returns an empty result; the pipeline is
/// responsible for classifying that outcome.
///
/// Implementations do not enforce their own deadline; the extraction
/// pipeline wraps every call in a timeout.
///
/// # Platform Implementations
///
/// ```ignore
/// struct VisionOcr {
///     library: PlatformAssetHandle,
/// }
///
/// #[async_trait(?Send)]
/// impl OcrEngine for VisionOcr {
///     async fn recognize(&self, id: &ImageId) -> Result<OcrResult, OcrError> {
///         let image = self.library.load_full_resolution(id).await
///             .map_err(|e| OcrError::Failed(e.to_string()))?;
///         run_text_recognition(&image).await
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait OcrEngine: Send + Sync {
    /// Runs text recognition on the image identified by `id`.
    async fn recognize(&self, id: &ImageId) -> Result<OcrResult, OcrError>;
}

/// Scripted OCR engine for tests and demos.
///
/// Returns pre-configured outcomes per image id and records how many
/// times each id was recognized, which lets tests assert that cached
/// images are never re-extracted. An optional artificial delay makes
/// timeout and overlap behavior testable.
#[derive(Debug, Default)]
pub struct StaticOcr {
    outcomes: Mutex<HashMap<ImageId, Result<OcrResult, OcrError>>>,
    calls: Mutex<HashMap<ImageId, usize>>,
    delay: Option<Duration>,
}

impl StaticOcr {
    /// Creates an engine with no scripted outcomes.
    ///
    /// Recognizing an unscripted id fails with [`OcrError::Failed`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a single-fragment text result for `id`.
    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        if let Ok(outcomes) = self.outcomes.get_mut() {
            outcomes.insert(ImageId::new(id), Ok(OcrResult::from_text(text)));
        }
        self
    }

    /// Scripts a full result for `id`.
    pub fn with_result(mut self, id: &str, result: OcrResult) -> Self {
        if let Ok(outcomes) = self.outcomes.get_mut() {
            outcomes.insert(ImageId::new(id), Ok(result));
        }
        self
    }

    /// Scripts a recognition failure for `id`.
    pub fn with_failure(mut self, id: &str, error: OcrError) -> Self {
        if let Ok(outcomes) = self.outcomes.get_mut() {
            outcomes.insert(ImageId::new(id), Err(error));
        }
        self
    }

    /// Adds an artificial delay before every recognition.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces the outcome for `id` after construction.
    ///
    /// Lets a test script a failure for one pass and a success for the
    /// next.
    pub fn set_outcome(&self, id: &str, outcome: Result<OcrResult, OcrError>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.insert(ImageId::new(id), outcome);
        }
    }

    /// Returns how many times `id` has been recognized.
    pub fn calls_for(&self, id: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&ImageId::new(id)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Returns the total number of recognition calls.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }
}

#[async_trait(?Send)]
impl OcrEngine for StaticOcr {
    async fn recognize(&self, id: &ImageId) -> Result<OcrResult, OcrError> {
        {
            let mut calls = self
                .calls
                .lock()
                .map_err(|e| OcrError::Failed(format!("Lock poisoned: {}", e)))?;
            *calls.entry(id.clone()).or_insert(0) += 1;
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcomes = self
            .outcomes
            .lock()
            .map_err(|e| OcrError::Failed(format!("Lock poisoned: {}", e)))?;
        match outcomes.get(id) {
            Some(outcome) => outcome.clone(),
            None => Err(OcrError::Failed(format!(
                "No OCR output configured for {}",
                id
            ))),
        }
    }
}
