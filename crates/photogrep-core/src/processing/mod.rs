//! OCR extraction pipeline and progress reporting.
//!
//! This module wraps raw OCR calls with the policy the engine applies to
//! every image:
//! - A hard per-image deadline, so one stuck recognition cannot stall a
//!   whole reconciliation pass
//! - A concurrency bound for batch extraction
//! - Classification of empty output as a distinct `NoText` outcome
//! - Progress snapshots for UI and CLI feedback
//!
//! # Example
//!
//! ```ignore
//! use photogrep_core::processing::ExtractionPipeline;
//! use std::sync::Arc;
//!
//! let pipeline = ExtractionPipeline::new(Arc::new(platform_ocr))
//!     .with_timeout(Duration::from_secs(10))
//!     .with_concurrency(4);
//!
//! let report = engine
//!     .reconcile_with_progress(&library, &pipeline, |progress| {
//!         println!("{:.0}% complete", progress.percent_complete());
//!     })
//!     .await?;
//! ```

mod pipeline;
mod progress;

pub use pipeline::{ExtractError, ExtractionPipeline};
pub use progress::{ProgressTimer, SyncProgress};
