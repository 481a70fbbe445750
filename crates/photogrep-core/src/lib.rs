//! # Photogrep Core
//!
//! Core engine for prefix-searching OCR text extracted from photo
//! libraries. Platform-independent: photo access and text recognition
//! are injected through traits, storage is pluggable, and the same
//! engine runs under a CLI, a desktop app, or tests.
//!
//! ## Modules
//!
//! - [`search`]: prefix index, search engine, and reconciliation
//! - [`storage`]: durable OCR result cache and key-value backends
//! - [`processing`]: OCR extraction pipeline with deadlines and progress
//! - [`ocr`]: OCR engine trait and scripted test engine
//! - [`library`]: photo library trait and fixed test libraries
//! - [`metrics`]: rolling performance metrics
//! - [`config`]: tunable constants
//! - [`error`]: platform-facing error types
//!
//! ## Quick Start
//!
//! ```ignore
//! use photogrep_core::processing::ExtractionPipeline;
//! use photogrep_core::search::PhotoSearchEngine;
//! use photogrep_core::storage::RedbStore;
//! use std::sync::Arc;
//!
//! let store = RedbStore::open("photogrep.redb")?;
//! let engine = PhotoSearchEngine::try_load_or_new(store).await?;
//!
//! let pipeline = ExtractionPipeline::new(Arc::new(platform_ocr));
//! let report = engine.reconcile(&platform_library, &pipeline).await?;
//! println!("indexed {} photos", report.live);
//!
//! for id in engine.search("receipt") {
//!     println!("match: {}", id);
//! }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod metrics;
pub mod ocr;
pub mod processing;
pub mod search;
pub mod storage;
