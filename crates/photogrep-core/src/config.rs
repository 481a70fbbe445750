//! Configuration constants for photogrep.
//!
//! Central location for all tunable parameters: extraction concurrency,
//! OCR deadlines, enumeration page sizes, and metrics windows.

// ============================================================================
// OCR Extraction
// ============================================================================

/// Maximum number of images extracted concurrently during a
/// reconciliation pass.
///
/// OCR calls are I/O- and compute-heavy; a small bound keeps memory flat
/// and avoids starving the platform OCR service.
pub const DEFAULT_OCR_CONCURRENCY: usize = 4;

/// Deadline for a single OCR call, in seconds.
///
/// An extraction that exceeds this is treated as failed for the current
/// pass and retried on the next one.
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Library Enumeration
// ============================================================================

/// Maximum number of photos requested from the library in one pass.
///
/// Recent-first providers return the newest photos within this limit.
pub const DEFAULT_ENUMERATION_PAGE: usize = 500;

// ============================================================================
// Metrics
// ============================================================================

/// Rolling window for extraction and hydration timing metrics, in seconds.
pub const DEFAULT_METRICS_WINDOW_SECS: u64 = 60;

/// Rolling window for search timing metrics, in seconds.
///
/// Longer than the extraction window because searches are sparse
/// user-initiated events.
pub const SEARCH_METRICS_WINDOW_SECS: u64 = 300;

/// Maximum samples retained per metric window.
pub const MAX_METRIC_SAMPLES: usize = 1000;

// ============================================================================
// Storage
// ============================================================================

/// Default filename for the on-disk OCR result database.
pub const DEFAULT_DB_FILENAME: &str = "photogrep.redb";
