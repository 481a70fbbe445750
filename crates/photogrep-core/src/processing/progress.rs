//! Progress reporting for reconciliation passes.

use instant::Instant;
use std::time::Duration;

/// Progress of an in-flight reconciliation pass.
///
/// Emitted through the progress callback each time an image finishes,
/// whether it was hydrated from the cache, freshly extracted, or failed.
/// `extracted` includes images where OCR ran and recognized nothing. A
/// pass that evicts obsolete records also emits once after the eviction
/// step, so cleanup work is visible even when no live image remains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncProgress {
    /// Images fully handled so far this pass.
    pub images_completed: usize,
    /// Images this pass will handle in total.
    pub images_total: usize,
    /// Images served from the cache without running OCR.
    pub from_cache: usize,
    /// Images run through OCR this pass.
    pub extracted: usize,
    /// Images whose extraction or persistence failed.
    pub failed: usize,
    /// Cached records evicted because their photo left the library.
    pub evicted: usize,
    /// Milliseconds elapsed since the pass started.
    pub elapsed_ms: u64,
}

impl SyncProgress {
    /// Creates a progress snapshot.
    pub fn new(
        images_completed: usize,
        images_total: usize,
        from_cache: usize,
        extracted: usize,
        failed: usize,
        evicted: usize,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            images_completed,
            images_total,
            from_cache,
            extracted,
            failed,
            evicted,
            elapsed_ms,
        }
    }

    /// Returns completion as a percentage in `[0, 100]`.
    pub fn percent_complete(&self) -> f64 {
        if self.images_total == 0 {
            return 100.0;
        }
        (self.images_completed as f64 / self.images_total as f64) * 100.0
    }

    /// Returns true once every image has been handled.
    pub fn is_complete(&self) -> bool {
        self.images_completed >= self.images_total
    }

    /// Estimates remaining time in milliseconds from the pace so far.
    ///
    /// Returns `None` before any image completes.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        if self.images_completed == 0 || self.elapsed_ms == 0 {
            return None;
        }
        let rate = self.images_completed as f64 / self.elapsed_ms as f64;
        let remaining = self.images_total.saturating_sub(self.images_completed);
        Some((remaining as f64 / rate) as u64)
    }

    /// Returns throughput in images per second.
    pub fn images_per_second(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        self.images_completed as f64 / (self.elapsed_ms as f64 / 1000.0)
    }
}

/// Wall-clock timer for one reconciliation pass.
///
/// Returns the raw [`Duration`]; callers convert to milliseconds where a
/// progress snapshot or report wants them.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTimer {
    started: Instant,
}

impl ProgressTimer {
    /// Starts timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Returns the time elapsed since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
