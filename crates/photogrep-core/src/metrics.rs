//! Performance metrics for extraction, hydration, and search.
//!
//! Collects timing samples into rolling windows and exposes aggregate
//! snapshots for status displays. Recording is cheap and never fails:
//! a poisoned lock silently drops the sample rather than disturbing the
//! operation being measured.
//!
//! # Usage
//!
//! ```ignore
//! use photogrep_core::metrics::global_metrics;
//!
//! global_metrics().record_search(elapsed_ms);
//!
//! let snapshot = global_metrics().snapshot();
//! if let Some(avg) = snapshot.search_avg_ms {
//!     println!("search avg: {:.1}ms over {} queries", avg, snapshot.search_count);
//! }
//! ```

use crate::config::{DEFAULT_METRICS_WINDOW_SECS, MAX_METRIC_SAMPLES, SEARCH_METRICS_WINDOW_SECS};
use crate::search::types::{get_current_timestamp, SyncReport};
use instant::Instant;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::RwLock;
use std::time::Duration;

/// A single timing sample.
#[derive(Debug, Clone, Copy)]
struct TimingSample {
    timestamp: Instant,
    duration_ms: u64,
}

/// Rolling window of timing samples for one operation type.
#[derive(Debug)]
struct MetricData {
    samples: VecDeque<TimingSample>,
    window: Duration,
}

impl MetricData {
    fn new(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
        }
    }

    fn record(&mut self, duration_ms: u64) {
        self.samples.push_back(TimingSample {
            timestamp: Instant::now(),
            duration_ms,
        });
        if self.samples.len() > MAX_METRIC_SAMPLES {
            self.samples.pop_front();
        }
        self.prune(Instant::now());
    }

    fn prune(&mut self, now: Instant) {
        // checked_sub avoids underflow when the process is younger than
        // the window.
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        while let Some(front) = self.samples.front() {
            if front.timestamp < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn rolling_avg(&mut self) -> Option<f64> {
        self.prune(Instant::now());
        if self.samples.is_empty() {
            return None;
        }
        let total: u64 = self.samples.iter().map(|s| s.duration_ms).sum();
        Some(total as f64 / self.samples.len() as f64)
    }

    fn rolling_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.samples.len()
    }

    fn throughput_per_sec(&mut self) -> f64 {
        self.prune(Instant::now());
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.len() as f64 / self.window.as_secs_f64()
    }
}

/// Point-in-time aggregate of all metric windows.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Average OCR extraction time over the window, if any ran.
    pub extraction_avg_ms: Option<f64>,
    /// Extractions within the window.
    pub extraction_count: usize,
    /// Extraction throughput in images per second over the window.
    pub extraction_per_sec: f64,
    /// Average cache hydration time over the window, if any ran.
    pub hydration_avg_ms: Option<f64>,
    /// Hydrations within the window.
    pub hydration_count: usize,
    /// Average search time over the window, if any ran.
    pub search_avg_ms: Option<f64>,
    /// Searches within the window.
    pub search_count: usize,
    /// Report from the most recent completed reconciliation pass.
    pub last_sync: Option<SyncReport>,
    /// Wall-clock completion time of that pass, ms since Unix epoch.
    pub last_sync_at_ms: Option<u64>,
}

struct MetricsInner {
    extraction: MetricData,
    hydration: MetricData,
    search: MetricData,
    last_sync: Option<(SyncReport, u64)>,
}

/// Thread-safe metrics collector.
pub struct Metrics {
    inner: RwLock<MetricsInner>,
}

impl Metrics {
    /// Creates a collector with the default windows.
    pub fn new() -> Self {
        Self::with_windows(
            Duration::from_secs(DEFAULT_METRICS_WINDOW_SECS),
            Duration::from_secs(SEARCH_METRICS_WINDOW_SECS),
        )
    }

    /// Creates a collector with explicit windows, for tests.
    pub fn with_windows(pipeline_window: Duration, search_window: Duration) -> Self {
        Self {
            inner: RwLock::new(MetricsInner {
                extraction: MetricData::new(pipeline_window),
                hydration: MetricData::new(pipeline_window),
                search: MetricData::new(search_window),
                last_sync: None,
            }),
        }
    }

    /// Records one OCR extraction duration.
    pub fn record_extraction(&self, duration_ms: u64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.extraction.record(duration_ms);
        }
    }

    /// Records one cache hydration duration.
    pub fn record_hydration(&self, duration_ms: u64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.hydration.record(duration_ms);
        }
    }

    /// Records one search duration.
    pub fn record_search(&self, duration_ms: u64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.search.record(duration_ms);
        }
    }

    /// Records the report of a completed reconciliation pass.
    pub fn record_sync(&self, report: &SyncReport) {
        if let Ok(mut inner) = self.inner.write() {
            inner.last_sync = Some((report.clone(), get_current_timestamp()));
        }
    }

    /// Returns a snapshot of all current aggregates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        match self.inner.write() {
            Ok(mut inner) => MetricsSnapshot {
                extraction_avg_ms: inner.extraction.rolling_avg(),
                extraction_count: inner.extraction.rolling_count(),
                extraction_per_sec: inner.extraction.throughput_per_sec(),
                hydration_avg_ms: inner.hydration.rolling_avg(),
                hydration_count: inner.hydration.rolling_count(),
                search_avg_ms: inner.search.rolling_avg(),
                search_count: inner.search.rolling_count(),
                last_sync: inner.last_sync.as_ref().map(|(r, _)| r.clone()),
                last_sync_at_ms: inner.last_sync.as_ref().map(|(_, at)| *at),
            },
            Err(_) => MetricsSnapshot::default(),
        }
    }

    /// Discards all samples and the last sync report.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.extraction.samples.clear();
            inner.hydration.samples.clear();
            inner.search.samples.clear();
            inner.last_sync = None;
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Returns the process-wide metrics collector.
pub fn global_metrics() -> &'static Metrics {
    &GLOBAL_METRICS
}

/// Times an expression and records it under the given method.
///
/// ```ignore
/// let results = time_operation!(global_metrics(), record_search, {
///     engine.search(&term)
/// });
/// ```
#[macro_export]
macro_rules! time_operation {
    ($metrics:expr, $method:ident, $body:expr) => {{
        let __start = instant::Instant::now();
        let __result = $body;
        let __elapsed_ms = __start.elapsed().as_millis() as u64;
        $metrics.$method(__elapsed_ms);
        __result
    }};
}
