//! Reconciliation between the photo library and the OCR result cache.
//!
//! A pass partitions the live library against the cached id set and
//! brings the engine back in step with it: cached photos are served from
//! storage, new photos flow through the extraction pipeline, and photos
//! that left the library have their records evicted. Per-image failures
//! are logged and retried on the next pass; only enumeration and cache
//! listing failures abort a pass.

use super::PhotoSearchEngine;
use crate::library::PhotoLibrary;
use crate::metrics::global_metrics;
use crate::processing::{ExtractError, ExtractionPipeline, ProgressTimer, SyncProgress};
use crate::search::types::{ImageId, OcrResult, SyncError, SyncReport};
use crate::storage::KeyValueStore;
use futures::stream::{self, StreamExt};
use instant::Instant;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, instrument, warn};

impl<S: KeyValueStore> PhotoSearchEngine<S> {
    /// Runs one reconciliation pass against the library.
    ///
    /// See [`reconcile_with_progress`](Self::reconcile_with_progress).
    pub async fn reconcile(
        &self,
        library: &dyn PhotoLibrary,
        pipeline: &ExtractionPipeline,
    ) -> Result<SyncReport, SyncError> {
        self.reconcile_with_progress(library, pipeline, |_| {}).await
    }

    /// Runs one reconciliation pass, reporting progress as images
    /// complete.
    ///
    /// The pass enumerates the library, then handles each live photo:
    /// photos with a cached result are hydrated from storage, the rest
    /// are extracted through `pipeline` with its concurrency bound, each
    /// result persisted before it is indexed. Cached results whose photo
    /// no longer exists are evicted; a pass that evicted anything emits
    /// one extra progress snapshot after the eviction step. Images whose
    /// cache record has become unreadable are re-extracted as if they
    /// were new.
    ///
    /// A photo whose extraction fails or times out stays uncached and is
    /// retried on the next pass; it never aborts the pass.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Library`] if the library cannot be enumerated. The
    ///   engine is left untouched: an enumeration failure must not be
    ///   mistaken for an empty library, which would evict everything.
    /// - [`SyncError::Storage`] if the cached id set cannot be listed.
    /// - [`SyncError::SyncInProgress`] if another pass is running. The
    ///   caller retries after the running pass finishes.
    #[instrument(skip_all)]
    pub async fn reconcile_with_progress<F>(
        &self,
        library: &dyn PhotoLibrary,
        pipeline: &ExtractionPipeline,
        on_progress: F,
    ) -> Result<SyncReport, SyncError>
    where
        F: Fn(SyncProgress),
    {
        let _gate = self
            .sync_gate
            .try_lock()
            .map_err(|_| SyncError::SyncInProgress)?;
        let timer = ProgressTimer::start();

        let live: HashSet<ImageId> = library
            .enumerate(self.page_size)
            .await?
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        let cached: HashSet<ImageId> = self.cache.list_ids().await?.into_iter().collect();

        let existing: Vec<ImageId> = live.intersection(&cached).cloned().collect();
        let fresh: Vec<ImageId> = live.difference(&cached).cloned().collect();
        let obsolete: Vec<ImageId> = cached.difference(&live).cloned().collect();

        info!(
            "Reconciling {} live photos: {} cached, {} new, {} obsolete",
            live.len(),
            existing.len(),
            fresh.len(),
            obsolete.len()
        );

        let total = existing.len() + fresh.len();
        let completed = AtomicUsize::new(0);
        let from_cache = AtomicUsize::new(0);
        let extracted = AtomicUsize::new(0);
        let no_text = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let evicted = AtomicUsize::new(0);
        let mut requeue: Vec<ImageId> = Vec::new();

        let completed = &completed;
        let from_cache = &from_cache;
        let extracted = &extracted;
        let no_text = &no_text;
        let failed = &failed;
        let evicted = &evicted;
        let timer = &timer;
        let on_progress = &on_progress;
        let emit = || {
            on_progress(SyncProgress::new(
                completed.load(Ordering::Relaxed),
                total,
                from_cache.load(Ordering::Relaxed),
                extracted.load(Ordering::Relaxed) + no_text.load(Ordering::Relaxed),
                failed.load(Ordering::Relaxed),
                evicted.load(Ordering::Relaxed),
                timer.elapsed().as_millis() as u64,
            ));
        };
        let emit = &emit;

        // Photos already cached: hydrate without running OCR.
        for id in &existing {
            let started = Instant::now();
            match self.cache.get(id).await {
                Ok(Some(result)) => {
                    self.insert_result(id, &result);
                    from_cache.fetch_add(1, Ordering::Relaxed);
                    completed.fetch_add(1, Ordering::Relaxed);
                    global_metrics().record_hydration(started.elapsed().as_millis() as u64);
                    emit();
                }
                Ok(None) => {
                    // Record is unreadable; treat the photo as new.
                    requeue.push(id.clone());
                }
                Err(e) => {
                    warn!("Failed to load cached result for {}: {}", id, e);
                    failed.fetch_add(1, Ordering::Relaxed);
                    completed.fetch_add(1, Ordering::Relaxed);
                    emit();
                }
            }
        }

        // Cached results whose photo left the library.
        for id in &obsolete {
            match self.cache.remove(id).await {
                Ok(()) => {
                    self.forget(id);
                    evicted.fetch_add(1, Ordering::Relaxed);
                    debug!("Evicted cached result for {}", id);
                }
                Err(e) => warn!("Failed to evict cached result for {}: {}", id, e),
            }
        }
        if evicted.load(Ordering::Relaxed) > 0 {
            emit();
        }

        // New photos and requeued unreadable records, extracted under
        // the pipeline's concurrency bound. Persist first, then index.
        let queue: Vec<ImageId> = fresh.into_iter().chain(requeue).collect();
        if !queue.is_empty() {
            debug!(
                "Extracting {} photos with concurrency {}",
                queue.len(),
                pipeline.concurrency()
            );
        }
        stream::iter(queue)
            .for_each_concurrent(pipeline.concurrency(), |id| async move {
                match pipeline.extract(&id).await {
                    Ok(result) => match self.cache.put(&id, &result).await {
                        Ok(()) => {
                            self.insert_result(&id, &result);
                            extracted.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            warn!("Failed to persist OCR result for {}: {}", id, e);
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    },
                    Err(ExtractError::NoText) => {
                        // Cache the empty result so the photo is never
                        // re-run through OCR.
                        let empty = OcrResult::empty();
                        match self.cache.put(&id, &empty).await {
                            Ok(()) => {
                                self.insert_result(&id, &empty);
                                no_text.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                warn!("Failed to persist empty result for {}: {}", id, e);
                                failed.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Extraction failed for {}: {} (will retry next pass)", id, e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                completed.fetch_add(1, Ordering::Relaxed);
                emit();
            })
            .await;

        self.ready.store(true, Ordering::SeqCst);

        let report = SyncReport {
            live: live.len(),
            from_cache: from_cache.load(Ordering::Relaxed),
            extracted: extracted.load(Ordering::Relaxed),
            no_text: no_text.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            evicted: evicted.load(Ordering::Relaxed),
            duration_ms: timer.elapsed().as_millis() as u64,
        };
        global_metrics().record_sync(&report);
        info!(
            "Reconciliation complete in {}ms: {} live, {} from cache, {} extracted, {} empty, {} failed, {} evicted",
            report.duration_ms,
            report.live,
            report.from_cache,
            report.extracted,
            report.no_text,
            report.failed,
            report.evicted
        );
        Ok(report)
    }
}
