//! Sync command implementation.
//!
//! Reconciles a photo directory against the OCR cache: new photos get
//! their sidecars read and cached, deleted photos are evicted, and
//! everything else hydrates from the cache without touching a sidecar.

use crate::config;
use crate::library::FsLibrary;
use crate::ocr::SidecarOcr;
use anyhow::{Context, Result};
use photogrep_core::processing::ExtractionPipeline;
use photogrep_core::search::{PhotoSearchEngine, SyncReport};
use photogrep_core::storage::RedbStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs one reconciliation pass over `library_dir`.
///
/// Opens (or creates) the cache database, hydrates the engine from it,
/// then diffs the directory contents against the cache.
///
/// # Arguments
///
/// * `library_dir` - Directory holding images and their sidecars
/// * `data_dir` - Optional custom data directory
/// * `concurrency` - Extraction concurrency override
/// * `timeout_secs` - Per-image OCR deadline override, in seconds
pub async fn run_sync(
    library_dir: &Path,
    data_dir: Option<&PathBuf>,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<SyncReport> {
    let db_path = config::database_path(data_dir)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    info!("Opening database: {}", db_path.display());
    let store = RedbStore::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let engine = PhotoSearchEngine::try_load_or_new(store)
        .await
        .context("Failed to load search engine")?;
    info!("Hydrated {} images from cache", engine.tracked_image_count());

    let mut pipeline = ExtractionPipeline::new(Arc::new(SidecarOcr::new()));
    if let Some(width) = concurrency {
        pipeline = pipeline.with_concurrency(width);
    }
    if let Some(secs) = timeout_secs {
        pipeline = pipeline.with_timeout(Duration::from_secs(secs));
    }

    let library = FsLibrary::new(library_dir);
    let report = engine
        .reconcile_with_progress(&library, &pipeline, |progress| {
            eprint!(
                "\rSyncing {}/{} ({:.0}%)",
                progress.images_completed,
                progress.images_total,
                progress.percent_complete()
            );
        })
        .await
        .context("Sync failed")?;
    eprintln!();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_photo(dir: &Path, name: &str, sidecar: Option<&str>) {
        let path = dir.join(name);
        std::fs::write(&path, b"jpegdata").unwrap();
        if let Some(contents) = sidecar {
            std::fs::write(format!("{}.ocr.json", path.display()), contents).unwrap();
        }
    }

    #[tokio::test]
    async fn test_sync_extracts_and_reports() {
        let photos = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        add_photo(photos.path(), "car.jpg", Some(r#"[{"text":"Red Car"}]"#));
        add_photo(photos.path(), "blank.jpg", Some("[]"));
        add_photo(photos.path(), "pending.jpg", None);

        let report = run_sync(photos.path(), Some(&data.path().to_path_buf()), None, None)
            .await
            .unwrap();

        assert_eq!(report.live, 3);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.no_text, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.evicted, 0);
    }

    #[tokio::test]
    async fn test_second_sync_uses_cache() {
        let photos = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        add_photo(photos.path(), "car.jpg", Some(r#"[{"text":"Red Car"}]"#));

        let data_dir = data.path().to_path_buf();
        let first = run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();
        assert_eq!(first.extracted, 1);

        // Remove the sidecar; the cached result carries the second pass.
        std::fs::remove_file(photos.path().join("car.jpg.ocr.json")).unwrap();
        let second = run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();
        assert_eq!(second.from_cache, 1);
        assert_eq!(second.ocr_runs(), 0);
    }

    #[tokio::test]
    async fn test_sync_evicts_deleted_photos() {
        let photos = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        add_photo(photos.path(), "keep.jpg", Some(r#"[{"text":"lighthouse"}]"#));
        add_photo(photos.path(), "gone.jpg", Some(r#"[{"text":"ferry"}]"#));

        let data_dir = data.path().to_path_buf();
        run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();

        std::fs::remove_file(photos.path().join("gone.jpg")).unwrap();
        let second = run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();
        assert_eq!(second.live, 1);
        assert_eq!(second.evicted, 1);
    }
}
