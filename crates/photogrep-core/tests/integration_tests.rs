//! End-to-end integration tests over the durable redb store.
//!
//! These tests exercise the full workflow:
//! 1. Reconcile: enumerate → extract → persist → index
//! 2. Search while the process is alive
//! 3. Restart: reopen the database and hydrate the index from cache
//! 4. Reconcile again: cache hits, evictions, and empty-result handling

use photogrep_core::library::FixedLibrary;
use photogrep_core::ocr::StaticOcr;
use photogrep_core::processing::ExtractionPipeline;
use photogrep_core::search::{ImageId, OcrResult, PhotoSearchEngine};
use photogrep_core::storage::RedbStore;
use std::sync::Arc;
use tempfile::TempDir;

fn id(s: &str) -> ImageId {
    ImageId::new(s)
}

// ============================================================================
// Full Lifecycle
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_across_restarts() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("photogrep.redb");

    let ocr = Arc::new(
        StaticOcr::new()
            .with_text("a", "Red Car")
            .with_text("b", "Blue Sky")
            .with_result("c", OcrResult::empty()),
    );
    let pipeline = ExtractionPipeline::new(ocr.clone());

    // First session: extract two photos and search them.
    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();
        let library = FixedLibrary::with_ids(&["a", "b"]);

        let report = engine.reconcile(&library, &pipeline).await.unwrap();
        assert_eq!(report.extracted, 2);

        assert_eq!(engine.search("red"), [id("a")].into_iter().collect());
        assert_eq!(engine.search("BLUE").len(), 1);
        assert_eq!(engine.search("car").len(), 1);
        assert!(engine.search("green").is_empty());
    }

    // Second session: hydrate from disk, no OCR calls needed.
    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();

        assert_eq!(engine.tracked_image_count(), 2);
        assert_eq!(engine.search("blue"), [id("b")].into_iter().collect());
        assert_eq!(
            engine.ocr_text(&id("a")),
            Some(OcrResult::from_text("Red Car"))
        );
        assert_eq!(ocr.calls_for("a"), 1);
        assert_eq!(ocr.calls_for("b"), 1);

        // Library changed while we were away: photo a deleted, photo c
        // (with no recognizable text) added.
        let library = FixedLibrary::with_ids(&["b", "c"]);
        let report = engine.reconcile(&library, &pipeline).await.unwrap();

        assert_eq!(report.from_cache, 1);
        assert_eq!(report.no_text, 1);
        assert_eq!(report.evicted, 1);
        assert_eq!(ocr.calls_for("b"), 1);

        assert_eq!(engine.cache().get(&id("a")).await.unwrap(), None);
        assert_eq!(
            engine.cache().get(&id("c")).await.unwrap(),
            Some(OcrResult::empty())
        );
        assert_eq!(engine.search("blue").len(), 1);
    }

    // Third session: the cache holds exactly the surviving photos, and
    // the empty result still prevents re-extraction.
    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();

        let mut cached = engine.cache().list_ids().await.unwrap();
        cached.sort();
        assert_eq!(cached, vec![id("b"), id("c")]);

        let library = FixedLibrary::with_ids(&["b", "c"]);
        let report = engine.reconcile(&library, &pipeline).await.unwrap();
        assert_eq!(report.from_cache, 2);
        assert_eq!(ocr.calls_for("c"), 1);
    }
}

// ============================================================================
// Identifier Encoding on Disk
// ============================================================================

#[tokio::test]
async fn test_awkward_identifiers_survive_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("photogrep.redb");

    let raw_ids = [
        "CF1B2F7F-81D8-4954-8DEF-5CF348E7E0E6/L0/001",
        "album 1:photo%2",
        "фото/пляж 2024",
        "img:img:",
    ];

    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::new(store);
        for raw in raw_ids {
            engine
                .cache()
                .put(&id(raw), &OcrResult::from_text(raw))
                .await
                .unwrap();
        }
    }

    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();

        assert_eq!(engine.tracked_image_count(), raw_ids.len());
        for raw in raw_ids {
            assert_eq!(
                engine.cache().get(&id(raw)).await.unwrap(),
                Some(OcrResult::from_text(raw)),
                "id {:?}",
                raw
            );
        }

        let mut listed = engine.cache().list_ids().await.unwrap();
        listed.sort();
        let mut expected: Vec<ImageId> = raw_ids.iter().map(|r| id(r)).collect();
        expected.sort();
        assert_eq!(listed, expected);
    }
}

// ============================================================================
// Failure Recovery on Disk
// ============================================================================

#[tokio::test]
async fn test_failed_photo_retried_after_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("photogrep.redb");

    let ocr = Arc::new(
        StaticOcr::new()
            .with_failure(
                "flaky",
                photogrep_core::error::OcrError::Failed("camera roll busy".to_string()),
            )
            .with_text("stable", "farmers market"),
    );
    let pipeline = ExtractionPipeline::new(ocr.clone());

    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();
        let library = FixedLibrary::with_ids(&["flaky", "stable"]);

        let report = engine.reconcile(&library, &pipeline).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.extracted, 1);
    }

    // After a restart the failed photo is still uncached, so the next
    // pass picks it up; the successful one is served from disk.
    ocr.set_outcome("flaky", Ok(OcrResult::from_text("street sign")));
    {
        let store = RedbStore::open(&db_path).unwrap();
        let engine = PhotoSearchEngine::try_load_or_new(store).await.unwrap();
        let library = FixedLibrary::with_ids(&["flaky", "stable"]);

        let report = engine.reconcile(&library, &pipeline).await.unwrap();
        assert_eq!(report.extracted, 1);
        assert_eq!(report.from_cache, 1);
        assert_eq!(ocr.calls_for("stable"), 1);
        assert_eq!(engine.search("street").len(), 1);
    }
}
