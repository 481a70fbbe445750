//! Search command implementation.
//!
//! Answers queries from the cache alone: hydrates the engine from the
//! database, walks the prefix index, and attaches each hit's recognized
//! text.

use crate::config;
use anyhow::{anyhow, Context, Result};
use photogrep_core::search::{ImageId, PhotoSearchEngine};
use photogrep_core::storage::RedbStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// One search hit: an image plus the text recognized inside it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Image id (the file path recorded at sync time)
    pub id: String,
    /// Full recognized text, fragments joined with newlines
    pub text: String,
}

/// Opens the existing cache and hydrates the engine from it.
///
/// # Errors
///
/// Fails if no database exists yet; `pg sync` creates one.
pub async fn open_engine(data_dir: Option<&PathBuf>) -> Result<PhotoSearchEngine<RedbStore>> {
    let db_path = config::database_path(data_dir)?;
    if !db_path.exists() {
        return Err(anyhow!(
            "No OCR cache found at {}.\nRun `pg sync <library-dir>` first.",
            db_path.display()
        ));
    }

    info!("Opening database: {}", db_path.display());
    let store = RedbStore::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let engine = PhotoSearchEngine::try_load_or_new(store)
        .await
        .context("Failed to load search engine")?;
    info!("Hydrated {} images from cache", engine.tracked_image_count());
    Ok(engine)
}

/// Performs a prefix search against the cache.
///
/// # Arguments
///
/// * `term` - The prefix to search for
/// * `limit` - Maximum number of hits to return
/// * `data_dir` - Optional custom data directory
///
/// # Returns
///
/// Hits sorted by id for stable output; the engine itself returns an
/// unordered set.
pub async fn execute_search(
    term: &str,
    limit: usize,
    data_dir: Option<&PathBuf>,
) -> Result<Vec<SearchHit>> {
    let engine = open_engine(data_dir).await?;
    if engine.tracked_image_count() == 0 {
        return Err(anyhow!(
            "Cache is empty. Run `pg sync <library-dir>` first."
        ));
    }

    let mut ids: Vec<ImageId> = engine.search(term).into_iter().collect();
    info!("Found {} photos for \"{}\"", ids.len(), term);
    ids.sort();
    ids.truncate(limit);

    Ok(ids
        .into_iter()
        .map(|id| {
            let text = engine
                .ocr_text(&id)
                .map(|result| result.joined_text())
                .unwrap_or_default();
            SearchHit {
                id: id.to_string(),
                text,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_search_missing_database() {
        let result = execute_search("car", 10, Some(&PathBuf::from("/nonexistent/path"))).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("No OCR cache found"));
    }

    #[tokio::test]
    async fn test_search_after_sync() {
        let photos = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let path = photos.path().join("sign.jpg");
        std::fs::write(&path, b"jpegdata").unwrap();
        std::fs::write(
            format!("{}.ocr.json", path.display()),
            r#"[{"text":"Harbor View Cafe"}]"#,
        )
        .unwrap();

        let data_dir = data.path().to_path_buf();
        crate::sync::run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();

        let hits = execute_search("harb", 10, Some(&data_dir)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].id.ends_with("sign.jpg"));
        assert_eq!(hits[0].text, "Harbor View Cafe");

        // Case-insensitive and respects the limit.
        assert_eq!(
            execute_search("HARBOR", 10, Some(&data_dir)).await.unwrap().len(),
            1
        );
        assert!(execute_search("zzz", 10, Some(&data_dir))
            .await
            .unwrap()
            .is_empty());
    }
}
