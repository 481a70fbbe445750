//! Status command implementation.
//!
//! Reports what the cache and index hold without reading any sidecar or
//! photo.

use crate::config;
use crate::search::open_engine;
use anyhow::Result;
use photogrep_core::metrics::global_metrics;
use serde::Serialize;
use std::path::PathBuf;

/// Counters describing the current cache and index contents.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Where the cache database lives
    pub database_path: String,
    /// Images with a cached OCR result
    pub cached_images: usize,
    /// Cached images whose OCR recognized at least some text
    pub images_with_text: usize,
    /// Distinct words in the prefix index
    pub distinct_words: usize,
    /// Average per-image hydration time for this run, if measured
    pub hydration_avg_ms: Option<f64>,
}

/// Collects status counters by hydrating the engine from the cache.
pub async fn gather_status(data_dir: Option<&PathBuf>) -> Result<StatusReport> {
    let db_path = config::database_path(data_dir)?;
    let engine = open_engine(data_dir).await?;

    let ids = engine.cache().list_ids().await?;
    let mut images_with_text = 0;
    for id in &ids {
        if engine
            .ocr_text(id)
            .is_some_and(|result| result.has_text())
        {
            images_with_text += 1;
        }
    }

    Ok(StatusReport {
        database_path: db_path.display().to_string(),
        cached_images: ids.len(),
        images_with_text,
        distinct_words: engine.indexed_word_count(),
        hydration_avg_ms: global_metrics().snapshot().hydration_avg_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_counts_text_and_blank() {
        let photos = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();

        let sign = photos.path().join("sign.jpg");
        std::fs::write(&sign, b"jpegdata").unwrap();
        std::fs::write(
            format!("{}.ocr.json", sign.display()),
            r#"[{"text":"One Way"}]"#,
        )
        .unwrap();

        let blank = photos.path().join("blank.jpg");
        std::fs::write(&blank, b"jpegdata").unwrap();
        std::fs::write(format!("{}.ocr.json", blank.display()), "[]").unwrap();

        let data_dir = data.path().to_path_buf();
        crate::sync::run_sync(photos.path(), Some(&data_dir), None, None)
            .await
            .unwrap();

        let report = gather_status(Some(&data_dir)).await.unwrap();
        assert_eq!(report.cached_images, 2);
        assert_eq!(report.images_with_text, 1);
        assert_eq!(report.distinct_words, 2);
        assert!(report.database_path.ends_with("photogrep.redb"));
    }

    #[tokio::test]
    async fn test_status_missing_database() {
        let result = gather_status(Some(&PathBuf::from("/nonexistent/path"))).await;
        assert!(result.is_err());
    }
}
