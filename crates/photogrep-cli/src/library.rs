//! Filesystem-backed photo library.
//!
//! Walks a directory tree for image files and reports them most recent
//! first by modification time. Stands in for a platform photo collection
//! when photos live in an exported folder.

use async_trait::async_trait;
use photogrep_core::error::LibraryError;
use photogrep_core::library::{PhotoEntry, PhotoLibrary};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;
use walkdir::WalkDir;

/// File extensions treated as photos.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "heif", "tiff", "tif", "webp", "bmp", "gif",
];

/// Photo library over a directory tree.
///
/// Every file with an image extension counts as one photo. The root is
/// canonicalized before walking, so ids are absolute paths and stay
/// stable across syncs no matter how the directory was spelled on the
/// command line.
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    /// Creates a library over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl PhotoLibrary for FsLibrary {
    async fn enumerate(&self, limit: usize) -> Result<Vec<PhotoEntry>, LibraryError> {
        let root = self.root.canonicalize().map_err(|e| {
            LibraryError::Unavailable(format!("Cannot access {}: {}", self.root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(LibraryError::Unavailable(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = entry.map_err(|e| {
                LibraryError::Unavailable(format!("Failed to walk {}: {}", root.display(), e))
            })?;
            if !entry.file_type().is_file() || !Self::is_image(entry.path()) {
                continue;
            }

            let mtime = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64);

            let id = entry.path().to_string_lossy().into_owned();
            entries.push(match mtime {
                Some(ts) => PhotoEntry::with_taken_at(id, ts),
                None => PhotoEntry::new(id),
            });
        }

        // Most recent first; files without a readable mtime sort last.
        entries.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        entries.truncate(limit);
        debug!(
            "Enumerated {} photos under {}",
            entries.len(),
            root.display()
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, mtime_secs: u64) {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_enumerates_only_images() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg", 1_000);
        touch(dir.path(), "b.PNG", 1_000);
        touch(dir.path(), "notes.txt", 1_000);
        touch(dir.path(), "a.jpg.ocr.json", 1_000);

        let library = FsLibrary::new(dir.path());
        assert_eq!(library.enumerate(100).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_most_recent_first() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.jpg", 1_000);
        touch(dir.path(), "new.jpg", 2_000);
        touch(dir.path(), "mid.jpg", 1_500);

        let library = FsLibrary::new(dir.path());
        let entries = library.enumerate(100).await.unwrap();
        assert!(entries[0].id.as_str().ends_with("new.jpg"));
        assert!(entries[1].id.as_str().ends_with("mid.jpg"));
        assert!(entries[2].id.as_str().ends_with("old.jpg"));
    }

    #[tokio::test]
    async fn test_limit_keeps_newest() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.jpg", 1_000);
        touch(dir.path(), "new.jpg", 2_000);

        let library = FsLibrary::new(dir.path());
        let entries = library.enumerate(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.as_str().ends_with("new.jpg"));
    }

    #[tokio::test]
    async fn test_walks_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("trip")).unwrap();
        touch(&dir.path().join("trip"), "d.jpeg", 1_000);

        let library = FsLibrary::new(dir.path());
        assert_eq!(library.enumerate(100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_errors() {
        let library = FsLibrary::new("/nonexistent/photogrep-library");
        let err = library.enumerate(100).await.unwrap_err();
        assert!(matches!(err, LibraryError::Unavailable(_)));
    }
}
