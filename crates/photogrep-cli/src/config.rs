//! Configuration and path resolution for the CLI.
//!
//! Handles finding the data directory across environments:
//! - Custom: `--data-dir` flag or `$PHOTOGREP_DATA_DIR`
//! - Default: platform standard location via `directories`

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use photogrep_core::config::DEFAULT_DB_FILENAME;
use std::path::PathBuf;

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "PHOTOGREP_DATA_DIR";

/// Returns the data directory holding the OCR cache.
///
/// Resolution order:
/// 1. `--data-dir` flag
/// 2. `$PHOTOGREP_DATA_DIR` environment variable
/// 3. Platform standard location:
///    - macOS: `~/Library/Application Support/dev.photogrep.Photogrep/`
///    - Linux: `~/.local/share/photogrep/`
///    - Windows: `%APPDATA%\photogrep\Photogrep\data\`
pub fn get_data_dir(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return Ok(dir.clone());
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    ProjectDirs::from("dev", "photogrep", "Photogrep")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

/// Returns the path to the cache database file.
///
/// The path may not exist yet; `sync` creates the directory and file,
/// `search` and `status` refuse to run without them.
pub fn database_path(custom_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let data_dir = get_data_dir(custom_dir)?;
    Ok(data_dir.join(DEFAULT_DB_FILENAME))
}
