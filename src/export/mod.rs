//! Export module
//!
//! This module contains:
//! - PNG encoding and saving
//! - PDF documents in single-page and paged layouts
//! - Copying to the system clipboard
//!
//! Every export works on an already flattened raster, so none of them can
//! touch the session that produced it.

pub mod clipboard;
pub mod pdf;
pub mod png;

use std::path::{Path, PathBuf};

use crate::config::SaveLocation;

/// File stem for exports; sorts chronologically
pub const FILE_NAME_FORMAT: &str = "Screenshot_%Y-%m-%d_%H-%M-%S";

/// Timestamped file name with the given extension
pub fn timestamped_name(extension: &str) -> String {
    format!(
        "{}.{}",
        chrono::Local::now().format(FILE_NAME_FORMAT),
        extension
    )
}

/// Platform directory for a save location
pub fn save_dir(location: SaveLocation) -> Option<PathBuf> {
    match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }
}

/// Where to write an export: `dir` when given, else the configured location
pub fn output_path(dir: Option<&Path>, location: SaveLocation, extension: &str) -> Option<PathBuf> {
    let mut path = match dir {
        Some(dir) => dir.to_path_buf(),
        None => save_dir(location)?,
    };
    path.push(timestamped_name(extension));
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_name_shape() {
        let name = timestamped_name("png");
        assert!(name.starts_with("Screenshot_"));
        assert!(name.ends_with(".png"));
        // Screenshot_YYYY-mm-dd_HH-MM-SS.png
        assert_eq!(name.len(), "Screenshot_2024-01-01_00-00-00.png".len());
    }

    #[test]
    fn test_explicit_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(Some(dir.path()), SaveLocation::Pictures, "pdf").unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
    }
}
