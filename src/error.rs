//! Error taxonomy for loading, decoding and exporting

use thiserror::Error;

/// Errors surfaced to the user; none of them leave the session half-updated
#[derive(Debug, Error)]
pub enum EditorError {
    /// The page could not be captured or no capture is available
    #[error("capture unavailable: {0}")]
    AcquisitionUnavailable(String),

    /// A tile could not be decoded, the editor does not open
    #[error("failed to decode tile {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    /// Encoding or writing an export failed, the session is untouched
    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid capture record: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn export(err: impl std::fmt::Display) -> Self {
        EditorError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
