//! Loading the `{screenshots, meta}` record left behind by the capture step

use std::path::{Path, PathBuf};

use base64::Engine;
use image::error::{DecodingError, ImageFormatHint};
use image::{ImageError, RgbaImage};
use serde::Deserialize;

use crate::domain::{CaptureKind, CaptureMeta, PageCapture};
use crate::error::{EditorError, Result};

const DATA_URL_MARKER: &str = ";base64,";

/// Session storage record, as written by the acquisition step
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub meta: Option<CaptureMeta>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub capture_type: Option<CaptureKind>,
}

/// Read and decode the record at `path`
///
/// Tile paths are resolved against the record's directory.
pub async fn load_capture(path: &Path) -> Result<PageCapture> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(EditorError::AcquisitionUnavailable(format!(
                "no capture stored at {}",
                path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };
    let record: CaptureRecord = serde_json::from_str(&text)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    decode_record(record, base_dir).await
}

/// Decode every tile of `record` off the event loop, preserving their order
pub async fn decode_record(record: CaptureRecord, base_dir: PathBuf) -> Result<PageCapture> {
    let Some(meta) = record.meta else {
        return Err(EditorError::AcquisitionUnavailable(
            "capture record has no page metadata".to_string(),
        ));
    };
    if record.screenshots.is_empty() {
        return Err(EditorError::AcquisitionUnavailable(
            "capture record has no screenshots".to_string(),
        ));
    }
    if meta.is_restricted() {
        return Err(EditorError::AcquisitionUnavailable(format!(
            "{} cannot be captured",
            meta.url.as_deref().unwrap_or_default()
        )));
    }

    log::info!(
        "Decoding {} tile(s) for {}",
        record.screenshots.len(),
        meta.url.as_deref().unwrap_or("<unknown page>")
    );

    let decodes = record
        .screenshots
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            let base_dir = base_dir.clone();
            async move {
                match tokio::task::spawn_blocking(move || decode_tile(index, &source, &base_dir))
                    .await
                {
                    Ok(result) => result,
                    Err(err) => Err(EditorError::Decode {
                        index,
                        source: ImageError::IoError(std::io::Error::other(err)),
                    }),
                }
            }
        });
    let tiles = futures::future::try_join_all(decodes).await?;

    Ok(PageCapture::new(tiles, meta, record.capture_type))
}

/// Decode one tile given as a data URL or a file path
pub fn decode_tile(index: usize, source: &str, base_dir: &Path) -> Result<RgbaImage> {
    let decode_err = |source: ImageError| EditorError::Decode { index, source };

    let bytes = if source.starts_with("data:") {
        let (_, payload) = source.split_once(DATA_URL_MARKER).ok_or_else(|| {
            decode_err(ImageError::Decoding(DecodingError::new(
                ImageFormatHint::Unknown,
                "data URL is not base64 encoded",
            )))
        })?;
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| {
                decode_err(ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Unknown,
                    err,
                )))
            })?
    } else {
        std::fs::read(base_dir.join(source)).map_err(|err| decode_err(ImageError::IoError(err)))?
    };

    let image = image::load_from_memory(&bytes).map_err(decode_err)?;
    log::debug!("Decoded tile {}: {}x{}", index, image.width(), image.height());
    Ok(image.to_rgba8())
}
