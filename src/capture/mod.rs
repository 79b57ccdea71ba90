//! Turning the acquisition hand-off into a base image
//!
//! This module consolidates:
//! - Loading and decoding the `{screenshots, meta}` record (store.rs)
//! - Stitching tiles into one raster (stitch.rs)
//! - The base image type owned by an editor session (image.rs)

pub mod image;
pub mod stitch;
pub mod store;

use std::path::Path;

use crate::domain::CaptureMeta;
use crate::error::{EditorError, Result};

use self::image::BaseImage;

/// Load the record at `path` and stitch its tiles, keeping the page metadata
///
/// Decoding and stitching both run on the blocking pool.
pub async fn open_capture(path: &Path) -> Result<(BaseImage, CaptureMeta)> {
    let capture = store::load_capture(path).await?;
    tokio::task::spawn_blocking(move || {
        let base = stitch::stitch(&capture)?;
        Ok((base, capture.meta))
    })
    .await
    .map_err(|err| EditorError::Io(std::io::Error::other(err)))?
}
