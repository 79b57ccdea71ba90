//! Stacking captured tiles into the base image

use image::RgbaImage;

use crate::capture::image::BaseImage;
use crate::domain::PageCapture;
use crate::error::{EditorError, Result};

/// Overlay every tile at `y = index * viewportHeight` on a page-sized canvas
///
/// Tiles that reach past the page bottom are clipped by the canvas.
pub fn stitch(capture: &PageCapture) -> Result<BaseImage> {
    let (width, height) = capture.meta.canvas_size();
    if width == 0 || height == 0 {
        return Err(EditorError::AcquisitionUnavailable(format!(
            "capture has an empty page size ({width}x{height})"
        )));
    }

    let mut image = RgbaImage::new(width, height);
    for (index, tile) in capture.tiles.iter().enumerate() {
        let y = capture.meta.tile_offset(index);
        log::debug!(
            "Stitching tile {} ({}x{}) at y={}",
            index,
            tile.width(),
            tile.height(),
            y
        );
        image::imageops::overlay(&mut image, tile, 0, y);
    }
    Ok(BaseImage::new(image))
}
