//! Flattened base image an editor session annotates

use std::sync::Arc;

use image::RgbaImage;

use crate::domain::Rect;

/// The stitched raster; replaced on crop, never mutated in place
#[derive(Clone, Debug)]
pub struct BaseImage {
    rgba: Arc<RgbaImage>,
}

impl BaseImage {
    pub fn new(rgba: RgbaImage) -> Self {
        log::debug!("BaseImage ready: {}x{} pixels", rgba.width(), rgba.height());
        Self {
            rgba: Arc::new(rgba),
        }
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Whole-image rectangle
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// New image holding only `rect`, with its origin moved to (0, 0)
    ///
    /// Returns `None` when `rect` does not overlap the image.
    pub fn cropped(&self, rect: Rect) -> Option<BaseImage> {
        let clipped = rect.intersect(self.rect())?;
        let dims = clipped.dimensions()?;
        let sub = image::imageops::crop_imm(
            self.rgba.as_ref(),
            clipped.left as u32,
            clipped.top as u32,
            dims.width(),
            dims.height(),
        )
        .to_image();
        Some(BaseImage::new(sub))
    }
}
