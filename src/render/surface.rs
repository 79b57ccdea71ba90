//! Drawing targets for the render pipeline
//!
//! The same pipeline draws onto both surfaces. They differ only in whether
//! editing aids (blur outlines, previews, crop shading) belong on them.

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

use crate::capture::image::BaseImage;
use crate::error::{EditorError, Result};

/// Something the render pipeline can draw onto
pub trait Surface {
    fn pixmap_mut(&mut self) -> &mut Pixmap;

    /// Whether editing aids should be drawn
    fn shows_editing_aids(&self) -> bool;
}

/// Live on-screen canvas; zoom is applied by whoever displays it
pub struct DisplaySurface {
    pixmap: Pixmap,
}

impl DisplaySurface {
    pub fn for_image(base: &BaseImage) -> Option<Self> {
        Pixmap::new(base.width(), base.height()).map(|pixmap| Self { pixmap })
    }

    pub fn to_rgba(&self) -> RgbaImage {
        pixmap_to_rgba(&self.pixmap)
    }
}

impl Surface for DisplaySurface {
    fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    fn shows_editing_aids(&self) -> bool {
        true
    }
}

/// Off-screen surface sized exactly to the base image at 1:1 scale
pub struct ExportSurface {
    pixmap: Pixmap,
}

impl ExportSurface {
    pub fn for_image(base: &BaseImage) -> Result<Self> {
        let pixmap = Pixmap::new(base.width(), base.height()).ok_or_else(|| {
            EditorError::Export(format!(
                "cannot allocate a {}x{} export surface",
                base.width(),
                base.height()
            ))
        })?;
        Ok(Self { pixmap })
    }

    pub fn into_rgba(self) -> RgbaImage {
        pixmap_to_rgba(&self.pixmap)
    }
}

impl Surface for ExportSurface {
    fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    fn shows_editing_aids(&self) -> bool {
        false
    }
}

/// Replace the pixels under `img` placed at `(x, y)`, clipped to the pixmap
pub fn copy_rgba_into(pixmap: &mut Pixmap, img: &RgbaImage, x: i32, y: i32) {
    let (pw, ph) = (pixmap.width() as i64, pixmap.height() as i64);
    let pixels = pixmap.pixels_mut();

    for (ix, iy, px) in img.enumerate_pixels() {
        let tx = i64::from(x) + i64::from(ix);
        let ty = i64::from(y) + i64::from(iy);
        if tx < 0 || ty < 0 || tx >= pw || ty >= ph {
            continue;
        }
        let [r, g, b, a] = px.0;
        pixels[(ty * pw + tx) as usize] = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
}

/// Un-premultiply a pixmap into a straight-alpha image
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_is_clipped_and_round_trips() {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        let img = RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 255]));
        copy_rgba_into(&mut pixmap, &img, 2, -1);

        let out = pixmap_to_rgba(&pixmap);
        assert_eq!(out.get_pixel(2, 0).0, [10, 20, 30, 255]);
        assert_eq!(out.get_pixel(3, 1).0, [10, 20, 30, 255]);
        assert_eq!(out.get_pixel(3, 2).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_only_display_shows_aids() {
        let base = BaseImage::new(RgbaImage::new(2, 2));
        assert!(DisplaySurface::for_image(&base).unwrap().shows_editing_aids());
        assert!(!ExportSurface::for_image(&base).unwrap().shows_editing_aids());
    }
}
