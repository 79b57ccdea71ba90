//! Blur redaction sampled from the base image

use image::RgbaImage;

use crate::domain::Rect;

/// Blur the part of `base` under `region`
///
/// The blur samples a margin of real neighbouring pixels so the region edges
/// do not fade towards transparency. Returns the clipped region and its
/// blurred pixels, or `None` when the region misses the image.
pub fn blurred_region(base: &RgbaImage, region: Rect, sigma: f32) -> Option<(Rect, RgbaImage)> {
    let bounds = Rect::from_size(base.width(), base.height());
    let clipped = region.intersect(bounds)?;
    let dims = clipped.dimensions()?;

    let margin = (sigma * 3.0).ceil().max(0.0) as i32;
    let sample = clipped.inflate(margin).intersect(bounds)?;
    let sample_dims = sample.dimensions()?;

    let source = image::imageops::crop_imm(
        base,
        sample.left as u32,
        sample.top as u32,
        sample_dims.width(),
        sample_dims.height(),
    )
    .to_image();
    let blurred = image::imageops::blur(&source, sigma);

    let inner = image::imageops::crop_imm(
        &blurred,
        (clipped.left - sample.left) as u32,
        (clipped.top - sample.top) as u32,
        dims.width(),
        dims.height(),
    )
    .to_image();
    Some((clipped, inner))
}
