//! PNG encoding of flattened exports

use std::io;
use std::path::Path;

use image::RgbaImage;

use crate::error::{EditorError, Result};

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> std::result::Result<(), ::png::EncodingError> {
    let mut encoder = ::png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(::png::ColorType::Rgba);
    encoder.set_depth(::png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode `image` into an in-memory PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, image).map_err(EditorError::export)?;
    Ok(buffer)
}

/// Write `image` to `path` as PNG, creating the parent directory if needed
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_png(io::BufWriter::new(file), image).map_err(EditorError::export)?;
    log::info!(
        "Saved {}x{} PNG to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
