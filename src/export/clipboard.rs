//! Copying exports to the system clipboard

use std::borrow::Cow;

use image::RgbaImage;

use crate::error::{EditorError, Result};

/// Put `image` on the system clipboard as an RGBA image payload
pub fn copy_image(image: &RgbaImage) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(EditorError::export)?;
    // arboard wants ImageData { width, height, bytes } in RGBA order
    let data = arboard::ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    };
    clipboard.set_image(data).map_err(EditorError::export)?;
    log::info!(
        "Copied {}x{} image to the clipboard",
        image.width(),
        image.height()
    );
    Ok(())
}
