//! Output of the acquisition step, as handed to the editor

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// URL prefixes the browser never lets an extension capture
const RESTRICTED_PREFIXES: [&str; 5] = [
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "view-source:",
];

/// Page metadata recorded alongside the tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMeta {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub total_height: Option<u32>,
    /// Older records name the page height `height`
    #[serde(default)]
    pub height: Option<u32>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f32,
    #[serde(default)]
    pub scroll_x: f32,
    #[serde(default)]
    pub scroll_y: f32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_device_pixel_ratio() -> f32 {
    1.0
}

impl CaptureMeta {
    /// Metadata for a single visible-area capture
    pub fn visible(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            width: None,
            total_height: None,
            height: None,
            viewport_width,
            viewport_height,
            device_pixel_ratio: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            url: None,
            title: None,
        }
    }

    /// Page width in CSS pixels, the viewport width when absent
    pub fn page_width(&self) -> u32 {
        self.width.unwrap_or(self.viewport_width)
    }

    /// Page height in CSS pixels: `totalHeight`, then `height`, then the viewport height
    pub fn page_height(&self) -> u32 {
        self.total_height
            .or(self.height)
            .unwrap_or(self.viewport_height)
    }

    /// Device pixel ratio, with nonsense values treated as 1
    pub fn scale(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Size of the stitched image in device pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        let scale = self.scale();
        (
            (self.page_width() as f32 * scale).round() as u32,
            (self.page_height() as f32 * scale).round() as u32,
        )
    }

    /// Vertical position of tile `index` in the stitched image, in device pixels
    pub fn tile_offset(&self, index: usize) -> i64 {
        (index as f64 * f64::from(self.viewport_height) * f64::from(self.scale())).round() as i64
    }

    /// Whether the recorded URL is one the browser refuses to capture
    pub fn is_restricted(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|url| RESTRICTED_PREFIXES.iter().any(|p| url.starts_with(p)))
    }
}

/// How the page was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    FullPage,
    Visible,
}

/// Decoded tiles plus metadata, immutable once received
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub tiles: Vec<RgbaImage>,
    pub meta: CaptureMeta,
    pub kind: CaptureKind,
}

impl PageCapture {
    pub fn new(tiles: Vec<RgbaImage>, meta: CaptureMeta, kind: Option<CaptureKind>) -> Self {
        let kind = kind.unwrap_or(if tiles.len() > 1 {
            CaptureKind::FullPage
        } else {
            CaptureKind::Visible
        });
        Self { tiles, meta, kind }
    }
}
