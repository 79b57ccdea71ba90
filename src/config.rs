//! Editor configuration and shared color type

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Tool;
use crate::domain::metrics::text;

/// Serializable color representation, channels in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self {
            r: 0.9,
            g: 0.1,
            b: 0.1,
        }
    }
}

impl ShapeColor {
    pub const WHITE: ShapeColor = ShapeColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a color from 8-bit channels
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }
}

impl FromStr for ShapeColor {
    type Err = String;

    /// Parse `#rrggbb` or `rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got {s:?}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad color {s:?}: {e}"))
        };
        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba_u8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Where exported files go when no output directory is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// How the flattened image is laid out in a PDF export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfLayout {
    /// Whole image scaled down onto a single page
    Single,
    /// Image scaled to page width and split over as many pages as needed
    #[default]
    Paged,
}

impl FromStr for PdfLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(PdfLayout::Single),
            "paged" => Ok(PdfLayout::Paged),
            other => Err(format!("unknown pdf layout {other:?} (expected single or paged)")),
        }
    }
}

/// Editor configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tool selected when the editor opens
    pub initial_tool: Tool,
    /// Color for new annotations
    pub shape_color: ShapeColor,
    /// Stroke width for new annotations, in BaseImage pixels
    pub stroke_width: f32,
    /// Font size used by the text prompt when none is given
    pub font_size: f32,
    /// Gaussian sigma for blur regions
    pub blur_sigma: f32,
    /// Opacity of the white backing behind text (0.0-1.0)
    pub text_backing_opacity: f32,
    /// System font family for text and step labels
    pub font_family: Option<String>,
    /// Explicit font file, takes precedence over `font_family`
    pub font_path: Option<PathBuf>,
    /// Where to save exports
    pub save_location: SaveLocation,
    /// Also copy to clipboard when saving a PNG
    pub copy_to_clipboard_on_save: bool,
    /// PDF page size in points (width, height)
    pub pdf_page_size: (f32, f32),
    pub pdf_layout: PdfLayout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_tool: Tool::Arrow,
            shape_color: ShapeColor::default(),
            stroke_width: 3.0,
            font_size: 20.0,
            blur_sigma: 6.0,
            text_backing_opacity: 0.75,
            font_family: None,
            font_path: None,
            save_location: SaveLocation::Pictures,
            copy_to_clipboard_on_save: false,
            // A4
            pdf_page_size: (595.28, 841.89),
            pdf_layout: PdfLayout::Paged,
        }
    }
}

impl EditorConfig {
    /// Application directory name under the platform config dir
    pub const ID: &'static str = "pageshot";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from `path` (or the default location), falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Self>(&text) {
                Ok(config) => config.sanitized(),
                Err(err) => {
                    log::warn!("Error parsing {}, using defaults: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Could not read {}, using defaults: {}", path.display(), err);
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.stroke_width > 0.0) {
            self.stroke_width = defaults.stroke_width;
        }
        self.font_size = text::font_size(self.font_size).unwrap_or(defaults.font_size);
        if !(self.blur_sigma > 0.0) {
            self.blur_sigma = defaults.blur_sigma;
        }
        if !(self.pdf_page_size.0 > 0.0 && self.pdf_page_size.1 > 0.0) {
            self.pdf_page_size = defaults.pdf_page_size;
        }
        self.text_backing_opacity = self.text_backing_opacity.clamp(0.0, 1.0);
        self
    }
}
