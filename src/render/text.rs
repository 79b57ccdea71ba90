//! Font loading and text rasterization
//!
//! Fonts come from an explicit file or from the system via font-kit. Every
//! entry point degrades to metric estimates when no font could be loaded.

use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use tiny_skia::{ColorU8, Pixmap};

use super::geometry::text;
use crate::config::{EditorConfig, ShapeColor};

/// Regular, italic, bold and bold-italic faces of one family
#[derive(Clone, Default)]
pub struct Fonts {
    faces: [Option<FontArc>; 4],
}

fn slot(bold: bool, italic: bool) -> usize {
    usize::from(bold) * 2 + usize::from(italic)
}

impl Fonts {
    /// No fonts; text renders as backing only
    pub fn none() -> Self {
        Self::default()
    }

    /// The same face for every style
    pub fn single(font: FontArc) -> Self {
        Self {
            faces: [
                Some(font.clone()),
                Some(font.clone()),
                Some(font.clone()),
                Some(font),
            ],
        }
    }

    /// Resolve fonts as configured, logging what could not be found
    pub fn from_config(config: &EditorConfig) -> Self {
        if let Some(path) = &config.font_path {
            match load_font_file(path) {
                Some(font) => return Self::single(font),
                None => log::warn!("Could not load font {}, trying system fonts", path.display()),
            }
        }

        let family = config.font_family.as_deref();
        let mut fonts = Self::none();
        for bold in [false, true] {
            for italic in [false, true] {
                fonts.faces[slot(bold, italic)] = load_system_font(family, bold, italic);
            }
        }
        if fonts.faces.iter().all(Option::is_none) {
            log::warn!("No usable system font found, text will render without glyphs");
        }
        fonts
    }

    /// Face for the requested style, falling back to whatever is loaded
    pub fn face(&self, bold: bool, italic: bool) -> Option<&FontArc> {
        self.faces[slot(bold, italic)]
            .as_ref()
            .or(self.faces[slot(bold, false)].as_ref())
            .or_else(|| self.faces.iter().flatten().next())
    }
}

/// Load a font file from disk
pub fn load_font_file(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    FontArc::try_from_vec(bytes).ok()
}

/// Load a font by family (sans-serif when absent), weight and style from the system
pub fn load_system_font(family: Option<&str>, bold: bool, italic: bool) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::{Properties, Style, Weight};
    use font_kit::source::SystemSource;

    let mut props = Properties::new();
    if bold {
        props.weight = Weight::BOLD;
    }
    if italic {
        props.style = Style::Italic;
    }

    let mut families = Vec::with_capacity(2);
    if let Some(family) = family {
        families.push(FamilyName::Title(family.to_string()));
    }
    families.push(FamilyName::SansSerif);

    let handle = SystemSource::new()
        .select_best_match(&families, &props)
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}

/// Size of a laid out block of text
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
    pub ascent: f32,
}

/// Measure `content` (one or more lines) at `size`
pub fn measure(font: Option<&FontArc>, content: &str, size: f32) -> TextMetrics {
    match font {
        Some(font) => {
            let scaled = font.as_scaled(PxScale::from(size));
            let (lines, width) = text::lines(content).fold((0usize, 0.0f32), |(n, w), line| {
                (n + 1, w.max(line_width(font, line, size)))
            });
            TextMetrics {
                width,
                height: lines.max(1) as f32 * scaled.height(),
                line_height: scaled.height(),
                ascent: scaled.ascent(),
            }
        }
        None => {
            let (width, height) = text::estimated_size(content, size);
            TextMetrics {
                width,
                height,
                line_height: size * text::LINE_HEIGHT,
                ascent: size * 0.8,
            }
        }
    }
}

fn line_width(font: &FontArc, line: &str, size: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Largest glyph box `rasterize` allocates, in pixels
pub const MAX_RASTER_PIXELS: u64 = 64 * 1024 * 1024;

/// Rasterize `content` into a tight pixmap filled with `color`
///
/// Returns `None` when the glyph box is larger than `MAX_RASTER_PIXELS` or
/// could not be allocated.
pub fn rasterize(font: &FontArc, content: &str, size: f32, color: ShapeColor) -> Option<Pixmap> {
    let metrics = measure(Some(font), content, size);
    if !(metrics.width.is_finite() && metrics.height.is_finite()) {
        return None;
    }
    let width = metrics.width.ceil().max(1.0) as u64;
    let height = metrics.height.ceil().max(1.0) as u64;
    let area = width.checked_mul(height).filter(|area| *area <= MAX_RASTER_PIXELS)?;
    let (width, height) = (u32::try_from(width).ok()?, u32::try_from(height).ok()?);
    let mut pixmap = Pixmap::new(width, height)?;
    let mut coverage = vec![0.0f32; usize::try_from(area).ok()?];

    let scaled = font.as_scaled(PxScale::from(size));
    for (index, line) in text::lines(content).enumerate() {
        let baseline = index as f32 * metrics.line_height + metrics.ascent;
        let mut caret = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(PxScale::from(size), point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                    return;
                }
                let cell = &mut coverage[(py * i64::from(width) + px) as usize];
                *cell = cell.max(c);
            });
        }
    }

    let [r, g, b, _] = color.to_rgba_u8();
    for (dst, c) in pixmap.pixels_mut().iter_mut().zip(coverage) {
        if c > 0.0 {
            let alpha = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            *dst = ColorU8::from_rgba(r, g, b, alpha).premultiply();
        }
    }
    Some(pixmap)
}
