//! Deterministic rendering of a base image plus ordered layers
//!
//! `Renderer::render` is the only drawing routine: the live display and the
//! export both go through it, so what is previewed is what gets exported.

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

use super::geometry::{self, aids, arrow, highlight, step, text as text_geom};
use super::surface::{ExportSurface, Surface, copy_rgba_into};
use super::{blur, text};
use crate::capture::image::BaseImage;
use crate::config::{EditorConfig, ShapeColor};
use crate::domain::{
    Bounds, BlurLayer, CircleLayer, Layer, Point, Rect, RectLayer, SegmentLayer, StepLayer,
    StrokeLayer, TextLayer,
};
use crate::error::Result;

/// Render settings plus the fonts text layers need
#[derive(Clone)]
pub struct Renderer {
    fonts: text::Fonts,
    blur_sigma: f32,
    text_backing_opacity: f32,
}

impl Renderer {
    pub fn new(fonts: text::Fonts, config: &EditorConfig) -> Self {
        Self {
            fonts,
            blur_sigma: config.blur_sigma,
            text_backing_opacity: config.text_backing_opacity,
        }
    }

    /// Renderer with fonts resolved from `config`
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(text::Fonts::from_config(config), config)
    }

    /// Clear `surface`, draw `base` at the origin, then every layer in order
    pub fn render<'a, S>(
        &self,
        surface: &mut S,
        base: &BaseImage,
        layers: impl IntoIterator<Item = &'a Layer>,
    ) where
        S: Surface + ?Sized,
    {
        let editing_aids = surface.shows_editing_aids();
        let pixmap = surface.pixmap_mut();
        pixmap.fill(Color::TRANSPARENT);
        copy_rgba_into(pixmap, base.rgba(), 0, 0);

        for layer in layers {
            self.draw_layer(pixmap, base, layer, editing_aids);
        }
    }

    /// Flatten `layers` over `base` at full resolution, without editing aids
    pub fn render_export<'a>(
        &self,
        base: &BaseImage,
        layers: impl IntoIterator<Item = &'a Layer>,
    ) -> Result<RgbaImage> {
        let mut surface = ExportSurface::for_image(base)?;
        self.render(&mut surface, base, layers);
        Ok(surface.into_rgba())
    }

    fn draw_layer(&self, pixmap: &mut Pixmap, base: &BaseImage, layer: &Layer, editing_aids: bool) {
        match layer {
            Layer::Arrow(s) => draw_arrow(pixmap, s),
            Layer::Line(s) => draw_line(pixmap, s),
            Layer::Rectangle(r) => draw_rectangle(pixmap, r),
            Layer::Circle(c) => draw_circle(pixmap, c),
            Layer::Text(t) => self.draw_text(pixmap, t),
            Layer::FreehandPath(s) => draw_stroke(pixmap, s, 1.0, 1.0),
            Layer::Highlight(s) => {
                draw_stroke(pixmap, s, highlight::WIDTH_FACTOR, highlight::OPACITY);
            }
            Layer::StepMarker(m) => self.draw_step(pixmap, m),
            Layer::BlurRegion(b) => self.draw_blur(pixmap, base, b, editing_aids),
        }
    }

    fn draw_text(&self, pixmap: &mut Pixmap, layer: &TextLayer) {
        if layer.text.is_empty() {
            return;
        }
        let font = self.fonts.face(layer.bold, layer.italic);
        let metrics = text::measure(font, &layer.text, layer.font_size);

        if let Some(backing) = tiny_skia::Rect::from_xywh(
            layer.x - text_geom::PAD,
            layer.y - text_geom::PAD,
            metrics.width + text_geom::PAD * 2.0,
            metrics.height + text_geom::PAD * 2.0,
        ) {
            let alpha = (self.text_backing_opacity * 255.0).round() as u8;
            let mut paint = Paint::default();
            paint.set_color_rgba8(255, 255, 255, alpha);
            pixmap.fill_rect(backing, &paint, Transform::identity(), None);
        }

        if let Some(font) = font
            && let Some(glyphs) = text::rasterize(font, &layer.text, layer.font_size, layer.color)
        {
            pixmap.draw_pixmap(
                layer.x.round() as i32,
                layer.y.round() as i32,
                glyphs.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_step(&self, pixmap: &mut Pixmap, marker: &StepLayer) {
        if let Some(disc) = PathBuilder::from_circle(marker.x, marker.y, step::RADIUS) {
            pixmap.fill_path(
                &disc,
                &solid_paint(marker.color, 1.0),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        let Some(font) = self.fonts.face(true, false) else {
            return;
        };
        let label = marker.sequence_number.to_string();
        let metrics = text::measure(Some(font), &label, step::LABEL_SIZE);
        if let Some(glyphs) = text::rasterize(font, &label, step::LABEL_SIZE, ShapeColor::WHITE) {
            pixmap.draw_pixmap(
                (marker.x - metrics.width / 2.0).round() as i32,
                (marker.y - metrics.height / 2.0).round() as i32,
                glyphs.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_blur(&self, pixmap: &mut Pixmap, base: &BaseImage, region: &BlurLayer, editing_aids: bool) {
        let rect = Rect::enclosing(region.x, region.y, region.w, region.h);
        if let Some((clipped, pixels)) = blur::blurred_region(base.rgba(), rect, self.blur_sigma) {
            copy_rgba_into(pixmap, &pixels, clipped.left, clipped.top);
        }

        if editing_aids {
            let outline = Bounds::from_corners(region.x, region.y, region.x + region.w, region.y + region.h);
            stroke_dashed_rect(pixmap, outline, Color::from_rgba8(90, 90, 90, 200));
        }
    }
}

/// Shade everything outside `selection` and outline it
pub fn draw_crop_overlay(pixmap: &mut Pixmap, selection: Bounds) {
    let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
    let mut shade = Paint::default();
    shade.set_color_rgba8(0, 0, 0, aids::CROP_SHADE_ALPHA);

    let bands = [
        (0.0, 0.0, w, selection.top),
        (0.0, selection.bottom, w, h - selection.bottom),
        (0.0, selection.top, selection.left, selection.height()),
        (selection.right, selection.top, w - selection.right, selection.height()),
    ];
    for (x, y, bw, bh) in bands {
        if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, bw, bh) {
            pixmap.fill_rect(rect, &shade, Transform::identity(), None);
        }
    }
    stroke_dashed_rect(pixmap, selection, Color::WHITE);
}

fn stroke_dashed_rect(pixmap: &mut Pixmap, bounds: Bounds, color: Color) {
    let Some(path) = rect_path(bounds.left, bounds.top, bounds.width(), bounds.height()) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;

    let stroke = Stroke {
        width: aids::OUTLINE_WIDTH,
        dash: StrokeDash::new(aids::DASH.to_vec(), 0.0),
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn solid_paint(color: ShapeColor, opacity: f32) -> Paint<'static> {
    let [r, g, b, _] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width: width.max(0.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn segment_path(x1: f32, y1: f32, x2: f32, y2: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x1, y1);
    pb.line_to(x2, y2);
    pb.finish()
}

fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    pb.line_to(x + w, y);
    pb.line_to(x + w, y + h);
    pb.line_to(x, y + h);
    pb.close();
    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * geometry::BEZIER_K;
    let ky = ry * geometry::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.close();
    pb.finish()
}

fn draw_line(pixmap: &mut Pixmap, s: &SegmentLayer) {
    if let Some(path) = segment_path(s.x1, s.y1, s.x2, s.y2) {
        let paint = solid_paint(s.color, 1.0);
        pixmap.stroke_path(&path, &paint, &round_stroke(s.stroke_width), Transform::identity(), None);
    }
}

/// Shaft plus a filled triangular head
fn draw_arrow(pixmap: &mut Pixmap, s: &SegmentLayer) {
    let paint = solid_paint(s.color, 1.0);

    let (shaft_x, shaft_y) = arrow::shaft_end(s.x1, s.y1, s.x2, s.y2, s.stroke_width);
    if let Some(path) = segment_path(s.x1, s.y1, shaft_x, shaft_y) {
        pixmap.stroke_path(&path, &paint, &round_stroke(s.stroke_width), Transform::identity(), None);
    }

    let [tip, left, right] = arrow::head_points(s.x1, s.y1, s.x2, s.y2, s.stroke_width);
    let mut pb = PathBuilder::new();
    pb.move_to(tip.0, tip.1);
    pb.line_to(left.0, left.1);
    pb.line_to(right.0, right.1);
    pb.close();
    if let Some(head) = pb.finish() {
        pixmap.fill_path(&head, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_rectangle(pixmap: &mut Pixmap, r: &RectLayer) {
    if let Some(path) = rect_path(r.x, r.y, r.w, r.h) {
        let paint = solid_paint(r.color, 1.0);
        pixmap.stroke_path(&path, &paint, &round_stroke(r.stroke_width), Transform::identity(), None);
    }
}

fn draw_circle(pixmap: &mut Pixmap, c: &CircleLayer) {
    if let Some(path) = ellipse_path(c.x, c.y, c.radius, c.radius) {
        let paint = solid_paint(c.color, 1.0);
        pixmap.stroke_path(&path, &paint, &round_stroke(c.stroke_width), Transform::identity(), None);
    }
}

/// Polyline through every point; single points draw nothing
fn draw_stroke(pixmap: &mut Pixmap, s: &StrokeLayer, width_factor: f32, opacity: f32) {
    let [first, rest @ ..] = s.points.as_slice() else {
        return;
    };
    if rest.is_empty() {
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for Point { x, y } in rest {
        pb.line_to(*x, *y);
    }
    if let Some(path) = pb.finish() {
        let paint = solid_paint(s.color, opacity);
        let stroke = round_stroke(s.stroke_width * width_factor);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
