//! Annotation layers drawn over the base image
//!
//! All layer types store coordinates in BaseImage pixel space. A committed
//! layer is never edited again, except for crop rebasing which translates it.

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Point};
use crate::config::ShapeColor;
use super::metrics::{arrow, highlight, step, text};

/// Straight segment, shared by arrows and plain lines
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentLayer {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Outline rectangle (no fill), `w`/`h` are never negative
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectLayer {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Outline circle (no fill) around a center point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleLayer {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Text label; `x`/`y` is the top-left corner of the first line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: ShapeColor,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
}

/// Polyline through the recorded pointer positions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeLayer {
    pub points: Vec<Point>,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Numbered callout disc centered on `x`/`y`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepLayer {
    pub x: f32,
    pub y: f32,
    pub sequence_number: u32,
    pub color: ShapeColor,
}

/// Region of the base image that is redrawn blurred
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlurLayer {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One committed annotation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Arrow(SegmentLayer),
    Line(SegmentLayer),
    Rectangle(RectLayer),
    Circle(CircleLayer),
    Text(TextLayer),
    FreehandPath(StrokeLayer),
    Highlight(StrokeLayer),
    StepMarker(StepLayer),
    BlurRegion(BlurLayer),
}

impl Layer {
    pub fn arrow(from: Point, to: Point, color: ShapeColor, stroke_width: f32) -> Self {
        Layer::Arrow(SegmentLayer::new(from, to, color, stroke_width))
    }

    pub fn line(from: Point, to: Point, color: ShapeColor, stroke_width: f32) -> Self {
        Layer::Line(SegmentLayer::new(from, to, color, stroke_width))
    }

    /// Rectangle spanning two corners in any drag direction
    pub fn rectangle(from: Point, to: Point, color: ShapeColor, stroke_width: f32) -> Self {
        let b = Bounds::from_corners(from.x, from.y, to.x, to.y);
        Layer::Rectangle(RectLayer {
            x: b.left,
            y: b.top,
            w: b.width(),
            h: b.height(),
            color,
            stroke_width,
        })
    }

    /// Circle centered on `center` passing through `edge`
    pub fn circle(center: Point, edge: Point, color: ShapeColor, stroke_width: f32) -> Self {
        Layer::Circle(CircleLayer {
            x: center.x,
            y: center.y,
            radius: center.distance(edge),
            color,
            stroke_width,
        })
    }

    pub fn text(
        at: Point,
        text: impl Into<String>,
        color: ShapeColor,
        font_size: f32,
        bold: bool,
        italic: bool,
    ) -> Self {
        Layer::Text(TextLayer {
            x: at.x,
            y: at.y,
            text: text.into(),
            color,
            font_size,
            bold,
            italic,
        })
    }

    pub fn freehand(points: Vec<Point>, color: ShapeColor, stroke_width: f32) -> Self {
        Layer::FreehandPath(StrokeLayer {
            points,
            color,
            stroke_width,
        })
    }

    pub fn highlight(points: Vec<Point>, color: ShapeColor, stroke_width: f32) -> Self {
        Layer::Highlight(StrokeLayer {
            points,
            color,
            stroke_width,
        })
    }

    pub fn step_marker(at: Point, sequence_number: u32, color: ShapeColor) -> Self {
        Layer::StepMarker(StepLayer {
            x: at.x,
            y: at.y,
            sequence_number,
            color,
        })
    }

    /// Blur region spanning two corners, normalized to a non-negative size
    pub fn blur_region(from: Point, to: Point) -> Self {
        let b = Bounds::from_corners(from.x, from.y, to.x, to.y);
        Layer::BlurRegion(BlurLayer {
            x: b.left,
            y: b.top,
            w: b.width(),
            h: b.height(),
        })
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Arrow(_) => "arrow",
            Layer::Line(_) => "line",
            Layer::Rectangle(_) => "rectangle",
            Layer::Circle(_) => "circle",
            Layer::Text(_) => "text",
            Layer::FreehandPath(_) => "freehand",
            Layer::Highlight(_) => "highlight",
            Layer::StepMarker(_) => "step",
            Layer::BlurRegion(_) => "blur",
        }
    }

    /// Move the layer by `(dx, dy)`
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Layer::Arrow(s) | Layer::Line(s) => {
                s.x1 += dx;
                s.y1 += dy;
                s.x2 += dx;
                s.y2 += dy;
            }
            Layer::FreehandPath(s) | Layer::Highlight(s) => {
                for p in &mut s.points {
                    *p = p.translate(dx, dy);
                }
            }
            Layer::Rectangle(RectLayer { x, y, .. })
            | Layer::Circle(CircleLayer { x, y, .. })
            | Layer::Text(TextLayer { x, y, .. })
            | Layer::StepMarker(StepLayer { x, y, .. })
            | Layer::BlurRegion(BlurLayer { x, y, .. }) => {
                *x += dx;
                *y += dy;
            }
        }
    }

    /// Conservative extent of everything the layer may paint
    ///
    /// Text has no font at hand here, so its box is estimated from the
    /// character count and errs on the large side.
    pub fn bounds(&self) -> Option<Bounds> {
        let bounds = match self {
            Layer::Arrow(s) => Bounds::from_corners(s.x1, s.y1, s.x2, s.y2)
                .inflate(arrow::head_length(s.stroke_width) + s.stroke_width / 2.0),
            Layer::Line(s) => {
                Bounds::from_corners(s.x1, s.y1, s.x2, s.y2).inflate(s.stroke_width / 2.0)
            }
            Layer::Rectangle(r) => {
                Bounds::from_corners(r.x, r.y, r.x + r.w, r.y + r.h).inflate(r.stroke_width / 2.0)
            }
            Layer::Circle(c) => Bounds::from_corners(c.x, c.y, c.x, c.y)
                .inflate(c.radius + c.stroke_width / 2.0),
            Layer::Text(t) => {
                let (w, h) = text::estimated_size(&t.text, t.font_size);
                Bounds::from_corners(t.x, t.y, t.x + w, t.y + h).inflate(text::PAD)
            }
            Layer::FreehandPath(s) => Bounds::from_points(&s.points)?.inflate(s.stroke_width / 2.0),
            Layer::Highlight(s) => Bounds::from_points(&s.points)?
                .inflate(s.stroke_width * highlight::WIDTH_FACTOR / 2.0),
            Layer::StepMarker(m) => Bounds::from_corners(m.x, m.y, m.x, m.y).inflate(step::RADIUS),
            Layer::BlurRegion(b) => Bounds::from_corners(b.x, b.y, b.x + b.w, b.y + b.h),
        };
        Some(bounds)
    }
}

impl SegmentLayer {
    fn new(from: Point, to: Point, color: ShapeColor, stroke_width: f32) -> Self {
        Self {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            color,
            stroke_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> ShapeColor {
        ShapeColor::default()
    }

    #[test]
    fn test_rectangle_is_normalized() {
        let layer = Layer::rectangle(Point::new(50.0, 40.0), Point::new(10.0, 70.0), red(), 2.0);
        let Layer::Rectangle(r) = layer else {
            panic!("expected rectangle");
        };
        assert_eq!((r.x, r.y, r.w, r.h), (10.0, 40.0, 40.0, 30.0));
    }

    #[test]
    fn test_blur_region_is_normalized() {
        let layer = Layer::blur_region(Point::new(30.0, 30.0), Point::new(10.0, 5.0));
        assert_eq!(
            layer,
            Layer::BlurRegion(BlurLayer {
                x: 10.0,
                y: 5.0,
                w: 20.0,
                h: 25.0
            })
        );
    }

    #[test]
    fn test_translate_moves_every_point() {
        let mut path = Layer::freehand(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(9.0, 2.0)],
            red(),
            2.0,
        );
        path.translate(-3.0, 4.0);
        let Layer::FreehandPath(s) = &path else {
            panic!("expected path");
        };
        assert_eq!(
            s.points,
            vec![Point::new(-3.0, 4.0), Point::new(2.0, 9.0), Point::new(6.0, 6.0)]
        );

        let mut arrow = Layer::arrow(Point::new(1.0, 2.0), Point::new(3.0, 4.0), red(), 2.0);
        arrow.translate(10.0, 10.0);
        assert_eq!(
            arrow,
            Layer::arrow(Point::new(11.0, 12.0), Point::new(13.0, 14.0), red(), 2.0)
        );

        let mut marker = Layer::step_marker(Point::new(5.0, 5.0), 3, red());
        marker.translate(-5.0, -5.0);
        assert_eq!(marker, Layer::step_marker(Point::new(0.0, 0.0), 3, red()));
    }

    #[test]
    fn test_circle_radius_from_drag() {
        let Layer::Circle(c) = Layer::circle(Point::new(10.0, 10.0), Point::new(13.0, 14.0), red(), 1.0)
        else {
            panic!("expected circle");
        };
        assert_eq!(c.radius, 5.0);
    }

    #[test]
    fn test_empty_path_has_no_bounds() {
        assert!(Layer::freehand(Vec::new(), red(), 2.0).bounds().is_none());
        let marker = Layer::step_marker(Point::new(100.0, 100.0), 1, red());
        let b = marker.bounds().unwrap();
        assert_eq!((b.left, b.right), (100.0 - step::RADIUS, 100.0 + step::RADIUS));
    }

    #[test]
    fn test_layer_json_is_tagged() {
        let layer = Layer::step_marker(Point::new(1.0, 2.0), 4, red());
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "step_marker");
        assert_eq!(json["sequence_number"], 4);
    }
}
