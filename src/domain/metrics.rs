//! Layer metrics shared by the layer model and the renderer
//!
//! The renderer paints with these numbers and the layer model uses the same
//! numbers to estimate how far a layer reaches.

/// Arrow geometry
pub mod arrow {
    use std::f32::consts::FRAC_PI_6;

    /// Arrowhead length with zero stroke width
    pub const HEAD_BASE: f32 = 15.0;
    /// Extra head length per unit of stroke width
    pub const HEAD_PER_WIDTH: f32 = 2.0;
    /// Angle between the shaft and each side of the head
    pub const HEAD_HALF_ANGLE: f32 = FRAC_PI_6;

    /// Head length for a given stroke width
    #[inline]
    pub fn head_length(stroke_width: f32) -> f32 {
        HEAD_BASE + HEAD_PER_WIDTH * stroke_width
    }

    /// Triangle corners of the head: (tip, left, right)
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        stroke_width: f32,
    ) -> [(f32, f32); 3] {
        let angle = (end_y - start_y).atan2(end_x - start_x);
        let len = head_length(stroke_width);
        [
            (end_x, end_y),
            (
                end_x - len * (angle - HEAD_HALF_ANGLE).cos(),
                end_y - len * (angle - HEAD_HALF_ANGLE).sin(),
            ),
            (
                end_x - len * (angle + HEAD_HALF_ANGLE).cos(),
                end_y - len * (angle + HEAD_HALF_ANGLE).sin(),
            ),
        ]
    }

    /// Point where the shaft meets the head base, so round caps stay behind the tip
    pub fn shaft_end(start_x: f32, start_y: f32, end_x: f32, end_y: f32, stroke_width: f32) -> (f32, f32) {
        let length = (end_x - start_x).hypot(end_y - start_y);
        let back = head_length(stroke_width) * HEAD_HALF_ANGLE.cos();
        if length <= back {
            return (start_x, start_y);
        }
        let t = (length - back) / length;
        (start_x + (end_x - start_x) * t, start_y + (end_y - start_y) * t)
    }
}

/// Highlighter strokes
pub mod highlight {
    /// Multiplier applied to the stored stroke width
    pub const WIDTH_FACTOR: f32 = 3.0;
    /// Fixed opacity of highlighter ink
    pub const OPACITY: f32 = 0.3;
}

/// Numbered step markers
pub mod step {
    /// Disc radius
    pub const RADIUS: f32 = 18.0;
    /// Font size of the numeral
    pub const LABEL_SIZE: f32 = 18.0;
}

/// Text layers
pub mod text {
    /// Padding between the text and its backing rectangle
    pub const PAD: f32 = 4.0;
    /// Line height as a multiple of the font size when no font is loaded
    pub const LINE_HEIGHT: f32 = 1.2;
    /// Average advance as a multiple of the font size when no font is loaded
    pub const ESTIMATED_ADVANCE: f32 = 0.6;
    /// Largest font size a text layer is committed with
    pub const MAX_FONT_SIZE: f32 = 400.0;

    /// Clamp a requested font size, or `None` when it is unusable
    pub fn font_size(size: f32) -> Option<f32> {
        (size.is_finite() && size > 0.0).then(|| size.min(MAX_FONT_SIZE))
    }

    /// Lines of a text block; a trailing newline starts an empty last line
    pub fn lines(content: &str) -> std::str::Split<'_, char> {
        content.split('\n')
    }

    /// Width and height of `content` from character counts alone
    pub fn estimated_size(content: &str, size: f32) -> (f32, f32) {
        let (count, widest) = lines(content).fold((0usize, 0usize), |(n, w), line| {
            (n + 1, w.max(line.chars().count()))
        });
        (
            widest as f32 * size * ESTIMATED_ADVANCE,
            count.max(1) as f32 * size * LINE_HEIGHT,
        )
    }
}
