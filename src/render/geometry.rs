//! Rendering geometry
//!
//! Layer metrics live in the domain and are re-exported here for the pipeline.

pub use crate::domain::metrics::{arrow, highlight, step, text};

/// Editing aids drawn on display surfaces only
pub mod aids {
    /// Dash pattern for blur region outlines
    pub const DASH: [f32; 2] = [6.0, 4.0];
    pub const OUTLINE_WIDTH: f32 = 1.0;
    /// Alpha of the shade outside a crop selection
    pub const CROP_SHADE_ALPHA: u8 = 128;
}

/// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;
