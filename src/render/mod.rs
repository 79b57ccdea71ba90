//! Annotation rendering module
//!
//! This module contains:
//! - Geometry constants shared with the layer model
//! - Drawing surfaces for display and export
//! - Text rasterization and blur sampling
//! - The render pipeline itself

pub mod blur;
pub mod geometry;
pub mod pipeline;
pub mod surface;
pub mod text;

pub use pipeline::{Renderer, draw_crop_overlay};
pub use surface::{DisplaySurface, ExportSurface, Surface};
