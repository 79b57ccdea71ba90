//! Annotation editor for captured web pages
//!
//! A capture hand-off (tiles plus page metadata) is stitched into a base
//! image, annotated through an `EditorSession` driven by `Command`s, and
//! flattened by the same render pipeline for display and export.

pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod render;
pub mod session;

pub use capture::image::BaseImage;
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use render::Renderer;
pub use session::{Command, EditorSession, ExportFrame, Update};
