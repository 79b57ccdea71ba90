//! Editor session module
//!
//! This module contains:
//! - The session object owning the document and toolbar state
//! - The History Store
//! - Command and update types
//! - Command handlers (the per-tool pointer state machine)
//! - The crop transform
//! - Keyboard shortcuts

pub mod crop;
pub mod handlers;
pub mod history;
pub mod messages;
pub mod shortcuts;
pub mod state;

pub use history::History;
pub use messages::{Command, Update};
pub use state::{CropSelection, EditorSession, ExportFrame, Gesture};
