//! Toolbar state: which tool is active and how new layers are styled

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{EditorConfig, ShapeColor};

/// Smallest zoom factor the view may reach
pub const MIN_ZOOM: f32 = 0.1;
/// Largest zoom factor the view may reach
pub const MAX_ZOOM: f32 = 8.0;
/// Multiplier applied by one zoom step
pub const ZOOM_STEP: f32 = 1.25;

/// Annotation tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Inert pointer, reserved for selecting layers
    #[default]
    Select,
    Arrow,
    Line,
    Rectangle,
    Circle,
    /// Freehand pen
    Draw,
    Highlight,
    Text,
    /// Numbered step marker
    Step,
    Blur,
    Crop,
}

impl Tool {
    pub const ALL: [Tool; 11] = [
        Tool::Select,
        Tool::Arrow,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Draw,
        Tool::Highlight,
        Tool::Text,
        Tool::Step,
        Tool::Blur,
        Tool::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Arrow => "arrow",
            Tool::Line => "line",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Draw => "draw",
            Tool::Highlight => "highlight",
            Tool::Text => "text",
            Tool::Step => "step",
            Tool::Blur => "blur",
            Tool::Crop => "crop",
        }
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| format!("unknown tool {s:?}"))
    }
}

/// Per-session toolbar state, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    pub active_tool: Tool,
    pub current_color: ShapeColor,
    pub stroke_width: f32,
    /// Display-only scale of the canvas; never touches layer coordinates
    pub zoom_factor: f32,
    /// Font size offered by the text prompt
    pub font_size: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ToolState {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            active_tool: config.initial_tool,
            current_color: config.shape_color,
            stroke_width: config.stroke_width,
            zoom_factor: 1.0,
            font_size: config.font_size,
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom_factor = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom_factor * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom_factor / ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_factor = 1.0;
    }
}
