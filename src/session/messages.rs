//! Commands consumed by an editor session and the updates it reports back
//!
//! Every user input becomes one `Command`. Pointer positions are in client
//! coordinates; the session maps them onto the BaseImage itself.

use serde::{Deserialize, Deserializer};

use crate::config::ShapeColor;
use crate::domain::{ClientRect, Tool};

/// One user input, as produced by the toolbar, the canvas or a replay script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SelectTool {
        tool: Tool,
    },
    SetColor {
        #[serde(deserialize_with = "hex_color")]
        color: ShapeColor,
    },
    SetStrokeWidth {
        width: f32,
    },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    SetZoom {
        zoom: f32,
    },
    /// Measured on-screen rect of the canvas, in client coordinates
    SetCanvasRect {
        rect: ClientRect,
    },
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    /// Answer to `Update::PromptText`
    ConfirmText {
        text: String,
        #[serde(default)]
        font_size: Option<f32>,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
    },
    CancelText,
    /// Answer to `Update::ConfirmCrop`
    ApplyCrop,
    CancelCrop,
    Undo,
    Redo,
    /// Key press, translated through the editor's shortcuts
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    /// Drop every layer; ignored unless the user confirmed it
    Clear {
        #[serde(default)]
        confirmed: bool,
    },
}

/// What a command did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Nothing changed
    Nothing,
    /// Display state changed, the canvas needs repainting
    Redraw,
    /// A layer was appended to the history
    Committed,
    /// A degenerate gesture was dropped
    Discarded,
    /// The text tool wants content for the recorded anchor
    PromptText,
    /// A crop selection is waiting for apply or cancel
    ConfirmCrop,
}

impl Update {
    /// Whether the canvas has to be repainted after this update
    pub fn needs_redraw(self) -> bool {
        !matches!(self, Update::Nothing)
    }
}

fn hex_color<'de, D>(deserializer: D) -> Result<ShapeColor, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

/// Parse a replay script: a JSON array of commands
pub fn parse_script(text: &str) -> serde_json::Result<Vec<Command>> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = r##"[
            {"command": "select_tool", "tool": "rectangle"},
            {"command": "set_color", "color": "#00ff00"},
            {"command": "pointer_down", "x": 1, "y": 2.5},
            {"command": "confirm_text", "text": "hi", "bold": true},
            {"command": "clear"},
            {"command": "undo"},
            {"command": "key", "key": "z", "ctrl": true}
        ]"##;
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands[0],
            Command::SelectTool {
                tool: Tool::Rectangle
            }
        );
        assert_eq!(
            commands[1],
            Command::SetColor {
                color: ShapeColor::from_rgb_u8(0, 255, 0)
            }
        );
        assert_eq!(commands[2], Command::PointerDown { x: 1.0, y: 2.5 });
        assert_eq!(
            commands[3],
            Command::ConfirmText {
                text: "hi".to_string(),
                font_size: None,
                bold: true,
                italic: false,
            }
        );
        assert_eq!(commands[4], Command::Clear { confirmed: false });
        assert_eq!(commands[5], Command::Undo);
        assert_eq!(
            commands[6],
            Command::Key {
                key: "z".to_string(),
                ctrl: true,
                shift: false,
            }
        );
    }

    #[test]
    fn test_canvas_rect_command() {
        let commands = parse_script(
            r#"[{"command": "set_canvas_rect", "rect": {"left": 4, "top": 8, "width": 640, "height": 320}}]"#,
        )
        .unwrap();
        assert_eq!(
            commands[0],
            Command::SetCanvasRect {
                rect: ClientRect {
                    left: 4.0,
                    top: 8.0,
                    width: 640.0,
                    height: 320.0,
                },
            }
        );
    }

    #[test]
    fn test_only_nothing_skips_redraw() {
        assert!(!Update::Nothing.needs_redraw());
        assert!(Update::Discarded.needs_redraw());
        assert!(Update::Committed.needs_redraw());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(parse_script(r#"[{"command": "set_color", "color": "red"}]"#).is_err());
    }
}
