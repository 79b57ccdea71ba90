use serde::Deserialize;

use crate::domain::Tool;
use crate::session::messages::Command;
use crate::session::state::{EditorSession, Gesture};

/// Modifier keys held during a key press; `ctrl` also stands for Cmd on macOS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

/// Tools reachable with the number keys, in toolbar order
const NUMBERED_TOOLS: [Tool; 9] = [
    Tool::Arrow,
    Tool::Line,
    Tool::Rectangle,
    Tool::Circle,
    Tool::Draw,
    Tool::Highlight,
    Tool::Text,
    Tool::Step,
    Tool::Blur,
];

/// Translate a key press into a command for `session`
///
/// `key` is a single character or a named key such as `Enter`/`Escape`.
pub fn handle_key_event(session: &EditorSession, key: &str, modifiers: Modifiers) -> Option<Command> {
    let awaiting_text = matches!(session.gesture(), Gesture::AwaitingText(_));
    let crop_pending = session.crop_selection().is_some_and(|c| c.is_selecting());

    // the text prompt owns the keyboard until it is answered
    if awaiting_text {
        return (key == "Escape").then_some(Command::CancelText);
    }

    match key {
        "z" | "Z" if modifiers.ctrl && !modifiers.shift => Some(Command::Undo),
        "y" | "Y" if modifiers.ctrl => Some(Command::Redo),
        "z" | "Z" if modifiers.ctrl && modifiers.shift => Some(Command::Redo),
        "+" | "=" if modifiers.ctrl => Some(Command::ZoomIn),
        "-" if modifiers.ctrl => Some(Command::ZoomOut),
        "0" if modifiers.ctrl => Some(Command::ZoomReset),
        "Enter" if crop_pending => Some(Command::ApplyCrop),
        "Escape" if crop_pending => Some(Command::CancelCrop),
        "Escape" => Some(Command::SelectTool { tool: Tool::Select }),
        "c" if !modifiers.ctrl => Some(Command::SelectTool { tool: Tool::Crop }),
        _ if !modifiers.ctrl => {
            let digit = key.parse::<usize>().ok().filter(|d| (1..=9).contains(d))?;
            Some(Command::SelectTool {
                tool: NUMBERED_TOOLS[digit - 1],
            })
        }
        _ => None,
    }
}
