//! Command dispatch and the per-tool pointer state machine

use crate::domain::metrics::text as text_metrics;
use crate::domain::{Layer, Point, Tool, ToolState};

use super::messages::{Command, Update};
use super::shortcuts::{Modifiers, handle_key_event};
use super::state::{CropSelection, EditorSession, Gesture};

impl EditorSession {
    /// Apply one command synchronously and report what changed
    pub fn dispatch(&mut self, command: Command) -> Update {
        log::trace!("Dispatching {:?}", command);
        match command {
            Command::SelectTool { tool } => self.select_tool(tool),
            Command::SetColor { color } => {
                self.tools.current_color = color;
                self.redraw_if_previewing()
            }
            Command::SetStrokeWidth { width } => {
                if width.is_finite() && width > 0.0 {
                    self.tools.stroke_width = width;
                    self.redraw_if_previewing()
                } else {
                    log::warn!("Ignoring invalid stroke width {}", width);
                    Update::Nothing
                }
            }
            Command::ZoomIn => self.rezoom(ToolState::zoom_in),
            Command::ZoomOut => self.rezoom(ToolState::zoom_out),
            Command::ZoomReset => self.rezoom(ToolState::reset_zoom),
            Command::SetZoom { zoom } => self.rezoom(|tools| tools.set_zoom(zoom)),
            Command::SetCanvasRect { rect } => {
                let usable = [rect.left, rect.top, rect.width, rect.height]
                    .iter()
                    .all(|v| v.is_finite())
                    && rect.width > 0.0
                    && rect.height > 0.0;
                if usable {
                    self.canvas_rect = Some(rect);
                } else {
                    log::warn!("Ignoring unusable canvas rect {:?}", rect);
                }
                Update::Nothing
            }
            Command::PointerDown { x, y } => {
                let at = self.viewport().client_to_canvas(x, y);
                self.pointer_down(at)
            }
            Command::PointerMove { x, y } => {
                let at = self.viewport().client_to_canvas(x, y);
                self.pointer_move(at)
            }
            Command::PointerUp { x, y } => {
                let at = self.viewport().client_to_canvas(x, y);
                self.pointer_up(at)
            }
            Command::ConfirmText {
                text,
                font_size,
                bold,
                italic,
            } => self.confirm_text(text, font_size, bold, italic),
            Command::CancelText => {
                if matches!(self.gesture, Gesture::AwaitingText(_)) {
                    self.gesture = Gesture::Idle;
                    log::debug!("Text prompt cancelled");
                    Update::Discarded
                } else {
                    Update::Nothing
                }
            }
            Command::ApplyCrop => self.apply_crop(),
            Command::CancelCrop => {
                if self.crop.take().is_some() {
                    log::debug!("Crop selection cancelled");
                    Update::Redraw
                } else {
                    Update::Nothing
                }
            }
            Command::Undo => {
                if self.history.can_undo() {
                    self.history.undo();
                    Update::Redraw
                } else {
                    Update::Nothing
                }
            }
            Command::Redo => {
                if self.history.can_redo() {
                    self.history.redo();
                    Update::Redraw
                } else {
                    Update::Nothing
                }
            }
            Command::Key { key, ctrl, shift } => {
                match handle_key_event(self, &key, Modifiers { ctrl, shift }) {
                    Some(command) => self.dispatch(command),
                    None => Update::Nothing,
                }
            }
            Command::Clear { confirmed } => {
                if !confirmed {
                    log::warn!("Refusing to clear {} layer(s) without confirmation", self.history.len());
                    return Update::Nothing;
                }
                log::info!("Clearing {} layer(s)", self.history.len());
                self.history.clear();
                self.gesture = Gesture::Idle;
                Update::Redraw
            }
        }
    }

    fn select_tool(&mut self, tool: Tool) -> Update {
        let abandoned = self.gesture != Gesture::Idle || self.crop.is_some();
        self.gesture = Gesture::Idle;
        self.crop = None;
        self.tools.active_tool = tool;
        log::debug!("Active tool: {}", tool.name());
        if abandoned {
            Update::Redraw
        } else {
            Update::Nothing
        }
    }

    fn redraw_if_previewing(&self) -> Update {
        match self.gesture {
            Gesture::Anchored { .. } | Gesture::Stroking(_) => Update::Redraw,
            Gesture::Idle | Gesture::AwaitingText(_) => Update::Nothing,
        }
    }

    fn pointer_down(&mut self, at: Point) -> Update {
        // the text prompt is modal
        if matches!(self.gesture, Gesture::AwaitingText(_)) {
            return Update::Nothing;
        }
        match self.tools.active_tool {
            Tool::Select | Tool::Step => Update::Nothing,
            Tool::Arrow | Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Blur => {
                self.gesture = Gesture::Anchored {
                    anchor: at,
                    current: at,
                };
                Update::Redraw
            }
            Tool::Draw | Tool::Highlight => {
                self.gesture = Gesture::Stroking(Vec::new());
                Update::Nothing
            }
            Tool::Text => {
                self.gesture = Gesture::AwaitingText(at);
                Update::PromptText
            }
            Tool::Crop => {
                self.crop = Some(CropSelection::begin(at));
                Update::Redraw
            }
        }
    }

    fn pointer_move(&mut self, at: Point) -> Update {
        match &mut self.gesture {
            Gesture::Anchored { current, .. } => {
                *current = at;
                return Update::Redraw;
            }
            Gesture::Stroking(points) => {
                points.push(at);
                return Update::Redraw;
            }
            Gesture::Idle | Gesture::AwaitingText(_) => {}
        }
        if let Some(crop) = &mut self.crop
            && crop.dragging
        {
            crop.update(at);
            return Update::Redraw;
        }
        Update::Nothing
    }

    fn pointer_up(&mut self, at: Point) -> Update {
        let tool = self.tools.active_tool;
        let color = self.tools.current_color;
        let width = self.tools.stroke_width;

        match std::mem::take(&mut self.gesture) {
            Gesture::Anchored { anchor, .. } => {
                let layer = match tool {
                    Tool::Arrow => Layer::arrow(anchor, at, color, width),
                    Tool::Line => Layer::line(anchor, at, color, width),
                    Tool::Rectangle => Layer::rectangle(anchor, at, color, width),
                    Tool::Circle => Layer::circle(anchor, at, color, width),
                    Tool::Blur => Layer::blur_region(anchor, at),
                    _ => return Update::Redraw,
                };
                self.history.commit(layer);
                Update::Committed
            }
            Gesture::Stroking(points) => {
                if points.len() < 2 {
                    log::debug!("Discarding {} stroke with {} point(s)", tool.name(), points.len());
                    return Update::Discarded;
                }
                let layer = match tool {
                    Tool::Highlight => Layer::highlight(points, color, width),
                    _ => Layer::freehand(points, color, width),
                };
                self.history.commit(layer);
                Update::Committed
            }
            pending @ Gesture::AwaitingText(_) => {
                self.gesture = pending;
                Update::Nothing
            }
            Gesture::Idle => match tool {
                Tool::Step => {
                    let n = self.history.take_step();
                    self.history.commit(Layer::step_marker(at, n, color));
                    Update::Committed
                }
                Tool::Crop => self.finish_crop_drag(at),
                _ => Update::Nothing,
            },
        }
    }

    fn finish_crop_drag(&mut self, at: Point) -> Update {
        let Some(crop) = &mut self.crop else {
            return Update::Nothing;
        };
        if !crop.dragging {
            return Update::Nothing;
        }
        crop.update(at);
        crop.dragging = false;
        if crop.meets_threshold() {
            log::debug!("Crop selection {:?} awaiting confirmation", crop.bounds());
            Update::ConfirmCrop
        } else {
            log::debug!("Discarding crop selection below threshold");
            self.crop = None;
            Update::Discarded
        }
    }

    /// Change the zoom, scaling a reported canvas rect along until the host measures it again
    fn rezoom(&mut self, apply: impl FnOnce(&mut ToolState)) -> Update {
        let before = self.tools.zoom_factor;
        apply(&mut self.tools);
        let ratio = self.tools.zoom_factor / before;
        if let Some(rect) = &mut self.canvas_rect {
            rect.width *= ratio;
            rect.height *= ratio;
        }
        Update::Redraw
    }

    fn confirm_text(
        &mut self,
        text: String,
        font_size: Option<f32>,
        bold: bool,
        italic: bool,
    ) -> Update {
        let Gesture::AwaitingText(at) = self.gesture else {
            return Update::Nothing;
        };
        self.gesture = Gesture::Idle;
        if text.trim().is_empty() {
            log::debug!("Discarding empty text");
            return Update::Discarded;
        }
        let size = font_size
            .and_then(text_metrics::font_size)
            .unwrap_or(self.tools.font_size);
        self.history.commit(Layer::text(
            at,
            text,
            self.tools.current_color,
            size,
            bold,
            italic,
        ));
        Update::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::BaseImage;
    use crate::config::{EditorConfig, ShapeColor};
    use crate::domain::{ClientRect, RectLayer, StepLayer, StrokeLayer, TextLayer};
    use image::RgbaImage;

    fn session() -> EditorSession {
        let base = BaseImage::new(RgbaImage::new(200, 200));
        EditorSession::new(base, &EditorConfig::default())
    }

    fn drag(session: &mut EditorSession, from: (f32, f32), to: (f32, f32)) -> Update {
        session.dispatch(Command::PointerDown {
            x: from.0,
            y: from.1,
        });
        session.dispatch(Command::PointerMove { x: to.0, y: to.1 });
        session.dispatch(Command::PointerUp { x: to.0, y: to.1 })
    }

    fn select(session: &mut EditorSession, tool: Tool) {
        session.dispatch(Command::SelectTool { tool });
    }

    fn click(session: &mut EditorSession, x: f32, y: f32) -> Update {
        session.dispatch(Command::PointerDown { x, y });
        session.dispatch(Command::PointerUp { x, y })
    }

    fn step_numbers(session: &EditorSession) -> Vec<u32> {
        session
            .visible_layers()
            .filter_map(|layer| match layer {
                Layer::StepMarker(StepLayer {
                    sequence_number, ..
                }) => Some(*sequence_number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rectangle_drag_commits_normalized_shape() {
        let mut session = session();
        select(&mut session, Tool::Rectangle);
        session.dispatch(Command::SetColor {
            color: ShapeColor::from_rgb_u8(0, 0, 255),
        });
        assert_eq!(drag(&mut session, (50.0, 40.0), (10.0, 20.0)), Update::Committed);

        let layers: Vec<_> = session.visible_layers().cloned().collect();
        assert_eq!(
            layers,
            vec![Layer::Rectangle(RectLayer {
                x: 10.0,
                y: 20.0,
                w: 40.0,
                h: 20.0,
                color: ShapeColor::from_rgb_u8(0, 0, 255),
                stroke_width: 3.0,
            })]
        );
    }

    #[test]
    fn test_zero_area_shape_still_commits() {
        let mut session = session();
        select(&mut session, Tool::Blur);
        assert_eq!(click(&mut session, 30.0, 30.0), Update::Committed);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_shape_preview_follows_pointer() {
        let mut session = session();
        select(&mut session, Tool::Line);
        session.dispatch(Command::PointerDown { x: 0.0, y: 0.0 });
        session.dispatch(Command::PointerMove { x: 5.0, y: 5.0 });
        assert!(matches!(session.preview_layer(), Some(Layer::Line(_))));
        assert_eq!(session.history().len(), 0);
    }

    #[test]
    fn test_stroke_needs_two_points() {
        let mut session = session();
        select(&mut session, Tool::Draw);
        assert_eq!(click(&mut session, 10.0, 10.0), Update::Discarded);

        session.dispatch(Command::PointerDown { x: 10.0, y: 10.0 });
        session.dispatch(Command::PointerMove { x: 11.0, y: 10.0 });
        assert_eq!(
            session.dispatch(Command::PointerUp { x: 11.0, y: 10.0 }),
            Update::Discarded
        );
        assert!(session.history().is_empty());

        select(&mut session, Tool::Highlight);
        session.dispatch(Command::PointerDown { x: 10.0, y: 10.0 });
        for x in [11.0, 12.0, 13.0] {
            session.dispatch(Command::PointerMove { x, y: 10.0 });
        }
        assert!(matches!(session.preview_layer(), Some(Layer::Highlight(_))));
        assert_eq!(
            session.dispatch(Command::PointerUp { x: 13.0, y: 10.0 }),
            Update::Committed
        );
        let Some(Layer::Highlight(StrokeLayer { points, .. })) = session.visible_layers().next()
        else {
            panic!("expected a highlight layer");
        };
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_text_prompt_confirm_and_cancel() {
        let mut session = session();
        select(&mut session, Tool::Text);
        assert_eq!(
            session.dispatch(Command::PointerDown { x: 15.0, y: 25.0 }),
            Update::PromptText
        );
        // pointer input is ignored while the prompt is open
        assert_eq!(
            session.dispatch(Command::PointerDown { x: 90.0, y: 90.0 }),
            Update::Nothing
        );
        assert_eq!(
            session.dispatch(Command::ConfirmText {
                text: "Click here".to_string(),
                font_size: Some(32.0),
                bold: true,
                italic: false,
            }),
            Update::Committed
        );
        let Some(Layer::Text(TextLayer {
            x, y, font_size, bold, ..
        })) = session.visible_layers().next()
        else {
            panic!("expected a text layer");
        };
        assert_eq!((*x, *y, *font_size, *bold), (15.0, 25.0, 32.0, true));

        session.dispatch(Command::PointerDown { x: 50.0, y: 50.0 });
        assert_eq!(session.dispatch(Command::CancelText), Update::Discarded);
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.dispatch(Command::ConfirmText {
                text: "late".to_string(),
                font_size: None,
                bold: false,
                italic: false,
            }),
            Update::Nothing
        );
    }

    #[test]
    fn test_huge_font_size_is_clamped_and_renders() {
        let mut session = session();
        select(&mut session, Tool::Text);
        session.dispatch(Command::PointerDown { x: 5.0, y: 5.0 });
        session.dispatch(Command::ConfirmText {
            text: "Hello world".to_string(),
            font_size: Some(60_000.0),
            bold: false,
            italic: false,
        });
        let Some(Layer::Text(TextLayer { font_size, .. })) = session.visible_layers().next() else {
            panic!("expected a text layer");
        };
        assert_eq!(*font_size, text_metrics::MAX_FONT_SIZE);

        let renderer = crate::render::Renderer::from_config(&EditorConfig::default());
        let out = session.snapshot().flatten(&renderer).unwrap();
        assert_eq!(out.dimensions(), (session.base().width(), session.base().height()));
    }

    #[test]
    fn test_step_counter_does_not_rewind_on_undo() {
        let mut session = session();
        select(&mut session, Tool::Step);
        for i in 0..3 {
            click(&mut session, 20.0 * i as f32, 10.0);
        }
        assert_eq!(step_numbers(&session), vec![1, 2, 3]);

        session.dispatch(Command::Undo);
        session.dispatch(Command::Undo);
        click(&mut session, 100.0, 100.0);
        assert_eq!(step_numbers(&session), vec![1, 3]);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut session = session();
        select(&mut session, Tool::Step);
        click(&mut session, 10.0, 10.0);
        click(&mut session, 20.0, 10.0);

        assert_eq!(
            session.dispatch(Command::Clear { confirmed: false }),
            Update::Nothing
        );
        assert_eq!(session.history().len(), 2);

        assert_eq!(
            session.dispatch(Command::Clear { confirmed: true }),
            Update::Redraw
        );
        assert!(session.history().is_empty());
        click(&mut session, 10.0, 10.0);
        assert_eq!(step_numbers(&session), vec![1]);
    }

    #[test]
    fn test_pointer_is_mapped_through_zoom() {
        let mut session = session();
        select(&mut session, Tool::Step);
        session.dispatch(Command::SetZoom { zoom: 2.0 });
        click(&mut session, 100.0, 100.0);

        let Some(Layer::StepMarker(StepLayer { x, y, .. })) = session.visible_layers().next()
        else {
            panic!("expected a step marker");
        };
        assert_eq!((*x, *y), (50.0, 50.0));
    }

    #[test]
    fn test_pointer_is_mapped_through_measured_rect() {
        let mut session = session();
        select(&mut session, Tool::Step);
        // 200px canvas fitted into 128 client pixels
        session.dispatch(Command::SetCanvasRect {
            rect: ClientRect {
                left: 10.0,
                top: 20.0,
                width: 128.0,
                height: 128.0,
            },
        });
        click(&mut session, 74.0, 84.0);
        // zooming scales the reported rect until the host measures again
        session.dispatch(Command::SetZoom { zoom: 2.0 });
        click(&mut session, 138.0, 148.0);
        // a collapsed rect is ignored
        session.dispatch(Command::SetCanvasRect {
            rect: ClientRect::default(),
        });
        click(&mut session, 10.0, 20.0);

        let points: Vec<_> = session
            .visible_layers()
            .filter_map(|layer| match layer {
                Layer::StepMarker(StepLayer { x, y, .. }) => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![(100.0, 100.0), (100.0, 100.0), (0.0, 0.0)]);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut session = session();
        for _ in 0..40 {
            session.dispatch(Command::ZoomIn);
        }
        assert_eq!(session.tools().zoom_factor, crate::domain::MAX_ZOOM);
        for _ in 0..80 {
            session.dispatch(Command::ZoomOut);
        }
        assert_eq!(session.tools().zoom_factor, crate::domain::MIN_ZOOM);
        session.dispatch(Command::ZoomReset);
        assert_eq!(session.tools().zoom_factor, 1.0);
    }

    #[test]
    fn test_switching_tools_abandons_gesture() {
        let mut session = session();
        select(&mut session, Tool::Arrow);
        session.dispatch(Command::PointerDown { x: 0.0, y: 0.0 });
        assert_eq!(
            session.dispatch(Command::SelectTool { tool: Tool::Crop }),
            Update::Redraw
        );
        assert_eq!(session.gesture(), &Gesture::Idle);
        session.dispatch(Command::PointerUp { x: 50.0, y: 50.0 });
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_key_commands_go_through_shortcuts() {
        let mut session = session();
        session.dispatch(Command::Key {
            key: "8".to_string(),
            ctrl: false,
            shift: false,
        });
        assert_eq!(session.tools().active_tool, Tool::Step);
        click(&mut session, 10.0, 10.0);
        assert_eq!(
            session.dispatch(Command::Key {
                key: "z".to_string(),
                ctrl: true,
                shift: false,
            }),
            Update::Redraw
        );
        assert!(session.visible_layers().next().is_none());
    }

    #[test]
    fn test_select_tool_is_inert() {
        let mut session = session();
        select(&mut session, Tool::Select);
        assert_eq!(drag(&mut session, (0.0, 0.0), (40.0, 40.0)), Update::Nothing);
        assert!(session.history().is_empty());
    }
}
