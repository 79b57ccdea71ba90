//! Editor session state
//!
//! One `EditorSession` is the whole document: the base image, its layer
//! history and the toolbar state. Nothing here is global, so several
//! sessions can live side by side.

use image::RgbaImage;

use crate::capture::image::BaseImage;
use crate::config::EditorConfig;
use crate::domain::{Bounds, CaptureMeta, ClientRect, Layer, Point, Tool, ToolState, Viewport};
use crate::error::Result;
use crate::render::{DisplaySurface, Renderer, Surface, draw_crop_overlay};

use super::history::History;

/// Minimum width and height of a crop selection, in BaseImage pixels
pub const CROP_THRESHOLD: f32 = 10.0;

/// Pointer gesture in progress for the active tool
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Two-point tools between pointer-down and pointer-up
    Anchored { anchor: Point, current: Point },
    /// Freehand or highlighter points collected so far
    Stroking(Vec<Point>),
    /// Text prompt open for this anchor
    AwaitingText(Point),
}

/// Transient crop rectangle, discarded after apply or cancel
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CropSelection {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub active: bool,
    pub dragging: bool,
}

impl CropSelection {
    pub fn begin(at: Point) -> Self {
        Self {
            start_x: at.x,
            start_y: at.y,
            end_x: at.x,
            end_y: at.y,
            active: true,
            dragging: true,
        }
    }

    pub fn update(&mut self, to: Point) {
        self.end_x = to.x;
        self.end_y = to.y;
    }

    /// Normalized selection rectangle
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.start_x, self.start_y, self.end_x, self.end_y)
    }

    /// Whether the selection is large enough to be deliberate
    pub fn meets_threshold(&self) -> bool {
        let bounds = self.bounds();
        bounds.width() >= CROP_THRESHOLD && bounds.height() >= CROP_THRESHOLD
    }

    /// Released and waiting for apply or cancel
    pub fn is_selecting(&self) -> bool {
        self.active && !self.dragging
    }
}

/// Owned copy of everything an export needs
///
/// Taken synchronously, so commands dispatched while the export encodes
/// cannot change what gets written.
#[derive(Clone, Debug)]
pub struct ExportFrame {
    pub base: BaseImage,
    pub layers: Vec<Layer>,
    pub meta: Option<CaptureMeta>,
}

impl ExportFrame {
    /// Flatten the frame at full resolution
    pub fn flatten(&self, renderer: &Renderer) -> Result<RgbaImage> {
        renderer.render_export(&self.base, &self.layers)
    }

    /// Document title for exports that carry one
    pub fn title(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.title.as_deref())
            .filter(|title| !title.trim().is_empty())
    }
}

/// Annotation document plus the input state driving it
#[derive(Clone, Debug)]
pub struct EditorSession {
    pub(super) base: BaseImage,
    pub(super) history: History,
    pub(super) tools: ToolState,
    pub(super) gesture: Gesture,
    pub(super) crop: Option<CropSelection>,
    /// Last on-screen rect reported by the host
    pub(super) canvas_rect: Option<ClientRect>,
    pub(super) meta: Option<CaptureMeta>,
}

impl EditorSession {
    /// Open a session over a decoded image
    pub fn new(base: BaseImage, config: &EditorConfig) -> Self {
        log::info!(
            "Editor session opened on {}x{} image with the {} tool",
            base.width(),
            base.height(),
            config.initial_tool.name()
        );
        Self {
            base,
            history: History::new(),
            tools: ToolState::from_config(config),
            gesture: Gesture::Idle,
            crop: None,
            canvas_rect: None,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: CaptureMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn base(&self) -> &BaseImage {
        &self.base
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn meta(&self) -> Option<&CaptureMeta> {
        self.meta.as_ref()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn crop_selection(&self) -> Option<&CropSelection> {
        self.crop.as_ref()
    }

    /// Where the canvas currently sits on screen
    ///
    /// Until the host reports a measured rect, the canvas is assumed to sit
    /// at the client origin scaled by the zoom factor.
    pub fn viewport(&self) -> Viewport {
        let (width, height) = (self.base.width(), self.base.height());
        match self.canvas_rect {
            Some(rect) => Viewport::measured(width, height, rect),
            None => Viewport::zoomed(width, height, self.tools.zoom_factor, 0.0, 0.0),
        }
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.history.visible_layers()
    }

    /// Uncommitted layer for the gesture in progress, for live display only
    pub fn preview_layer(&self) -> Option<Layer> {
        let color = self.tools.current_color;
        let width = self.tools.stroke_width;
        match &self.gesture {
            Gesture::Anchored { anchor, current } => match self.tools.active_tool {
                Tool::Arrow => Some(Layer::arrow(*anchor, *current, color, width)),
                Tool::Line => Some(Layer::line(*anchor, *current, color, width)),
                Tool::Rectangle => Some(Layer::rectangle(*anchor, *current, color, width)),
                Tool::Circle => Some(Layer::circle(*anchor, *current, color, width)),
                Tool::Blur => Some(Layer::blur_region(*anchor, *current)),
                _ => None,
            },
            Gesture::Stroking(points) => match self.tools.active_tool {
                Tool::Draw => Some(Layer::freehand(points.clone(), color, width)),
                Tool::Highlight => Some(Layer::highlight(points.clone(), color, width)),
                _ => None,
            },
            Gesture::Idle | Gesture::AwaitingText(_) => None,
        }
    }

    /// Owned copy of the base image and visible layers
    pub fn snapshot(&self) -> ExportFrame {
        ExportFrame {
            base: self.base.clone(),
            layers: self.history.visible_layers().cloned().collect(),
            meta: self.meta.clone(),
        }
    }

    /// Paint the live canvas: committed layers, the preview and the crop overlay
    pub fn render_display(&self, renderer: &Renderer) -> Option<DisplaySurface> {
        let mut surface = DisplaySurface::for_image(&self.base)?;
        let preview = self.preview_layer();
        renderer.render(
            &mut surface,
            &self.base,
            self.history.visible_layers().chain(preview.as_ref()),
        );
        if let Some(crop) = &self.crop
            && crop.active
        {
            draw_crop_overlay(surface.pixmap_mut(), crop.bounds());
        }
        Some(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(width: u32, height: u32) -> EditorSession {
        let base = BaseImage::new(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 200, 200, 255]),
        ));
        EditorSession::new(base, &EditorConfig::default())
    }

    #[test]
    fn test_crop_threshold() {
        let mut crop = CropSelection::begin(Point::new(10.0, 10.0));
        crop.update(Point::new(15.0, 15.0));
        assert!(!crop.meets_threshold());
        crop.update(Point::new(0.0, 30.0));
        assert!(crop.meets_threshold());
        assert_eq!(crop.bounds(), Bounds::from_corners(0.0, 10.0, 10.0, 30.0));
    }

    #[test]
    fn test_viewport_follows_zoom() {
        let mut session = session(1000, 500);
        session.tools.set_zoom(0.5);
        let viewport = session.viewport();
        assert_eq!(viewport.rect.width, 500.0);
        assert_eq!(
            viewport.client_to_canvas(100.0, 100.0),
            Point::new(200.0, 200.0)
        );

        session.canvas_rect = Some(ClientRect {
            left: 8.0,
            top: 16.0,
            width: 640.0,
            height: 320.0,
        });
        assert_eq!(
            session.viewport().client_to_canvas(328.0, 176.0),
            Point::new(500.0, 250.0)
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_commits() {
        let mut session = session(20, 20).with_meta(CaptureMeta {
            title: Some("Example".to_string()),
            ..CaptureMeta::visible(20, 20)
        });
        session.history.commit(Layer::blur_region(
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
        ));
        let frame = session.snapshot();
        session.history.commit(Layer::blur_region(
            Point::new(5.0, 5.0),
            Point::new(9.0, 9.0),
        ));
        session.history.undo();
        session.history.undo();

        assert_eq!(frame.layers.len(), 1);
        assert_eq!(frame.title(), Some("Example"));
    }

    #[test]
    fn test_display_matches_export_without_aids() {
        let mut session = session(40, 30);
        session.history.commit(Layer::rectangle(
            Point::new(5.0, 5.0),
            Point::new(30.0, 20.0),
            session.tools.current_color,
            2.0,
        ));
        let renderer = Renderer::new(crate::render::text::Fonts::none(), &EditorConfig::default());

        // zoom is a display transform and must not reach the pixels
        session.tools.set_zoom(3.0);
        let display = session.render_display(&renderer).unwrap().to_rgba();
        let export = session.snapshot().flatten(&renderer).unwrap();
        assert_eq!(display.dimensions(), (40, 30));
        assert_eq!(display, export);
    }
}
