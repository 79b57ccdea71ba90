//! Crop transform
//!
//! Cropping replaces the base image with a sub-region and moves every layer
//! into the new coordinate space. It bypasses the history, so it cannot be
//! undone.

use crate::capture::image::BaseImage;
use crate::domain::{Bounds, Rect};

use super::history::History;
use super::messages::Update;
use super::state::{EditorSession, Gesture};

/// Crop `base` to `selection` and rebase the layers in `history`
///
/// The selection is rounded out to whole pixels and clamped to the image.
/// Layers that end up wholly outside the new canvas are dropped. Returns
/// `None`, leaving `history` untouched, when the selection misses the image.
/// Layers undone before the crop stay undone rather than the cursor being clamped to the last layer.
pub fn crop(base: &BaseImage, history: &mut History, selection: Bounds) -> Option<BaseImage> {
    let rect = Rect::enclosing(
        selection.left,
        selection.top,
        selection.width(),
        selection.height(),
    )
    .intersect(base.rect())?;
    let cropped = base.cropped(rect)?;

    let (dx, dy) = (-(rect.left as f32), -(rect.top as f32));
    let (width, height) = (cropped.width() as f32, cropped.height() as f32);
    let before = history.len();
    history.rebase(|layer| {
        layer.translate(dx, dy);
        layer
            .bounds()
            .is_some_and(|bounds| bounds.intersects_canvas(width, height))
    });

    log::info!(
        "Cropped to {}x{} at ({}, {}), {} of {} layer(s) kept",
        cropped.width(),
        cropped.height(),
        rect.left,
        rect.top,
        history.len(),
        before
    );
    Some(cropped)
}

impl EditorSession {
    /// Apply the pending crop selection, if one is waiting for confirmation
    pub(super) fn apply_crop(&mut self) -> Update {
        let Some(selection) = self.crop.filter(|crop| crop.is_selecting()) else {
            return Update::Nothing;
        };
        self.crop = None;

        match crop(&self.base, &mut self.history, selection.bounds()) {
            Some(base) => {
                // same display scale for the smaller canvas until the host measures again
                if let Some(rect) = &mut self.canvas_rect {
                    rect.width *= base.width() as f32 / self.base.width().max(1) as f32;
                    rect.height *= base.height() as f32 / self.base.height().max(1) as f32;
                }
                self.base = base;
                self.gesture = Gesture::Idle;
                Update::Redraw
            }
            None => {
                log::warn!("Crop selection {:?} lies outside the image", selection.bounds());
                Update::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorConfig, ShapeColor};
    use crate::domain::{ClientRect, Layer, Point, RectLayer, Tool};
    use crate::session::messages::Command;
    use image::RgbaImage;

    fn rectangle(x: f32, y: f32, w: f32, h: f32) -> Layer {
        Layer::rectangle(
            Point::new(x, y),
            Point::new(x + w, y + h),
            ShapeColor::default(),
            2.0,
        )
    }

    fn gradient(width: u32, height: u32) -> BaseImage {
        BaseImage::new(RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([x as u8, y as u8, 0, 255])
        }))
    }

    fn crop_session() -> EditorSession {
        let mut session = EditorSession::new(gradient(200, 200), &EditorConfig::default());
        session.dispatch(Command::SelectTool { tool: Tool::Crop });
        session
    }

    fn drag(session: &mut EditorSession, from: (f32, f32), to: (f32, f32)) -> Update {
        session.dispatch(Command::PointerDown {
            x: from.0,
            y: from.1,
        });
        session.dispatch(Command::PointerMove { x: to.0, y: to.1 });
        session.dispatch(Command::PointerUp { x: to.0, y: to.1 })
    }

    #[test]
    fn test_crop_rebases_and_drops_layers() {
        let base = gradient(200, 200);
        let mut history = History::new();
        history.commit(rectangle(20.0, 20.0, 10.0, 10.0));
        history.commit(rectangle(150.0, 150.0, 10.0, 10.0));

        let selection = Bounds::from_corners(10.0, 10.0, 110.0, 60.0);
        let cropped = crop(&base, &mut history, selection).unwrap();

        assert_eq!((cropped.width(), cropped.height()), (100, 50));
        assert_eq!(cropped.rgba().get_pixel(0, 0).0, [10, 10, 0, 255]);
        let layers: Vec<_> = history.visible_layers().cloned().collect();
        assert_eq!(layers.len(), 1);
        let Layer::Rectangle(RectLayer { x, y, w, h, .. }) = &layers[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!((*x, *y, *w, *h), (10.0, 10.0, 10.0, 10.0));
        assert_eq!(history.history_index(), 0);
    }

    #[test]
    fn test_selection_outside_image_changes_nothing() {
        let base = gradient(50, 50);
        let mut history = History::new();
        history.commit(rectangle(5.0, 5.0, 10.0, 10.0));

        let selection = Bounds::from_corners(100.0, 100.0, 150.0, 150.0);
        assert!(crop(&base, &mut history, selection).is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_small_crop_gesture_is_discarded() {
        let mut session = crop_session();
        assert_eq!(drag(&mut session, (20.0, 20.0), (25.0, 25.0)), Update::Discarded);
        assert!(session.crop_selection().is_none());

        assert_eq!(session.dispatch(Command::ApplyCrop), Update::Nothing);
        assert_eq!(session.base().width(), 200);
    }

    #[test]
    fn test_crop_gesture_apply() {
        let mut session = crop_session();
        session.dispatch(Command::SelectTool {
            tool: Tool::Rectangle,
        });
        drag(&mut session, (20.0, 20.0), (30.0, 30.0));
        session.dispatch(Command::SelectTool { tool: Tool::Crop });

        assert_eq!(drag(&mut session, (110.0, 60.0), (10.0, 10.0)), Update::ConfirmCrop);
        assert!(session.crop_selection().is_some_and(|c| c.is_selecting()));
        assert_eq!(session.dispatch(Command::ApplyCrop), Update::Redraw);

        assert_eq!((session.base().width(), session.base().height()), (100, 50));
        assert!(session.crop_selection().is_none());
        assert_eq!(session.visible_layers().count(), 1);
    }

    #[test]
    fn test_crop_gesture_cancel() {
        let mut session = crop_session();
        assert_eq!(drag(&mut session, (0.0, 0.0), (50.0, 50.0)), Update::ConfirmCrop);
        assert_eq!(session.dispatch(Command::CancelCrop), Update::Redraw);
        assert!(session.crop_selection().is_none());
        assert_eq!(session.dispatch(Command::ApplyCrop), Update::Nothing);
        assert_eq!(session.base().width(), 200);
    }

    #[test]
    fn test_selection_is_clamped_to_image() {
        let mut session = crop_session();
        assert_eq!(drag(&mut session, (150.0, 150.0), (260.0, 240.0)), Update::ConfirmCrop);
        session.dispatch(Command::ApplyCrop);
        assert_eq!((session.base().width(), session.base().height()), (50, 50));
    }

    #[test]
    fn test_crop_keeps_display_scale_of_measured_rect() {
        let mut session = crop_session();
        session.dispatch(Command::SetCanvasRect {
            rect: ClientRect {
                left: 0.0,
                top: 0.0,
                width: 100.0,
                height: 100.0,
            },
        });
        assert_eq!(drag(&mut session, (75.0, 75.0), (125.0, 125.0)), Update::ConfirmCrop);
        session.dispatch(Command::ApplyCrop);

        assert_eq!((session.base().width(), session.base().height()), (50, 50));
        let viewport = session.viewport();
        assert_eq!((viewport.rect.width, viewport.rect.height), (25.0, 25.0));
        assert_eq!(viewport.scale(), (2.0, 2.0));
    }
}
