//! Pointer coordinate mapping between the displayed canvas and BaseImage pixels

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// On-screen bounding rectangle of the canvas element, in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Relation between the canvas' intrinsic pixel size and its displayed rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
    pub rect: ClientRect,
}

impl Viewport {
    /// Canvas of `width x height` pixels displayed at `zoom`, its top-left at `(left, top)`
    pub fn zoomed(width: u32, height: u32, zoom: f32, left: f32, top: f32) -> Self {
        Self {
            intrinsic_width: width,
            intrinsic_height: height,
            rect: ClientRect {
                left,
                top,
                width: width as f32 * zoom,
                height: height as f32 * zoom,
            },
        }
    }

    /// Canvas of `width x height` pixels shown in a measured on-screen `rect`
    pub fn measured(width: u32, height: u32, rect: ClientRect) -> Self {
        Self {
            intrinsic_width: width,
            intrinsic_height: height,
            rect,
        }
    }

    /// Horizontal and vertical factors from display pixels to canvas pixels
    pub fn scale(&self) -> (f32, f32) {
        let axis = |intrinsic: u32, displayed: f32| {
            if displayed > 0.0 {
                intrinsic as f32 / displayed
            } else {
                1.0
            }
        };
        (
            axis(self.intrinsic_width, self.rect.width),
            axis(self.intrinsic_height, self.rect.height),
        )
    }

    /// Map a pointer position in client coordinates into BaseImage pixels
    pub fn client_to_canvas(&self, client_x: f32, client_y: f32) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            (client_x - self.rect.left) * sx,
            (client_y - self.rect.top) * sy,
        )
    }

    /// Map a BaseImage pixel position back to client coordinates
    pub fn canvas_to_client(&self, point: Point) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (
            point.x / sx + self.rect.left,
            point.y / sy + self.rect.top,
        )
    }
}
