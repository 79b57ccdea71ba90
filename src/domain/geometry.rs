//! Geometric types for BaseImage coordinates

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A point in BaseImage pixel space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Floating point extent of a layer, used for visibility tests
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    /// Bounds spanning two arbitrary corners
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let (left, top, right, bottom) = normalize_rect(x1, y1, x2, y2);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Smallest bounds containing all points, `None` when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::from_corners(first.x, first.y, first.x, first.y);
        for p in points {
            bounds.left = bounds.left.min(p.x);
            bounds.top = bounds.top.min(p.y);
            bounds.right = bounds.right.max(p.x);
            bounds.bottom = bounds.bottom.max(p.y);
        }
        Some(bounds)
    }

    /// Grow the bounds by `amount` on every side
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Check whether any part of the extent lies on a `[0, width) x [0, height)` canvas
    pub fn intersects_canvas(&self, width: f32, height: f32) -> bool {
        self.right >= 0.0 && self.bottom >= 0.0 && self.left < width && self.top < height
    }
}

/// Integer pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole `width x height` image
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Round a float rectangle outwards to whole pixels
    pub fn enclosing(x: f32, y: f32, w: f32, h: f32) -> Self {
        let (min_x, min_y, max_x, max_y) = normalize_rect(x, y, x + w, y + h);
        Self::new(
            min_x.floor() as i32,
            min_y.floor() as i32,
            max_x.ceil() as i32,
            max_y.ceil() as i32,
        )
    }

    /// Grow the rectangle by `amount` pixels on every side
    pub fn inflate(&self, amount: i32) -> Rect {
        Rect {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new((self.width()).unsigned_abs())?;
        let height = NonZeroU32::new((self.height()).unsigned_abs())?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rect_any_direction() {
        assert_eq!(normalize_rect(30.0, 40.0, 10.0, 5.0), (10.0, 5.0, 30.0, 40.0));
        assert_eq!(normalize_rect(1.0, 2.0, 3.0, 4.0), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_bounds_intersects_canvas() {
        let inside = Bounds::from_corners(10.0, 10.0, 20.0, 20.0);
        assert!(inside.intersects_canvas(100.0, 50.0));

        let straddling = Bounds::from_corners(-5.0, -5.0, 2.0, 2.0);
        assert!(straddling.intersects_canvas(100.0, 50.0));

        let below = Bounds::from_corners(140.0, 140.0, 150.0, 150.0);
        assert!(!below.intersects_canvas(100.0, 50.0));

        let left_of = Bounds::from_corners(-30.0, 0.0, -1.0, 10.0);
        assert!(!left_of.intersects_canvas(100.0, 50.0));
    }

    #[test]
    fn test_rect_enclosing_and_intersect() {
        let rect = Rect::enclosing(10.5, 20.2, -5.0, 10.0);
        assert_eq!(rect, Rect::new(5, 20, 11, 31));

        let clipped = rect.intersect(Rect::from_size(8, 100)).unwrap();
        assert_eq!(clipped, Rect::new(5, 20, 8, 31));
        assert!(Rect::new(0, 0, 5, 5).intersect(Rect::new(5, 5, 9, 9)).is_none());
        assert!(Rect::new(3, 3, 3, 9).dimensions().is_none());
    }
}
