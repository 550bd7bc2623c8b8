//! Mapping from on-screen (CSS pixel) positions to the canvas bitmap grid.

use crate::Point;

/// On-screen box of the canvas element, as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Fixed logical resolution of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitmapSize {
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Converts a client position into bitmap space, undoing any CSS scaling of the canvas.
///
/// A zero-size rect is a caller precondition violation; the result is then non-finite.
/// Positions outside the rect map outside the bitmap and are not clamped.
pub fn map_to_bitmap(client_x: f64, client_y: f64, rect: ClientRect, bitmap: BitmapSize) -> Point {
    let scale_x = bitmap.width / rect.width;
    let scale_y = bitmap.height / rect.height;
    Point {
        x: (client_x - rect.left) * scale_x,
        y: (client_y - rect.top) * scale_y,
    }
}
