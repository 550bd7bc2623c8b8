pub mod geometry;
pub mod input;
pub mod protocol;
pub mod results;
pub mod session;

pub use geometry::{map_to_bitmap, BitmapSize, ClientRect};
pub use input::{Gesture, GestureTracker, InputEvent, TouchPoint};
pub use protocol::{decode_response, ClientError, PredictRequest, PredictionResult};
pub use results::{BarDiff, BarRow, BarSet, DisplayState, Headline, ResultPatch, RowId};
pub use session::{Effect, GestureState, RequestSeq, Session, SessionEvent};

pub const CANVAS_BG: &str = "#F7F4EE";
pub const STROKE_COLOR: &str = "#1C1A17";
pub const STROKE_WIDTH: f64 = 22.0;
pub const CONFIDENCE_THRESHOLD: f64 = 0.55;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
