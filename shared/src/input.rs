//! Folds pointer and touch input into one gesture stream.
//!
//! Browsers fire both pointer and touch events for a finger; the client feeds
//! touch-typed pointer events through the touch path only, so each physical
//! contact is seen once here.

use crate::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub point: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { button: i16, point: Point },
    PointerMove { point: Point },
    PointerUp,
    PointerLeave,
    /// `changed` holds the touches that started with this event.
    TouchStart { changed: Vec<TouchPoint> },
    /// `touches` holds every touch currently on the surface.
    TouchMove { touches: Vec<TouchPoint> },
    /// `changed` holds the touches that ended or were cancelled.
    TouchEnd { changed: Vec<TouchPoint> },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Start(Point),
    Move(Point),
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Source {
    Pointer,
    Touch(i32),
}

#[derive(Debug, Default)]
pub struct GestureTracker {
    source: Option<Source>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.source.is_some()
    }

    /// Whether the browser default (scroll, zoom) must be suppressed for this event.
    pub fn suppresses_default(event: &InputEvent) -> bool {
        matches!(
            event,
            InputEvent::TouchStart { .. }
                | InputEvent::TouchMove { .. }
                | InputEvent::TouchEnd { .. }
        )
    }

    pub fn feed(&mut self, event: InputEvent) -> Option<Gesture> {
        match event {
            InputEvent::PointerDown { button, point } => {
                if button != 0 || self.source.is_some() {
                    return None;
                }
                self.source = Some(Source::Pointer);
                Some(Gesture::Start(point))
            }
            InputEvent::PointerMove { point } => match self.source {
                Some(Source::Pointer) => Some(Gesture::Move(point)),
                _ => None,
            },
            InputEvent::PointerUp | InputEvent::PointerLeave => match self.source {
                Some(Source::Pointer) => {
                    self.source = None;
                    Some(Gesture::End)
                }
                _ => None,
            },
            InputEvent::TouchStart { changed } => {
                if self.source.is_some() {
                    return None;
                }
                let first = changed.first()?;
                self.source = Some(Source::Touch(first.id));
                Some(Gesture::Start(first.point))
            }
            InputEvent::TouchMove { touches } => {
                let Some(Source::Touch(id)) = self.source else {
                    return None;
                };
                touches
                    .iter()
                    .find(|touch| touch.id == id)
                    .map(|touch| Gesture::Move(touch.point))
            }
            InputEvent::TouchEnd { changed } => {
                let Some(Source::Touch(id)) = self.source else {
                    return None;
                };
                if !changed.iter().any(|touch| touch.id == id) {
                    return None;
                }
                self.source = None;
                Some(Gesture::End)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: i32, x: f64, y: f64) -> TouchPoint {
        TouchPoint {
            id,
            point: Point::new(x, y),
        }
    }

    #[test]
    fn pointer_press_drag_release() {
        let mut tracker = GestureTracker::new();
        let start = tracker.feed(InputEvent::PointerDown {
            button: 0,
            point: Point::new(1.0, 2.0),
        });
        assert_eq!(start, Some(Gesture::Start(Point::new(1.0, 2.0))));
        for i in 0..3 {
            let point = Point::new(i as f64, 0.0);
            assert_eq!(
                tracker.feed(InputEvent::PointerMove { point }),
                Some(Gesture::Move(point))
            );
        }
        assert_eq!(tracker.feed(InputEvent::PointerUp), Some(Gesture::End));
        assert_eq!(tracker.feed(InputEvent::PointerUp), None);
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn hover_and_secondary_buttons_are_ignored() {
        let mut tracker = GestureTracker::new();
        assert_eq!(
            tracker.feed(InputEvent::PointerMove {
                point: Point::new(3.0, 3.0)
            }),
            None
        );
        assert_eq!(
            tracker.feed(InputEvent::PointerDown {
                button: 2,
                point: Point::new(3.0, 3.0)
            }),
            None
        );
        assert_eq!(tracker.feed(InputEvent::PointerLeave), None);
    }

    #[test]
    fn leave_ends_an_active_press_once() {
        let mut tracker = GestureTracker::new();
        tracker.feed(InputEvent::PointerDown {
            button: 0,
            point: Point::default(),
        });
        assert_eq!(tracker.feed(InputEvent::PointerLeave), Some(Gesture::End));
        assert_eq!(tracker.feed(InputEvent::PointerUp), None);
    }

    #[test]
    fn only_first_touch_is_tracked() {
        let mut tracker = GestureTracker::new();
        let start = tracker.feed(InputEvent::TouchStart {
            changed: vec![touch(7, 10.0, 10.0)],
        });
        assert_eq!(start, Some(Gesture::Start(Point::new(10.0, 10.0))));

        assert_eq!(
            tracker.feed(InputEvent::TouchStart {
                changed: vec![touch(8, 50.0, 50.0)],
            }),
            None
        );
        assert_eq!(
            tracker.feed(InputEvent::TouchMove {
                touches: vec![touch(8, 60.0, 60.0), touch(7, 12.0, 14.0)],
            }),
            Some(Gesture::Move(Point::new(12.0, 14.0)))
        );
        assert_eq!(
            tracker.feed(InputEvent::TouchEnd {
                changed: vec![touch(8, 60.0, 60.0)],
            }),
            None
        );
        assert_eq!(
            tracker.feed(InputEvent::TouchEnd {
                changed: vec![touch(7, 12.0, 14.0)],
            }),
            Some(Gesture::End)
        );
    }

    #[test]
    fn pointer_input_is_ignored_during_touch_gesture() {
        let mut tracker = GestureTracker::new();
        tracker.feed(InputEvent::TouchStart {
            changed: vec![touch(1, 0.0, 0.0)],
        });
        assert_eq!(
            tracker.feed(InputEvent::PointerDown {
                button: 0,
                point: Point::default()
            }),
            None
        );
        assert_eq!(tracker.feed(InputEvent::PointerUp), None);
        assert!(tracker.is_tracking());
    }

    #[test]
    fn touch_events_suppress_default() {
        assert!(GestureTracker::suppresses_default(&InputEvent::TouchMove {
            touches: Vec::new()
        }));
        assert!(!GestureTracker::suppresses_default(&InputEvent::PointerUp));
    }
}
