//! Widget session: gesture state, request sequencing and the display state machine.
//!
//! All transitions go through [`Session::apply`], which returns the side effects
//! the host must carry out in order.

use crate::input::Gesture;
use crate::protocol::{ClientError, PredictionResult};
use crate::results::{failure_patch, prediction_patch, BarSet, DisplayState, ResultPatch};
use crate::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureState {
    pub is_active: bool,
    /// Pen position; only meaningful while `is_active`.
    pub last_point: Point,
    /// Set on the first gesture start, reset only by clear.
    pub has_ink: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    GestureStart(Point),
    GestureMove(Point),
    GestureEnd,
    Clear,
    PredictionResolved(RequestSeq, PredictionResult),
    PredictionFailed(RequestSeq, ClientError),
}

impl From<Gesture> for SessionEvent {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Start(point) => SessionEvent::GestureStart(point),
            Gesture::Move(point) => SessionEvent::GestureMove(point),
            Gesture::End => SessionEvent::GestureEnd,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FillBackground,
    DrawSegment { from: Point, to: Point },
    RequestPrediction(RequestSeq),
    Render(ResultPatch),
    ResetResults,
    /// A resolution arrived for a request that is no longer current.
    Discarded(RequestSeq),
}

#[derive(Debug, Default)]
pub struct Session {
    gesture: GestureState,
    display: DisplayState,
    result: Option<PredictionResult>,
    bars: BarSet,
    issued: u64,
    /// Latest request whose answer may still be shown; cleared by `clear`.
    awaiting: Option<RequestSeq>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects to run once at startup.
    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::FillBackground]
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn bars(&self) -> &BarSet {
        &self.bars
    }

    pub fn latest_request(&self) -> Option<RequestSeq> {
        self.awaiting
    }

    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::GestureStart(point) => {
                self.gesture.is_active = true;
                self.gesture.last_point = point;
                self.gesture.has_ink = true;
                Vec::new()
            }
            SessionEvent::GestureMove(point) => {
                if !self.gesture.is_active {
                    return Vec::new();
                }
                let from = std::mem::replace(&mut self.gesture.last_point, point);
                vec![Effect::DrawSegment { from, to: point }]
            }
            SessionEvent::GestureEnd => {
                let was_active = std::mem::replace(&mut self.gesture.is_active, false);
                if !was_active || !self.gesture.has_ink {
                    return Vec::new();
                }
                self.issued += 1;
                let seq = RequestSeq(self.issued);
                self.awaiting = Some(seq);
                vec![Effect::RequestPrediction(seq)]
            }
            SessionEvent::Clear => self.clear(),
            SessionEvent::PredictionResolved(seq, result) => {
                if self.awaiting != Some(seq) {
                    return vec![Effect::Discarded(seq)];
                }
                let patch = prediction_patch(&result, &mut self.bars);
                self.display = patch.state;
                self.result = Some(result);
                vec![Effect::Render(patch)]
            }
            SessionEvent::PredictionFailed(seq, error) => {
                if self.awaiting != Some(seq) {
                    return vec![Effect::Discarded(seq)];
                }
                let patch = failure_patch(&error);
                self.display = patch.state;
                vec![Effect::Render(patch)]
            }
        }
    }

    fn clear(&mut self) -> Vec<Effect> {
        self.gesture.has_ink = false;
        self.display = DisplayState::Empty;
        self.result = None;
        self.bars.clear();
        self.awaiting = None;
        vec![Effect::FillBackground, Effect::ResetResults]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{OFFLINE_LABEL, UNSURE_LABEL};

    fn circle_result() -> PredictionResult {
        PredictionResult {
            prediction: "circle".into(),
            confidence: 0.92,
            probabilities: vec![
                ("circle".into(), 0.92),
                ("square".into(), 0.05),
                ("triangle".into(), 0.03),
            ],
        }
    }

    fn request_seq(effects: &[Effect]) -> RequestSeq {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::RequestPrediction(seq) => Some(*seq),
                _ => None,
            })
            .expect("no request issued")
    }

    fn render_patch(effects: Vec<Effect>) -> ResultPatch {
        match effects.into_iter().next() {
            Some(Effect::Render(patch)) => patch,
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn init_fills_background() {
        assert_eq!(Session::new().init(), vec![Effect::FillBackground]);
    }

    #[test]
    fn press_drag_release_draws_and_requests_once() {
        let mut session = Session::new();
        assert!(session
            .apply(SessionEvent::GestureStart(Point::new(10.0, 10.0)))
            .is_empty());
        let effects = session.apply(SessionEvent::GestureMove(Point::new(40.0, 50.0)));
        assert_eq!(
            effects,
            vec![Effect::DrawSegment {
                from: Point::new(10.0, 10.0),
                to: Point::new(40.0, 50.0)
            }]
        );
        let effects = session.apply(SessionEvent::GestureMove(Point::new(60.0, 50.0)));
        assert_eq!(
            effects,
            vec![Effect::DrawSegment {
                from: Point::new(40.0, 50.0),
                to: Point::new(60.0, 50.0)
            }]
        );
        let effects = session.apply(SessionEvent::GestureEnd);
        assert_eq!(effects, vec![Effect::RequestPrediction(RequestSeq(1))]);
        assert!(session.apply(SessionEvent::GestureEnd).is_empty());
        assert!(session.gesture().has_ink);
        assert!(!session.gesture().is_active);
    }

    #[test]
    fn tap_without_movement_still_predicts() {
        let mut session = Session::new();
        let mut effects = session.apply(SessionEvent::GestureStart(Point::new(5.0, 5.0)));
        effects.extend(session.apply(SessionEvent::GestureEnd));
        assert_eq!(effects, vec![Effect::RequestPrediction(RequestSeq(1))]);
        assert!(session.gesture().has_ink);
    }

    #[test]
    fn moves_outside_a_gesture_are_ignored() {
        let mut session = Session::new();
        assert!(session
            .apply(SessionEvent::GestureMove(Point::new(1.0, 1.0)))
            .is_empty());
    }

    #[test]
    fn resolved_prediction_renders_confident_headline() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
        let patch =
            render_patch(session.apply(SessionEvent::PredictionResolved(seq, circle_result())));
        assert_eq!(patch.headline.text, "circle");
        assert_eq!(patch.confidence, "92.0% confidence");
        assert_eq!(patch.bars.unwrap().create[0].shape, "circle");
        assert_eq!(session.display_state(), DisplayState::Confident);
        assert_eq!(session.result(), Some(&circle_result()));
    }

    #[test]
    fn low_confidence_renders_unsure() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
        let mut result = circle_result();
        result.confidence = 0.3;
        let patch = render_patch(session.apply(SessionEvent::PredictionResolved(seq, result)));
        assert_eq!(patch.headline.text, UNSURE_LABEL);
        assert!(patch.confidence.is_empty());
        assert_eq!(patch.bars.unwrap().create.len(), 3);
        assert_eq!(session.display_state(), DisplayState::Unsure);
    }

    #[test]
    fn transport_failure_renders_offline() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
        let patch = render_patch(session.apply(SessionEvent::PredictionFailed(
            seq,
            ClientError::Transport("network".into()),
        )));
        assert_eq!(patch.headline.text, OFFLINE_LABEL);
        assert_eq!(session.display_state(), DisplayState::Offline);
    }

    #[test]
    fn repeated_predictions_keep_row_count() {
        let mut session = Session::new();
        for _ in 0..3 {
            session.apply(SessionEvent::GestureStart(Point::default()));
            let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
            session.apply(SessionEvent::PredictionResolved(seq, circle_result()));
            assert_eq!(session.bars().len(), 3);
        }
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let first = request_seq(&session.apply(SessionEvent::GestureEnd));
        session.apply(SessionEvent::GestureStart(Point::default()));
        let second = request_seq(&session.apply(SessionEvent::GestureEnd));
        assert!(second > first);

        session.apply(SessionEvent::PredictionResolved(second, circle_result()));
        let mut stale = circle_result();
        stale.prediction = "square".into();
        let effects = session.apply(SessionEvent::PredictionResolved(first, stale));
        assert_eq!(effects, vec![Effect::Discarded(first)]);
        assert_eq!(session.result().unwrap().prediction, "circle");
    }

    #[test]
    fn response_after_clear_is_discarded() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
        session.apply(SessionEvent::Clear);
        let effects = session.apply(SessionEvent::PredictionFailed(seq, ClientError::Endpoint));
        assert_eq!(effects, vec![Effect::Discarded(seq)]);
        assert_eq!(session.display_state(), DisplayState::Empty);
    }

    #[test]
    fn clear_resets_everything_from_any_state() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        let seq = request_seq(&session.apply(SessionEvent::GestureEnd));
        session.apply(SessionEvent::PredictionResolved(seq, circle_result()));

        let effects = session.apply(SessionEvent::Clear);
        assert_eq!(effects, vec![Effect::FillBackground, Effect::ResetResults]);
        assert!(!session.gesture().has_ink);
        assert!(session.bars().is_empty());
        assert!(session.result().is_none());
        assert_eq!(session.display_state(), DisplayState::Empty);
        assert_eq!(session.latest_request(), None);

        let effects = Session::new().apply(SessionEvent::Clear);
        assert_eq!(effects, vec![Effect::FillBackground, Effect::ResetResults]);
    }

    #[test]
    fn clear_mid_gesture_keeps_pen_down() {
        let mut session = Session::new();
        session.apply(SessionEvent::GestureStart(Point::default()));
        session.apply(SessionEvent::Clear);
        assert!(session.gesture().is_active);
        assert!(session.apply(SessionEvent::GestureEnd).is_empty());
    }

    #[test]
    fn gesture_events_convert_from_tracker_output() {
        let point = Point::new(2.0, 3.0);
        assert_eq!(
            SessionEvent::from(Gesture::Start(point)),
            SessionEvent::GestureStart(point)
        );
        assert_eq!(SessionEvent::from(Gesture::End), SessionEvent::GestureEnd);
    }
}
