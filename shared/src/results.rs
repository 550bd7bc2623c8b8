//! Projection of classifier output onto the result panel.
//!
//! The panel is a headline, a confidence line, a divider and one bar row per
//! shape. Rows are identified by [`RowId`] and survive across predictions so the
//! client can animate them in place.

use std::collections::HashMap;

use crate::protocol::{ClientError, PredictionResult};
use crate::CONFIDENCE_THRESHOLD;

pub const UNSURE_LABEL: &str = "not sure yet\u{2026}";
pub const ERROR_LABEL: &str = "error";
pub const OFFLINE_LABEL: &str = "offline";
/// Entrance delay added per rank for freshly created rows.
pub const ROW_STAGGER_SECS: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Empty,
    Unsure,
    Confident,
    Error,
    Offline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Headline {
    pub text: String,
    /// Rendered with the muted "unsure" style.
    pub muted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct BarRow {
    pub id: RowId,
    pub shape: String,
    pub rank: usize,
    /// Bar width and label, in percent with one decimal.
    pub percent: String,
    pub is_top: bool,
    pub delay_secs: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarDiff {
    pub create: Vec<BarRow>,
    pub update: Vec<BarRow>,
    pub remove: Vec<RowId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultPatch {
    pub state: DisplayState,
    pub headline: Headline,
    /// Empty string clears the line.
    pub confidence: String,
    /// `None` leaves the divider as it is.
    pub divider_visible: Option<bool>,
    /// `None` leaves the bar rows as they are.
    pub bars: Option<BarDiff>,
}

/// Shape-name to row mapping that outlives individual predictions.
#[derive(Debug, Default)]
pub struct BarSet {
    rows: HashMap<String, RowId>,
    next_id: u32,
}

impl BarSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_for(&self, shape: &str) -> Option<RowId> {
        self.rows.get(shape).copied()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Diffs a ranked list against the existing rows and adopts it.
    pub fn reconcile(&mut self, ranked: &[(String, f64)]) -> BarDiff {
        let mut diff = BarDiff::default();
        let top = ranked.first().map(|(shape, _)| shape.as_str());
        let mut seen = HashMap::with_capacity(ranked.len());
        for (rank, (shape, probability)) in ranked.iter().enumerate() {
            if seen.contains_key(shape) {
                continue;
            }
            let existing = self.rows.get(shape).copied();
            let id = existing.unwrap_or_else(|| {
                let id = RowId(self.next_id);
                self.next_id += 1;
                id
            });
            seen.insert(shape.clone(), id);
            let row = BarRow {
                id,
                shape: shape.clone(),
                rank,
                percent: format_percent(*probability),
                is_top: Some(shape.as_str()) == top,
                delay_secs: rank as f64 * ROW_STAGGER_SECS,
            };
            if existing.is_some() {
                diff.update.push(row);
            } else {
                diff.create.push(row);
            }
        }
        let mut removed: Vec<RowId> = self
            .rows
            .iter()
            .filter(|(shape, _)| !seen.contains_key(*shape))
            .map(|(_, id)| *id)
            .collect();
        removed.sort();
        diff.remove = removed;
        self.rows = seen;
        diff
    }
}

/// Sorts by probability, highest first. Equal values keep their input order.
pub fn rank_probabilities(probabilities: &[(String, f64)]) -> Vec<(String, f64)> {
    let mut ranked = probabilities.to_vec();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Percent with one decimal, halves rounded away from zero.
pub fn format_percent(value: f64) -> String {
    let tenths = (value * 100.0 * 10.0).round();
    format!("{:.1}", tenths / 10.0)
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{}% confidence", format_percent(confidence))
}

pub fn prediction_patch(result: &PredictionResult, bars: &mut BarSet) -> ResultPatch {
    let unsure = result.confidence < CONFIDENCE_THRESHOLD;
    let (state, headline, confidence) = if unsure {
        (
            DisplayState::Unsure,
            Headline {
                text: UNSURE_LABEL.to_string(),
                muted: true,
            },
            String::new(),
        )
    } else {
        (
            DisplayState::Confident,
            Headline {
                text: result.prediction.clone(),
                muted: false,
            },
            format_confidence(result.confidence),
        )
    };
    let ranked = rank_probabilities(&result.probabilities);
    ResultPatch {
        state,
        headline,
        confidence,
        divider_visible: Some(true),
        bars: Some(bars.reconcile(&ranked)),
    }
}

pub fn failure_patch(error: &ClientError) -> ResultPatch {
    let (state, text) = match error {
        ClientError::Endpoint => (DisplayState::Error, ERROR_LABEL),
        ClientError::Transport(_) => (DisplayState::Offline, OFFLINE_LABEL),
    };
    ResultPatch {
        state,
        headline: Headline {
            text: text.to_string(),
            muted: true,
        },
        confidence: String::new(),
        divider_visible: None,
        bars: None,
    }
}
