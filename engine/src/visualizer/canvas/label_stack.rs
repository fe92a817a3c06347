//! Greedy row stacking for key-event labels
//!
//! Widths are estimated from the character count because placement has to be
//! decided before any text is measured on a rendering surface.

use crate::visualizer::timeline::time_domain::ScaleMapping;
use shared::{EventId, LabelAnchor, LabelsSection, TimeMs};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    pub event_id: EventId,
    pub time: TimeMs,
    pub text: String,
}

/// Padded horizontal extent reserved on a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelExtent {
    pub left: f64,
    pub right: f64,
}

impl LabelExtent {
    /// Touching extents do not overlap.
    pub fn overlaps(&self, other: &LabelExtent) -> bool {
        self.left < other.right && other.left < self.right
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub event_id: EventId,
    pub x: f64,
    pub row: usize,
    pub anchor: LabelAnchor,
    pub extent: LabelExtent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStackPlacer {
    char_width: f64,
    padding: f64,
}

impl Default for LabelStackPlacer {
    fn default() -> Self {
        Self::from_config(&LabelsSection::default())
    }
}

impl LabelStackPlacer {
    pub fn new(char_width: f64, padding: f64) -> Self {
        Self {
            char_width: char_width.max(0.0),
            padding: padding.max(0.0),
        }
    }

    pub fn from_config(labels: &LabelsSection) -> Self {
        Self::new(labels.char_width, labels.padding)
    }

    pub fn estimate_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    /// Rows are unbounded here; capping them to the available height is the
    /// caller's concern.
    pub fn place<S: ScaleMapping>(
        &self,
        candidates: &[LabelCandidate],
        scale: &S,
        chart_width: f64,
    ) -> Vec<LabelPlacement> {
        let mut ordered: Vec<&LabelCandidate> = candidates.iter().collect();
        ordered.sort_by_key(|candidate| (candidate.time, candidate.event_id));

        let mut rows: Vec<Vec<LabelExtent>> = Vec::new();
        let mut placements = Vec::with_capacity(ordered.len());

        for candidate in ordered {
            let x = scale.project(candidate.time);
            let anchor = anchor_for(x, chart_width);
            let extent = self.extent(x, self.estimate_width(&candidate.text), anchor);

            let row = rows
                .iter()
                .position(|reserved| reserved.iter().all(|taken| !taken.overlaps(&extent)))
                .unwrap_or(rows.len());
            if row == rows.len() {
                rows.push(Vec::new());
            }
            rows[row].push(extent);

            placements.push(LabelPlacement {
                event_id: candidate.event_id,
                x,
                row,
                anchor,
                extent,
            });
        }

        placements
    }

    fn extent(&self, x: f64, width: f64, anchor: LabelAnchor) -> LabelExtent {
        let (left, right) = match anchor {
            LabelAnchor::Start => (x, x + width),
            LabelAnchor::Middle => (x - width / 2.0, x + width / 2.0),
            LabelAnchor::End => (x - width, x),
        };
        LabelExtent {
            left: left - self.padding,
            right: right + self.padding,
        }
    }
}

/// Left third → start, right third → end, otherwise middle.
pub fn anchor_for(x: f64, chart_width: f64) -> LabelAnchor {
    let third = chart_width / 3.0;
    if x < third {
        LabelAnchor::Start
    } else if x > chart_width - third {
        LabelAnchor::End
    } else {
        LabelAnchor::Middle
    }
}
