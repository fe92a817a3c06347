//! Full dataset extent
//!
//! Computed once from the complete, unfiltered record set. It is the permanent
//! clamp ceiling for every zoom and pan, whatever subset is currently visible.

use super::time_domain::TimeDomain;
use shared::TimelineEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaximumTimelineRange {
    pub range: Option<TimeDomain>,
}

impl MaximumTimelineRange {
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        Self {
            range: Self::compute_range(events),
        }
    }

    /// Pure function computing [earliest, latest] across all events.
    fn compute_range(events: &[TimelineEvent]) -> Option<TimeDomain> {
        let earliest = events.iter().map(|event| event.time).min()?;
        let latest = events.iter().map(|event| event.time).max()?;
        Some(TimeDomain::new(earliest, latest))
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }
}
