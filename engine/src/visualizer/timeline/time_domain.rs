//! Time domain for the visible window and its pixel mapping
//!
//! `TimeDomain` is the clamped [start, end] window, `clamp_domain` keeps any
//! proposed window inside the full dataset extent, and `LinearTimeScale`
//! converts between instants and horizontal pixels.

use serde::Serialize;
use shared::{DurationMs, TimeMs};
use std::fmt;

/// Visible time window. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeDomain {
    start: TimeMs,
    end: TimeMs,
}

impl TimeDomain {
    /// Inverted endpoints are swapped.
    pub fn new(start: TimeMs, end: TimeMs) -> Self {
        TimeDomain {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn point(time: TimeMs) -> Self {
        TimeDomain {
            start: time,
            end: time,
        }
    }

    /// Window of `span` centered on `center`.
    pub fn centered_on(center: TimeMs, span: DurationMs) -> Self {
        let span = span.abs();
        let start = center.sub_duration(DurationMs(span.0 / 2));
        TimeDomain::new(start, start.add_duration(span))
    }

    pub fn start(self) -> TimeMs {
        self.start
    }

    pub fn end(self) -> TimeMs {
        self.end
    }

    pub fn span(self) -> DurationMs {
        self.end.duration_since(self.start)
    }

    pub fn midpoint(self) -> TimeMs {
        TimeMs::midpoint(self.start, self.end)
    }

    pub fn contains(self, time: TimeMs) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn contains_domain(self, other: TimeDomain) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn shifted(self, delta: DurationMs) -> Self {
        TimeDomain {
            start: self.start.add_duration(delta),
            end: self.end.add_duration(delta),
        }
    }
}

impl fmt::Display for TimeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Clamp a proposed window into `bounds`, keeping at least `min_span` unless
/// the bounds themselves are shorter.
pub fn clamp_domain(proposed: TimeDomain, bounds: TimeDomain, min_span: DurationMs) -> TimeDomain {
    clamp_window(proposed.start, proposed.end, bounds, min_span)
}

/// Same as [`clamp_domain`] for a raw, possibly inverted, pair of endpoints.
///
/// The window is translated into the bounds before the minimum span is
/// enforced; enforcing first would collapse every pan that hits an edge.
pub fn clamp_window(
    start: TimeMs,
    end: TimeMs,
    bounds: TimeDomain,
    min_span: DurationMs,
) -> TimeDomain {
    let full_span = bounds.span();
    let proposed_span = end.duration_since(start).abs();
    if proposed_span >= full_span || full_span < min_span {
        return bounds;
    }

    let original_midpoint = TimeMs::midpoint(start, end);
    let (mut start, mut end) = (start, end);

    // Translate, preserving span
    let low = start.min(end);
    let high = start.max(end);
    if low < bounds.start {
        let shift = bounds.start.duration_since(low);
        start = start.add_duration(shift);
        end = end.add_duration(shift);
    } else if high > bounds.end {
        let shift = high.duration_since(bounds.end);
        start = start.sub_duration(shift);
        end = end.sub_duration(shift);
    }

    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    if end.duration_since(start) < min_span {
        let recentered = TimeDomain::centered_on(original_midpoint, min_span);
        start = recentered.start;
        end = recentered.end;
        if start < bounds.start {
            start = bounds.start;
            end = start.add_duration(min_span);
        } else if end > bounds.end {
            end = bounds.end;
            start = end.sub_duration(min_span);
        }
    }

    TimeDomain { start, end }
}

/// Mapping between instants and pixels. Callers stay agnostic to linearity.
pub trait ScaleMapping {
    fn project(&self, time: TimeMs) -> f64;
    fn invert(&self, pixel: f64) -> TimeMs;
}

/// Linear time→pixel scale over a horizontal pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTimeScale {
    domain: TimeDomain,
    range_start: f64,
    range_end: f64,
}

impl LinearTimeScale {
    pub fn new(domain: TimeDomain, range_start: f64, range_end: f64) -> Self {
        LinearTimeScale {
            domain,
            range_start,
            range_end,
        }
    }

    pub fn with_width(domain: TimeDomain, width: f64) -> Self {
        Self::new(domain, 0.0, width)
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    pub fn width(&self) -> f64 {
        self.range_end - self.range_start
    }

    /// Same pixel range, different window.
    pub fn rescaled(&self, domain: TimeDomain) -> Self {
        Self::new(domain, self.range_start, self.range_end)
    }
}

impl ScaleMapping for LinearTimeScale {
    fn project(&self, time: TimeMs) -> f64 {
        let span = self.domain.span().millis();
        if span == 0 {
            return (self.range_start + self.range_end) / 2.0;
        }
        let ratio = time.duration_since(self.domain.start).millis() as f64 / span as f64;
        self.range_start + ratio * self.width()
    }

    fn invert(&self, pixel: f64) -> TimeMs {
        let width = self.width();
        if width == 0.0 {
            return self.domain.midpoint();
        }
        let ratio = (pixel - self.range_start) / width;
        let offset = (ratio * self.domain.span().millis() as f64).round() as i64;
        self.domain.start.add_duration(DurationMs(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> TimeMs {
        TimeMs::from_ymd(year, month, day).unwrap()
    }

    fn min_span() -> DurationMs {
        DurationMs::from_days(30)
    }

    fn decade() -> TimeDomain {
        TimeDomain::new(day(2010, 1, 1), day(2020, 1, 1))
    }

    #[test]
    fn new_swaps_inverted_endpoints() {
        let domain = TimeDomain::new(day(2020, 5, 1), day(2020, 1, 1));
        assert_eq!(domain.start(), day(2020, 1, 1));
        assert_eq!(domain.end(), day(2020, 5, 1));
    }

    #[test]
    fn short_dataset_returns_full_extent() {
        let bounds = TimeDomain::new(day(2020, 1, 10), day(2020, 1, 20));
        let requested = TimeDomain::new(day(2020, 1, 1), day(2020, 1, 31));
        assert_eq!(clamp_domain(requested, bounds, min_span()), bounds);

        let narrow = TimeDomain::new(day(2020, 1, 12), day(2020, 1, 14));
        assert_eq!(clamp_domain(narrow, bounds, min_span()), bounds);
    }

    #[test]
    fn oversized_window_returns_full_extent() {
        let proposed = TimeDomain::new(day(2005, 1, 1), day(2030, 1, 1));
        assert_eq!(clamp_domain(proposed, decade(), min_span()), decade());
    }

    #[test]
    fn edge_pan_translates_without_shrinking() {
        let proposed = TimeDomain::new(day(2009, 1, 1), day(2011, 1, 1));
        let clamped = clamp_domain(proposed, decade(), min_span());
        assert_eq!(clamped.start(), day(2010, 1, 1));
        assert_eq!(clamped.span(), proposed.span());

        let past_end = TimeDomain::new(day(2019, 6, 1), day(2021, 6, 1));
        let clamped = clamp_domain(past_end, decade(), min_span());
        assert_eq!(clamped.end(), day(2020, 1, 1));
        assert_eq!(clamped.span(), past_end.span());
    }

    #[test]
    fn inverted_window_is_swapped_and_kept() {
        let clamped = clamp_window(day(2015, 6, 1), day(2014, 6, 1), decade(), min_span());
        assert_eq!(clamped, TimeDomain::new(day(2014, 6, 1), day(2015, 6, 1)));
    }

    #[test]
    fn narrow_window_is_recentered_on_its_midpoint() {
        let proposed = TimeDomain::new(day(2015, 3, 10), day(2015, 3, 20));
        let clamped = clamp_domain(proposed, decade(), min_span());
        assert_eq!(clamped.span(), min_span());
        assert_eq!(clamped.midpoint(), proposed.midpoint());
    }

    #[test]
    fn narrow_window_at_edge_snaps_to_bound() {
        let proposed = TimeDomain::new(day(2019, 12, 25), day(2019, 12, 31));
        let clamped = clamp_domain(proposed, decade(), min_span());
        assert_eq!(clamped.end(), day(2020, 1, 1));
        assert_eq!(clamped.span(), min_span());

        let degenerate = TimeDomain::point(day(2010, 1, 1));
        let clamped = clamp_domain(degenerate, decade(), min_span());
        assert_eq!(clamped.start(), day(2010, 1, 1));
        assert_eq!(clamped.span(), min_span());
    }

    #[test]
    fn clamped_windows_always_satisfy_invariants() {
        let bounds = decade();
        let base = bounds.start().millis();
        let year = DurationMs::from_days(365).millis();
        let steps = [-3, -1, 0, 1, 2, 5, 9, 10, 12];
        let spans = [0, 1, 10, 29, 30, 31, 200, 3650, 5000];
        for step in steps {
            for span_days in spans {
                let start = TimeMs(base + step * year);
                let end = start.add_duration(DurationMs::from_days(span_days));
                for (a, b) in [(start, end), (end, start)] {
                    let clamped = clamp_window(a, b, bounds, min_span());
                    assert!(clamped.start() <= clamped.end());
                    assert!(bounds.contains_domain(clamped), "{clamped} escapes {bounds}");
                    assert!(clamped.span() >= min_span(), "{clamped} is too narrow");
                }
            }
        }
    }

    #[test]
    fn scale_projects_and_inverts_linearly() {
        let domain = TimeDomain::new(day(2020, 1, 1), day(2020, 1, 11));
        let scale = LinearTimeScale::with_width(domain, 1000.0);
        assert!((scale.project(day(2020, 1, 6)) - 500.0).abs() < 1e-9);
        assert_eq!(scale.invert(100.0), day(2020, 1, 2));
        assert_eq!(scale.invert(0.0), domain.start());
    }

    #[test]
    fn zero_span_scale_projects_to_center() {
        let scale = LinearTimeScale::with_width(TimeDomain::point(day(2020, 1, 1)), 800.0);
        assert_eq!(scale.project(day(1999, 1, 1)), 400.0);
    }
}
