//! Viewport control for timeline panning and zooming
//!
//! Owns the active `TimeDomain` and turns pan, wheel, pinch, button and
//! keyboard requests into new clamped domains. Every change reports whether
//! the span moved enough to need a full relayout or only a reprojection.

use super::time_domain::{ScaleMapping, TimeDomain, clamp_domain};
use shared::{DurationMs, TimeMs, ViewportSection};

/// Wheel delta > 0 grows the span by this factor.
pub const WHEEL_SPAN_GROWTH: f64 = 1.1;
/// Wheel delta < 0 shrinks the span by this factor.
pub const WHEEL_SPAN_SHRINK: f64 = 0.9;
/// Faster keyboard panning multiplies the step.
const FAST_PAN_MULTIPLIER: f64 = 3.0;

/// Result of a viewport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainUpdate {
    Unchanged,
    /// Span kept within hysteresis; cached layout offsets stay valid.
    Reproject(TimeDomain),
    /// Span changed beyond hysteresis; relaxation must run again.
    Repack(TimeDomain),
}

impl DomainUpdate {
    pub fn domain(&self) -> Option<TimeDomain> {
        match self {
            DomainUpdate::Unchanged => None,
            DomainUpdate::Reproject(domain) | DomainUpdate::Repack(domain) => Some(*domain),
        }
    }

    pub fn needs_repack(&self) -> bool {
        matches!(self, DomainUpdate::Repack(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomButton {
    In,
    Out,
}

impl ZoomButton {
    /// Zoom factor; the new span is the current span divided by it.
    pub fn factor(self) -> f64 {
        match self {
            ZoomButton::In => 1.25,
            ZoomButton::Out => 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Earlier,
    Later,
}

/// State captured when a pinch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinchBaseline {
    /// Time under the midpoint of both pointers at gesture start.
    pub anchor: TimeMs,
    pub span: DurationMs,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    bounds: TimeDomain,
    domain: TimeDomain,
    min_span: DurationMs,
    span_hysteresis: f64,
    keyboard_pan_fraction: f64,
    /// Span the cached layout was last relaxed for.
    packed_span: DurationMs,
}

impl ViewportController {
    /// Starts zoomed out to `bounds`, the full dataset extent.
    pub fn new(bounds: TimeDomain, settings: &ViewportSection) -> Self {
        Self {
            bounds,
            domain: bounds,
            min_span: settings.min_span(),
            span_hysteresis: settings.span_hysteresis.max(0.0),
            keyboard_pan_fraction: settings.keyboard_pan_fraction,
            packed_span: bounds.span(),
        }
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    pub fn bounds(&self) -> TimeDomain {
        self.bounds
    }

    pub fn min_span(&self) -> DurationMs {
        self.min_span
    }

    pub fn is_at_full_extent(&self) -> bool {
        self.domain.span() >= self.bounds.span()
    }

    /// Record that the layout was relaxed for the current domain, e.g. after
    /// a filter change or a resize.
    pub fn mark_packed(&mut self) {
        self.packed_span = self.domain.span();
    }

    pub fn set_domain(&mut self, proposed: TimeDomain) -> DomainUpdate {
        let next = clamp_domain(proposed, self.bounds, self.min_span);
        self.commit(next)
    }

    /// Fit all: back to the full dataset extent.
    pub fn reset(&mut self) -> DomainUpdate {
        self.commit(self.bounds)
    }

    /// Shift the window by a pixel delta measured on `scale`.
    pub fn pan_by(&mut self, pixel_delta: f64, scale: &impl ScaleMapping) -> DomainUpdate {
        if pixel_delta == 0.0 || !pixel_delta.is_finite() {
            return DomainUpdate::Unchanged;
        }
        let delta = scale.invert(0.0).duration_since(scale.invert(pixel_delta));
        let next = clamp_domain(self.domain.shifted(delta), self.bounds, self.min_span);
        self.commit(next)
    }

    /// Keyboard panning by a fraction of the visible span.
    pub fn pan_steps(&mut self, direction: PanDirection, fast: bool) -> DomainUpdate {
        let mut fraction = self.keyboard_pan_fraction;
        if fast {
            fraction *= FAST_PAN_MULTIPLIER;
        }
        let step = self.domain.span().scale(fraction).millis().max(1);
        let delta = match direction {
            PanDirection::Earlier => DurationMs(-step),
            PanDirection::Later => DurationMs(step),
        };
        let next = clamp_domain(self.domain.shifted(delta), self.bounds, self.min_span);
        self.commit(next)
    }

    /// New span is `current / factor`, centered on `anchor` (default: midpoint).
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<TimeMs>) -> DomainUpdate {
        if !factor.is_finite() || factor <= 0.0 || factor == 1.0 {
            return DomainUpdate::Unchanged;
        }
        if factor < 1.0 && self.is_at_full_extent() {
            log::trace!("zoom out ignored, already at full extent {}", self.bounds);
            return DomainUpdate::Unchanged;
        }
        let new_span = self.domain.span().scale(1.0 / factor);
        let anchor = anchor.unwrap_or_else(|| self.domain.midpoint());
        self.zoom_to_span(new_span, anchor)
    }

    /// Positive delta zooms out, negative zooms in, anchored at the pointer.
    pub fn wheel(&mut self, delta: f64, anchor: TimeMs) -> DomainUpdate {
        if delta == 0.0 || !delta.is_finite() {
            return DomainUpdate::Unchanged;
        }
        let span_growth = if delta > 0.0 {
            WHEEL_SPAN_GROWTH
        } else {
            WHEEL_SPAN_SHRINK
        };
        self.zoom_by(1.0 / span_growth, Some(anchor))
    }

    pub fn zoom_button(&mut self, button: ZoomButton) -> DomainUpdate {
        self.zoom_by(button.factor(), None)
    }

    /// `distance_ratio` is start distance / current distance, so spreading
    /// fingers gives a ratio below one and a narrower window.
    pub fn pinch_zoom(&mut self, distance_ratio: f64, baseline: PinchBaseline) -> DomainUpdate {
        if !distance_ratio.is_finite() || distance_ratio <= 0.0 {
            return DomainUpdate::Unchanged;
        }
        let new_span = baseline.span.scale(distance_ratio);
        if new_span >= self.domain.span() && self.is_at_full_extent() {
            return DomainUpdate::Unchanged;
        }
        self.zoom_to_span(new_span, baseline.anchor)
    }

    fn zoom_to_span(&mut self, new_span: DurationMs, anchor: TimeMs) -> DomainUpdate {
        if new_span < self.min_span && new_span < self.domain.span() {
            log::trace!("zoom to {} rejected, below minimum span {}", new_span, self.min_span);
            return DomainUpdate::Unchanged;
        }
        let proposed = TimeDomain::centered_on(anchor, new_span);
        let next = clamp_domain(proposed, self.bounds, self.min_span);
        self.commit(next)
    }

    fn commit(&mut self, next: TimeDomain) -> DomainUpdate {
        let previous = self.domain;
        if next == previous {
            return DomainUpdate::Unchanged;
        }
        self.domain = next;

        // Measured against the last relaxation so slow zooms cannot drift
        // past the threshold one small step at a time
        if span_changed_significantly(self.packed_span, next.span(), self.span_hysteresis) {
            self.packed_span = next.span();
            log::debug!("viewport {} → {} (repack)", previous, next);
            DomainUpdate::Repack(next)
        } else {
            log::trace!("viewport {} → {} (reproject)", previous, next);
            DomainUpdate::Reproject(next)
        }
    }
}

/// Relative span change beyond `hysteresis`.
pub fn span_changed_significantly(
    previous: DurationMs,
    next: DurationMs,
    hysteresis: f64,
) -> bool {
    if previous.millis() == 0 {
        return next.millis() != 0;
    }
    let delta = (next.millis() - previous.millis()).abs() as f64;
    delta / previous.millis().abs() as f64 > hysteresis
}
