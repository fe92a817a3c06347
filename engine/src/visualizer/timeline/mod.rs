//! Timeline domain entry point.
//!
//! Exposes the viewport controller together with time-domain utilities and
//! the full-extent computation that bounds every zoom and pan.

pub mod maximum_timeline_range;
pub mod time_domain;
pub mod viewport_controller;

pub use maximum_timeline_range::MaximumTimelineRange;
pub use time_domain::{LinearTimeScale, ScaleMapping, TimeDomain, clamp_domain, clamp_window};
pub use viewport_controller::{
    DomainUpdate, PanDirection, PinchBaseline, ViewportController, ZoomButton,
};
