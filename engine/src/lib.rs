//! Timeline engine
//!
//! Viewport control, collision-resolving marker layout, label stacking and
//! the filter pipeline, tied together by `TimelineSession`.

pub mod filter_pipeline;
pub mod timeline_session;
pub mod visualizer;

pub use filter_pipeline::{filter_events, visible_ids};
pub use timeline_session::{TimelineFrame, TimelineSession};
pub use visualizer::canvas::{CollisionLayoutEngine, GeometryCache, LabelStackPlacer, LayoutBand};
pub use visualizer::interaction::{GestureInput, GestureSession, PointerId};
pub use visualizer::timeline::{
    DomainUpdate, LinearTimeScale, MaximumTimelineRange, PanDirection, ScaleMapping, TimeDomain,
    ViewportController, ZoomButton, clamp_domain, clamp_window,
};
