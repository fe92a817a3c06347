pub mod axis;
pub mod collision_layout;
pub mod geometry_cache;
pub mod label_stack;

pub use axis::axis_ticks;
pub use collision_layout::{CollisionLayoutEngine, LayoutBand, MarkerPosition};
pub use geometry_cache::{CachedMarker, GeometryCache};
pub use label_stack::{LabelCandidate, LabelExtent, LabelPlacement, LabelStackPlacer, anchor_for};
