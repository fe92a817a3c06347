//! Marker geometry cache
//!
//! Keeps the offsets from the last relaxation so a pan or a sub-threshold
//! zoom only reprojects (x = ideal x + cached offset, y untouched) instead of
//! running the physics again.

use super::collision_layout::{CollisionLayoutEngine, LayoutBand};
use crate::visualizer::timeline::time_domain::{ScaleMapping, TimeDomain};
use indexmap::IndexMap;
use shared::{EventId, TimeMs};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedMarker {
    pub event_id: EventId,
    pub time: TimeMs,
    /// Displacement absorbed by collision resolution.
    pub offset_x: f64,
    pub x: f64,
    pub y: f64,
}

/// Layout state for the visible set, in paint order.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    markers: IndexMap<EventId, CachedMarker>,
    packed_domain: Option<TimeDomain>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, event_id: EventId) -> Option<&CachedMarker> {
        self.markers.get(&event_id)
    }

    pub fn markers(&self) -> impl Iterator<Item = &CachedMarker> {
        self.markers.values()
    }

    /// Domain the cached offsets were relaxed for.
    pub fn packed_domain(&self) -> Option<TimeDomain> {
        self.packed_domain
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.packed_domain = None;
    }

    /// Full relaxation of `visible`, replacing every cached entry.
    pub fn repack<S: ScaleMapping>(
        &mut self,
        visible: &[(EventId, TimeMs)],
        scale: &S,
        domain: TimeDomain,
        engine: &CollisionLayoutEngine,
        band: LayoutBand,
        radius: f64,
    ) {
        let times: Vec<TimeMs> = visible.iter().map(|(_, time)| *time).collect();
        let positions = engine.layout(&times, scale, band, radius);

        self.markers = visible
            .iter()
            .zip(positions)
            .map(|((event_id, time), position)| {
                let marker = CachedMarker {
                    event_id: *event_id,
                    time: *time,
                    offset_x: position.offset_x,
                    x: scale.project(*time) + position.offset_x,
                    y: position.y,
                };
                (*event_id, marker)
            })
            .collect();
        self.packed_domain = Some(domain);
        log::debug!("repacked {} markers for {}", self.markers.len(), domain);
    }

    /// Reapply cached offsets to a new scale. O(N), no relaxation.
    pub fn reproject<S: ScaleMapping>(&mut self, scale: &S) {
        for marker in self.markers.values_mut() {
            marker.x = scale.project(marker.time) + marker.offset_x;
        }
    }

    /// Topmost marker (last painted) whose circle contains the point.
    pub fn marker_at(&self, x: f64, y: f64, radius: f64) -> Option<EventId> {
        self.markers
            .values()
            .rev()
            .find(|marker| (marker.x - x).powi(2) + (marker.y - y).powi(2) <= radius * radius)
            .map(|marker| marker.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::timeline::time_domain::LinearTimeScale;
    use shared::DurationMs;

    fn day(offset: i64) -> TimeMs {
        TimeMs::from_ymd(2020, 1, 1)
            .unwrap()
            .add_duration(DurationMs::from_days(offset))
    }

    fn domain(start_day: i64) -> TimeDomain {
        TimeDomain::new(day(start_day), day(start_day + 100))
    }

    fn packed_cache(visible: &[(EventId, TimeMs)]) -> (GeometryCache, LinearTimeScale) {
        let scale = LinearTimeScale::with_width(domain(0), 1000.0);
        let mut cache = GeometryCache::new();
        cache.repack(
            visible,
            &scale,
            domain(0),
            &CollisionLayoutEngine::default(),
            LayoutBand::new(100.0, 0.0, 200.0),
            8.0,
        );
        (cache, scale)
    }

    fn clustered() -> Vec<(EventId, TimeMs)> {
        vec![
            (EventId(0), day(40)),
            (EventId(1), day(40)),
            (EventId(2), day(41)),
            (EventId(3), day(70)),
        ]
    }

    #[test]
    fn pan_keeps_offsets_and_shifts_x_by_pan_delta() {
        let (mut cache, _) = packed_cache(&clustered());
        let before: Vec<CachedMarker> = cache.markers().copied().collect();

        // 3 days later at 10px per day moves everything 30px left
        let panned = LinearTimeScale::with_width(domain(3), 1000.0);
        cache.reproject(&panned);

        for (old, new) in before.iter().zip(cache.markers()) {
            assert_eq!(old.offset_x, new.offset_x);
            assert_eq!(old.y, new.y);
            assert!((old.x - 30.0 - new.x).abs() < 1e-6);
        }
        assert_eq!(cache.packed_domain(), Some(domain(0)));
    }

    #[test]
    fn repack_replaces_the_visible_set() {
        let (mut cache, scale) = packed_cache(&clustered());
        assert_eq!(cache.len(), 4);

        let smaller = vec![(EventId(3), day(70))];
        cache.repack(
            &smaller,
            &scale,
            domain(0),
            &CollisionLayoutEngine::default(),
            LayoutBand::new(100.0, 0.0, 200.0),
            8.0,
        );
        assert_eq!(cache.len(), 1);
        assert!(cache.get(EventId(0)).is_none());
        let marker = cache.get(EventId(3)).unwrap();
        assert_eq!(marker.offset_x, 0.0);
        assert!((marker.x - 700.0).abs() < 1e-6);
    }

    #[test]
    fn hit_test_prefers_last_painted_marker() {
        let (cache, _) = packed_cache(&clustered());
        let lonely = cache.get(EventId(3)).unwrap();
        assert_eq!(cache.marker_at(lonely.x + 3.0, lonely.y, 8.0), Some(EventId(3)));
        assert_eq!(cache.marker_at(lonely.x + 30.0, lonely.y, 8.0), None);
    }

    #[test]
    fn empty_repack_is_well_formed() {
        let (cache, _) = packed_cache(&[]);
        assert!(cache.is_empty());
        assert_eq!(cache.marker_at(0.0, 0.0, 8.0), None);
    }
}
