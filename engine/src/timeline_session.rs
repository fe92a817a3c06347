//! Timeline session
//!
//! One explicit context object owning everything a timeline view mutates:
//! the record set, filter criteria, viewport, gesture state, layout caches and
//! the active selection. Presentation adapters forward intents here and read
//! back `TimelineFrame`s.

use crate::filter_pipeline;
use crate::visualizer::canvas::axis::axis_ticks;
use crate::visualizer::canvas::collision_layout::{CollisionLayoutEngine, LayoutBand};
use crate::visualizer::canvas::geometry_cache::GeometryCache;
use crate::visualizer::canvas::label_stack::{LabelCandidate, LabelPlacement, LabelStackPlacer};
use crate::visualizer::interaction::gesture::{GestureInput, GestureSession};
use crate::visualizer::timeline::maximum_timeline_range::MaximumTimelineRange;
use crate::visualizer::timeline::time_domain::{LinearTimeScale, TimeDomain};
use crate::visualizer::timeline::viewport_controller::{DomainUpdate, ViewportController};
use serde::Serialize;
use shared::{
    AxisTick, EventId, EventRecord, FilterCriteria, FilterOptions, LabelGeometry, MarkerGeometry,
    TimeMs, TimelineConfig, TimelineEvent, events_from_records,
};

/// Everything needed to paint one frame, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineFrame {
    pub domain: TimeDomain,
    pub ticks: Vec<AxisTick>,
    pub markers: Vec<MarkerGeometry>,
    pub labels: Vec<LabelGeometry>,
}

#[derive(Debug, Clone)]
pub struct TimelineSession {
    config: TimelineConfig,
    events: Vec<TimelineEvent>,
    options: FilterOptions,
    criteria: FilterCriteria,
    visible: Vec<EventId>,
    full_range: MaximumTimelineRange,
    controller: ViewportController,
    gestures: GestureSession,
    scale: LinearTimeScale,
    layout_engine: CollisionLayoutEngine,
    geometry: GeometryCache,
    label_placer: LabelStackPlacer,
    labels: Vec<LabelPlacement>,
    selected: Option<EventId>,
    width: f64,
    height: f64,
}

impl TimelineSession {
    pub fn new(records: Vec<EventRecord>, config: TimelineConfig) -> Self {
        Self::from_events(events_from_records(records), config)
    }

    /// Starts at the full extent with every filter option selected.
    pub fn from_events(events: Vec<TimelineEvent>, config: TimelineConfig) -> Self {
        let options = FilterOptions::from_events(&events);
        let criteria = FilterCriteria::show_everything(&options);
        let full_range = MaximumTimelineRange::from_events(&events);
        let bounds = full_range
            .range
            .unwrap_or_else(|| TimeDomain::point(TimeMs::ZERO));
        let controller = ViewportController::new(bounds, &config.viewport);
        let width = config.canvas.width;
        let height = config.canvas.height;

        let mut session = Self {
            scale: LinearTimeScale::with_width(bounds, width),
            layout_engine: CollisionLayoutEngine::new(config.layout.iterations),
            label_placer: LabelStackPlacer::from_config(&config.labels),
            config,
            events,
            options,
            criteria,
            visible: Vec::new(),
            full_range,
            controller,
            gestures: GestureSession::new(),
            geometry: GeometryCache::new(),
            labels: Vec::new(),
            selected: None,
            width,
            height,
        };
        log::debug!(
            "timeline session with {} events, full extent {}",
            session.events.len(),
            bounds
        );
        session.refilter();
        session.repack();
        session.relabel();
        session
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn event(&self, event_id: EventId) -> Option<&TimelineEvent> {
        self.events.get(event_id.0).filter(|event| event.id == event_id)
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn visible_ids(&self) -> &[EventId] {
        &self.visible
    }

    pub fn domain(&self) -> TimeDomain {
        self.controller.domain()
    }

    /// Full extent of the unfiltered record set.
    pub fn bounds(&self) -> TimeDomain {
        self.controller.bounds()
    }

    pub fn full_range(&self) -> MaximumTimelineRange {
        self.full_range
    }

    pub fn selected(&self) -> Option<EventId> {
        self.selected
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    pub fn labels(&self) -> &[LabelPlacement] {
        &self.labels
    }

    /// A changed visible set always repacks. Labels are matched in their
    /// normalized form, so display-case criteria work as given.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria.normalized();
        self.refilter();
        self.repack();
        self.relabel();
    }

    pub fn set_domain(&mut self, proposed: TimeDomain) -> DomainUpdate {
        let update = self.controller.set_domain(proposed);
        self.apply(update);
        update
    }

    pub fn handle_gesture(&mut self, input: GestureInput) -> DomainUpdate {
        let update = self.gestures.handle(input, &mut self.controller, &self.scale);
        self.apply(update);
        update
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::warn!("ignoring resize to {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
        self.scale = LinearTimeScale::with_width(self.controller.domain(), width);
        self.repack();
        self.relabel();
    }

    /// The previously active event is marked viewed. Returns whether the
    /// selection changed.
    pub fn select(&mut self, event_id: EventId) -> bool {
        if self.selected == Some(event_id) {
            return false;
        }
        if !self.visible.contains(&event_id) {
            log::debug!("ignoring selection of hidden event {:?}", event_id);
            return false;
        }
        if let Some(previous) = self.selected.replace(event_id) {
            if let Some(event) = self.events.get_mut(previous.0) {
                event.mark_viewed();
            }
        }
        true
    }

    pub fn marker_at(&self, x: f64, y: f64) -> Option<EventId> {
        self.geometry.marker_at(x, y, self.config.layout.marker_radius)
    }

    /// Domain, then axis, then markers, then labels; labels read marker y
    /// for their connectors.
    pub fn frame(&self) -> TimelineFrame {
        let domain = self.controller.domain();
        let ticks = axis_ticks(&self.scale);
        let radius = self.config.layout.marker_radius;

        let markers: Vec<MarkerGeometry> = self
            .geometry
            .markers()
            .map(|marker| MarkerGeometry {
                event_id: marker.event_id,
                x: marker.x,
                y: marker.y,
                radius,
                is_key_event: self.event(marker.event_id).is_some_and(|e| e.is_key_event),
                selected: self.selected == Some(marker.event_id),
                viewed: self.event(marker.event_id).is_some_and(|e| e.viewed),
            })
            .collect();

        let max_rows = self.max_label_rows();
        let labels = self
            .labels
            .iter()
            .filter_map(|placement| {
                let marker = self.geometry.get(placement.event_id)?;
                let event = self.event(placement.event_id)?;
                Some(LabelGeometry {
                    event_id: placement.event_id,
                    text: event.title.clone(),
                    x: placement.x,
                    y: self.label_y(placement.row),
                    label_row: placement.row,
                    anchor_mode: placement.anchor,
                    connector_from_y: marker.y,
                    overflow: placement.row >= max_rows,
                })
            })
            .collect();

        TimelineFrame {
            domain,
            ticks,
            markers,
            labels,
        }
    }

    fn apply(&mut self, update: DomainUpdate) {
        match update {
            DomainUpdate::Unchanged => {}
            DomainUpdate::Reproject(domain) => {
                self.scale = self.scale.rescaled(domain);
                self.geometry.reproject(&self.scale);
                self.relabel();
            }
            DomainUpdate::Repack(domain) => {
                self.scale = self.scale.rescaled(domain);
                self.repack();
                self.relabel();
            }
        }
    }

    fn refilter(&mut self) {
        self.visible = filter_pipeline::visible_ids(&self.events, &self.criteria);
    }

    fn repack(&mut self) {
        let visible: Vec<(EventId, TimeMs)> = self
            .visible
            .iter()
            .filter_map(|id| self.event(*id).map(|event| (*id, event.time)))
            .collect();
        let band = self.band();
        let domain = self.controller.domain();
        self.geometry.repack(
            &visible,
            &self.scale,
            domain,
            &self.layout_engine,
            band,
            self.config.layout.marker_radius,
        );
        self.controller.mark_packed();
    }

    fn relabel(&mut self) {
        let candidates: Vec<LabelCandidate> = self
            .visible
            .iter()
            .filter_map(|id| self.event(*id))
            .filter(|event| event.is_key_event)
            .map(|event| LabelCandidate {
                event_id: event.id,
                time: event.time,
                text: event.title.clone(),
            })
            .collect();
        self.labels = self.label_placer.place(&candidates, &self.scale, self.width);

        let max_rows = self.max_label_rows();
        let overflowing = self.labels.iter().filter(|p| p.row >= max_rows).count();
        if overflowing > 0 {
            log::debug!(
                "{} labels beyond the {} rows that fit above the markers",
                overflowing,
                max_rows
            );
        }
    }

    fn plot_height(&self) -> f64 {
        (self.height - self.config.canvas.axis_height).max(0.0)
    }

    fn band(&self) -> LayoutBand {
        let plot_height = self.plot_height();
        let padding = self.config.layout.band_padding;
        LayoutBand::new(
            plot_height * self.config.layout.center_y_ratio,
            padding,
            plot_height - padding,
        )
    }

    /// Rows that fit between the top margin and the top of a centered marker.
    fn max_label_rows(&self) -> usize {
        let labels = &self.config.labels;
        let available =
            self.band().center_y - self.config.layout.marker_radius - labels.top_margin;
        (available / labels.row_height).floor().max(0.0) as usize
    }

    fn label_y(&self, row: usize) -> f64 {
        let labels = &self.config.labels;
        labels.top_margin + (row as f64 + 0.5) * labels.row_height
    }
}
