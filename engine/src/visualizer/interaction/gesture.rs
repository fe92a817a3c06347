//! Gesture session for pointer, wheel, button and keyboard input
//!
//! Holds the state of one continuous interaction (active pointers, pinch
//! baseline, last pan position) and forwards parsed intents to the
//! `ViewportController`. The state is dropped as soon as every pointer is
//! released so no stale delta leaks into the next gesture.

use crate::visualizer::timeline::time_domain::ScaleMapping;
use crate::visualizer::timeline::viewport_controller::{
    DomainUpdate, PanDirection, PinchBaseline, ViewportController, ZoomButton,
};
use indexmap::IndexMap;

/// Pointers closer than this cannot form a usable pinch.
const MIN_PINCH_DISTANCE_PX: f64 = 1.0;

pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    PointerDown { pointer_id: PointerId, x: f64, y: f64 },
    PointerMove { pointer_id: PointerId, x: f64, y: f64 },
    PointerUp { pointer_id: PointerId },
    PointerCancel { pointer_id: PointerId },
    Wheel { delta: f64, x: f64 },
    ZoomButton(ZoomButton),
    KeyPan { direction: PanDirection, fast: bool },
    FitAll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    start_distance: f64,
    baseline: PinchBaseline,
}

#[derive(Debug, Clone, Default)]
pub struct GestureSession {
    /// Insertion order decides which two pointers form a pinch.
    pointers: IndexMap<PointerId, (f64, f64)>,
    last_pan_x: Option<f64>,
    pinch: Option<PinchState>,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.pointers.is_empty() && self.last_pan_x.is_none() && self.pinch.is_none()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn reset(&mut self) {
        self.pointers.clear();
        self.last_pan_x = None;
        self.pinch = None;
    }

    pub fn handle(
        &mut self,
        input: GestureInput,
        controller: &mut ViewportController,
        scale: &impl ScaleMapping,
    ) -> DomainUpdate {
        match input {
            GestureInput::PointerDown { pointer_id, x, y } => {
                self.pointer_down(pointer_id, x, y, controller, scale);
                DomainUpdate::Unchanged
            }
            GestureInput::PointerMove { pointer_id, x, y } => {
                self.pointer_move(pointer_id, x, y, controller, scale)
            }
            GestureInput::PointerUp { pointer_id } | GestureInput::PointerCancel { pointer_id } => {
                self.pointer_up(pointer_id, controller, scale);
                DomainUpdate::Unchanged
            }
            GestureInput::Wheel { delta, x } => controller.wheel(delta, scale.invert(x)),
            GestureInput::ZoomButton(button) => controller.zoom_button(button),
            GestureInput::KeyPan { direction, fast } => controller.pan_steps(direction, fast),
            GestureInput::FitAll => controller.reset(),
        }
    }

    fn pointer_down(
        &mut self,
        pointer_id: PointerId,
        x: f64,
        y: f64,
        controller: &ViewportController,
        scale: &impl ScaleMapping,
    ) {
        self.pointers.insert(pointer_id, (x, y));
        match self.pointers.len() {
            1 => {
                self.last_pan_x = Some(x);
                self.pinch = None;
            }
            2 => {
                self.last_pan_x = None;
                self.pinch = self.start_pinch(controller, scale);
            }
            _ => {}
        }
    }

    fn start_pinch(
        &self,
        controller: &ViewportController,
        scale: &impl ScaleMapping,
    ) -> Option<PinchState> {
        let (a, b) = self.pinch_pair()?;
        let start_distance = distance(a, b);
        if start_distance < MIN_PINCH_DISTANCE_PX {
            return None;
        }
        let midpoint_x = (a.0 + b.0) / 2.0;
        Some(PinchState {
            start_distance,
            baseline: PinchBaseline {
                anchor: scale.invert(midpoint_x),
                span: controller.domain().span(),
            },
        })
    }

    fn pointer_move(
        &mut self,
        pointer_id: PointerId,
        x: f64,
        y: f64,
        controller: &mut ViewportController,
        scale: &impl ScaleMapping,
    ) -> DomainUpdate {
        let Some(position) = self.pointers.get_mut(&pointer_id) else {
            return DomainUpdate::Unchanged;
        };
        *position = (x, y);

        if let Some(pinch) = self.pinch {
            let Some((a, b)) = self.pinch_pair() else {
                return DomainUpdate::Unchanged;
            };
            let current_distance = distance(a, b);
            if current_distance < MIN_PINCH_DISTANCE_PX {
                return DomainUpdate::Unchanged;
            }
            return controller.pinch_zoom(pinch.start_distance / current_distance, pinch.baseline);
        }

        if self.pointers.len() == 1 {
            if let Some(last_x) = self.last_pan_x.replace(x) {
                return controller.pan_by(x - last_x, scale);
            }
        }
        DomainUpdate::Unchanged
    }

    fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        controller: &ViewportController,
        scale: &impl ScaleMapping,
    ) {
        let Some((index, _, _)) = self.pointers.shift_remove_full(&pointer_id) else {
            return;
        };
        match self.pointers.len() {
            0 => self.reset(),
            1 => {
                // Continue as a pan from where the remaining finger is now
                self.pinch = None;
                self.last_pan_x = self.pointers.values().next().map(|(x, _)| *x);
            }
            _ if index < 2 => {
                // A new pair pinches from the current view and distance
                self.pinch = self.start_pinch(controller, scale);
            }
            _ => {}
        }
    }

    fn pinch_pair(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut positions = self.pointers.values();
        Some((*positions.next()?, *positions.next()?))
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
