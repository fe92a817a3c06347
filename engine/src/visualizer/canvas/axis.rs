//! Time axis ticks on whole-day steps.

use crate::visualizer::timeline::time_domain::{LinearTimeScale, ScaleMapping};
use shared::{AxisTick, DurationMs, TimeMs};

const TARGET_TICK_SPACING_PX: f64 = 80.0;
const MIN_TICK_COUNT: f64 = 2.0;
const MAX_TICK_COUNT: f64 = 12.0;

/// Ticks aligned to multiples of a nice day step since the epoch, so they
/// stay put while panning.
pub fn axis_ticks(scale: &LinearTimeScale) -> Vec<AxisTick> {
    let domain = scale.domain();
    let span = domain.span();
    let width = scale.width();
    if span.millis() <= 0 || width <= 0.0 {
        return Vec::new();
    }

    let desired_tick_count = (width / TARGET_TICK_SPACING_PX).clamp(MIN_TICK_COUNT, MAX_TICK_COUNT);
    let step_days = round_to_nice_number(span.days() / desired_tick_count).max(1.0);
    let step = DurationMs::from_days(step_days.round() as i64).millis();

    let start = domain.start().millis();
    let mut tick = start.div_euclid(step) * step;
    if tick < start {
        tick += step;
    }

    let mut ticks = Vec::new();
    while tick <= domain.end().millis() {
        let time = TimeMs(tick);
        ticks.push(AxisTick {
            x: scale.project(time),
            time,
            label: time.to_string(),
        });
        tick += step;
    }
    ticks
}

fn round_to_nice_number(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }

    let magnitude = 10_f64.powf(value.log10().floor());
    let normalized = value / magnitude;

    let nice_normalized = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice_normalized * magnitude
}
