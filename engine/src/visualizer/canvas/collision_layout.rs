//! Collision-resolving marker layout
//!
//! Iterative relaxation with three competing forces per marker: a pull to
//! its ideal x (the projected event time), a pull to the band's center line
//! and pairwise repulsion whenever two circles overlap. The loop runs a fixed
//! number of iterations instead of detecting convergence, so the cost is
//! bounded and the result is deterministic for a given input order.

use crate::visualizer::timeline::time_domain::ScaleMapping;
use shared::TimeMs;

pub const DEFAULT_ITERATIONS: usize = 150;

/// Force strength reached on the last iteration, relative to the first.
const ALPHA_MIN: f64 = 0.0001;
const X_STRENGTH: f64 = 1.0;
const Y_STRENGTH: f64 = 0.1;
/// Collision passes per iteration.
const COLLISION_SWEEPS: usize = 4;
/// Closer than this, two centers count as coincident.
const COINCIDENT_DISTANCE: f64 = 1e-9;

/// Relaxed position of one marker relative to its ideal x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPosition {
    pub offset_x: f64,
    pub y: f64,
}

/// Vertical band markers are laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBand {
    pub center_y: f64,
    pub top: f64,
    pub bottom: f64,
}

impl LayoutBand {
    pub fn new(center_y: f64, top: f64, bottom: f64) -> Self {
        Self {
            center_y,
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    pub fn unbounded(center_y: f64) -> Self {
        Self::new(center_y, f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// How many circles of `radius` fit stacked vertically.
    pub fn row_capacity(&self, radius: f64) -> usize {
        if radius <= 0.0 || !self.height().is_finite() {
            return usize::MAX;
        }
        (self.height() / (2.0 * radius)).floor().max(0.0) as usize
    }

    /// Allowed range for circle centers.
    fn center_limits(&self, radius: f64) -> (f64, f64) {
        let low = self.top + radius;
        let high = self.bottom - radius;
        if low <= high {
            (low, high)
        } else {
            (self.center_y, self.center_y)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionLayoutEngine {
    iterations: usize,
}

impl Default for CollisionLayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl CollisionLayoutEngine {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One position per input time, in input order.
    pub fn layout(
        &self,
        times: &[TimeMs],
        scale: &impl ScaleMapping,
        band: LayoutBand,
        radius: f64,
    ) -> Vec<MarkerPosition> {
        let ideal_x: Vec<f64> = times.iter().map(|time| scale.project(*time)).collect();
        match ideal_x.len() {
            0 => return Vec::new(),
            1 => {
                return vec![MarkerPosition {
                    offset_x: 0.0,
                    y: band.center_y,
                }];
            }
            _ => {}
        }

        let mut x = ideal_x.clone();
        let mut y = vec![band.center_y; ideal_x.len()];
        let limits = band.center_limits(radius);
        let min_distance = 2.0 * radius;

        let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / self.iterations as f64);
        let mut alpha = 1.0;

        for _ in 0..self.iterations {
            alpha -= alpha * alpha_decay;
            for i in 0..x.len() {
                x[i] += (ideal_x[i] - x[i]) * X_STRENGTH * alpha;
                y[i] += (band.center_y - y[i]) * Y_STRENGTH * alpha;
            }
            for _ in 0..COLLISION_SWEEPS {
                resolve_collisions(&mut x, &mut y, min_distance, limits);
            }
        }

        x.iter()
            .zip(&ideal_x)
            .zip(&y)
            .map(|((x, ideal), y)| MarkerPosition {
                offset_x: x - ideal,
                y: *y,
            })
            .collect()
    }
}

/// One in-place pass over every pair: overlapping circles are pushed apart
/// along their center line by half the overlap each. Pushes are equal and
/// opposite, so the mean position of a group is preserved.
fn resolve_collisions(x: &mut [f64], y: &mut [f64], min_distance: f64, limits: (f64, f64)) {
    for a in 0..x.len() {
        for b in (a + 1)..x.len() {
            let dx = x[b] - x[a];
            if dx.abs() >= min_distance {
                continue;
            }
            let dy = y[b] - y[a];
            let distance = (dx * dx + dy * dy).sqrt();
            if distance >= min_distance {
                continue;
            }
            // Coincident centers: lower index moves up, higher moves down
            let (ux, uy) = if distance > COINCIDENT_DISTANCE {
                (dx / distance, dy / distance)
            } else {
                (0.0, 1.0)
            };
            let push = (min_distance - distance) / 2.0;
            x[a] -= ux * push;
            x[b] += ux * push;
            y[a] = (y[a] - uy * push).clamp(limits.0, limits.1);
            y[b] = (y[b] + uy * push).clamp(limits.0, limits.1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::timeline::time_domain::{LinearTimeScale, TimeDomain};
    use shared::DurationMs;

    const EPSILON: f64 = 0.01;

    fn scale() -> LinearTimeScale {
        let start = TimeMs::from_ymd(2020, 1, 1).unwrap();
        // 10px per day
        LinearTimeScale::with_width(
            TimeDomain::new(start, start.add_duration(DurationMs::from_days(100))),
            1000.0,
        )
    }

    fn at_day(day: i64) -> TimeMs {
        TimeMs::from_ymd(2020, 1, 1)
            .unwrap()
            .add_duration(DurationMs::from_days(day))
    }

    fn band() -> LayoutBand {
        LayoutBand::new(100.0, 0.0, 200.0)
    }

    fn assert_no_overlap(times: &[TimeMs], positions: &[MarkerPosition], radius: f64) {
        let scale = scale();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let xi = scale.project(times[i]) + positions[i].offset_x;
                let xj = scale.project(times[j]) + positions[j].offset_x;
                let distance = ((xi - xj).powi(2) + (positions[i].y - positions[j].y).powi(2)).sqrt();
                assert!(
                    distance >= 2.0 * radius - EPSILON,
                    "markers {i} and {j} overlap: distance {distance}"
                );
            }
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let engine = CollisionLayoutEngine::default();
        assert!(engine.layout(&[], &scale(), band(), 8.0).is_empty());
    }

    #[test]
    fn single_event_sits_on_center_line() {
        let engine = CollisionLayoutEngine::default();
        let positions = engine.layout(&[at_day(40)], &scale(), band(), 8.0);
        assert_eq!(
            positions,
            vec![MarkerPosition {
                offset_x: 0.0,
                y: 100.0
            }]
        );
    }

    #[test]
    fn three_simultaneous_events_stack_vertically() {
        let engine = CollisionLayoutEngine::default();
        let times = [at_day(50); 3];
        let positions = engine.layout(&times, &scale(), band(), 8.0);

        let ys: Vec<f64> = positions.iter().map(|p| p.y).collect();
        let spread = ys.iter().cloned().fold(f64::MIN, f64::max)
            - ys.iter().cloned().fold(f64::MAX, f64::min);
        assert!(spread >= 16.0);

        let offset_sum: f64 = positions.iter().map(|p| p.offset_x).sum();
        assert!(offset_sum.abs() < 1e-9);
        assert_no_overlap(&times, &positions, 8.0);
    }

    #[test]
    fn stacked_instants_are_symmetric_about_center() {
        let engine = CollisionLayoutEngine::default();
        let times = [at_day(20); 5];
        let positions = engine.layout(&times, &scale(), band(), 8.0);
        let mean_y: f64 = positions.iter().map(|p| p.y).sum::<f64>() / 5.0;
        assert!((mean_y - 100.0).abs() < EPSILON);
        for position in &positions {
            assert!(position.offset_x.abs() < 1e-9);
        }
        assert_no_overlap(&times, &positions, 8.0);
    }

    #[test]
    fn nearby_events_are_pushed_apart_symmetrically() {
        let engine = CollisionLayoutEngine::default();
        // 3px apart at 10px per day
        let times = [at_day(30), at_day(30).add_duration(DurationMs::from_days_f64(0.3))];
        let positions = engine.layout(&times, &scale(), band(), 8.0);
        assert_no_overlap(&times, &positions, 8.0);
        assert!((positions[0].offset_x + positions[1].offset_x).abs() < EPSILON);
    }

    #[test]
    fn separated_events_keep_ideal_positions() {
        let engine = CollisionLayoutEngine::default();
        let times = [at_day(10), at_day(20), at_day(30)];
        let positions = engine.layout(&times, &scale(), band(), 8.0);
        for position in positions {
            assert_eq!(position.offset_x, 0.0);
            assert_eq!(position.y, 100.0);
        }
    }

    #[test]
    fn dense_cluster_resolves_within_capacity() {
        let engine = CollisionLayoutEngine::default();
        let mut times = Vec::new();
        for day in [40, 40, 40, 41, 41, 42] {
            times.push(at_day(day));
        }
        assert!(band().row_capacity(8.0) >= times.len());
        let positions = engine.layout(&times, &scale(), band(), 8.0);
        assert_no_overlap(&times, &positions, 8.0);
    }

    #[test]
    fn layout_is_deterministic() {
        let engine = CollisionLayoutEngine::default();
        let times = [at_day(5), at_day(5), at_day(6), at_day(5)];
        let first = engine.layout(&times, &scale(), band(), 8.0);
        let second = engine.layout(&times, &scale(), band(), 8.0);
        assert_eq!(first, second);
    }

    #[test]
    fn markers_stay_inside_the_band() {
        let engine = CollisionLayoutEngine::default();
        let narrow = LayoutBand::new(20.0, 0.0, 40.0);
        let positions = engine.layout(&[at_day(50); 4], &scale(), narrow, 8.0);
        for position in positions {
            assert!(position.y >= 8.0 - 1e-9 && position.y <= 32.0 + 1e-9);
        }
    }
}
