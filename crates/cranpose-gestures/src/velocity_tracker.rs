//! Pointer velocity estimation for fling and swipe classification.
//!
//! [`VelocityTracker`] keeps one impulse-strategy tracker per axis for every
//! active pointer. The impulse strategy estimates velocity from the kinetic
//! energy imparted by the touch samples, which is less noisy than a plain
//! least-squares fit for short flicks.

use smallvec::SmallVec;
use web_time::Instant;

use crate::geometry::Velocity;
use crate::motion_event::{MotionAction, MotionEvent, PointerId};

/// Ring buffer size for velocity tracking samples.
const HISTORY_SIZE: usize = 20;

/// Only use samples within the last 100ms for velocity calculation.
const HORIZON_MS: i64 = 100;

/// If no movement for this duration, assume the pointer has stopped.
pub const ASSUME_STOPPED_MS: i64 = 40;

/// Source of per-pointer velocities for the detector.
///
/// `compute_current_velocity` snapshots velocities; the getters return the
/// last snapshot and `0.0` for pointers that were not tracked.
pub trait VelocityEstimator {
    fn add_movement(&mut self, event: &MotionEvent);

    /// `units` selects the time unit: `1` for per millisecond, `1000` for
    /// per second. Results are clamped to `±max_velocity`.
    fn compute_current_velocity(&mut self, units: u32, max_velocity: f32);

    fn x_velocity(&self, id: PointerId) -> f32;

    fn y_velocity(&self, id: PointerId) -> f32;

    fn velocity(&self, id: PointerId) -> Velocity {
        Velocity::new(self.x_velocity(id), self.y_velocity(id))
    }

    fn clear(&mut self);
}

#[derive(Clone, Copy, Default)]
struct DataPointAtTime {
    time_ms: i64,
    data_point: f32,
}

/// 1D velocity tracker using impulse-based velocity calculation.
#[derive(Clone)]
pub struct VelocityTracker1D {
    samples: [Option<DataPointAtTime>; HISTORY_SIZE],
    index: usize,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }

    /// Adds an absolute position at the given time (milliseconds).
    pub fn add_data_point(&mut self, time_ms: i64, data_point: f32) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(DataPointAtTime {
            time_ms,
            data_point,
        });
    }

    /// Calculates the velocity in units per `units` milliseconds.
    ///
    /// Returns 0.0 if there aren't enough recent samples.
    pub fn calculate_velocity(&self, units: u32) -> f32 {
        let mut data_points = [0.0f32; HISTORY_SIZE];
        let mut times = [0.0f32; HISTORY_SIZE];
        let mut sample_count = 0;

        let newest_sample = match self.samples[self.index] {
            Some(sample) => sample,
            None => return 0.0,
        };

        let mut current_index = self.index;
        let mut previous_sample = newest_sample;

        while let Some(sample) = self.samples[current_index] {
            let age = (newest_sample.time_ms - sample.time_ms) as f32;
            let delta = (sample.time_ms - previous_sample.time_ms).abs() as f32;
            previous_sample = sample;

            if age > HORIZON_MS as f32 || delta > ASSUME_STOPPED_MS as f32 {
                break;
            }

            data_points[sample_count] = sample.data_point;
            times[sample_count] = -age;

            current_index = if current_index == 0 {
                HISTORY_SIZE - 1
            } else {
                current_index - 1
            };

            sample_count += 1;
            if sample_count >= HISTORY_SIZE {
                break;
            }
        }

        if sample_count < 2 {
            return 0.0;
        }

        calculate_impulse_velocity(&data_points, &times, sample_count) * units as f32
    }

    /// Like [`calculate_velocity`](Self::calculate_velocity), capped to `max_velocity`.
    pub fn calculate_velocity_with_max(&self, units: u32, max_velocity: f32) -> f32 {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return 0.0;
        }

        let velocity = self.calculate_velocity(units);
        if velocity == 0.0 || velocity.is_nan() {
            return 0.0;
        }

        velocity.clamp(-max_velocity, max_velocity)
    }

    pub fn reset(&mut self) {
        self.samples = [None; HISTORY_SIZE];
        self.index = 0;
    }
}

/// Impulse velocity in units per millisecond.
fn calculate_impulse_velocity(
    data_points: &[f32; HISTORY_SIZE],
    times: &[f32; HISTORY_SIZE],
    sample_count: usize,
) -> f32 {
    if sample_count < 2 {
        return 0.0;
    }

    let mut work = 0.0f32;
    let start = sample_count - 1;
    let mut next_time = times[start];

    for i in (1..=start).rev() {
        let current_time = next_time;
        next_time = times[i - 1];
        if current_time == next_time {
            continue;
        }

        let v_curr = (data_points[i - 1] - data_points[i]) / (next_time - current_time);
        let v_prev = kinetic_energy_to_velocity(work);
        work += (v_curr - v_prev) * v_curr.abs();
        if i == start {
            work *= 0.5;
        }
    }

    kinetic_energy_to_velocity(work)
}

/// Converts kinetic energy to velocity using E = 0.5 * m * v^2 (with m = 1).
#[inline]
fn kinetic_energy_to_velocity(kinetic_energy: f32) -> f32 {
    kinetic_energy.signum() * (2.0 * kinetic_energy.abs()).sqrt()
}

#[derive(Clone)]
struct PointerTrack {
    id: PointerId,
    x: VelocityTracker1D,
    y: VelocityTracker1D,
}

/// Multi-pointer [`VelocityEstimator`] built on [`VelocityTracker1D`].
///
/// - `Down` starts over.
/// - `PointerDown` starts a fresh trace for the new pointer.
/// - `Move` records every pointer; a gap of [`ASSUME_STOPPED_MS`] or more
///   since the previous sample means all pointers stopped.
/// - `Up` and `PointerUp` repeat the last known positions and are ignored.
#[derive(Clone, Default)]
pub struct VelocityTracker {
    tracks: SmallVec<[PointerTrack; 4]>,
    computed: SmallVec<[(PointerId, Velocity); 4]>,
    origin: Option<Instant>,
    last_event_time: Option<Instant>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn track_mut(&mut self, id: PointerId) -> &mut PointerTrack {
        let index = match self.tracks.iter().position(|track| track.id == id) {
            Some(index) => index,
            None => {
                self.tracks.push(PointerTrack {
                    id,
                    x: VelocityTracker1D::new(),
                    y: VelocityTracker1D::new(),
                });
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[index]
    }

    fn record(&mut self, event: &MotionEvent) {
        let time = event.event_time();
        let origin = *self.origin.get_or_insert(time);
        let time_ms = time.saturating_duration_since(origin).as_millis() as i64;
        for pointer in event.pointers() {
            let track = self.track_mut(pointer.id);
            track.x.add_data_point(time_ms, pointer.position.x);
            track.y.add_data_point(time_ms, pointer.position.y);
        }
        self.last_event_time = Some(time);
    }

    fn computed(&self, id: PointerId) -> Velocity {
        self.computed
            .iter()
            .find(|(tracked, _)| *tracked == id)
            .map(|(_, velocity)| *velocity)
            .unwrap_or(Velocity::ZERO)
    }
}

impl VelocityEstimator for VelocityTracker {
    fn add_movement(&mut self, event: &MotionEvent) {
        match event.action() {
            MotionAction::Down => {
                self.clear();
            }
            MotionAction::PointerDown => {
                if event.action_index() < event.pointer_count() {
                    let id = event.pointer_id(event.action_index());
                    self.tracks.retain(|track| track.id != id);
                }
            }
            MotionAction::Move => {
                let stopped = self.last_event_time.is_some_and(|last| {
                    event.event_time().saturating_duration_since(last).as_millis() as i64
                        >= ASSUME_STOPPED_MS
                });
                if stopped {
                    log::trace!("velocity tracker: pointers assumed stopped, restarting");
                    self.tracks.clear();
                    self.origin = None;
                }
            }
            _ => return,
        }
        self.record(event);
    }

    fn compute_current_velocity(&mut self, units: u32, max_velocity: f32) {
        self.computed.clear();
        for track in &self.tracks {
            self.computed.push((
                track.id,
                Velocity::new(
                    track.x.calculate_velocity_with_max(units, max_velocity),
                    track.y.calculate_velocity_with_max(units, max_velocity),
                ),
            ));
        }
    }

    fn x_velocity(&self, id: PointerId) -> f32 {
        self.computed(id).x
    }

    fn y_velocity(&self, id: PointerId) -> f32 {
        self.computed(id).y
    }

    fn clear(&mut self) {
        self.tracks.clear();
        self.computed.clear();
        self.origin = None;
        self.last_event_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PER_SECOND: u32 = 1000;

    fn at(origin: Instant, ms: u64) -> Instant {
        origin + Duration::from_millis(ms)
    }

    fn axis(samples: &[(i64, f32)]) -> VelocityTracker1D {
        let mut tracker = VelocityTracker1D::new();
        for &(time_ms, position) in samples {
            tracker.add_data_point(time_ms, position);
        }
        tracker
    }

    #[test]
    fn too_few_samples_have_no_velocity() {
        assert_eq!(axis(&[]).calculate_velocity(PER_SECOND), 0.0);
        assert_eq!(axis(&[(0, 42.0)]).calculate_velocity(PER_SECOND), 0.0);
        // The two samples straddle the stop gap, leaving one usable sample.
        let stalled = axis(&[(0, 0.0), (ASSUME_STOPPED_MS + 1, 80.0)]);
        assert_eq!(stalled.calculate_velocity(PER_SECOND), 0.0);
    }

    #[test]
    fn steady_motion_reports_its_speed() {
        // 6px every 4ms.
        let tracker = axis(&[(0, 0.0), (4, 6.0), (8, 12.0), (12, 18.0), (16, 24.0)]);
        let per_second = tracker.calculate_velocity(PER_SECOND);
        assert!((per_second - 1_500.0).abs() < 100.0, "got {per_second}");
        let per_ms = tracker.calculate_velocity(1);
        assert!((per_ms - 1.5).abs() < 0.1, "got {per_ms}");

        let reversed = axis(&[(0, 24.0), (8, 12.0), (16, 0.0)]);
        assert!(reversed.calculate_velocity(PER_SECOND) < 0.0);
    }

    #[test]
    fn recent_flick_dominates_slow_drift() {
        // Slow drift followed by a quick flick.
        let mut samples: Vec<(i64, f32)> = (0..10).map(|i| (i * 20, i as f32)).collect();
        samples.extend((1..=5).map(|i| (180 + i * 5, 9.0 + i as f32 * 20.0)));
        let velocity = axis(&samples).calculate_velocity(PER_SECOND);
        assert!(velocity > 2_000.0, "got {velocity}");
    }

    #[test]
    fn max_velocity_clamps_both_directions() {
        let forward = axis(&[(0, 0.0), (2, 400.0)]);
        assert_eq!(forward.calculate_velocity_with_max(PER_SECOND, 5_000.0), 5_000.0);

        let mut backward = forward.clone();
        backward.reset();
        backward.add_data_point(0, 400.0);
        backward.add_data_point(2, 0.0);
        assert_eq!(backward.calculate_velocity_with_max(PER_SECOND, 5_000.0), -5_000.0);

        assert_eq!(forward.calculate_velocity_with_max(PER_SECOND, f32::NAN), 0.0);
    }

    #[test]
    fn tracks_each_pointer_independently() {
        let origin = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Down, origin).with_pointer(0, 0.0, 0.0),
        );
        tracker.add_movement(
            &MotionEvent::new(MotionAction::PointerDown, at(origin, 1))
                .with_pointer(0, 0.0, 0.0)
                .with_pointer(1, 100.0, 0.0)
                .with_action_index(1),
        );
        for step in 1..=4u64 {
            let offset = step as f32 * 10.0;
            tracker.add_movement(
                &MotionEvent::new(MotionAction::Move, at(origin, 1 + step * 10))
                    .with_pointer(0, offset, 0.0)
                    .with_pointer(1, 100.0 - offset, 0.0),
            );
        }
        tracker.compute_current_velocity(PER_SECOND, 8_000.0);

        assert!(tracker.x_velocity(0) > 0.0);
        assert!(tracker.x_velocity(1) < 0.0);
        assert_eq!(tracker.y_velocity(0), 0.0);
        assert_eq!(tracker.x_velocity(42), 0.0);
    }

    #[test]
    fn up_positions_do_not_count() {
        let origin = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Down, origin).with_pointer(0, 0.0, 0.0),
        );
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Up, at(origin, 10)).with_pointer(0, 0.0, 500.0),
        );
        tracker.compute_current_velocity(PER_SECOND, 8_000.0);
        assert_eq!(tracker.velocity(0), Velocity::ZERO);
    }

    #[test]
    fn long_pause_between_moves_restarts_tracking() {
        let origin = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Down, origin).with_pointer(0, 0.0, 0.0),
        );
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Move, at(origin, 10)).with_pointer(0, 0.0, 100.0),
        );
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Move, at(origin, 200)).with_pointer(0, 0.0, 110.0),
        );
        tracker.compute_current_velocity(PER_SECOND, 8_000.0);
        assert_eq!(tracker.y_velocity(0), 0.0);
    }

    #[test]
    fn clear_forgets_computed_velocities() {
        let origin = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Down, origin).with_pointer(0, 0.0, 0.0),
        );
        tracker.add_movement(
            &MotionEvent::new(MotionAction::Move, at(origin, 10)).with_pointer(0, 50.0, 0.0),
        );
        tracker.compute_current_velocity(PER_SECOND, 8_000.0);
        assert!(tracker.x_velocity(0) > 0.0);

        tracker.clear();
        assert_eq!(tracker.x_velocity(0), 0.0);
    }
}
