//! Geometric and velocity tests shared by the detector's action handlers.
//!
//! Distances are compared squared so no square roots are taken and the
//! comparisons stay exact at the threshold.

use std::time::Duration;

use crate::config::GestureDetectorConfig;
use crate::geometry::Velocity;
use crate::motion_event::{MotionEvent, PointerId};

/// Added to slop radii to absorb rounding at the slop boundary.
pub const SLOP_EPSILON: f32 = 0.05;

/// Scroll deltas at or below this are dropped once scrolling.
pub const SCROLL_EPSILON: f32 = 0.001;

/// Floor for the minor axis in the swipe ratio.
const SWIPE_RATIO_FLOOR: f32 = 0.001;

/// Squared distance thresholds derived from a config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopThresholds {
    pub touch_slop_square: f32,
    pub double_tap_touch_slop_square: f32,
    pub double_tap_slop_square: f32,
    pub two_finger_tap_distance_square: f32,
}

impl SlopThresholds {
    pub fn new(config: &GestureDetectorConfig) -> Self {
        // Only touch slop gets the epsilon; the double-tap region is exact.
        let touch_slop = config.touch_slop + SLOP_EPSILON;
        Self {
            touch_slop_square: touch_slop * touch_slop,
            double_tap_touch_slop_square: touch_slop * touch_slop,
            double_tap_slop_square: config.double_tap_slop * config.double_tap_slop,
            two_finger_tap_distance_square: config.two_finger_tap_max_separation
                * config.two_finger_tap_max_separation,
        }
    }
}

/// Picks the down sample a pointer's slop is measured from: the primary
/// down if the pointer started the sequence, otherwise the secondary down
/// if it appears there.
pub fn source_pointer_down_event<'a>(
    current_down: &'a MotionEvent,
    secondary_pointer_down: Option<&'a MotionEvent>,
    pointer_id: PointerId,
) -> Option<&'a MotionEvent> {
    if current_down.pointer_count() > 0 && current_down.pointer_id(0) == pointer_id {
        return Some(current_down);
    }
    secondary_pointer_down.filter(|secondary| secondary.find_pointer_index(pointer_id).is_some())
}

/// Whether every pointer of `event` is still within touch slop of its own
/// down position. Pointers without a known down position fail the test,
/// as does any sequence that ever had more than two pointers.
pub fn is_within_touch_slop(
    event: &MotionEvent,
    current_down: &MotionEvent,
    secondary_pointer_down: Option<&MotionEvent>,
    maximum_pointer_count: usize,
    touch_slop_square: f32,
) -> bool {
    if maximum_pointer_count > 2 {
        return false;
    }

    event.pointers().iter().all(|pointer| {
        let Some(source) =
            source_pointer_down_event(current_down, secondary_pointer_down, pointer.id)
        else {
            return false;
        };
        let Some(source_index) = source.find_pointer_index(pointer.id) else {
            return false;
        };
        source.position(source_index).distance_squared_to(pointer.position) <= touch_slop_square
    })
}

/// Timing and spacing constraints for a repeated tap.
#[derive(Clone, Copy, Debug)]
pub struct RepeatedTapCriteria {
    pub double_tap_timeout: Duration,
    /// Applied only when a real double tap would be dispatched.
    pub double_tap_min_time: Option<Duration>,
    pub double_tap_slop_square: f32,
}

/// Whether `second_down` repeats the tap made of `first_down`/`first_up`.
///
/// `always_in_bigger_tap_region` must describe the first tap's sequence.
pub fn is_repeated_tap(
    first_down: &MotionEvent,
    first_up: &MotionEvent,
    second_down: &MotionEvent,
    always_in_bigger_tap_region: bool,
    criteria: &RepeatedTapCriteria,
) -> bool {
    if !always_in_bigger_tap_region {
        return false;
    }

    let Some(delta_time) = second_down
        .event_time()
        .checked_duration_since(first_up.event_time())
    else {
        return false;
    };
    if delta_time > criteria.double_tap_timeout {
        return false;
    }
    if criteria
        .double_tap_min_time
        .is_some_and(|min_time| delta_time < min_time)
    {
        return false;
    }

    if first_down.pointer_count() == 0 || second_down.pointer_count() == 0 {
        return false;
    }
    first_down.position(0).distance_squared_to(second_down.position(0))
        <= criteria.double_tap_slop_square
}

pub fn exceeds_fling_velocity(velocity: Velocity, minimum_fling_velocity: f32) -> bool {
    velocity.x.abs() > minimum_fling_velocity || velocity.y.abs() > minimum_fling_velocity
}

/// Sums the departing pointer's velocity with every remaining pointer's.
///
/// Returns `None` as soon as a remaining pointer moves against the departing
/// one (negative dot product): counter-moving fingers are not a fling.
pub fn combined_pointer_up_velocity(
    departing: Velocity,
    remaining: impl IntoIterator<Item = Velocity>,
) -> Option<Velocity> {
    let mut total = departing;
    for velocity in remaining {
        if departing.dot(velocity) < 0.0 {
            return None;
        }
        total += velocity;
    }
    Some(total)
}

/// Axis-snapping swipe test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeClassifier {
    enabled: bool,
    minimum_velocity: f32,
    minimum_direction_component_ratio: f32,
}

impl SwipeClassifier {
    pub fn new(config: &GestureDetectorConfig) -> Self {
        let angle = config.maximum_swipe_deviation_angle.clamp(0.001, 45.0);
        Self {
            enabled: config.swipe_enabled,
            minimum_velocity: config.minimum_swipe_velocity,
            minimum_direction_component_ratio: 1.0 / angle.to_radians().tan(),
        }
    }

    /// Returns the swipe velocity collapsed onto its dominant axis, or `None`
    /// if swipes are disabled or the motion is too slow or too diagonal.
    pub fn classify(&self, velocity: Velocity) -> Option<Velocity> {
        if !self.enabled || (velocity.x == 0.0 && velocity.y == 0.0) {
            return None;
        }

        let mut vx = velocity.x;
        let mut vy = velocity.y;
        let mut vx_abs = vx.abs();
        let mut vy_abs = vy.abs();

        if vx_abs < self.minimum_velocity {
            vx_abs = 0.0;
            vx = 0.0;
        }
        if vy_abs < self.minimum_velocity {
            vy_abs = 0.0;
            vy = 0.0;
        }

        // Both components below the minimum gives a ratio of 0.
        let ratio = if vx_abs > vy_abs {
            vx_abs / vy_abs.max(SWIPE_RATIO_FLOOR)
        } else {
            vy_abs / vx_abs.max(SWIPE_RATIO_FLOOR)
        };
        if ratio < self.minimum_direction_component_ratio {
            return None;
        }

        if vx_abs > vy_abs {
            Some(Velocity::new(vx, 0.0))
        } else {
            Some(Velocity::new(0.0, vy))
        }
    }
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
