//! Assertion utilities for gesture robot tests.

use crate::recorder::{Gesture, GestureKind};

/// Assert that a value is within an expected range.
///
/// Velocity estimates are not exact, so compare them with a tolerance.
pub fn assert_approx_eq(actual: f32, expected: f32, tolerance: f32, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{}: expected {} (±{}), got {} (diff: {})",
        msg,
        expected,
        tolerance,
        actual,
        diff
    );
}

/// Assert the exact order of dispatched gesture kinds.
pub fn assert_kinds(gestures: &[Gesture], expected: &[GestureKind], msg: &str) {
    let actual: Vec<GestureKind> = gestures.iter().map(Gesture::kind).collect();
    assert_eq!(
        actual, expected,
        "{}: unexpected gesture sequence {:?}",
        msg, gestures
    );
}

/// Assert that `kind` was dispatched exactly `expected` times.
pub fn assert_count(gestures: &[Gesture], kind: GestureKind, expected: usize, msg: &str) {
    let actual = gestures.iter().filter(|g| g.kind() == kind).count();
    assert_eq!(
        actual, expected,
        "{}: expected {} {:?}, got {} in {:?}",
        msg, expected, kind, actual, gestures
    );
}

/// Assert that `kind` was never dispatched.
pub fn assert_absent(gestures: &[Gesture], kind: GestureKind, msg: &str) {
    assert_count(gestures, kind, 0, msg);
}

/// Assert that `first` was dispatched, and dispatched before `second`.
pub fn assert_before(gestures: &[Gesture], first: GestureKind, second: GestureKind, msg: &str) {
    let position = |kind: GestureKind| gestures.iter().position(|g| g.kind() == kind);
    match (position(first), position(second)) {
        (Some(a), Some(b)) => assert!(
            a < b,
            "{}: {:?} at {} is not before {:?} at {} in {:?}",
            msg,
            first,
            a,
            second,
            b,
            gestures
        ),
        (Some(_), None) => {}
        (None, _) => panic!("{}: {:?} never dispatched in {:?}", msg, first, gestures),
    }
}

/// Returns the single fling in `gestures` as `(velocity_x, velocity_y)`.
pub fn single_fling(gestures: &[Gesture], msg: &str) -> (f32, f32) {
    assert_count(gestures, GestureKind::Fling, 1, msg);
    gestures
        .iter()
        .find_map(|gesture| match gesture {
            Gesture::Fling {
                velocity_x,
                velocity_y,
            } => Some((*velocity_x, *velocity_y)),
            _ => None,
        })
        .unwrap_or_else(|| panic!("{}: no fling", msg))
}

/// Sum of all scroll distances, `(x, y)`.
pub fn total_scroll(gestures: &[Gesture]) -> (f32, f32) {
    gestures
        .iter()
        .fold((0.0f32, 0.0f32), |(sum_x, sum_y), gesture| match gesture {
            Gesture::Scroll {
                distance_x,
                distance_y,
            } => (sum_x + *distance_x, sum_y + *distance_y),
            _ => (sum_x, sum_y),
        })
}
