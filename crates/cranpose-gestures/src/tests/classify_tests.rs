use super::*;

use crate::motion_event::MotionAction;
use web_time::Instant;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn down(origin: Instant, at: u64, x: f32, y: f32) -> MotionEvent {
    MotionEvent::new(MotionAction::Down, origin + ms(at)).with_pointer(0, x, y)
}

fn up(origin: Instant, at: u64, x: f32, y: f32) -> MotionEvent {
    MotionEvent::new(MotionAction::Up, origin + ms(at)).with_pointer(0, x, y)
}

fn criteria(min_time: Option<u64>) -> RepeatedTapCriteria {
    let config = GestureDetectorConfig::default();
    RepeatedTapCriteria {
        double_tap_timeout: config.double_tap_timeout,
        double_tap_min_time: min_time.map(ms),
        double_tap_slop_square: SlopThresholds::new(&config).double_tap_slop_square,
    }
}

#[test]
fn slop_thresholds_include_epsilon() {
    let thresholds = SlopThresholds::new(&GestureDetectorConfig::default());
    let expected = (8.0 + SLOP_EPSILON) * (8.0 + SLOP_EPSILON);
    assert_eq!(thresholds.touch_slop_square, expected);
    assert_eq!(thresholds.double_tap_slop_square, 100.0 * 100.0);
    assert_eq!(thresholds.two_finger_tap_distance_square, 300.0 * 300.0);
}

#[test]
fn pointer_exactly_on_slop_boundary_is_within() {
    let origin = Instant::now();
    let thresholds = SlopThresholds::new(&GestureDetectorConfig::default());
    let first = down(origin, 0, 10.0, 10.0);
    let moved = MotionEvent::new(MotionAction::Move, origin + ms(5)).with_pointer(0, 18.0, 10.0);

    assert!(is_within_touch_slop(
        &moved,
        &first,
        None,
        1,
        thresholds.touch_slop_square
    ));

    let beyond = MotionEvent::new(MotionAction::Move, origin + ms(5)).with_pointer(0, 18.1, 10.0);
    assert!(!is_within_touch_slop(
        &beyond,
        &first,
        None,
        1,
        thresholds.touch_slop_square
    ));
}

#[test]
fn secondary_pointer_is_measured_from_secondary_down() {
    let origin = Instant::now();
    let thresholds = SlopThresholds::new(&GestureDetectorConfig::default());
    let first = down(origin, 0, 0.0, 0.0);
    let secondary = MotionEvent::new(MotionAction::PointerDown, origin + ms(10))
        .with_pointer(0, 0.0, 0.0)
        .with_pointer(1, 200.0, 0.0)
        .with_action_index(1);
    let moved = MotionEvent::new(MotionAction::Move, origin + ms(20))
        .with_pointer(0, 1.0, 0.0)
        .with_pointer(1, 203.0, 0.0);

    assert!(is_within_touch_slop(
        &moved,
        &first,
        Some(&secondary),
        2,
        thresholds.touch_slop_square
    ));
}

#[test]
fn unknown_pointer_fails_slop_test() {
    let origin = Instant::now();
    let first = down(origin, 0, 0.0, 0.0);
    let moved = MotionEvent::new(MotionAction::Move, origin + ms(20))
        .with_pointer(0, 0.0, 0.0)
        .with_pointer(5, 0.0, 0.0);

    assert!(source_pointer_down_event(&first, None, 5).is_none());
    assert!(!is_within_touch_slop(&moved, &first, None, 2, 1_000.0));
}

#[test]
fn more_than_two_pointers_never_within_slop() {
    let origin = Instant::now();
    let first = down(origin, 0, 0.0, 0.0);
    let still = MotionEvent::new(MotionAction::Move, origin + ms(20)).with_pointer(0, 0.0, 0.0);
    assert!(!is_within_touch_slop(&still, &first, None, 3, 1_000.0));
}

#[test]
fn repeated_tap_requires_bigger_tap_region() {
    let origin = Instant::now();
    let first_down = down(origin, 0, 10.0, 10.0);
    let first_up = up(origin, 50, 10.0, 10.0);
    let second_down = down(origin, 120, 12.0, 11.0);

    assert!(is_repeated_tap(
        &first_down,
        &first_up,
        &second_down,
        true,
        &criteria(Some(40))
    ));
    assert!(!is_repeated_tap(
        &first_down,
        &first_up,
        &second_down,
        false,
        &criteria(Some(40))
    ));
}

#[test]
fn min_time_applies_only_when_requested() {
    let origin = Instant::now();
    let first_down = down(origin, 0, 10.0, 10.0);
    let first_up = up(origin, 50, 10.0, 10.0);
    let quick_down = down(origin, 60, 10.0, 10.0);

    assert!(!is_repeated_tap(
        &first_down,
        &first_up,
        &quick_down,
        true,
        &criteria(Some(40))
    ));
    assert!(is_repeated_tap(
        &first_down,
        &first_up,
        &quick_down,
        true,
        &criteria(None)
    ));
}

#[test]
fn repeated_tap_rejects_late_or_distant_second_down() {
    let origin = Instant::now();
    let first_down = down(origin, 0, 10.0, 10.0);
    let first_up = up(origin, 50, 10.0, 10.0);

    let late = down(origin, 351, 10.0, 10.0);
    assert!(!is_repeated_tap(&first_down, &first_up, &late, true, &criteria(None)));

    let distant = down(origin, 120, 200.0, 10.0);
    assert!(!is_repeated_tap(&first_down, &first_up, &distant, true, &criteria(None)));
}

#[test]
fn second_down_exactly_on_double_tap_slop_repeats() {
    let origin = Instant::now();
    let first_down = down(origin, 0, 10.0, 10.0);
    let first_up = up(origin, 50, 10.0, 10.0);

    let on_boundary = down(origin, 120, 110.0, 10.0);
    assert!(is_repeated_tap(&first_down, &first_up, &on_boundary, true, &criteria(None)));

    let just_outside = down(origin, 120, 110.1, 10.0);
    assert!(!is_repeated_tap(&first_down, &first_up, &just_outside, true, &criteria(None)));
}

#[test]
fn fling_gate_checks_either_axis() {
    assert!(exceeds_fling_velocity(Velocity::new(0.0, -51.0), 50.0));
    assert!(exceeds_fling_velocity(Velocity::new(60.0, 0.0), 50.0));
    assert!(!exceeds_fling_velocity(Velocity::new(50.0, -50.0), 50.0));
}

#[test]
fn counter_moving_pointer_cancels_combined_velocity() {
    let departing = Velocity::new(100.0, 0.0);
    assert_eq!(
        combined_pointer_up_velocity(departing, [Velocity::new(80.0, 10.0)]),
        Some(Velocity::new(180.0, 10.0))
    );
    assert_eq!(
        combined_pointer_up_velocity(
            departing,
            [Velocity::new(80.0, 0.0), Velocity::new(-5.0, 0.0)]
        ),
        None
    );
}

#[test]
fn swipe_disabled_by_default() {
    let classifier = SwipeClassifier::new(&GestureDetectorConfig::default());
    assert_eq!(classifier.classify(Velocity::new(1_000.0, 0.0)), None);
}

#[test]
fn swipe_snaps_to_dominant_axis() {
    let classifier = SwipeClassifier::new(&GestureDetectorConfig::default().with_swipe(20.0, 20.0));
    assert_eq!(
        classifier.classify(Velocity::new(-1_000.0, 100.0)),
        Some(Velocity::new(-1_000.0, 0.0))
    );
    // Minor axis below the minimum is ignored entirely.
    assert_eq!(
        classifier.classify(Velocity::new(15.0, 300.0)),
        Some(Velocity::new(0.0, 300.0))
    );
}

#[test]
fn diagonal_or_slow_motion_is_not_a_swipe() {
    let classifier = SwipeClassifier::new(&GestureDetectorConfig::default().with_swipe(20.0, 20.0));
    assert_eq!(classifier.classify(Velocity::new(500.0, 500.0)), None);
    assert_eq!(classifier.classify(Velocity::new(10.0, -10.0)), None);
    assert_eq!(classifier.classify(Velocity::ZERO), None);
}
