//! Callbacks receiving recognized gestures.
//!
//! Both traits are invoked synchronously from
//! [`GestureDetector::on_touch_event`](crate::GestureDetector::on_touch_event)
//! or from a timeout firing. Every method has an empty default so listeners
//! only implement the gestures they care about. Methods returning `bool`
//! report whether the listener consumed the gesture.

use crate::motion_event::MotionEvent;

pub trait GestureListener {
    /// A pointer touched down. Called for every down, before anything else.
    fn on_down(&mut self, _event: &MotionEvent) -> bool {
        false
    }

    /// The press has been held past the show-press timeout without moving.
    /// Intended for visual press feedback.
    fn on_show_press(&mut self, _event: &MotionEvent) {}

    /// A single pointer lifted without leaving the touch slop.
    ///
    /// `tap_count` starts at 1 and grows for rapid repeated taps, wrapping at
    /// the configured repeat interval.
    fn on_single_tap_up(&mut self, _event: &MotionEvent, _tap_count: u32) -> bool {
        false
    }

    fn on_long_press(&mut self, _event: &MotionEvent) {}

    /// Pointers moved beyond touch slop, or kept moving after that.
    ///
    /// `distance_x`/`distance_y` is the focal point movement since the last
    /// scroll callback, positive when the pointers moved left/up.
    fn on_scroll(
        &mut self,
        _down: &MotionEvent,
        _current: &MotionEvent,
        _secondary_pointer_down: &MotionEvent,
        _distance_x: f32,
        _distance_y: f32,
    ) -> bool {
        false
    }

    /// The last pointer lifted while moving faster than the minimum fling
    /// velocity. Velocities are in units per second.
    fn on_fling(
        &mut self,
        _down: &MotionEvent,
        _up: &MotionEvent,
        _velocity_x: f32,
        _velocity_y: f32,
    ) -> bool {
        false
    }

    /// An axis-aligned swipe. Exactly one of the velocities is non-zero.
    fn on_swipe(
        &mut self,
        _down: &MotionEvent,
        _up: &MotionEvent,
        _velocity_x: f32,
        _velocity_y: f32,
    ) -> bool {
        false
    }

    fn on_two_finger_tap(&mut self, _down: &MotionEvent, _pointer_up: &MotionEvent) -> bool {
        false
    }

    /// A pending tap was cancelled. Keeps the gesture stream terminated for
    /// listeners that started tracking a tap in [`on_down`](Self::on_down).
    fn on_tap_cancel(&mut self, _event: &MotionEvent) {}
}

pub trait DoubleTapListener {
    /// A single tap that is known not to be the first half of a double tap.
    fn on_single_tap_confirmed(&mut self, _event: &MotionEvent) -> bool {
        false
    }

    /// The second down of a double tap arrived. `event` is the first tap's down.
    fn on_double_tap(&mut self, _event: &MotionEvent) -> bool {
        false
    }

    /// Down, move and up events that belong to the second tap of a double tap.
    fn on_double_tap_event(&mut self, _event: &MotionEvent) -> bool {
        false
    }
}
