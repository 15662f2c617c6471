//! Thresholds and timeouts for gesture detection.
//!
//! The defaults below mirror the platform values used on Android
//! (ViewConfiguration) so touch handling feels the same as native apps.
//!
//! # DPI Considerations
//!
//! Distances are in logical pixels and velocities in logical pixels per
//! second. For very high-density touch screens, hosts should scale the slop
//! values by the device's DPI factor before constructing the detector.

use std::time::Duration;

use crate::error::ConfigError;

/// Time a press must be held, after show-press, before it becomes a long press.
pub const LONGPRESS_TIMEOUT: Duration = Duration::from_millis(500);

/// Time before a held press is reported for visual feedback.
pub const SHOWPRESS_TIMEOUT: Duration = Duration::from_millis(180);

/// Maximum time between the first tap's release and the second tap's press.
pub const DOUBLE_TAP_TIMEOUT: Duration = Duration::from_millis(300);

/// Minimum time between the first tap's release and the second tap's press.
///
/// Anything faster is assumed to be a fingernail bounce rather than a
/// deliberate second tap.
pub const DOUBLE_TAP_MIN_TIME: Duration = Duration::from_millis(40);

/// Touch slop in logical pixels.
///
/// If a pointer moves more than this distance from where it went down:
/// - Scroll begins
/// - Tap, show-press and long-press are cancelled
///
/// Matches Android's ViewConfiguration.TOUCH_SLOP (~8dp).
pub const TOUCH_SLOP: f32 = 8.0;

/// Maximum distance between the two presses of a double tap.
pub const DOUBLE_TAP_SLOP: f32 = 100.0;

/// Minimum release velocity, on either axis, for a fling.
pub const MINIMUM_FLING_VELOCITY: f32 = 50.0;

/// Maximum fling velocity in logical pixels per second.
///
/// Matches Android's default maximum fling velocity on a baseline density.
pub const MAXIMUM_FLING_VELOCITY: f32 = 8_000.0;

pub const MINIMUM_SWIPE_VELOCITY: f32 = 20.0;

/// Maximum angle, in degrees, a swipe may deviate from its axis.
pub const MAXIMUM_SWIPE_DEVIATION_ANGLE: f32 = 20.0;

pub const TWO_FINGER_TAP_MAX_SEPARATION: f32 = 300.0;

pub const TWO_FINGER_TAP_TIMEOUT: Duration = Duration::from_millis(700);

/// Immutable set of thresholds, timeouts and feature flags for a
/// [`GestureDetector`](crate::GestureDetector).
#[derive(Clone, Debug, PartialEq)]
pub struct GestureDetectorConfig {
    pub longpress_timeout: Duration,
    pub showpress_timeout: Duration,
    pub double_tap_timeout: Duration,
    pub double_tap_min_time: Duration,
    pub touch_slop: f32,
    pub double_tap_slop: f32,
    pub minimum_fling_velocity: f32,
    pub maximum_fling_velocity: f32,
    /// Whether [`on_swipe`](crate::GestureListener::on_swipe) is dispatched.
    pub swipe_enabled: bool,
    pub minimum_swipe_velocity: f32,
    /// In degrees, within `(0, 45]`.
    pub maximum_swipe_deviation_angle: f32,
    /// Whether [`on_two_finger_tap`](crate::GestureListener::on_two_finger_tap) is dispatched.
    pub two_finger_tap_enabled: bool,
    pub two_finger_tap_max_separation: f32,
    pub two_finger_tap_timeout: Duration,
    /// Single taps within the double-tap region are counted modulo this
    /// interval; `1` disables repeat counting.
    pub single_tap_repeat_interval: u32,
    /// Holding the primary stylus button while pressing triggers the long
    /// press right away.
    pub stylus_button_accelerated_longpress_enabled: bool,
    /// A deep (force) press triggers the long press right away.
    pub deep_press_accelerated_longpress_enabled: bool,
}

impl Default for GestureDetectorConfig {
    fn default() -> Self {
        Self {
            longpress_timeout: LONGPRESS_TIMEOUT,
            showpress_timeout: SHOWPRESS_TIMEOUT,
            double_tap_timeout: DOUBLE_TAP_TIMEOUT,
            double_tap_min_time: DOUBLE_TAP_MIN_TIME,
            touch_slop: TOUCH_SLOP,
            double_tap_slop: DOUBLE_TAP_SLOP,
            minimum_fling_velocity: MINIMUM_FLING_VELOCITY,
            maximum_fling_velocity: MAXIMUM_FLING_VELOCITY,
            swipe_enabled: false,
            minimum_swipe_velocity: MINIMUM_SWIPE_VELOCITY,
            maximum_swipe_deviation_angle: MAXIMUM_SWIPE_DEVIATION_ANGLE,
            two_finger_tap_enabled: false,
            two_finger_tap_max_separation: TWO_FINGER_TAP_MAX_SEPARATION,
            two_finger_tap_timeout: TWO_FINGER_TAP_TIMEOUT,
            single_tap_repeat_interval: 1,
            stylus_button_accelerated_longpress_enabled: false,
            deep_press_accelerated_longpress_enabled: false,
        }
    }
}

impl GestureDetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_longpress_timeout(mut self, timeout: Duration) -> Self {
        self.longpress_timeout = timeout;
        self
    }

    pub fn with_showpress_timeout(mut self, timeout: Duration) -> Self {
        self.showpress_timeout = timeout;
        self
    }

    pub fn with_double_tap_timeout(mut self, timeout: Duration) -> Self {
        self.double_tap_timeout = timeout;
        self
    }

    pub fn with_double_tap_min_time(mut self, min_time: Duration) -> Self {
        self.double_tap_min_time = min_time;
        self
    }

    pub fn with_touch_slop(mut self, slop: f32) -> Self {
        self.touch_slop = slop;
        self
    }

    pub fn with_double_tap_slop(mut self, slop: f32) -> Self {
        self.double_tap_slop = slop;
        self
    }

    pub fn with_fling_velocity_range(mut self, minimum: f32, maximum: f32) -> Self {
        self.minimum_fling_velocity = minimum;
        self.maximum_fling_velocity = maximum;
        self
    }

    /// Enables swipe detection with the given velocity floor and maximum
    /// deviation angle (degrees).
    pub fn with_swipe(mut self, minimum_velocity: f32, maximum_deviation_angle: f32) -> Self {
        self.swipe_enabled = true;
        self.minimum_swipe_velocity = minimum_velocity;
        self.maximum_swipe_deviation_angle = maximum_deviation_angle;
        self
    }

    /// Enables two-finger tap detection.
    pub fn with_two_finger_tap(mut self, max_separation: f32, timeout: Duration) -> Self {
        self.two_finger_tap_enabled = true;
        self.two_finger_tap_max_separation = max_separation;
        self.two_finger_tap_timeout = timeout;
        self
    }

    pub fn with_single_tap_repeat_interval(mut self, interval: u32) -> Self {
        self.single_tap_repeat_interval = interval;
        self
    }

    pub fn with_stylus_button_accelerated_longpress(mut self, enabled: bool) -> Self {
        self.stylus_button_accelerated_longpress_enabled = enabled;
        self
    }

    pub fn with_deep_press_accelerated_longpress(mut self, enabled: bool) -> Self {
        self.deep_press_accelerated_longpress_enabled = enabled;
        self
    }

    /// Checks the invariants the detector relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.showpress_timeout > self.longpress_timeout {
            return Err(ConfigError::ShowPressAfterLongPress {
                showpress: self.showpress_timeout,
                longpress: self.longpress_timeout,
            });
        }
        if self.double_tap_timeout.is_zero() {
            return Err(ConfigError::ZeroDoubleTapTimeout);
        }
        if self.double_tap_min_time >= self.double_tap_timeout {
            return Err(ConfigError::DoubleTapMinTimeNotBelowTimeout {
                min_time: self.double_tap_min_time,
                timeout: self.double_tap_timeout,
            });
        }
        let angle = self.maximum_swipe_deviation_angle;
        if !(angle > 0.0 && angle <= 45.0) {
            return Err(ConfigError::InvalidSwipeDeviationAngle(angle));
        }
        if self.single_tap_repeat_interval == 0 {
            return Err(ConfigError::ZeroSingleTapRepeatInterval);
        }
        for (name, value) in [
            ("touch_slop", self.touch_slop),
            ("double_tap_slop", self.double_tap_slop),
            ("minimum_fling_velocity", self.minimum_fling_velocity),
            ("maximum_fling_velocity", self.maximum_fling_velocity),
            ("minimum_swipe_velocity", self.minimum_swipe_velocity),
            ("two_finger_tap_max_separation", self.two_finger_tap_max_separation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}
