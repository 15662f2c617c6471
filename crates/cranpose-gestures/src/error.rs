use std::time::Duration;

use crate::motion_event::MotionAction;

/// Rejected [`GestureDetectorConfig`](crate::GestureDetectorConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ShowPressAfterLongPress {
        showpress: Duration,
        longpress: Duration,
    },
    DoubleTapMinTimeNotBelowTimeout {
        min_time: Duration,
        timeout: Duration,
    },
    ZeroDoubleTapTimeout,
    InvalidSwipeDeviationAngle(f32),
    ZeroSingleTapRepeatInterval,
    InvalidThreshold {
        name: &'static str,
        value: f32,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ShowPressAfterLongPress {
                showpress,
                longpress,
            } => write!(
                f,
                "showpress timeout {showpress:?} exceeds longpress timeout {longpress:?}"
            ),
            ConfigError::DoubleTapMinTimeNotBelowTimeout { min_time, timeout } => write!(
                f,
                "double tap min time {min_time:?} must be below double tap timeout {timeout:?}"
            ),
            ConfigError::ZeroDoubleTapTimeout => write!(f, "double tap timeout must be positive"),
            ConfigError::InvalidSwipeDeviationAngle(angle) => {
                write!(f, "swipe deviation angle {angle} outside (0, 45] degrees")
            }
            ConfigError::ZeroSingleTapRepeatInterval => {
                write!(f, "single tap repeat interval must be at least 1")
            }
            ConfigError::InvalidThreshold { name, value } => {
                write!(f, "{name} must be finite and non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Motion event the detector cannot process.
///
/// These are caller contract violations. The detector leaves its state
/// untouched when it returns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    /// Hover and button actions are not part of touch gesture detection.
    UnsupportedAction(MotionAction),
    /// A non-down action arrived before any down of the sequence.
    NoActiveSequence(MotionAction),
    /// The event carries no pointers.
    EmptyEvent(MotionAction),
    /// The changed pointer index of a pointer down/up is out of range.
    InvalidActionIndex { action: MotionAction, index: usize },
}

impl std::fmt::Display for GestureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureError::UnsupportedAction(action) => {
                write!(f, "unsupported motion action {action:?}")
            }
            GestureError::NoActiveSequence(action) => {
                write!(f, "{action:?} received without a preceding Down")
            }
            GestureError::EmptyEvent(action) => write!(f, "{action:?} event has no pointers"),
            GestureError::InvalidActionIndex { action, index } => {
                write!(f, "{action:?} action index {index} out of range")
            }
        }
    }
}

impl std::error::Error for GestureError {}
