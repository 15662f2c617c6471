//! Touch gesture detection for Cranpose.
//!
//! Feed the [`MotionEvent`]s of a touch sequence into a [`GestureDetector`]
//! and it reports taps, double taps, show/long presses, scrolls, flings,
//! swipes and two-finger taps to a [`GestureListener`] (and optionally a
//! [`DoubleTapListener`]).

pub mod classify;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod listener;
pub mod motion_event;
pub mod timeout;
pub mod velocity_tracker;

pub use config::GestureDetectorConfig;
pub use detector::GestureDetector;
pub use error::{ConfigError, GestureError};
pub use geometry::{Point, Velocity};
pub use listener::{DoubleTapListener, GestureListener};
pub use motion_event::{
    MotionAction, MotionButton, MotionButtons, MotionClassification, MotionEvent, PointerCoords,
    PointerId,
};
pub use timeout::{TimeoutEvent, TimeoutGestureHandler};
pub use velocity_tracker::{VelocityEstimator, VelocityTracker, VelocityTracker1D};

pub mod prelude {
    pub use crate::config::GestureDetectorConfig;
    pub use crate::detector::GestureDetector;
    pub use crate::listener::{DoubleTapListener, GestureListener};
    pub use crate::motion_event::{MotionAction, MotionEvent, PointerId};
    pub use crate::velocity_tracker::VelocityEstimator;
}
