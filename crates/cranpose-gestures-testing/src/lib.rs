//! Testing utilities and harness for Cranpose gesture detection

pub mod recorder;
pub mod robot;
pub mod robot_assertions;

pub use recorder::{
    Gesture, GestureKind, GestureLog, RecordingDoubleTapListener, RecordingListener,
};
pub use robot::{GestureRobot, PRIMARY_POINTER};

pub mod prelude {
    pub use crate::recorder::{Gesture, GestureKind, GestureLog};
    pub use crate::robot::{GestureRobot, PRIMARY_POINTER};
    pub use crate::robot_assertions::*;
}
