//! Listeners that record every callback they receive.
//!
//! [`RecordingListener`] and [`RecordingDoubleTapListener`] push into the same
//! [`GestureLog`], so a test sees one ordered stream of everything the
//! detector dispatched.

use std::cell::RefCell;
use std::rc::Rc;

use cranpose_gestures::geometry::Point;
use cranpose_gestures::{DoubleTapListener, GestureListener, MotionAction, MotionEvent};

/// One listener callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Down { position: Point },
    ShowPress,
    SingleTapUp { tap_count: u32 },
    LongPress,
    Scroll { distance_x: f32, distance_y: f32 },
    Fling { velocity_x: f32, velocity_y: f32 },
    Swipe { velocity_x: f32, velocity_y: f32 },
    TwoFingerTap,
    TapCancel,
    SingleTapConfirmed,
    DoubleTap,
    DoubleTapEvent(MotionAction),
}

/// Payload-free discriminant of [`Gesture`] for order assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Down,
    ShowPress,
    SingleTapUp,
    LongPress,
    Scroll,
    Fling,
    Swipe,
    TwoFingerTap,
    TapCancel,
    SingleTapConfirmed,
    DoubleTap,
    DoubleTapEvent,
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Down { .. } => GestureKind::Down,
            Gesture::ShowPress => GestureKind::ShowPress,
            Gesture::SingleTapUp { .. } => GestureKind::SingleTapUp,
            Gesture::LongPress => GestureKind::LongPress,
            Gesture::Scroll { .. } => GestureKind::Scroll,
            Gesture::Fling { .. } => GestureKind::Fling,
            Gesture::Swipe { .. } => GestureKind::Swipe,
            Gesture::TwoFingerTap => GestureKind::TwoFingerTap,
            Gesture::TapCancel => GestureKind::TapCancel,
            Gesture::SingleTapConfirmed => GestureKind::SingleTapConfirmed,
            Gesture::DoubleTap => GestureKind::DoubleTap,
            Gesture::DoubleTapEvent(_) => GestureKind::DoubleTapEvent,
        }
    }
}

/// Shared, append-only record of dispatched gestures.
#[derive(Clone, Default)]
pub struct GestureLog {
    entries: Rc<RefCell<Vec<Gesture>>>,
}

impl GestureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, gesture: Gesture) {
        log::trace!("recorded {gesture:?}");
        self.entries.borrow_mut().push(gesture);
    }

    pub fn snapshot(&self) -> Vec<Gesture> {
        self.entries.borrow().clone()
    }

    /// Returns everything recorded so far and empties the log.
    pub fn take(&self) -> Vec<Gesture> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn kinds(&self) -> Vec<GestureKind> {
        self.entries.borrow().iter().map(Gesture::kind).collect()
    }

    pub fn count(&self, kind: GestureKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|gesture| gesture.kind() == kind)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Records [`GestureListener`] callbacks. Every consumable callback returns
/// `consume`.
pub struct RecordingListener {
    log: GestureLog,
    consume: bool,
}

impl RecordingListener {
    pub fn new(log: GestureLog) -> Self {
        Self { log, consume: true }
    }

    /// Reports gestures as not consumed.
    pub fn passive(log: GestureLog) -> Self {
        Self {
            log,
            consume: false,
        }
    }

    pub fn log(&self) -> &GestureLog {
        &self.log
    }

    fn record(&self, gesture: Gesture) -> bool {
        self.log.push(gesture);
        self.consume
    }
}

impl GestureListener for RecordingListener {
    fn on_down(&mut self, event: &MotionEvent) -> bool {
        self.record(Gesture::Down {
            position: event.position(0),
        })
    }

    fn on_show_press(&mut self, _event: &MotionEvent) {
        self.log.push(Gesture::ShowPress);
    }

    fn on_single_tap_up(&mut self, _event: &MotionEvent, tap_count: u32) -> bool {
        self.record(Gesture::SingleTapUp { tap_count })
    }

    fn on_long_press(&mut self, _event: &MotionEvent) {
        self.log.push(Gesture::LongPress);
    }

    fn on_scroll(
        &mut self,
        _down: &MotionEvent,
        _current: &MotionEvent,
        _secondary_pointer_down: &MotionEvent,
        distance_x: f32,
        distance_y: f32,
    ) -> bool {
        self.record(Gesture::Scroll {
            distance_x,
            distance_y,
        })
    }

    fn on_fling(
        &mut self,
        _down: &MotionEvent,
        _up: &MotionEvent,
        velocity_x: f32,
        velocity_y: f32,
    ) -> bool {
        self.record(Gesture::Fling {
            velocity_x,
            velocity_y,
        })
    }

    fn on_swipe(
        &mut self,
        _down: &MotionEvent,
        _up: &MotionEvent,
        velocity_x: f32,
        velocity_y: f32,
    ) -> bool {
        self.record(Gesture::Swipe {
            velocity_x,
            velocity_y,
        })
    }

    fn on_two_finger_tap(&mut self, _down: &MotionEvent, _pointer_up: &MotionEvent) -> bool {
        self.record(Gesture::TwoFingerTap)
    }

    fn on_tap_cancel(&mut self, _event: &MotionEvent) {
        self.log.push(Gesture::TapCancel);
    }
}

pub struct RecordingDoubleTapListener {
    log: GestureLog,
}

impl RecordingDoubleTapListener {
    pub fn new(log: GestureLog) -> Self {
        Self { log }
    }
}

impl DoubleTapListener for RecordingDoubleTapListener {
    fn on_single_tap_confirmed(&mut self, _event: &MotionEvent) -> bool {
        self.log.push(Gesture::SingleTapConfirmed);
        true
    }

    fn on_double_tap(&mut self, _event: &MotionEvent) -> bool {
        self.log.push(Gesture::DoubleTap);
        true
    }

    fn on_double_tap_event(&mut self, event: &MotionEvent) -> bool {
        self.log.push(Gesture::DoubleTapEvent(event.action()));
        true
    }
}
