//! Robot-style driver for gesture detection tests.
//!
//! [`GestureRobot`] owns a detector wired to recording listeners and a
//! virtual clock, and turns finger verbs (down, move, lift) into motion
//! events stamped with the current virtual time.
//!
//! # Example
//!
//! ```
//! use cranpose_gestures::GestureDetectorConfig;
//! use cranpose_gestures_testing::{GestureKind, GestureRobot};
//!
//! let mut robot = GestureRobot::new(GestureDetectorConfig::default()).unwrap();
//! robot.down(10.0, 10.0);
//! robot.advance_by(50);
//! robot.up();
//!
//! assert_eq!(
//!     robot.gesture_kinds(),
//!     vec![GestureKind::Down, GestureKind::SingleTapUp]
//! );
//! ```

use std::time::Duration;

use cranpose_gestures::{
    ConfigError, GestureDetector, GestureDetectorConfig, GestureError, MotionAction,
    MotionButtons, MotionClassification, MotionEvent, Point, PointerCoords, PointerId,
    VelocityEstimator, VelocityTracker,
};
use web_time::Instant;

use crate::recorder::{
    Gesture, GestureKind, GestureLog, RecordingDoubleTapListener, RecordingListener,
};

/// Pointer id used by the single-finger verbs.
pub const PRIMARY_POINTER: PointerId = 0;

/// Drives a [`GestureDetector`] with synthetic touch sequences.
///
/// A double-tap listener is attached from the start; see
/// [`detach_double_tap_listener`](Self::detach_double_tap_listener).
pub struct GestureRobot<V: VelocityEstimator = VelocityTracker> {
    detector: GestureDetector<RecordingListener, V>,
    log: GestureLog,
    origin: Instant,
    elapsed: Duration,
    pointers: Vec<PointerCoords>,
    buttons: MotionButtons,
    classification: MotionClassification,
    should_process_double_tap: bool,
}

impl GestureRobot {
    pub fn new(config: GestureDetectorConfig) -> Result<Self, ConfigError> {
        Self::with_velocity_estimator(config, VelocityTracker::new())
    }
}

impl<V: VelocityEstimator> GestureRobot<V> {
    pub fn with_velocity_estimator(
        config: GestureDetectorConfig,
        estimator: V,
    ) -> Result<Self, ConfigError> {
        let log = GestureLog::new();
        let detector = GestureDetector::with_velocity_estimator(
            config,
            RecordingListener::new(log.clone()),
            estimator,
        )?
        .with_double_tap_listener(RecordingDoubleTapListener::new(log.clone()));
        Ok(Self {
            detector,
            log,
            origin: Instant::now(),
            elapsed: Duration::ZERO,
            pointers: Vec::new(),
            buttons: MotionButtons::NONE,
            classification: MotionClassification::None,
            should_process_double_tap: true,
        })
    }

    pub fn detach_double_tap_listener(&mut self) {
        self.detector.set_double_tap_listener(None);
    }

    pub fn attach_double_tap_listener(&mut self) {
        self.detector
            .set_double_tap_listener(Some(Box::new(RecordingDoubleTapListener::new(
                self.log.clone(),
            ))));
    }

    pub fn set_should_process_double_tap(&mut self, should_process: bool) {
        self.should_process_double_tap = should_process;
    }

    /// Buttons reported on every following event.
    pub fn set_buttons(&mut self, buttons: MotionButtons) {
        self.buttons = buttons;
    }

    /// Classification reported on every following event.
    pub fn set_classification(&mut self, classification: MotionClassification) {
        self.classification = classification;
    }

    pub fn detector(&self) -> &GestureDetector<RecordingListener, V> {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut GestureDetector<RecordingListener, V> {
        &mut self.detector
    }

    // --- Clock ---------------------------------------------------------

    pub fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    /// Virtual time since the robot was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Moves the clock forward and fires every timeout that became due, as
    /// a host event loop would.
    pub fn advance_by(&mut self, millis: u64) {
        self.elapsed += Duration::from_millis(millis);
        let now = self.now();
        self.detector.advance_time(now);
    }

    /// Advances to an absolute virtual time. Never moves backwards.
    pub fn advance_to(&mut self, millis: u64) {
        let target = Duration::from_millis(millis);
        if target > self.elapsed {
            self.advance_by((target - self.elapsed).as_millis() as u64);
        }
    }

    /// Moves the clock forward without firing timeouts, like a host that
    /// stalled. The next event catches up on what became due.
    pub fn skip_by(&mut self, millis: u64) {
        self.elapsed += Duration::from_millis(millis);
    }

    // --- Finger verbs --------------------------------------------------

    /// First finger touches down. Panics if a finger is already down.
    pub fn down(&mut self, x: f32, y: f32) -> bool {
        assert!(
            self.pointers.is_empty(),
            "down with {} pointer(s) already down",
            self.pointers.len()
        );
        self.pointers.push(PointerCoords {
            id: PRIMARY_POINTER,
            position: Point::new(x, y),
        });
        self.dispatch(MotionAction::Down, 0)
    }

    /// An additional finger touches down.
    pub fn pointer_down(&mut self, id: PointerId, x: f32, y: f32) -> bool {
        assert!(
            self.index_of(id).is_none(),
            "pointer {id} is already down"
        );
        self.pointers.push(PointerCoords {
            id,
            position: Point::new(x, y),
        });
        let index = self.pointers.len() - 1;
        self.dispatch(MotionAction::PointerDown, index)
    }

    /// Moves the primary finger.
    pub fn move_to(&mut self, x: f32, y: f32) -> bool {
        self.move_pointers(&[(PRIMARY_POINTER, x, y)])
    }

    /// Moves any number of fingers in one motion event.
    pub fn move_pointers(&mut self, moves: &[(PointerId, f32, f32)]) -> bool {
        for &(id, x, y) in moves {
            let index = self.expect_index(id);
            self.pointers[index].position = Point::new(x, y);
        }
        self.dispatch(MotionAction::Move, 0)
    }

    /// Lifts one finger while others stay down.
    pub fn pointer_up(&mut self, id: PointerId) -> bool {
        let index = self.expect_index(id);
        let handled = self.dispatch(MotionAction::PointerUp, index);
        self.pointers.remove(index);
        handled
    }

    /// Lifts the last finger.
    pub fn up(&mut self) -> bool {
        assert_eq!(
            self.pointers.len(),
            1,
            "up requires exactly one pointer down"
        );
        let handled = self.dispatch(MotionAction::Up, 0);
        self.pointers.clear();
        handled
    }

    pub fn cancel(&mut self) -> bool {
        let handled = self.dispatch(MotionAction::Cancel, 0);
        self.pointers.clear();
        handled
    }

    /// Down, hold for `hold_millis`, up, all at the same spot.
    pub fn tap(&mut self, x: f32, y: f32, hold_millis: u64) {
        self.down(x, y);
        self.advance_by(hold_millis);
        self.up();
    }

    /// Drags the primary finger from `from` to `to` in `steps` evenly timed
    /// moves, then lifts it.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32), steps: u32, step_millis: u64) {
        self.down(from.0, from.1);
        let steps = steps.max(1);
        for step in 1..=steps {
            let fraction = step as f32 / steps as f32;
            self.advance_by(step_millis);
            self.move_to(
                from.0 + (to.0 - from.0) * fraction,
                from.1 + (to.1 - from.1) * fraction,
            );
        }
        self.up();
    }

    /// Builds the event a verb would send, at the current virtual time.
    pub fn event(&self, action: MotionAction, action_index: usize) -> MotionEvent {
        self.pointers
            .iter()
            .fold(MotionEvent::new(action, self.now()), |event, pointer| {
                event.with_pointer(pointer.id, pointer.position.x, pointer.position.y)
            })
            .with_action_index(action_index)
            .with_buttons(self.buttons)
            .with_classification(self.classification)
    }

    /// Sends an arbitrary event, returning the detector's verdict.
    pub fn send(&mut self, event: &MotionEvent) -> Result<bool, GestureError> {
        log::debug!(
            "robot t={}ms {:?} with {} pointer(s)",
            self.elapsed_millis(),
            event.action(),
            event.pointer_count()
        );
        self.detector
            .on_touch_event(event, self.should_process_double_tap)
    }

    fn dispatch(&mut self, action: MotionAction, action_index: usize) -> bool {
        let event = self.event(action, action_index);
        match self.send(&event) {
            Ok(handled) => handled,
            Err(err) => panic!("robot event rejected: {err}"),
        }
    }

    fn index_of(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|pointer| pointer.id == id)
    }

    fn expect_index(&self, id: PointerId) -> usize {
        match self.index_of(id) {
            Some(index) => index,
            None => panic!("pointer {id} is not down"),
        }
    }

    // --- Recorded gestures ---------------------------------------------

    pub fn log(&self) -> &GestureLog {
        &self.log
    }

    pub fn gestures(&self) -> Vec<Gesture> {
        self.log.snapshot()
    }

    pub fn gesture_kinds(&self) -> Vec<GestureKind> {
        self.log.kinds()
    }

    pub fn take_gestures(&mut self) -> Vec<Gesture> {
        self.log.take()
    }

    pub fn count(&self, kind: GestureKind) -> usize {
        self.log.count(kind)
    }
}
