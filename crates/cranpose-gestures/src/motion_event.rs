//! Multi-pointer motion samples consumed by the gesture detector.

use smallvec::SmallVec;
use web_time::Instant;

use crate::geometry::Point;

pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionAction {
    /// First pointer of a sequence touched down.
    Down,
    /// An additional pointer touched down; see [`MotionEvent::action_index`].
    PointerDown,
    Move,
    /// A pointer other than the last one lifted; see [`MotionEvent::action_index`].
    PointerUp,
    /// The last pointer lifted.
    Up,
    Cancel,
    ButtonPress,
    ButtonRelease,
    HoverEnter,
    HoverExit,
    HoverMove,
}

impl MotionAction {
    /// Whether gesture detection handles this action.
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            MotionAction::Down
                | MotionAction::PointerDown
                | MotionAction::Move
                | MotionAction::PointerUp
                | MotionAction::Up
                | MotionAction::Cancel
        )
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionButton {
    StylusPrimary = 0,
    StylusSecondary = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionButtons(u8);

impl MotionButtons {
    pub const NONE: Self = Self(0);

    pub fn new() -> Self {
        Self::NONE
    }

    pub fn with(mut self, button: MotionButton) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: MotionButton) {
        self.0 |= 1 << (button as u8);
    }

    pub fn remove(&mut self, button: MotionButton) {
        self.0 &= !(1 << (button as u8));
    }

    pub fn contains(&self, button: MotionButton) -> bool {
        (self.0 & (1 << (button as u8))) != 0
    }
}

impl Default for MotionButtons {
    fn default() -> Self {
        Self::NONE
    }
}

/// Platform classification of the current press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionClassification {
    #[default]
    None,
    /// The user is pressing deliberately hard.
    DeepPress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerCoords {
    pub id: PointerId,
    pub position: Point,
}

/// One input frame: every pointer currently touching, plus the action that
/// produced the frame.
///
/// Cloning is a deep copy. The detector keeps clones of the samples it needs
/// across calls, so callers are free to reuse their own event afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent {
    action: MotionAction,
    action_index: usize,
    event_time: Instant,
    pointers: SmallVec<[PointerCoords; 2]>,
    buttons: MotionButtons,
    classification: MotionClassification,
}

impl MotionEvent {
    pub fn new(action: MotionAction, event_time: Instant) -> Self {
        Self {
            action,
            action_index: 0,
            event_time,
            pointers: SmallVec::new(),
            buttons: MotionButtons::NONE,
            classification: MotionClassification::None,
        }
    }

    /// Appends a pointer. Pointer order is the index order seen by accessors.
    pub fn with_pointer(mut self, id: PointerId, x: f32, y: f32) -> Self {
        self.pointers.push(PointerCoords {
            id,
            position: Point::new(x, y),
        });
        self
    }

    /// Sets the index of the pointer that went down or up.
    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn with_buttons(mut self, buttons: MotionButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_classification(mut self, classification: MotionClassification) -> Self {
        self.classification = classification;
        self
    }

    pub fn action(&self) -> MotionAction {
        self.action
    }

    /// Index of the pointer that changed, meaningful for
    /// [`MotionAction::PointerDown`] and [`MotionAction::PointerUp`].
    pub fn action_index(&self) -> usize {
        self.action_index
    }

    pub fn event_time(&self) -> Instant {
        self.event_time
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointers(&self) -> &[PointerCoords] {
        &self.pointers
    }

    pub fn pointer_id(&self, index: usize) -> PointerId {
        self.pointers[index].id
    }

    pub fn position(&self, index: usize) -> Point {
        self.pointers[index].position
    }

    pub fn x(&self, index: usize) -> f32 {
        self.pointers[index].position.x
    }

    pub fn y(&self, index: usize) -> f32 {
        self.pointers[index].position.y
    }

    pub fn find_pointer_index(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|pointer| pointer.id == id)
    }

    pub fn buttons(&self) -> MotionButtons {
        self.buttons
    }

    pub fn classification(&self) -> MotionClassification {
        self.classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointers_keep_insertion_order() {
        let event = MotionEvent::new(MotionAction::PointerDown, Instant::now())
            .with_pointer(7, 1.0, 2.0)
            .with_pointer(3, 5.0, 6.0)
            .with_action_index(1);

        assert_eq!(event.pointer_count(), 2);
        assert_eq!(event.pointer_id(0), 7);
        assert_eq!(event.pointer_id(1), 3);
        assert_eq!(event.find_pointer_index(3), Some(1));
        assert_eq!(event.find_pointer_index(9), None);
        assert_eq!(event.x(1), 5.0);
        assert_eq!(event.y(0), 2.0);
    }

    #[test]
    fn clone_is_independent_of_original() {
        let original = MotionEvent::new(MotionAction::Down, Instant::now()).with_pointer(0, 1.0, 1.0);
        let retained = original.clone();
        let reused = original.with_pointer(1, 9.0, 9.0);

        assert_eq!(retained.pointer_count(), 1);
        assert_eq!(reused.pointer_count(), 2);
    }

    #[test]
    fn buttons_round_trip() {
        let buttons = MotionButtons::new().with(MotionButton::StylusPrimary);
        assert!(buttons.contains(MotionButton::StylusPrimary));
        assert!(!buttons.contains(MotionButton::StylusSecondary));
    }
}
