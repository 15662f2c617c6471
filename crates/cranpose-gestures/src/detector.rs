//! Touch gesture state machine.
//!
//! [`GestureDetector`] consumes the motion events of one touch sequence at a
//! time and reports taps, double taps, long presses, scrolls, flings, swipes
//! and two-finger taps to its listeners. Show-press, long-press and the
//! double-tap window are timeouts racing against the incoming events; the
//! host advances time with [`GestureDetector::advance_time`].
//!
//! The detector is not synchronized. Events and timeouts must be delivered
//! from one logical thread, never re-entrantly.

use web_time::Instant;

use crate::classify::{self, RepeatedTapCriteria, SlopThresholds, SwipeClassifier, SCROLL_EPSILON};
use crate::config::GestureDetectorConfig;
use crate::error::{ConfigError, GestureError};
use crate::geometry::{Point, Velocity};
use crate::listener::{DoubleTapListener, GestureListener};
use crate::motion_event::{MotionAction, MotionButton, MotionClassification, MotionEvent};
use crate::timeout::{TimeoutEvent, TimeoutGestureHandler};
use crate::velocity_tracker::{VelocityEstimator, VelocityTracker};

/// Velocities handed to listeners are in units per second.
const VELOCITY_UNITS_PER_SECOND: u32 = 1000;

pub struct GestureDetector<L, V = VelocityTracker>
where
    L: GestureListener,
    V: VelocityEstimator,
{
    config: GestureDetectorConfig,
    listener: L,
    double_tap_listener: Option<Box<dyn DoubleTapListener>>,
    velocity_tracker: V,
    timeouts: TimeoutGestureHandler,
    thresholds: SlopThresholds,
    swipe: SwipeClassifier,

    current_down_event: Option<MotionEvent>,
    /// Set when a second pointer goes down; used for that pointer's slop.
    secondary_pointer_down_event: Option<MotionEvent>,
    previous_up_event: Option<MotionEvent>,

    last_focus: Point,
    down_focus: Point,
    maximum_pointer_count: usize,
    current_single_tap_repeat_count: u32,

    still_down: bool,
    defer_confirm_single_tap: bool,
    all_pointers_within_slop_regions: bool,
    always_in_bigger_tap_region: bool,
    two_finger_tap_allowed_for_gesture: bool,
    is_double_tapping: bool,
    is_down_candidate_for_repeated_single_tap: bool,

    longpress_enabled: bool,
    showpress_enabled: bool,
}

impl<L: GestureListener> GestureDetector<L> {
    /// Creates a detector using the default [`VelocityTracker`].
    pub fn new(config: GestureDetectorConfig, listener: L) -> Result<Self, ConfigError> {
        Self::with_velocity_estimator(config, listener, VelocityTracker::new())
    }
}

impl<L, V> GestureDetector<L, V>
where
    L: GestureListener,
    V: VelocityEstimator,
{
    pub fn with_velocity_estimator(
        config: GestureDetectorConfig,
        listener: L,
        velocity_tracker: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            timeouts: TimeoutGestureHandler::new(&config),
            thresholds: SlopThresholds::new(&config),
            swipe: SwipeClassifier::new(&config),
            config,
            listener,
            double_tap_listener: None,
            velocity_tracker,
            current_down_event: None,
            secondary_pointer_down_event: None,
            previous_up_event: None,
            last_focus: Point::ZERO,
            down_focus: Point::ZERO,
            maximum_pointer_count: 0,
            current_single_tap_repeat_count: 0,
            still_down: false,
            defer_confirm_single_tap: false,
            all_pointers_within_slop_regions: false,
            always_in_bigger_tap_region: false,
            two_finger_tap_allowed_for_gesture: false,
            is_double_tapping: false,
            is_down_candidate_for_repeated_single_tap: false,
            longpress_enabled: true,
            showpress_enabled: true,
        })
    }

    pub fn with_double_tap_listener(mut self, listener: impl DoubleTapListener + 'static) -> Self {
        self.set_double_tap_listener(Some(Box::new(listener)));
        self
    }

    /// Replaces the double-tap listener.
    ///
    /// Removing the listener while the double-tap window is open flushes the
    /// window to the old listener, so an already completed tap still gets
    /// its single-tap confirmation.
    pub fn set_double_tap_listener(&mut self, listener: Option<Box<dyn DoubleTapListener>>) {
        if listener.is_none() {
            if self.timeouts.has_timeout(TimeoutEvent::Tap) {
                self.timeouts.stop_timeout(TimeoutEvent::Tap);
                self.on_tap_timeout();
            }
            if self.is_double_tapping {
                log::debug!("double tap listener removed mid double tap");
                self.is_double_tapping = false;
            }
        }
        self.double_tap_listener = listener;
    }

    pub fn has_double_tap_listener(&self) -> bool {
        self.double_tap_listener.is_some()
    }

    pub fn config(&self) -> &GestureDetectorConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn velocity_estimator(&self) -> &V {
        &self.velocity_tracker
    }

    pub fn is_double_tapping(&self) -> bool {
        self.is_double_tapping
    }

    pub fn is_longpress_enabled(&self) -> bool {
        self.longpress_enabled
    }

    pub fn is_showpress_enabled(&self) -> bool {
        self.showpress_enabled
    }

    /// Disabling cancels a pending long press.
    pub fn set_longpress_enabled(&mut self, enabled: bool) {
        self.longpress_enabled = enabled;
        if !enabled {
            self.timeouts.stop_timeout(TimeoutEvent::LongPress);
        }
    }

    /// Disabling cancels a pending show press.
    pub fn set_showpress_enabled(&mut self, enabled: bool) {
        self.showpress_enabled = enabled;
        if !enabled {
            self.timeouts.stop_timeout(TimeoutEvent::ShowPress);
        }
    }

    pub fn has_pending_timeout(&self, event: TimeoutEvent) -> bool {
        self.timeouts.has_timeout(event)
    }

    /// When the host should next call [`advance_time`](Self::advance_time).
    pub fn next_timeout_deadline(&self) -> Option<Instant> {
        self.timeouts.next_deadline()
    }

    /// Fires every timeout due at `now`, earliest first.
    pub fn advance_time(&mut self, now: Instant) {
        while let Some(event) = self.timeouts.take_due(now) {
            log::trace!("gesture timeout fired: {event:?}");
            match event {
                TimeoutEvent::ShowPress => self.on_show_press_timeout(),
                TimeoutEvent::LongPress => self.on_long_press_timeout(),
                TimeoutEvent::Tap => self.on_tap_timeout(),
            }
        }
    }

    /// Feeds one motion event. Returns whether a listener consumed it.
    ///
    /// Timeouts due at or before the event's time fire first, as they would
    /// have on the host's event loop.
    pub fn on_touch_event(
        &mut self,
        event: &MotionEvent,
        should_process_double_tap: bool,
    ) -> Result<bool, GestureError> {
        let action = event.action();
        self.check_event(event)?;

        self.advance_time(event.event_time());
        self.velocity_tracker.add_movement(event);

        let skip_index = (action == MotionAction::PointerUp).then(|| event.action_index());
        let focus = focal_point(event, skip_index);

        let handled = match action {
            MotionAction::Down => self.handle_down(event, focus, should_process_double_tap),
            MotionAction::PointerDown => self.handle_pointer_down(event, focus),
            MotionAction::Move => self.handle_move(event, focus),
            MotionAction::PointerUp => self.handle_pointer_up(event, focus),
            MotionAction::Up => self.handle_up(event, should_process_double_tap),
            MotionAction::Cancel => {
                self.cancel();
                false
            }
            MotionAction::ButtonPress
            | MotionAction::ButtonRelease
            | MotionAction::HoverEnter
            | MotionAction::HoverExit
            | MotionAction::HoverMove => return Err(GestureError::UnsupportedAction(action)),
        };
        Ok(handled)
    }

    /// Abandons the current sequence. A pending tap is reported through
    /// [`GestureListener::on_tap_cancel`]; nothing else is dispatched.
    pub fn cancel(&mut self) {
        if self.timeouts.has_timeout(TimeoutEvent::Tap) {
            if let Some(down) = self.current_down_event.as_ref() {
                log::trace!("gesture: tap cancel");
                self.listener.on_tap_cancel(down);
            }
        }
        self.cancel_taps();
        self.velocity_tracker.clear();
        self.current_down_event = None;
        self.secondary_pointer_down_event = None;
        self.previous_up_event = None;
        self.still_down = false;
        self.all_pointers_within_slop_regions = false;
        self.maximum_pointer_count = 0;
        self.two_finger_tap_allowed_for_gesture = false;
        log::debug!("gesture sequence cancelled");
    }

    /// Triggers the long press now instead of waiting for its timeout.
    pub fn activate_long_press_gesture(&mut self) {
        self.timeouts.stop_timeout(TimeoutEvent::ShowPress);
        self.timeouts.stop_timeout(TimeoutEvent::LongPress);
        self.on_long_press_timeout();
    }

    fn check_event(&self, event: &MotionEvent) -> Result<(), GestureError> {
        let action = event.action();
        if !action.is_touch() {
            log::warn!("gesture detector ignoring unsupported action {action:?}");
            return Err(GestureError::UnsupportedAction(action));
        }
        if action == MotionAction::Cancel {
            return Ok(());
        }
        if event.pointer_count() == 0 {
            return Err(GestureError::EmptyEvent(action));
        }
        if matches!(action, MotionAction::PointerDown | MotionAction::PointerUp)
            && event.action_index() >= event.pointer_count()
        {
            return Err(GestureError::InvalidActionIndex {
                action,
                index: event.action_index(),
            });
        }
        if action != MotionAction::Down && (!self.still_down || self.current_down_event.is_none()) {
            log::warn!("gesture detector received {action:?} outside of a touch sequence");
            return Err(GestureError::NoActiveSequence(action));
        }
        Ok(())
    }

    fn handle_down(
        &mut self,
        event: &MotionEvent,
        focus: Point,
        should_process_double_tap: bool,
    ) -> bool {
        let mut handled = false;
        let is_repeated_tap = match (&self.current_down_event, &self.previous_up_event) {
            (Some(first_down), Some(first_up)) => classify::is_repeated_tap(
                first_down,
                first_up,
                event,
                self.always_in_bigger_tap_region,
                &self.repeated_tap_criteria(should_process_double_tap),
            ),
            _ => false,
        };

        if self.double_tap_listener.is_some() && should_process_double_tap {
            self.is_down_candidate_for_repeated_single_tap = false;
            let had_tap_message = self.timeouts.has_timeout(TimeoutEvent::Tap);
            if had_tap_message {
                self.timeouts.stop_timeout(TimeoutEvent::Tap);
            }
            if had_tap_message && is_repeated_tap {
                self.is_double_tapping = true;
                if let (Some(double_tap_listener), Some(first_down)) = (
                    self.double_tap_listener.as_mut(),
                    self.current_down_event.as_ref(),
                ) {
                    log::trace!("gesture: double tap");
                    handled |= double_tap_listener.on_double_tap(first_down);
                    handled |= double_tap_listener.on_double_tap_event(event);
                }
            } else {
                self.timeouts
                    .start_timeout(TimeoutEvent::Tap, event.event_time());
            }
        } else {
            self.is_down_candidate_for_repeated_single_tap = is_repeated_tap;
        }

        self.down_focus = focus;
        self.last_focus = focus;
        self.current_down_event = Some(event.clone());
        self.secondary_pointer_down_event = None;
        self.all_pointers_within_slop_regions = true;
        self.always_in_bigger_tap_region = true;
        self.still_down = true;
        self.defer_confirm_single_tap = false;
        self.two_finger_tap_allowed_for_gesture = self.config.two_finger_tap_enabled;
        self.maximum_pointer_count = 1;

        // Show press is always armed before long press.
        if self.showpress_enabled {
            self.timeouts
                .start_timeout(TimeoutEvent::ShowPress, event.event_time());
        }
        if self.longpress_enabled {
            self.timeouts
                .start_timeout(TimeoutEvent::LongPress, event.event_time());
        }
        handled |= self.listener.on_down(event);
        handled
    }

    fn handle_pointer_down(&mut self, event: &MotionEvent, focus: Point) -> bool {
        self.down_focus = focus;
        self.last_focus = focus;
        // A new finger ends any tap candidacy.
        self.cancel_taps();
        self.maximum_pointer_count = self.maximum_pointer_count.max(event.pointer_count());

        // Kept even without two-finger tap: multi-finger scroll slop needs it.
        if event.pointer_count() == 2 {
            self.secondary_pointer_down_event = Some(event.clone());
        }

        if self.two_finger_tap_allowed_for_gesture {
            let separation_square = self.current_down_event.as_ref().map(|down| {
                down.position(0)
                    .distance_squared_to(event.position(event.action_index()))
            });
            let too_far = separation_square
                .map_or(true, |square| square > self.thresholds.two_finger_tap_distance_square);
            if self.maximum_pointer_count > 2 || too_far {
                self.two_finger_tap_allowed_for_gesture = false;
            }
        }
        false
    }

    fn handle_move(&mut self, event: &MotionEvent, focus: Point) -> bool {
        let mut handled = false;
        let scroll = self.last_focus - focus;

        if self.is_double_tapping {
            if let Some(double_tap_listener) = self.double_tap_listener.as_mut() {
                handled |= double_tap_listener.on_double_tap_event(event);
            }
        } else if self.all_pointers_within_slop_regions {
            if !self.is_within_touch_slop(event) {
                handled = self.dispatch_scroll(event, scroll);
                self.last_focus = focus;
                self.all_pointers_within_slop_regions = false;
                self.timeouts.stop();
            }

            if focus.distance_squared_to(self.down_focus)
                > self.thresholds.double_tap_touch_slop_square
            {
                self.always_in_bigger_tap_region = false;
            }

            if self.all_pointers_within_slop_regions && self.should_accelerate_long_press(event) {
                log::trace!("gesture: accelerated long press");
                self.activate_long_press_gesture();
            }
        } else if scroll.x.abs() > SCROLL_EPSILON || scroll.y.abs() > SCROLL_EPSILON {
            handled = self.dispatch_scroll(event, scroll);
            self.last_focus = focus;
        }

        // Either pointer leaving its own slop region, or a third pointer
        // at any point, rules out a two-finger tap.
        if self.two_finger_tap_allowed_for_gesture
            && (self.maximum_pointer_count > 2 || !self.is_within_touch_slop(event))
        {
            self.two_finger_tap_allowed_for_gesture = false;
        }
        handled
    }

    fn handle_pointer_up(&mut self, event: &MotionEvent, focus: Point) -> bool {
        self.down_focus = focus;
        self.last_focus = focus;

        self.velocity_tracker.compute_current_velocity(
            VELOCITY_UNITS_PER_SECOND,
            self.config.maximum_fling_velocity,
        );
        let up_index = event.action_index();
        let departing = self.velocity_tracker.velocity(event.pointer_id(up_index));
        let tracker = &self.velocity_tracker;
        let remaining = event
            .pointers()
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != up_index)
            .map(|(_, pointer)| tracker.velocity(pointer.id));
        let total = match classify::combined_pointer_up_velocity(departing, remaining) {
            Some(total) => total,
            None => {
                self.velocity_tracker.clear();
                Velocity::ZERO
            }
        };

        let count = event.pointer_count() as f32;
        let mut handled =
            self.handle_swipe_if_needed(event, Velocity::new(total.x / count, total.y / count));

        if self.two_finger_tap_allowed_for_gesture && self.maximum_pointer_count == 2 {
            if let (Some(down), Some(secondary)) = (
                self.current_down_event.as_ref(),
                self.secondary_pointer_down_event.as_ref(),
            ) {
                let elapsed = event
                    .event_time()
                    .saturating_duration_since(secondary.event_time());
                if elapsed <= self.config.two_finger_tap_timeout {
                    log::trace!("gesture: two finger tap");
                    handled = self.listener.on_two_finger_tap(down, event);
                }
            }
        }
        self.two_finger_tap_allowed_for_gesture = false;
        handled
    }

    fn handle_up(&mut self, event: &MotionEvent, should_process_double_tap: bool) -> bool {
        self.still_down = false;
        let mut handled = false;

        if self.is_double_tapping && should_process_double_tap {
            if let Some(double_tap_listener) = self.double_tap_listener.as_mut() {
                handled |= double_tap_listener.on_double_tap_event(event);
            }
        } else if self.all_pointers_within_slop_regions && self.maximum_pointer_count == 1 {
            if self.is_down_candidate_for_repeated_single_tap {
                self.current_single_tap_repeat_count = (1 + self.current_single_tap_repeat_count)
                    % self.config.single_tap_repeat_interval;
            } else {
                self.current_single_tap_repeat_count = 0;
            }
            let tap_count = 1 + self.current_single_tap_repeat_count;
            log::trace!("gesture: single tap up ({tap_count})");
            handled = self.listener.on_single_tap_up(event, tap_count);
            if self.defer_confirm_single_tap && should_process_double_tap {
                if let Some(double_tap_listener) = self.double_tap_listener.as_mut() {
                    double_tap_listener.on_single_tap_confirmed(event);
                }
            }
        } else {
            self.velocity_tracker.compute_current_velocity(
                VELOCITY_UNITS_PER_SECOND,
                self.config.maximum_fling_velocity,
            );
            // Fling follows the pointer that lifted last.
            let velocity = self.velocity_tracker.velocity(event.pointer_id(0));
            if classify::exceeds_fling_velocity(velocity, self.config.minimum_fling_velocity) {
                if let Some(down) = self.current_down_event.as_ref() {
                    log::trace!("gesture: fling ({}, {})", velocity.x, velocity.y);
                    handled = self.listener.on_fling(down, event, velocity.x, velocity.y);
                }
            }
            handled |= self.handle_swipe_if_needed(event, velocity);
        }

        self.previous_up_event = Some(event.clone());
        self.velocity_tracker.clear();
        self.is_double_tapping = false;
        self.defer_confirm_single_tap = false;
        self.timeouts.stop_timeout(TimeoutEvent::ShowPress);
        self.timeouts.stop_timeout(TimeoutEvent::LongPress);
        self.maximum_pointer_count = 0;
        handled
    }

    fn on_show_press_timeout(&mut self) {
        if let Some(down) = self.current_down_event.as_ref() {
            self.listener.on_show_press(down);
        }
    }

    fn on_long_press_timeout(&mut self) {
        self.timeouts.stop_timeout(TimeoutEvent::Tap);
        self.defer_confirm_single_tap = false;
        if let Some(down) = self.current_down_event.as_ref() {
            self.listener.on_long_press(down);
        }
    }

    /// Confirms the single tap once the double-tap window closes, or defers
    /// the confirmation to the up event if the pointer is still down.
    fn on_tap_timeout(&mut self) {
        let Some(double_tap_listener) = self.double_tap_listener.as_mut() else {
            return;
        };
        if self.still_down {
            self.defer_confirm_single_tap = true;
        } else if let Some(up) = self.previous_up_event.as_ref() {
            log::trace!("gesture: single tap confirmed");
            double_tap_listener.on_single_tap_confirmed(up);
        }
    }

    fn cancel_taps(&mut self) {
        self.timeouts.stop();
        self.is_double_tapping = false;
        self.always_in_bigger_tap_region = false;
        self.defer_confirm_single_tap = false;
        self.is_down_candidate_for_repeated_single_tap = false;
        self.current_single_tap_repeat_count = 0;
    }

    fn repeated_tap_criteria(&self, should_process_double_tap: bool) -> RepeatedTapCriteria {
        // The min time guards real double taps only; repeated single taps
        // skip it.
        let double_tap_min_time = (should_process_double_tap
            && self.double_tap_listener.is_some())
        .then_some(self.config.double_tap_min_time);
        RepeatedTapCriteria {
            double_tap_timeout: self.config.double_tap_timeout,
            double_tap_min_time,
            double_tap_slop_square: self.thresholds.double_tap_slop_square,
        }
    }

    fn is_within_touch_slop(&self, event: &MotionEvent) -> bool {
        let Some(down) = self.current_down_event.as_ref() else {
            return false;
        };
        classify::is_within_touch_slop(
            event,
            down,
            self.secondary_pointer_down_event.as_ref(),
            self.maximum_pointer_count,
            self.thresholds.touch_slop_square,
        )
    }

    fn should_accelerate_long_press(&self, event: &MotionEvent) -> bool {
        if !self.timeouts.has_timeout(TimeoutEvent::LongPress) {
            return false;
        }
        let stylus = self.config.stylus_button_accelerated_longpress_enabled
            && event.buttons().contains(MotionButton::StylusPrimary);
        let deep_press = self.config.deep_press_accelerated_longpress_enabled
            && event.pointer_count() == 1
            && event.classification() == MotionClassification::DeepPress;
        stylus || deep_press
    }

    fn dispatch_scroll(&mut self, event: &MotionEvent, scroll: Point) -> bool {
        let Some(down) = self.current_down_event.as_ref() else {
            return false;
        };
        let secondary = match self.secondary_pointer_down_event.as_ref() {
            Some(secondary) if self.maximum_pointer_count > 1 => secondary,
            _ => event,
        };
        log::trace!("gesture: scroll ({}, {})", scroll.x, scroll.y);
        self.listener
            .on_scroll(down, event, secondary, scroll.x, scroll.y)
    }

    fn handle_swipe_if_needed(&mut self, up: &MotionEvent, velocity: Velocity) -> bool {
        let Some(swipe) = self.swipe.classify(velocity) else {
            return false;
        };
        let Some(down) = self.current_down_event.as_ref() else {
            return false;
        };
        log::trace!("gesture: swipe ({}, {})", swipe.x, swipe.y);
        self.listener.on_swipe(down, up, swipe.x, swipe.y)
    }
}

/// Centroid of the event's pointers, leaving out `skip_index`.
fn focal_point(event: &MotionEvent, skip_index: Option<usize>) -> Point {
    let mut sum = Point::ZERO;
    let mut count = 0usize;
    for (index, pointer) in event.pointers().iter().enumerate() {
        if Some(index) == skip_index {
            continue;
        }
        sum += pointer.position;
        count += 1;
    }
    if count == 0 {
        return event.pointers().first().map_or(Point::ZERO, |pointer| pointer.position);
    }
    sum / count as f32
}

#[cfg(test)]
#[path = "tests/detector_tests.rs"]
mod tests;
