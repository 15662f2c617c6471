//! Delayed callbacks racing against a press.
//!
//! The detector owns three independent one-shot timeouts. Each slot is either
//! idle or armed with a deadline on the event timeline; the host decides when
//! time passes and asks for whichever slots are due. Keeping the slots in one
//! fixed table makes "stop everything" a single pass and lets tests drive time
//! by hand.

use std::time::Duration;

use web_time::Instant;

use crate::config::GestureDetectorConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeoutEvent {
    ShowPress = 0,
    LongPress = 1,
    Tap = 2,
}

impl TimeoutEvent {
    /// All slots, in tie-break order.
    pub const ALL: [TimeoutEvent; 3] = [
        TimeoutEvent::ShowPress,
        TimeoutEvent::LongPress,
        TimeoutEvent::Tap,
    ];

    const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        self as usize
    }
}

pub struct TimeoutGestureHandler {
    delays: [Duration; TimeoutEvent::COUNT],
    deadlines: [Option<Instant>; TimeoutEvent::COUNT],
}

impl TimeoutGestureHandler {
    /// Long press is scheduled off the down event, after show press, so the
    /// show press slot always expires first.
    pub fn new(config: &GestureDetectorConfig) -> Self {
        debug_assert!(config.showpress_timeout <= config.longpress_timeout);
        let mut delays = [Duration::ZERO; TimeoutEvent::COUNT];
        delays[TimeoutEvent::ShowPress.index()] = config.showpress_timeout;
        delays[TimeoutEvent::LongPress.index()] =
            config.longpress_timeout + config.showpress_timeout;
        delays[TimeoutEvent::Tap.index()] = config.double_tap_timeout;
        Self {
            delays,
            deadlines: [None; TimeoutEvent::COUNT],
        }
    }

    pub fn delay(&self, event: TimeoutEvent) -> Duration {
        self.delays[event.index()]
    }

    /// Arms `event` to expire one delay after `now`, replacing any pending
    /// deadline.
    pub fn start_timeout(&mut self, event: TimeoutEvent, now: Instant) {
        self.deadlines[event.index()] = Some(now + self.delays[event.index()]);
    }

    pub fn stop_timeout(&mut self, event: TimeoutEvent) {
        self.deadlines[event.index()] = None;
    }

    pub fn stop(&mut self) {
        self.deadlines = [None; TimeoutEvent::COUNT];
    }

    pub fn has_timeout(&self, event: TimeoutEvent) -> bool {
        self.deadlines[event.index()].is_some()
    }

    pub fn deadline(&self, event: TimeoutEvent) -> Option<Instant> {
        self.deadlines[event.index()]
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarms and returns the earliest slot whose deadline is at or before
    /// `now`. Equal deadlines resolve in [`TimeoutEvent::ALL`] order.
    pub fn take_due(&mut self, now: Instant) -> Option<TimeoutEvent> {
        let mut due: Option<(TimeoutEvent, Instant)> = None;
        for event in TimeoutEvent::ALL {
            if let Some(deadline) = self.deadlines[event.index()] {
                if deadline > now {
                    continue;
                }
                if due.map_or(true, |(_, earliest)| deadline < earliest) {
                    due = Some((event, deadline));
                }
            }
        }
        let (event, _) = due?;
        self.deadlines[event.index()] = None;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn handler() -> TimeoutGestureHandler {
        TimeoutGestureHandler::new(&GestureDetectorConfig::default())
    }

    #[test]
    fn long_press_delay_includes_show_press() {
        let handler = handler();
        assert_eq!(handler.delay(TimeoutEvent::ShowPress), ms(180));
        assert_eq!(handler.delay(TimeoutEvent::LongPress), ms(680));
        assert_eq!(handler.delay(TimeoutEvent::Tap), ms(300));
    }

    #[test]
    fn restart_replaces_deadline() {
        let mut handler = handler();
        let origin = Instant::now();
        handler.start_timeout(TimeoutEvent::Tap, origin);
        handler.start_timeout(TimeoutEvent::Tap, origin + ms(100));

        assert_eq!(handler.take_due(origin + ms(300)), None);
        assert_eq!(handler.take_due(origin + ms(400)), Some(TimeoutEvent::Tap));
        assert_eq!(handler.take_due(origin + ms(10_000)), None);
    }

    #[test]
    fn stopping_one_slot_leaves_others_armed() {
        let mut handler = handler();
        let origin = Instant::now();
        for event in TimeoutEvent::ALL {
            handler.start_timeout(event, origin);
        }
        handler.stop_timeout(TimeoutEvent::LongPress);

        assert!(handler.has_timeout(TimeoutEvent::ShowPress));
        assert!(!handler.has_timeout(TimeoutEvent::LongPress));
        assert!(handler.has_timeout(TimeoutEvent::Tap));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut handler = handler();
        handler.stop();
        handler.stop_timeout(TimeoutEvent::Tap);
        handler.stop();
        assert_eq!(handler.next_deadline(), None);
        assert_eq!(handler.take_due(Instant::now() + ms(10_000)), None);
    }

    #[test]
    fn due_slots_come_out_in_deadline_order() {
        let mut handler = handler();
        let origin = Instant::now();
        for event in TimeoutEvent::ALL {
            handler.start_timeout(event, origin);
        }
        assert_eq!(handler.next_deadline(), Some(origin + ms(180)));

        let later = origin + ms(1_000);
        assert_eq!(handler.take_due(later), Some(TimeoutEvent::ShowPress));
        assert_eq!(handler.take_due(later), Some(TimeoutEvent::Tap));
        assert_eq!(handler.take_due(later), Some(TimeoutEvent::LongPress));
        assert_eq!(handler.take_due(later), None);
    }

    #[test]
    fn equal_deadlines_resolve_in_slot_order() {
        let config = GestureDetectorConfig::default()
            .with_showpress_timeout(ms(0))
            .with_longpress_timeout(ms(300))
            .with_double_tap_timeout(ms(300));
        let mut handler = TimeoutGestureHandler::new(&config);
        let origin = Instant::now();
        handler.start_timeout(TimeoutEvent::Tap, origin);
        handler.start_timeout(TimeoutEvent::LongPress, origin);

        let now = origin + ms(300);
        assert_eq!(handler.take_due(now), Some(TimeoutEvent::LongPress));
        assert_eq!(handler.take_due(now), Some(TimeoutEvent::Tap));
    }
}
