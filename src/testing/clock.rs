//! VirtualClock: a manually advanced [`Timer`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::runtime::Timer;

new_key_type! {
    /// Handle of a callback scheduled on a [`VirtualClock`].
    pub struct TimerKey;
}

struct Scheduled {
    due: Duration,
    /// Tie-breaker: timers due at the same instant fire in schedule order.
    seq: u64,
    fire: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_seq: u64,
    timers: SlotMap<TimerKey, Scheduled>,
}

// ---------------------------------------------------------------------------
// VirtualClock
// ---------------------------------------------------------------------------

/// A timer whose time only moves when [`advance`](VirtualClock::advance) is
/// called.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use weave_ui::effect::delay;
/// use weave_ui::testing::{Recorder, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let rec: Recorder<String, ()> = Recorder::new();
/// let _canceler = rec.attach(&delay(clock.clone(), Duration::from_millis(10)));
/// clock.advance(Duration::from_millis(10));
/// assert!(rec.is_finished());
/// ```
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualClock")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of scheduled callbacks that have not fired.
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Move time forward by `by`, firing every callback that falls due, in
    /// due-time order. Callbacks scheduled while advancing fire too if they
    /// fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let fire = {
                let mut state = self.state.borrow_mut();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(key, _)| key);
                match next.and_then(|key| state.timers.remove(key)) {
                    Some(timer) => {
                        state.now = timer.due;
                        timer.fire
                    }
                    None => break,
                }
            };
            fire();
        }
        self.state.borrow_mut().now = target;
    }
}

impl Timer for VirtualClock {
    type Handle = TimerKey;

    fn schedule(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> TimerKey {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.timers.insert(Scheduled { due, seq, fire })
    }

    fn cancel(&self, handle: &TimerKey) {
        self.state.borrow_mut().timers.remove(*handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn log_into(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Box<dyn FnOnce()> {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(label))
    }

    #[test]
    fn fires_in_due_order() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        clock.schedule(Duration::from_millis(20), log_into(&log, "late"));
        clock.schedule(Duration::from_millis(10), log_into(&log, "early"));
        clock.schedule(Duration::from_millis(10), log_into(&log, "early-2"));
        clock.advance(Duration::from_millis(15));
        assert_eq!(*log.borrow(), vec!["early", "early-2"]);
        clock.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["early", "early-2", "late"]);
        assert_eq!(clock.now(), Duration::from_millis(20));
    }

    #[test]
    fn cancel_removes_timer() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let key = clock.schedule(Duration::from_millis(5), log_into(&log, "x"));
        assert_eq!(clock.pending(), 1);
        clock.cancel(&key);
        clock.cancel(&key);
        clock.advance(Duration::from_millis(10));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn timers_scheduled_while_advancing_fire_in_window() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (c, l) = (clock.clone(), log.clone());
        clock.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                l.borrow_mut().push("outer");
                c.schedule(Duration::from_millis(5), log_into(&l, "inner"));
            }),
        );
        clock.advance(Duration::from_millis(10));
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn debug_output() {
        let clock = VirtualClock::new();
        let dbg = format!("{:?}", clock);
        assert!(dbg.contains("VirtualClock"));
        assert!(dbg.contains("pending: 0"));
    }
}
