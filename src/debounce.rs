//! Trailing-edge debouncing of a widget's terminal values.
//!
//! Per subscription, a small automaton over [`DebounceStatus`]:
//!
//! | status       | value arrives                        | timer fires            |
//! |--------------|--------------------------------------|------------------------|
//! | `Initial`    | keep value, arm timer → `Waiting`    | –                      |
//! | `Waiting(h)` | keep value, cancel `h`, re-arm       | → `Elapsed`, forward   |
//! | `Elapsed`    | forward as `Partial` right away      | –                      |
//!
//! Once the first window has closed, later values pass straight through.
//! Views are forwarded untouched.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::callback::{Canceler, Consumer};
use crate::runtime::Timer;
use crate::view::View;
use crate::widget::{Outcome, Widget};

/// Where a debounced subscription stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceStatus<H> {
    /// No value seen yet.
    Initial,
    /// A value is held and the timer `H` is armed.
    Waiting(H),
    /// The quiet period has passed; values are forwarded immediately.
    Elapsed,
}

impl<H> DebounceStatus<H> {
    pub fn is_waiting(&self) -> bool {
        matches!(self, DebounceStatus::Waiting(_))
    }
}

/// Coalesce bursts of terminal values from `widget` into the last one,
/// delivered as `Partial` once `timeout` passes without a new value.
pub fn debounced<V, A, T>(timer: T, timeout: Duration, widget: Widget<V, A>) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
    T: Timer,
{
    Widget::new(move |sink| {
        let debouncer = Rc::new(Debouncer {
            timer: timer.clone(),
            timeout,
            sink,
            status: RefCell::new(DebounceStatus::Initial),
            latest: RefCell::new(None),
            stopped: Cell::new(false),
        });

        let weak = Rc::downgrade(&debouncer);
        let inner = widget.subscribe(move |outcome| {
            let Some(debouncer) = weak.upgrade() else {
                return;
            };
            match outcome {
                Outcome::View(v) => debouncer.forward_view(v),
                Outcome::Completed(a) | Outcome::Partial(a) => debouncer.on_value(a),
            }
        });

        let timer = timer.clone();
        Canceler::new(move || {
            debouncer.stop();
            let rest = Widget::from_callback(inner.cancel());
            debounced(timer, timeout, rest).into_callback()
        })
    })
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

struct Debouncer<V: 'static, A: 'static, T: Timer> {
    timer: T,
    timeout: Duration,
    sink: Consumer<Outcome<V, A>>,
    status: RefCell<DebounceStatus<T::Handle>>,
    /// Value held while `Waiting`.
    latest: RefCell<Option<A>>,
    stopped: Cell<bool>,
}

impl<V: View, A: Clone + 'static, T: Timer> Debouncer<V, A, T> {
    fn forward_view(&self, view: V) {
        if !self.stopped.get() {
            (self.sink)(Outcome::View(view));
        }
    }

    fn on_value(self: &Rc<Self>, value: A) {
        if self.stopped.get() {
            return;
        }
        let previous = {
            let mut status = self.status.borrow_mut();
            if matches!(*status, DebounceStatus::Elapsed) {
                None
            } else {
                Some(std::mem::replace(&mut *status, DebounceStatus::Initial))
            }
        };

        let Some(previous) = previous else {
            tracing::trace!("debounce window closed, forwarding");
            (self.sink)(Outcome::Partial(value));
            return;
        };

        if let DebounceStatus::Waiting(old) = previous {
            self.timer.cancel(&old);
        }
        *self.latest.borrow_mut() = Some(value);
        let weak = Rc::downgrade(self);
        let handle = self.timer.schedule(
            self.timeout,
            Box::new(move || {
                if let Some(debouncer) = weak.upgrade() {
                    debouncer.on_elapsed();
                }
            }),
        );
        *self.status.borrow_mut() = DebounceStatus::Waiting(handle);
        tracing::trace!(timeout = ?self.timeout, "debounce timer armed");
    }

    fn on_elapsed(self: &Rc<Self>) {
        *self.status.borrow_mut() = DebounceStatus::Elapsed;
        let latest = self.latest.borrow_mut().take();
        if let Some(value) = latest {
            self.on_value(value);
        }
    }

    fn stop(&self) {
        self.stopped.set(true);
        let status = std::mem::replace(&mut *self.status.borrow_mut(), DebounceStatus::Initial);
        if let DebounceStatus::Waiting(handle) = status {
            self.timer.cancel(&handle);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use crate::testing::{Recorder, VirtualClock};
    use pretty_assertions::assert_eq;

    const WINDOW: Duration = Duration::from_millis(100);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup() -> (VirtualClock, EventSource<u32>, Recorder<String, u32>, Canceler<Outcome<String, u32>>) {
        let clock = VirtualClock::new();
        let source = EventSource::new();
        let rec = Recorder::new();
        let canceler = rec.attach(&debounced(clock.clone(), WINDOW, source.each(String::from("input"))));
        (clock, source, rec, canceler)
    }

    #[test]
    fn burst_forwards_only_last_value_once() {
        let (clock, source, rec, _c) = setup();
        source.emit(1);
        clock.advance(ms(40));
        source.emit(2);
        clock.advance(ms(40));
        source.emit(3);
        clock.advance(ms(99));
        assert!(rec.values().is_empty());
        clock.advance(ms(1));
        assert_eq!(rec.values(), vec![3]);
        clock.advance(ms(500));
        assert_eq!(rec.values(), vec![3]);
        assert_eq!(rec.outcomes().last(), Some(&Outcome::Partial(3)));
    }

    #[test]
    fn separated_values_each_forwarded() {
        let (clock, source, rec, _c) = setup();
        source.emit(1);
        clock.advance(ms(150));
        assert_eq!(rec.values(), vec![1]);
        source.emit(2);
        assert_eq!(rec.values(), vec![1, 2]);
    }

    #[test]
    fn views_pass_through() {
        let (_clock, _source, rec, _c) = setup();
        assert_eq!(rec.views(), vec!["input"]);
    }

    #[test]
    fn sub_millisecond_timeout_is_honoured() {
        let clock = VirtualClock::new();
        let source = EventSource::new();
        let rec = Recorder::new();
        let timeout = Duration::from_micros(500);
        let _c = rec.attach(&debounced(clock.clone(), timeout, source.each(String::new())));
        source.emit(1_u32);
        clock.advance(Duration::from_micros(499));
        assert!(rec.values().is_empty());
        clock.advance(Duration::from_micros(1));
        assert_eq!(rec.values(), vec![1]);
    }

    #[test]
    fn cancel_stops_pending_timer() {
        let (clock, source, rec, canceler) = setup();
        source.emit(1);
        assert_eq!(clock.pending(), 1);
        canceler.cancel();
        assert_eq!(clock.pending(), 0);
        assert_eq!(source.listener_count(), 0);
        clock.advance(ms(200));
        assert!(rec.values().is_empty());
    }

    #[test]
    fn status_helpers() {
        assert!(DebounceStatus::Waiting(1_u8).is_waiting());
        assert!(!DebounceStatus::<u8>::Initial.is_waiting());
        assert!(!DebounceStatus::<u8>::Elapsed.is_waiting());
    }

    #[test]
    fn bind_after_debounce_takes_settled_value() {
        let clock = VirtualClock::new();
        let source = EventSource::new();
        let rec = Recorder::new();
        let widget = debounced(clock.clone(), WINDOW, source.each(String::new()))
            .bind(|query: u32| Widget::pure(query * 2));
        let _c = rec.attach(&widget);
        source.emit(5);
        source.emit(6);
        clock.advance(WINDOW);
        assert_eq!(rec.values(), vec![12]);
        // The debounced stage was cancelled by the Partial hand-off.
        assert_eq!(source.listener_count(), 0);
    }
}
