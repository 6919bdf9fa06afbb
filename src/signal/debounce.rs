//! Debounced input loops as signals.
//!
//! The signal sits idle on its value until the input widget produces a new
//! one. It then keeps racing the input against a quiet timer; each fresh
//! value restarts the race. When the timer wins, the last value becomes the
//! signal's value and it goes idle again.

use std::rc::Rc;
use std::time::Duration;

use crate::effect::delay;
use crate::runtime::Timer;
use crate::view::View;
use crate::widget::Widget;

use super::Signal;

/// A signal over `input` that only moves once `timeout` passes quietly.
///
/// `input` is given the current value and should show the input control and
/// complete with the next value entered.
pub fn debounce<V, A, T, F>(timer: T, timeout: Duration, initial: A, input: F) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
    T: Timer,
    F: Fn(A) -> Widget<V, A> + 'static,
{
    let settle = Rc::new(Settle {
        timer,
        timeout,
        input: Box::new(input),
    });
    idle(settle, initial)
}

struct Settle<V: 'static, A: 'static, T> {
    timer: T,
    timeout: Duration,
    input: Box<dyn Fn(A) -> Widget<V, A>>,
}

fn idle<V, A, T>(settle: Rc<Settle<V, A, T>>, value: A) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
    T: Timer,
{
    let seed = value.clone();
    let next = Widget::lazy(move || {
        let settle_next = Rc::clone(&settle);
        (settle.input)(seed.clone()).bind(move |fresh| racing(Rc::clone(&settle_next), fresh))
    });
    Signal::step(value, next)
}

fn racing<V, A, T>(settle: Rc<Settle<V, A, T>>, value: A) -> Widget<V, Signal<V, A>>
where
    V: View,
    A: Clone + 'static,
    T: Timer,
{
    tracing::trace!(timeout = ?settle.timeout, "debounce race restarted");
    let fresh = (settle.input)(value.clone()).map(Some);
    let quiet = delay(settle.timer.clone(), settle.timeout).map(|()| None);
    fresh.or(quiet).bind(move |winner| match winner {
        Some(fresh) => racing(Rc::clone(&settle), fresh),
        None => Widget::pure(idle(Rc::clone(&settle), value.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use crate::signal::tests::observe;
    use crate::testing::VirtualClock;
    use pretty_assertions::assert_eq;

    const QUIET: Duration = Duration::from_millis(100);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn text_input(source: &EventSource<String>) -> impl Fn(String) -> Widget<String, String> {
        let source = source.clone();
        move |current| source.next(format!("[{current}]"))
    }

    #[test]
    fn settles_on_last_value_after_quiet_period() {
        let clock = VirtualClock::new();
        let typed = EventSource::new();
        let signal = debounce(clock.clone(), QUIET, String::new(), text_input(&typed));
        let (log, _rec, _c) = observe(signal);

        typed.emit(String::from("r"));
        clock.advance(ms(30));
        typed.emit(String::from("ru"));
        clock.advance(ms(30));
        typed.emit(String::from("rust"));
        clock.advance(ms(99));
        assert_eq!(*log.borrow(), vec![String::new()]);

        clock.advance(ms(1));
        assert_eq!(*log.borrow(), vec![String::new(), String::from("rust")]);
    }

    #[test]
    fn input_shows_latest_typed_value_while_racing() {
        let clock = VirtualClock::new();
        let typed = EventSource::new();
        let (_log, rec, _c) = observe(debounce(clock.clone(), QUIET, String::from("a"), text_input(&typed)));
        typed.emit(String::from("ab"));
        assert_eq!(rec.last_view().as_deref(), Some("[ab]"));
        clock.advance(QUIET);
        assert_eq!(rec.last_view().as_deref(), Some("[ab]"));
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn idle_signal_arms_no_timer() {
        let clock = VirtualClock::new();
        let typed = EventSource::new();
        let (log, _rec, _c) = observe(debounce(clock.clone(), QUIET, String::from("x"), text_input(&typed)));
        clock.advance(ms(1_000));
        assert_eq!(clock.pending(), 0);
        assert_eq!(*log.borrow(), vec![String::from("x")]);
    }

    #[test]
    fn two_bursts_settle_twice() {
        let clock = VirtualClock::new();
        let typed = EventSource::new();
        let (log, _rec, _c) = observe(debounce(clock.clone(), QUIET, 0_u32, {
            let typed = typed.clone();
            move |n: u32| typed.next(format!("{n}"))
        }));
        typed.emit(1);
        typed.emit(2);
        clock.advance(QUIET);
        typed.emit(3);
        clock.advance(QUIET);
        assert_eq!(*log.borrow(), vec![0, 2, 3]);
    }
}
