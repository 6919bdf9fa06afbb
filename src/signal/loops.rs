//! Feedback loops and folds over signals.

use std::ops::ControlFlow;
use std::rc::Rc;

use crate::view::View;
use crate::widget::Widget;

use super::{demand, Signal};

/// Feed each result of `f` back into `f`, forever.
///
/// `f` runs lazily, once per step, when the tail is subscribed.
pub fn loop_w<V, A, F>(initial: A, f: F) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
    F: Fn(A) -> Widget<V, A> + 'static,
{
    loop_w_shared(initial, Rc::new(f))
}

fn loop_w_shared<V, A>(value: A, f: Rc<dyn Fn(A) -> Widget<V, A>>) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
{
    let seed = value.clone();
    let next = Widget::lazy(move || {
        let again = Rc::clone(&f);
        f(seed.clone()).map(move |value| loop_w_shared(value, Rc::clone(&again)))
    });
    Signal::step(value, next)
}

/// Like [`loop_w`], with a signal per iteration.
///
/// The signal `f` returns is advanced one step; the value it lands on is fed
/// back into `f`. Its current value is the loop's value meanwhile.
pub fn loop_s<V, A, F>(initial: A, f: F) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
    F: Fn(A) -> Signal<V, A> + 'static,
{
    loop_s_shared(initial, Rc::new(f))
}

fn loop_s_shared<V, A>(initial: A, f: Rc<dyn Fn(A) -> Signal<V, A>>) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
{
    let (value, next) = f(initial).into_parts();
    Signal::step(
        value,
        next.map(move |landed: Signal<V, A>| loop_s_shared(landed.extract(), Rc::clone(&f))),
    )
}

/// Accumulate a signal's values.
///
/// The accumulator starts as `combine(initial, signal.value)` and takes one
/// more `combine` per step of `signal`.
pub fn foldp<V, A, B, F>(combine: F, initial: B, signal: Signal<V, A>) -> Signal<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
    F: Fn(B, A) -> B + 'static,
{
    foldp_shared(Rc::new(combine), initial, signal)
}

fn foldp_shared<V, A, B>(combine: Rc<dyn Fn(B, A) -> B>, acc: B, signal: Signal<V, A>) -> Signal<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
{
    let (value, next) = signal.into_parts();
    let acc = combine(acc, value);
    let seed = acc.clone();
    Signal::step(
        acc,
        next.map(move |later| foldp_shared(Rc::clone(&combine), seed.clone(), later)),
    )
}

/// A state machine that runs until `step` breaks.
///
/// `None` while `step` keeps returning `Continue(state)`. The first
/// `Break(a)` turns the value into `Some(a)` for good, and `step` is not
/// called again.
pub fn state_loop_s<V, S, A, F>(default: S, step: F) -> Signal<V, Option<A>>
where
    V: View,
    S: Clone + 'static,
    A: Clone + 'static,
    F: Fn(S) -> Signal<V, ControlFlow<A, S>> + 'static,
{
    loop_s(ControlFlow::Continue(default), move |flow| match flow {
        ControlFlow::Continue(state) => step(state),
        ControlFlow::Break(done) => Signal::pure(ControlFlow::Break(done)),
    })
    .map(|flow| match flow {
        ControlFlow::Break(done) => Some(done),
        ControlFlow::Continue(_) => None,
    })
}

/// Run [`state_loop_s`] as a widget that completes with the break value.
pub fn demand_loop<V, S, A, F>(default: S, step: F) -> Widget<V, A>
where
    V: View,
    S: Clone + 'static,
    A: Clone + 'static,
    F: Fn(S) -> Signal<V, ControlFlow<A, S>> + 'static,
{
    demand(state_loop_s(default, step))
}
