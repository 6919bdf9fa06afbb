//! Signals: a current value plus the widget that produces the next signal.
//!
//! A signal never completes. Each time its tail widget finishes, the result
//! is the signal's next state. Everything here is built from widgets alone.
//!
//! - [`Signal::step`], [`hold`], [`fire_once`] — construction.
//! - [`dynamic`], [`demand`] — back from signals to widgets.
//! - [`loops`] — feedback loops and folds.
//! - [`debounce()`] — settle a noisy input loop.

pub mod debounce;
pub mod loops;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::callback::{Callback, Canceler, Consumer};
use crate::view::View;
use crate::widget::{Outcome, Widget, WidgetCanceler};

pub use debounce::debounce;
pub use loops::{demand_loop, foldp, loop_s, loop_w, state_loop_s};

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// An always-available value and the widget that yields the next state.
pub struct Signal<V: 'static, A: 'static> {
    value: A,
    next: Widget<V, Signal<V, A>>,
}

impl<V: 'static, A: Clone + 'static> Clone for Signal<V, A> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            next: self.next.clone(),
        }
    }
}

impl<V: 'static, A: fmt::Debug + 'static> fmt::Debug for Signal<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<V: View, A: Clone + 'static> Signal<V, A> {
    /// A signal holding `value` until `next` completes.
    pub fn step(value: A, next: Widget<V, Signal<V, A>>) -> Self {
        Self { value, next }
    }

    /// A signal stuck on `value`. Its tail shows the empty view forever.
    pub fn pure(value: A) -> Self {
        Self::step(value, Widget::empty())
    }

    /// The current value.
    pub fn value(&self) -> &A {
        &self.value
    }

    /// A copy of the current value.
    pub fn extract(&self) -> A {
        self.value.clone()
    }

    /// The widget producing the next state.
    pub fn next(&self) -> &Widget<V, Signal<V, A>> {
        &self.next
    }

    pub fn into_parts(self) -> (A, Widget<V, Signal<V, A>>) {
        (self.value, self.next)
    }

    /// Map every value, now and in all later states.
    pub fn map<B, F>(self, f: F) -> Signal<V, B>
    where
        B: Clone + 'static,
        F: Fn(A) -> B + 'static,
    {
        map_shared(self, Rc::new(f))
    }

    /// Run the signal forever as a widget. See [`dynamic`].
    pub fn dynamic<B: Clone + 'static>(self) -> Widget<V, B> {
        dynamic(self)
    }
}

fn map_shared<V, A, B>(signal: Signal<V, A>, f: Rc<dyn Fn(A) -> B>) -> Signal<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
{
    let (value, next) = signal.into_parts();
    let value = f(value);
    Signal::step(value, next.map(move |later| map_shared(later, Rc::clone(&f))))
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Re-run `widget` forever, holding its latest result.
pub fn hold<V, A>(initial: A, widget: Widget<V, A>) -> Signal<V, A>
where
    V: View,
    A: Clone + 'static,
{
    let again = widget.clone();
    Signal::step(initial, widget.map(move |value| hold(value, again.clone())))
}

/// `None` until `widget` completes, then `Some(result)` for good.
pub fn fire_once<V, A>(widget: Widget<V, A>) -> Signal<V, Option<A>>
where
    V: View,
    A: Clone + 'static,
{
    Signal::step(None, widget.map(|value| Signal::pure(Some(value))))
}

// ---------------------------------------------------------------------------
// Back to widgets
// ---------------------------------------------------------------------------

/// Complete with the first `Some` the signal holds, advancing until then.
pub fn demand<V, A>(signal: Signal<V, Option<A>>) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
{
    let (value, next) = signal.into_parts();
    match value {
        Some(value) => Widget::pure(value),
        None => next.bind(demand),
    }
}

/// Alias of [`demand`].
pub fn one_shot<V, A>(signal: Signal<V, Option<A>>) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
{
    demand(signal)
}

/// Advance `signal` forever, forwarding the views of every state.
///
/// The resulting widget never completes, so `B` is free. Only the current
/// state's subscription is kept; finished states are dropped as the signal
/// moves on.
pub fn dynamic<V, A, B>(signal: Signal<V, A>) -> Widget<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
{
    Widget::new(move |sink| {
        let runner = Rc::new(Dynamic {
            sink,
            generation: Cell::new(0),
            current: RefCell::new(None),
            stopped: Cell::new(false),
        });
        runner.advance(signal.clone());
        Canceler::new(move || runner.cancel())
    })
}

struct Dynamic<V: 'static, A: 'static, B: 'static> {
    sink: Consumer<Outcome<V, B>>,
    /// Bumped every time a state resolves; stale deliveries carry an old one.
    generation: Cell<u64>,
    current: RefCell<Option<WidgetCanceler<V, Signal<V, A>>>>,
    stopped: Cell<bool>,
}

impl<V: View, A: Clone + 'static, B: Clone + 'static> Dynamic<V, A, B> {
    fn advance(self: &Rc<Self>, signal: Signal<V, A>) {
        let generation = self.generation.get();
        let parked: Rc<RefCell<Option<Signal<V, A>>>> = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(self);
        let slot = Rc::clone(&parked);
        let canceler = signal.next().subscribe(move |outcome| {
            if let Some(runner) = weak.upgrade() {
                runner.deliver(generation, &slot, outcome);
            }
        });

        if self.stopped.get() {
            let _residual = canceler.cancel();
            return;
        }
        if self.generation.get() == generation {
            *self.current.borrow_mut() = Some(canceler);
            return;
        }
        // Resolved during subscribe. A `Partial` waits for this stage to be
        // cancelled before the next one starts.
        let deferred = parked.borrow_mut().take();
        if let Some(next) = deferred {
            let _residual = canceler.cancel();
            self.advance(next);
        }
    }

    fn deliver(
        self: &Rc<Self>,
        generation: u64,
        parked: &RefCell<Option<Signal<V, A>>>,
        outcome: Outcome<V, Signal<V, A>>,
    ) {
        if self.stopped.get() || generation != self.generation.get() {
            return;
        }
        let (next, partial) = match outcome {
            Outcome::View(v) => {
                (self.sink)(Outcome::View(v));
                return;
            }
            Outcome::Completed(next) => (next, false),
            Outcome::Partial(next) => (next, true),
        };

        self.generation.set(generation + 1);
        let previous = self.current.borrow_mut().take();
        match previous {
            Some(canceler) => {
                if partial {
                    let _residual = canceler.cancel();
                } else {
                    drop(canceler);
                }
                self.advance(next);
            }
            // Still inside `advance` for this stage.
            None if partial => *parked.borrow_mut() = Some(next),
            None => self.advance(next),
        }
    }

    fn cancel(&self) -> Callback<Outcome<V, B>> {
        self.stopped.set(true);
        let current = self.current.borrow_mut().take();
        match current {
            Some(canceler) => Widget::from_callback(canceler.cancel())
                .bind(dynamic::<V, A, B>)
                .into_callback(),
            None => Callback::never(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
