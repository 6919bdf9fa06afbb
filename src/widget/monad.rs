//! The [`Widget`] type and its leaf constructors.

use std::fmt;
use std::rc::Rc;

use crate::callback::{Callback, Canceler, Consumer};
use crate::view::View;

use super::bind::bind_shared;
use super::merge::orr;
use super::outcome::Outcome;

/// Canceler of a widget subscription.
pub type WidgetCanceler<V, A> = Canceler<Outcome<V, A>>;

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// One run of a component: any number of views, then one terminal value.
///
/// A widget is a description. Nothing happens until it is subscribed, and
/// every subscription is an independent run with its own canceler. The
/// canceler owns the run's bookkeeping, so keep it alive for as long as the
/// run should keep delivering.
pub struct Widget<V: 'static, A: 'static> {
    callback: Callback<Outcome<V, A>>,
}

impl<V: 'static, A: 'static> Clone for Widget<V, A> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
        }
    }
}

impl<V: 'static, A: 'static> fmt::Debug for Widget<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget").finish_non_exhaustive()
    }
}

impl<V: 'static, A: 'static> From<Callback<Outcome<V, A>>> for Widget<V, A> {
    fn from(callback: Callback<Outcome<V, A>>) -> Self {
        Self { callback }
    }
}

impl<V: 'static, A: 'static> Widget<V, A> {
    /// Build a widget from a raw subscribe function.
    pub fn new(
        subscribe: impl Fn(Consumer<Outcome<V, A>>) -> WidgetCanceler<V, A> + 'static,
    ) -> Self {
        Self {
            callback: Callback::new(subscribe),
        }
    }

    /// Wrap a callback of outcomes.
    pub fn from_callback(callback: Callback<Outcome<V, A>>) -> Self {
        Self { callback }
    }

    /// The underlying callback.
    pub fn callback(&self) -> &Callback<Outcome<V, A>> {
        &self.callback
    }

    /// Unwrap into the underlying callback.
    pub fn into_callback(self) -> Callback<Outcome<V, A>> {
        self.callback
    }

    /// Start a run.
    pub fn subscribe(&self, consumer: impl Fn(Outcome<V, A>) + 'static) -> WidgetCanceler<V, A> {
        self.callback.subscribe(consumer)
    }

    /// Start a run delivering to a shared consumer.
    pub fn subscribe_shared(&self, consumer: Consumer<Outcome<V, A>>) -> WidgetCanceler<V, A> {
        self.callback.subscribe_shared(consumer)
    }

    /// A widget that never delivers anything, not even a view.
    pub fn never() -> Self {
        Self::from_callback(Callback::never())
    }
}

impl<V: View, A: Clone + 'static> Widget<V, A> {
    /// Complete immediately with `value`. Nothing to undo.
    pub fn pure(value: A) -> Self {
        Self::new(move |sink| {
            sink(Outcome::Completed(value.clone()));
            Canceler::inert()
        })
    }

    /// Show `view` and never complete.
    pub fn display(view: V) -> Self {
        Self::new(move |sink| {
            sink(Outcome::View(view.clone()));
            Canceler::inert()
        })
    }

    /// Show the empty view forever. Same as `orr(vec![])`.
    pub fn empty() -> Self {
        orr(Vec::new())
    }

    /// Build the widget afresh on every subscription.
    ///
    /// This is how self-referential widgets are written: the recursive call
    /// sits inside `build` and only runs when someone subscribes.
    pub fn lazy(build: impl Fn() -> Widget<V, A> + 'static) -> Self {
        Self::new(move |sink| build().subscribe_shared(sink))
    }

    /// Map the terminal value. `Completed` stays `Completed`, `Partial`
    /// stays `Partial`.
    pub fn map<B, F>(self, f: F) -> Widget<V, B>
    where
        B: Clone + 'static,
        F: Fn(A) -> B + 'static,
    {
        map_shared(self, Rc::new(f))
    }

    /// Run `self`, then the widget `next` builds from its value.
    ///
    /// Views from the first stage are forwarded until it resolves. The
    /// canceler always targets whichever stage is active.
    pub fn bind<B, F>(self, next: F) -> Widget<V, B>
    where
        B: Clone + 'static,
        F: Fn(A) -> Widget<V, B> + 'static,
    {
        bind_shared(self, Rc::new(next))
    }

    /// Race `self` against `other`, merging their views.
    pub fn or(self, other: Widget<V, A>) -> Self {
        orr(vec![self, other])
    }
}

fn map_shared<V, A, B>(widget: Widget<V, A>, f: Rc<dyn Fn(A) -> B>) -> Widget<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
{
    Widget::new(move |sink| {
        let mapper = Rc::clone(&f);
        let canceler = widget.subscribe(move |outcome| sink(outcome.map(|a| mapper(a))));
        let f = Rc::clone(&f);
        canceler.map_residual(move |rest| map_shared(Widget::from_callback(rest), f).into_callback())
    })
}

// ===========================================================================
// Tests
// ===========================================================================
