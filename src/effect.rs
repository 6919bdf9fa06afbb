//! Lifting effects into widgets: synchronous effects, async tasks, delays.
//!
//! Async failures are logged and swallowed: the widget shows its initial view
//! and never completes. Surfacing the error would need an error channel in
//! [`Outcome`], which the engine does not have.

use std::cell::Cell;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crate::callback::{Callback, Canceler};
use crate::runtime::{Executor, Timer};
use crate::view::View;
use crate::widget::{Outcome, Widget};

/// Error logged when a bridged async task fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("async task failed: {message}")]
pub struct TaskError {
    message: String,
}

impl TaskError {
    pub fn new(cause: impl fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------
// Synchronous effects
// ---------------------------------------------------------------------------

/// Run `effect` on every subscription and complete with its result.
///
/// The effect has finished by the time `subscribe` returns, so the canceler
/// has nothing to undo. Panics inside `effect` propagate to the subscriber.
pub fn lift_sync<V, A>(effect: impl Fn() -> A + 'static) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
{
    Widget::new(move |sink| {
        sink(Outcome::Completed(effect()));
        Canceler::inert()
    })
}

// ---------------------------------------------------------------------------
// Async tasks
// ---------------------------------------------------------------------------

/// Show `initial`, run the task built by `task`, complete with its value.
///
/// Cancelling re-delivers `initial` (restoring the view an aborted attempt
/// may have left behind), aborts the task, discards its outcome and leaves
/// nothing behind. A failed task is logged at `error` level and the widget
/// stalls on `initial`.
pub fn lift_async<V, A, E, X, F, Fut>(executor: X, initial: V, task: F) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
    E: fmt::Display + 'static,
    X: Executor,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<A, E>> + 'static,
{
    Widget::new(move |sink| {
        sink(Outcome::View(initial.clone()));

        let discarded = Rc::new(Cell::new(false));
        let future = task();
        let deliver = Rc::clone(&sink);
        let discard = Rc::clone(&discarded);
        let handle = executor.spawn(Box::pin(async move {
            match future.await {
                Ok(value) => {
                    if !discard.get() {
                        deliver(Outcome::Completed(value));
                    }
                }
                Err(cause) => {
                    let err = TaskError::new(cause);
                    tracing::error!(error = %err, "async widget task failed; widget will not complete");
                }
            }
        }));

        let executor = executor.clone();
        let initial = initial.clone();
        Canceler::new(move || {
            sink(Outcome::View(initial));
            discarded.set(true);
            executor.abort(&handle);
            tracing::trace!("async widget task cancelled");
            Callback::never()
        })
    })
}

/// [`lift_async`] for tasks that cannot fail.
pub fn lift_future<V, A, X, F, Fut>(executor: X, initial: V, task: F) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
    X: Executor,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = A> + 'static,
{
    lift_async(executor, initial, move || {
        let future = task();
        async move { Ok::<A, Infallible>(future.await) }
    })
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Complete with `()` once `after` has passed. Shows nothing.
pub fn delay<V, T>(timer: T, after: Duration) -> Widget<V, ()>
where
    V: View,
    T: Timer,
{
    Widget::new(move |sink| {
        let handle = timer.schedule(after, Box::new(move || sink(Outcome::Completed(()))));
        let timer = timer.clone();
        Canceler::new(move || {
            timer.cancel(&handle);
            Callback::never()
        })
    })
}

// ===========================================================================
// Tests
// ===========================================================================
