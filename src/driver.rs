//! Top-level driver: mount a widget, render its views, collect its result.
//!
//! A [`Runner`] is the root subscriber of a widget tree. Every view that
//! reaches it is handed to a [`RenderSink`]; the first terminal value is kept
//! as the run's result and everything after it is ignored.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::view::View;
use crate::widget::{Outcome, Widget, WidgetCanceler};

// ---------------------------------------------------------------------------
// RenderSink
// ---------------------------------------------------------------------------

/// Receives every view a mounted widget shows.
pub trait RenderSink<V> {
    fn render(&mut self, view: &V);
}

impl<V, F: FnMut(&V)> RenderSink<V> for F {
    fn render(&mut self, view: &V) {
        self(view)
    }
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Runner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Name used in log events.
    pub label: String,
    /// Cancel the run when the runner is dropped.
    pub cancel_on_drop: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            label: String::from("widget"),
            cancel_on_drop: true,
        }
    }
}

impl RunConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label (builder).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set whether dropping the runner cancels the run (builder).
    pub fn with_cancel_on_drop(mut self, cancel_on_drop: bool) -> Self {
        self.cancel_on_drop = cancel_on_drop;
        self
    }
}

// ---------------------------------------------------------------------------
// RunError
// ---------------------------------------------------------------------------

/// Why a run has no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("widget has not completed yet")]
    Pending,
    #[error("widget was cancelled before completing")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct RunState<V: 'static, A: 'static> {
    label: String,
    renderer: RefCell<Box<dyn RenderSink<V>>>,
    frames: Cell<usize>,
    result: RefCell<Option<A>>,
    cancelled: Cell<bool>,
}

impl<V: 'static, A: 'static> RunState<V, A> {
    fn settled(&self) -> bool {
        self.cancelled.get() || self.result.borrow().is_some()
    }

    fn deliver(&self, outcome: Outcome<V, A>) {
        if self.settled() {
            return;
        }
        match outcome {
            Outcome::View(view) => {
                self.frames.set(self.frames.get() + 1);
                self.renderer.borrow_mut().render(&view);
            }
            Outcome::Completed(value) | Outcome::Partial(value) => {
                *self.result.borrow_mut() = Some(value);
                tracing::debug!(label = %self.label, frames = self.frames.get(), "widget completed");
            }
        }
    }
}

/// A mounted widget.
pub struct Runner<V: 'static, A: 'static> {
    config: RunConfig,
    state: Rc<RunState<V, A>>,
    canceler: WidgetCanceler<V, A>,
}

impl<V: View, A: Clone + 'static> Runner<V, A> {
    /// Subscribe to `widget`, sending its views to `sink`.
    pub fn mount(widget: &Widget<V, A>, sink: impl RenderSink<V> + 'static, config: RunConfig) -> Self {
        tracing::debug!(label = %config.label, "mounting widget");
        let state = Rc::new(RunState {
            label: config.label.clone(),
            renderer: RefCell::new(Box::new(sink)),
            frames: Cell::new(0),
            result: RefCell::new(None),
            cancelled: Cell::new(false),
        });
        let weak = Rc::downgrade(&state);
        let canceler = widget.subscribe(move |outcome| {
            if let Some(state) = weak.upgrade() {
                state.deliver(outcome);
            }
        });
        Self {
            config,
            state,
            canceler,
        }
    }

    /// Whether the widget may still show views or complete.
    pub fn is_running(&self) -> bool {
        !self.state.settled()
    }

    /// Number of views rendered so far.
    pub fn frames(&self) -> usize {
        self.state.frames.get()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The terminal value, once there is one.
    pub fn result(&self) -> Result<A, RunError> {
        if let Some(value) = self.state.result.borrow().as_ref() {
            return Ok(value.clone());
        }
        if self.state.cancelled.get() {
            Err(RunError::Cancelled)
        } else {
            Err(RunError::Pending)
        }
    }

    /// Stop the run and return what it had left to do.
    ///
    /// Only the first call cancels; later calls return [`Widget::never`].
    /// Cancelling after completion still tears down members that were left
    /// running, but the result is kept.
    pub fn cancel(&self) -> Widget<V, A> {
        if self.canceler.is_spent() {
            return Widget::never();
        }
        if self.state.result.borrow().is_none() {
            self.state.cancelled.set(true);
        }
        tracing::debug!(label = %self.config.label, "cancelling widget");
        Widget::from_callback(self.canceler.cancel())
    }
}

impl<V: 'static, A: 'static> Drop for Runner<V, A> {
    fn drop(&mut self) {
        if self.config.cancel_on_drop && !self.canceler.is_spent() {
            self.state.cancelled.set(true);
            let _residual = self.canceler.cancel();
        }
    }
}

impl<V: 'static, A: 'static> fmt::Debug for Runner<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("label", &self.config.label)
            .field("frames", &self.state.frames.get())
            .field("cancelled", &self.state.cancelled.get())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
