//! # weave-ui
//!
//! A continuation-based UI composition engine. A [`Widget`] is a component
//! that shows any number of views and eventually produces a value; widgets
//! are composed by sequencing ([`Widget::bind`]) and by racing
//! ([`orr`]), and every running widget can be cancelled into a description
//! of whatever work it had left.
//!
//! The engine is single-threaded: concurrency means interleaved deliveries
//! on one thread, driven by event sources, timers and local async tasks.
//!
//! ## Core Systems
//!
//! - **[`callback`]** — Subscribable work and idempotent cancellation
//! - **[`view`]** — The monoid of renderable views
//! - **[`widget`]** — Outcomes, the widget monad, `bind` and `orr`
//! - **[`effect`]** — Lifting sync effects, async tasks and delays
//! - **[`runtime`]** — Executor/timer capabilities and the tokio backend
//! - **[`event`]** — Event sources feeding input into widgets
//! - **[`debounce`]** — Trailing-edge debouncing of terminal values
//! - **[`signal`]** — Signals, feedback loops and debounced input
//! - **[`driver`]** — Mounting a widget tree and collecting its result
//! - **[`testing`]** — Virtual clock, recorders and view cells for tests

// Foundation
pub mod callback;
pub mod view;

// Composition
pub mod widget;

// Effects and input
pub mod effect;
pub mod event;
pub mod runtime;

// Time-based and stateful combinators
pub mod debounce;
pub mod signal;

// Top level
pub mod driver;
pub mod testing;

pub use callback::{Callback, Canceler, Consumer};
pub use debounce::debounced;
pub use driver::{RenderSink, RunConfig, RunError, Runner};
pub use effect::{delay, lift_async, lift_future, lift_sync, TaskError};
pub use event::EventSource;
pub use runtime::{Executor, Timer, TokioRuntime};
pub use signal::Signal;
pub use view::View;
pub use widget::{orr, Outcome, Widget, WidgetCanceler};
