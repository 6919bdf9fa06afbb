//! Capabilities the engine borrows from its host.
//!
//! The core never spawns or sleeps on its own. Bridged async work goes
//! through an [`Executor`] and every delay through a [`Timer`], both picked
//! at compile time by the caller.
//!
//! - [`TokioRuntime`] — both capabilities on a tokio `LocalSet`.
//! - [`VirtualClock`](crate::testing::VirtualClock) — a manually advanced
//!   [`Timer`] for deterministic tests.

pub mod local;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use local::TokioRuntime;

/// A boxed, single-threaded task.
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs bridged async tasks and aborts them on request.
pub trait Executor: Clone + 'static {
    /// Handle of a spawned task.
    type Handle: 'static;

    /// Start `task`. It must not run before this call returns.
    fn spawn(&self, task: LocalTask) -> Self::Handle;

    /// Request cancellation. The task's outcome is ignored either way.
    fn abort(&self, handle: &Self::Handle);
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Schedules callbacks after a delay.
pub trait Timer: Clone + 'static {
    /// Handle of a scheduled callback.
    type Handle: 'static;

    /// Run `fire` once `delay` has passed. Never fires synchronously.
    fn schedule(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> Self::Handle;

    /// Drop a scheduled callback. No-op if it already fired.
    fn cancel(&self, handle: &Self::Handle);
}
