//! Tokio-backed executor and timer.
//!
//! Widgets are `Rc`-based, so tasks are spawned with
//! [`tokio::task::spawn_local`]. Everything that subscribes a widget using
//! [`TokioRuntime`] must run inside a [`tokio::task::LocalSet`].

use std::time::Duration;

use tokio::task::JoinHandle;

use super::{Executor, LocalTask, Timer};

/// [`Executor`] and [`Timer`] on the current tokio `LocalSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

impl TokioRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for TokioRuntime {
    type Handle = JoinHandle<()>;

    fn spawn(&self, task: LocalTask) -> Self::Handle {
        tokio::task::spawn_local(task)
    }

    fn abort(&self, handle: &Self::Handle) {
        handle.abort();
    }
}

impl Timer for TokioRuntime {
    type Handle = JoinHandle<()>;

    fn schedule(&self, delay: Duration, fire: Box<dyn FnOnce()>) -> Self::Handle {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            fire();
        })
    }

    fn cancel(&self, handle: &Self::Handle) {
        handle.abort();
    }
}
