//! The callback/cancellation primitive everything else is built on.
//!
//! A [`Callback`] accepts a consumer, starts some work that may call the
//! consumer any number of times, and hands back a [`Canceler`]. Cancelling
//! never finishes the job outright: it stops deliveries and returns a new
//! `Callback` describing whatever is left to run or tear down.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), like the rest of the
//! engine: "concurrency" means interleaved deliveries on one thread.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared, effectful consumer of delivered values.
pub type Consumer<A> = Rc<dyn Fn(A)>;

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// Subscribable asynchronous work producing values of type `A`.
///
/// Cloning is cheap (one `Rc`). Each call to [`subscribe`](Callback::subscribe)
/// starts an independent run with its own canceler.
pub struct Callback<A: 'static> {
    run: Rc<dyn Fn(Consumer<A>) -> Canceler<A>>,
}

impl<A: 'static> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<A: 'static> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

impl<A: 'static> Callback<A> {
    /// Wrap a subscribe function.
    pub fn new(subscribe: impl Fn(Consumer<A>) -> Canceler<A> + 'static) -> Self {
        Self {
            run: Rc::new(subscribe),
        }
    }

    /// Work that never delivers anything. Cancelling it yields `never` again.
    pub fn never() -> Self {
        Self::new(|_| Canceler::inert())
    }

    /// Start a run that delivers to `consumer`.
    pub fn subscribe(&self, consumer: impl Fn(A) + 'static) -> Canceler<A> {
        (self.run)(Rc::new(consumer))
    }

    /// Start a run that delivers to an already shared consumer.
    pub fn subscribe_shared(&self, consumer: Consumer<A>) -> Canceler<A> {
        (self.run)(consumer)
    }
}

// ---------------------------------------------------------------------------
// Canceler
// ---------------------------------------------------------------------------

type CancelFn<A> = Box<dyn FnOnce() -> Callback<A>>;

/// Stops an in-flight run and returns the residual work.
///
/// Only the first [`cancel`](Canceler::cancel) runs the underlying effect;
/// later calls (from any clone) return [`Callback::never`].
pub struct Canceler<A: 'static> {
    pending: Rc<RefCell<Option<CancelFn<A>>>>,
}

impl<A: 'static> Clone for Canceler<A> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl<A: 'static> fmt::Debug for Canceler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canceler")
            .field("spent", &self.is_spent())
            .finish()
    }
}

impl<A: 'static> Canceler<A> {
    /// Wrap a cancel effect.
    pub fn new(cancel: impl FnOnce() -> Callback<A> + 'static) -> Self {
        Self {
            pending: Rc::new(RefCell::new(Some(Box::new(cancel)))),
        }
    }

    /// The canceler of work that is already done or never started.
    pub fn inert() -> Self {
        Self::new(Callback::never)
    }

    /// Cancel the run. Safe to call repeatedly.
    pub fn cancel(&self) -> Callback<A> {
        // Release the borrow before running the effect: cancelling may
        // re-enter this canceler through a delivery.
        let pending = self.pending.borrow_mut().take();
        match pending {
            Some(cancel) => cancel(),
            None => Callback::never(),
        }
    }

    /// Whether [`cancel`](Canceler::cancel) has already run.
    pub fn is_spent(&self) -> bool {
        self.pending.borrow().is_none()
    }

    /// Transform the residual callback once cancellation happens.
    pub fn map_residual<B: 'static>(
        self,
        f: impl FnOnce(Callback<A>) -> Callback<B> + 'static,
    ) -> Canceler<B> {
        Canceler::new(move || f(self.cancel()))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
