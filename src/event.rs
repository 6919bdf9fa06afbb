//! Event sources: where raw input (clicks, key presses, text changes) enters
//! the engine.
//!
//! An [`EventSource`] is held by whatever observes the outside world. Widgets
//! built from it register a listener on subscription and drop it when
//! cancelled; [`emit`](EventSource::emit) completes the listening widgets.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::callback::{Callback, Canceler, Consumer};
use crate::view::View;
use crate::widget::{Outcome, Widget};

new_key_type! {
    /// Identifies a registered listener.
    pub struct ListenerKey;
}

struct Listener<A: 'static> {
    deliver: Consumer<A>,
    /// Removed after its first delivery.
    once: bool,
}

type ListenerTable<A> = RefCell<SlotMap<ListenerKey, Listener<A>>>;

/// Unregisters a listener when its subscription goes away, whether it was
/// cancelled or its canceler was simply dropped.
struct Registration<A: 'static> {
    listeners: Weak<ListenerTable<A>>,
    key: ListenerKey,
}

impl<A: 'static> Drop for Registration<A> {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            // The removed listener is dropped after the borrow ends.
            let removed = listeners.borrow_mut().remove(self.key);
            drop(removed);
        }
    }
}

// ---------------------------------------------------------------------------
// EventSource
// ---------------------------------------------------------------------------

/// A cloneable emitter of input values.
pub struct EventSource<A: 'static> {
    listeners: Rc<ListenerTable<A>>,
}

impl<A: 'static> Clone for EventSource<A> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<A: 'static> Default for EventSource<A> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }
}

impl<A: 'static> fmt::Debug for EventSource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<A: 'static> EventSource<A> {
    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<A: Clone + 'static> EventSource<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `value` to every listener registered before this call.
    ///
    /// Listeners cancelled while the emission is in progress are skipped.
    /// Returns how many listeners received the value.
    pub fn emit(&self, value: A) -> usize {
        let keys: Vec<ListenerKey> = self.listeners.borrow().keys().collect();
        let mut delivered = 0;
        for key in keys {
            let target = {
                let mut listeners = self.listeners.borrow_mut();
                let once = match listeners.get(key) {
                    Some(listener) => listener.once,
                    None => continue,
                };
                if once {
                    listeners.remove(key).map(|listener| listener.deliver)
                } else {
                    listeners.get(key).map(|listener| Rc::clone(&listener.deliver))
                }
            };
            if let Some(deliver) = target {
                deliver(value.clone());
                delivered += 1;
            }
        }
        delivered
    }

    /// Show `view` and complete with the next emitted value.
    pub fn next<V: View>(&self, view: V) -> Widget<V, A> {
        self.listen(view, true)
    }

    /// Show `view` and deliver `Completed` for every emitted value.
    ///
    /// This breaks the one-terminal-value rule on purpose: it is the raw
    /// input stream that [`debounced`](crate::debounce::debounced) coalesces.
    /// Sequencing it with `bind` only ever takes the first value.
    pub fn each<V: View>(&self, view: V) -> Widget<V, A> {
        self.listen(view, false)
    }

    fn listen<V: View>(&self, view: V, once: bool) -> Widget<V, A> {
        let listeners = Rc::clone(&self.listeners);
        Widget::new(move |sink| {
            let deliver = Rc::clone(&sink);
            let key = listeners.borrow_mut().insert(Listener {
                deliver: Rc::new(move |value| deliver(Outcome::Completed(value))),
                once,
            });
            sink(Outcome::View(view.clone()));

            let registration = Registration {
                listeners: Rc::downgrade(&listeners),
                key,
            };
            Canceler::new(move || {
                drop(registration);
                Callback::never()
            })
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
