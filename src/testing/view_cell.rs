//! ViewCell: a view that tests can change from the outside.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::callback::{Callback, Canceler, Consumer};
use crate::view::View;
use crate::widget::{Outcome, Widget};

new_key_type! {
    struct WatcherKey;
}

struct Inner<V: 'static> {
    current: RefCell<V>,
    watchers: RefCell<SlotMap<WatcherKey, Consumer<V>>>,
}

/// Holds a view; widgets made from it re-deliver it on every [`set`](ViewCell::set).
pub struct ViewCell<V: 'static> {
    inner: Rc<Inner<V>>,
}

impl<V: 'static> Clone for ViewCell<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: View> ViewCell<V> {
    pub fn new(view: impl Into<V>) -> Self {
        Self {
            inner: Rc::new(Inner {
                current: RefCell::new(view.into()),
                watchers: RefCell::new(SlotMap::with_key()),
            }),
        }
    }

    pub fn get(&self) -> V {
        self.inner.current.borrow().clone()
    }

    /// Replace the view and re-deliver it to every live widget.
    pub fn set(&self, view: impl Into<V>) {
        let view = view.into();
        *self.inner.current.borrow_mut() = view.clone();
        let watchers: Vec<Consumer<V>> = self.inner.watchers.borrow().values().cloned().collect();
        for watch in watchers {
            watch(view.clone());
        }
    }

    /// A widget showing the current view. It never completes.
    pub fn widget<A: Clone + 'static>(&self) -> Widget<V, A> {
        let inner = Rc::clone(&self.inner);
        Widget::new(move |sink| {
            let current = inner.current.borrow().clone();
            let watch = Rc::clone(&sink);
            let key = inner
                .watchers
                .borrow_mut()
                .insert(Rc::new(move |view| watch(Outcome::View(view))));
            sink(Outcome::View(current));

            let inner = Rc::clone(&inner);
            Canceler::new(move || {
                inner.watchers.borrow_mut().remove(key);
                Callback::never()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn set_redelivers_until_cancelled() {
        let cell: ViewCell<String> = ViewCell::new("a");
        let rec: Recorder<String, ()> = Recorder::new();
        let canceler = rec.attach(&cell.widget());
        cell.set("b");
        canceler.cancel();
        cell.set("c");
        assert_eq!(rec.views(), vec!["a", "b"]);
        assert_eq!(cell.get(), "c");
    }
}
