//! Concurrent merge: run several widgets against one subscriber.
//!
//! Every member keeps its latest outcome in a slot. While no member has
//! finished, any update re-delivers the concatenation of all slots' views in
//! member order. The first terminal outcome wins and is forwarded as is;
//! after that the merge delivers nothing more.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::callback::{Callback, Canceler, Consumer};
use crate::view::View;

use super::monad::{Widget, WidgetCanceler};
use super::outcome::Outcome;

/// Run all `widgets` at once and merge their views.
///
/// - Views are joined left to right in the order given, from each member's
///   latest view (members that have not shown anything count as empty).
/// - The first `Completed`/`Partial` from any member is forwarded. The other
///   members are left running; cancelling the merge later cancels all of them
///   and returns the merge of their residuals.
/// - No merged view is delivered until every member has been subscribed, and
///   none at all if no member delivered during that pass. If members finish
///   during that pass, the lowest index wins.
/// - An empty list shows the empty view and never completes.
pub fn orr<V, A>(widgets: Vec<Widget<V, A>>) -> Widget<V, A>
where
    V: View,
    A: Clone + 'static,
{
    let members: Rc<[Widget<V, A>]> = widgets.into();
    Widget::new(move |sink| {
        if members.is_empty() {
            sink(Outcome::View(V::empty()));
            return Canceler::inert();
        }

        let merge = Rc::new(Merge::new(members.len(), sink));
        let cancelers = members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let weak = Rc::downgrade(&merge);
                member.subscribe(move |outcome| {
                    if let Some(merge) = weak.upgrade() {
                        merge.deliver(index, outcome);
                    }
                })
            })
            .collect();
        merge.start(cancelers);

        Canceler::new(move || merge.cancel())
    })
}

// ---------------------------------------------------------------------------
// Merge state
// ---------------------------------------------------------------------------

struct Merge<V: 'static, A: 'static> {
    sink: Consumer<Outcome<V, A>>,
    /// Latest outcome per member, in member order.
    latest: RefCell<Vec<Outcome<V, A>>>,
    cancelers: RefCell<Vec<WidgetCanceler<V, A>>>,
    /// Set once every member has been subscribed.
    subscribed: Cell<bool>,
    /// A member delivered before `subscribed` was set.
    dirty: Cell<bool>,
    /// Set once a terminal outcome was forwarded or the merge was cancelled.
    finished: Cell<bool>,
}

impl<V: View, A: Clone + 'static> Merge<V, A> {
    fn new(members: usize, sink: Consumer<Outcome<V, A>>) -> Self {
        Self {
            sink,
            latest: RefCell::new(vec![Outcome::View(V::empty()); members]),
            cancelers: RefCell::new(Vec::with_capacity(members)),
            subscribed: Cell::new(false),
            dirty: Cell::new(false),
            finished: Cell::new(false),
        }
    }

    fn deliver(&self, index: usize, outcome: Outcome<V, A>) {
        if self.finished.get() {
            return;
        }
        {
            let mut latest = self.latest.borrow_mut();
            assert!(
                index < latest.len(),
                "orr: member {index} out of range for {} slots",
                latest.len()
            );
            latest[index] = outcome;
        }
        if self.subscribed.get() {
            self.flush();
        } else {
            self.dirty.set(true);
        }
    }

    fn start(&self, cancelers: Vec<WidgetCanceler<V, A>>) {
        assert_eq!(
            cancelers.len(),
            self.latest.borrow().len(),
            "orr: canceler count does not match member count"
        );
        *self.cancelers.borrow_mut() = cancelers;
        self.subscribed.set(true);
        if self.dirty.replace(false) {
            self.flush();
        }
    }

    fn flush(&self) {
        let outgoing = {
            let latest = self.latest.borrow();
            match latest.iter().position(Outcome::is_terminal) {
                Some(index) => {
                    self.finished.set(true);
                    tracing::trace!(member = index, members = latest.len(), "orr member finished");
                    latest[index].clone()
                }
                None => Outcome::View(V::concat(latest.iter().filter_map(Outcome::view))),
            }
        };
        (self.sink)(outgoing);
    }

    fn cancel(&self) -> Callback<Outcome<V, A>> {
        self.finished.set(true);
        let cancelers = std::mem::take(&mut *self.cancelers.borrow_mut());
        let residual = cancelers
            .iter()
            .map(|canceler| Widget::from_callback(canceler.cancel()))
            .collect();
        orr(residual).into_callback()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
