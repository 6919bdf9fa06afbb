//! Sequencing: run one widget, then the widget built from its value.
//!
//! The interesting part is cancellation hand-off. A [`StageCell`] tracks which
//! stage the outside canceler currently targets. It moves from the first stage
//! to the second exactly once; every later terminal delivery from the first
//! stage loses that race and is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use crate::callback::{Callback, Canceler};
use crate::view::View;

use super::monad::{Widget, WidgetCanceler};
use super::outcome::Outcome;

// ---------------------------------------------------------------------------
// StageCell
// ---------------------------------------------------------------------------

enum Stage<V: 'static, A: 'static, B: 'static> {
    /// First stage is subscribing; its canceler is not known yet.
    Starting,
    /// First stage running.
    First(WidgetCanceler<V, A>),
    /// First stage resolved; second stage is subscribing.
    Resolved,
    /// Second stage running.
    Second(WidgetCanceler<V, B>),
    Cancelled,
}

/// Single-writer cell holding the canceler of the active stage.
pub(crate) struct StageCell<V: 'static, A: 'static, B: 'static> {
    stage: RefCell<Stage<V, A, B>>,
    /// A `Partial` value that arrived while the first stage was still
    /// subscribing. The second stage waits until the first is cancelled.
    deferred: RefCell<Option<A>>,
}

impl<V: 'static, A: 'static, B: 'static> StageCell<V, A, B> {
    pub(crate) fn new() -> Self {
        Self {
            stage: RefCell::new(Stage::Starting),
            deferred: RefCell::new(None),
        }
    }

    /// Whether views from the first stage should still be forwarded.
    pub(crate) fn first_active(&self) -> bool {
        matches!(*self.stage.borrow(), Stage::Starting | Stage::First(_))
    }

    /// Whether the second stage has taken over.
    #[cfg(test)]
    pub(crate) fn second_active(&self) -> bool {
        matches!(*self.stage.borrow(), Stage::Resolved | Stage::Second(_))
    }

    /// Try the one transition away from the first stage.
    ///
    /// Returns the value to build the second stage from, or `None` if another
    /// delivery already made the transition, the cell was cancelled, or the
    /// value was deferred. On `Partial`, the first stage is cancelled before
    /// this returns; if its canceler does not exist yet, the value is parked
    /// for [`install_first`](Self::install_first).
    pub(crate) fn resolve(&self, value: A, partial: bool) -> Option<A> {
        let previous = {
            let mut stage = self.stage.borrow_mut();
            if !matches!(*stage, Stage::Starting | Stage::First(_)) {
                return None;
            }
            std::mem::replace(&mut *stage, Stage::Resolved)
        };
        match previous {
            Stage::First(first) => {
                if partial {
                    let _residual = first.cancel();
                }
                Some(value)
            }
            _ if partial => {
                *self.deferred.borrow_mut() = Some(value);
                None
            }
            _ => Some(value),
        }
    }

    /// Record the first stage's canceler once its subscribe call returns.
    ///
    /// Returns a deferred `Partial` value; the first stage has been cancelled
    /// by then and the caller starts the second stage with it.
    pub(crate) fn install_first(&self, canceler: WidgetCanceler<V, A>) -> Option<A> {
        {
            let mut stage = self.stage.borrow_mut();
            if matches!(*stage, Stage::Starting) {
                *stage = Stage::First(canceler);
                return None;
            }
        }
        // Resolved during subscribe. A clean completion needs nothing more.
        let deferred = self.deferred.borrow_mut().take();
        if deferred.is_some() {
            let _residual = canceler.cancel();
        }
        deferred
    }

    /// Record the second stage's canceler.
    pub(crate) fn install_second(&self, canceler: WidgetCanceler<V, B>) {
        let mut stage = self.stage.borrow_mut();
        match *stage {
            Stage::Resolved => *stage = Stage::Second(canceler),
            Stage::Cancelled => {
                drop(stage);
                let _residual = canceler.cancel();
            }
            _ => unreachable!("bind: second stage installed without resolving the first"),
        }
    }

    fn take(&self) -> Stage<V, A, B> {
        std::mem::replace(&mut *self.stage.borrow_mut(), Stage::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// bind
// ---------------------------------------------------------------------------

pub(crate) fn bind_shared<V, A, B>(
    first: Widget<V, A>,
    next: Rc<dyn Fn(A) -> Widget<V, B>>,
) -> Widget<V, B>
where
    V: View,
    A: Clone + 'static,
    B: Clone + 'static,
{
    Widget::new(move |sink| {
        let cell = Rc::new(StageCell::<V, A, B>::new());
        let weak = Rc::downgrade(&cell);
        let build = Rc::clone(&next);
        let forward = Rc::clone(&sink);

        let first_canceler = first.subscribe(move |outcome| {
            let Some(cell) = weak.upgrade() else {
                return;
            };
            let (value, partial) = match outcome {
                Outcome::View(v) => {
                    if cell.first_active() {
                        forward(Outcome::View(v));
                    }
                    return;
                }
                Outcome::Completed(a) => (a, false),
                Outcome::Partial(a) => (a, true),
            };
            if let Some(value) = cell.resolve(value, partial) {
                let second = build(value).subscribe_shared(Rc::clone(&forward));
                cell.install_second(second);
            }
        });
        if let Some(value) = cell.install_first(first_canceler) {
            let second = next(value).subscribe_shared(sink);
            cell.install_second(second);
        }

        let next = Rc::clone(&next);
        Canceler::new(move || match cell.take() {
            Stage::First(first) => {
                bind_shared(Widget::from_callback(first.cancel()), next).into_callback()
            }
            Stage::Second(second) => second.cancel(),
            Stage::Starting | Stage::Resolved | Stage::Cancelled => Callback::never(),
        })
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use crate::testing::Recorder;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    type W<A> = Widget<String, A>;

    fn view(s: &str) -> Outcome<String, u32> {
        Outcome::View(s.to_owned())
    }

    /// A widget that shows `label`, then completes on the first emission.
    /// Cancelling it bumps `cancels`.
    fn tracked(source: &EventSource<u32>, label: &str, cancels: Rc<Cell<u32>>) -> W<u32> {
        let inner = source.next(label.to_owned());
        Widget::new(move |sink| {
            let canceler = inner.subscribe_shared(sink);
            let cancels = cancels.clone();
            Canceler::new(move || {
                cancels.set(cancels.get() + 1);
                canceler.cancel()
            })
        })
    }

    #[test]
    fn left_identity() {
        let f = |a: u32| W::display(format!("v{a}")).or(W::pure(a * 2));
        let direct = Recorder::new();
        let bound = Recorder::new();
        let _c1 = direct.attach(&f(4));
        let _c2 = bound.attach(&W::pure(4).bind(f));
        assert_eq!(direct.outcomes(), bound.outcomes());
    }

    #[test]
    fn right_identity() {
        let source = EventSource::new();
        let widget = source.next(String::from("wait"));
        let rec = Recorder::new();
        let _c = rec.attach(&widget.bind(W::pure));
        source.emit(9);
        assert_eq!(rec.outcomes(), vec![view("wait"), Outcome::Completed(9)]);
    }

    #[test]
    fn forwards_first_stage_views_then_second() {
        let first_src = EventSource::new();
        let second_src = EventSource::new();
        let second_src_c = second_src.clone();
        let widget = first_src
            .next(String::from("one"))
            .bind(move |a| second_src_c.next(format!("two:{a}")));

        let rec = Recorder::new();
        let _c = rec.attach(&widget);
        first_src.emit(1);
        second_src.emit(2);
        assert_eq!(
            rec.outcomes(),
            vec![view("one"), view("two:1"), Outcome::Completed(2)]
        );
    }

    #[test]
    fn cancel_in_first_stage_returns_rebound_residual() {
        let source = EventSource::new();
        let cancels = Rc::new(Cell::new(0));
        let widget = tracked(&source, "first", cancels.clone()).bind(|a| W::pure(a + 100));

        let rec = Recorder::new();
        let canceler = rec.attach(&widget);
        let residual = Widget::from_callback(canceler.cancel());
        assert_eq!(cancels.get(), 1);
        // The first stage's residual is `never`, rebound to the same continuation.
        let rest = Recorder::new();
        let _c = rest.attach(&residual);
        assert!(rest.outcomes().is_empty());
        assert_eq!(source.emit(5), 0);
    }

    #[test]
    fn cancel_in_second_stage_targets_second() {
        let first_src = EventSource::new();
        let second_src = EventSource::new();
        let first_cancels = Rc::new(Cell::new(0));
        let second_cancels = Rc::new(Cell::new(0));
        let s2 = second_src.clone();
        let sc = second_cancels.clone();
        let widget = tracked(&first_src, "a", first_cancels.clone())
            .bind(move |_| tracked(&s2, "b", sc.clone()));

        let rec = Recorder::new();
        let canceler = rec.attach(&widget);
        first_src.emit(1);
        canceler.cancel();
        assert_eq!(first_cancels.get(), 0);
        assert_eq!(second_cancels.get(), 1);
        assert_eq!(second_src.emit(2), 0);
        assert!(!rec.is_finished());
    }

    #[test]
    fn partial_cancels_first_stage_before_continuing() {
        let cancels = Rc::new(Cell::new(0));
        let order = Rc::new(RefCell::new(Vec::new()));
        let (c, o) = (cancels.clone(), order.clone());
        let racing: W<u32> = Widget::new(move |sink| {
            sink(Outcome::Partial(3));
            let (c, o) = (c.clone(), o.clone());
            Canceler::new(move || {
                c.set(c.get() + 1);
                o.borrow_mut().push("cancel first");
                Callback::never()
            })
        });
        let o2 = order.clone();
        let widget = racing.bind(move |a| {
            o2.borrow_mut().push("start second");
            W::pure(a)
        });

        let rec = Recorder::new();
        let _canceler = rec.attach(&widget);
        assert_eq!(cancels.get(), 1);
        assert_eq!(rec.outcomes(), vec![Outcome::Completed(3)]);
        // Partial arrived during subscribe: the second stage waits until the
        // first stage's canceler exists and has run.
        assert_eq!(*order.borrow(), vec!["cancel first", "start second"]);
    }

    #[test]
    fn partial_after_subscribe_cancels_first_immediately() {
        let source: EventSource<u32> = EventSource::new();
        let cancels = Rc::new(Cell::new(0));
        let inner = source.each(String::from("typing"));
        let c = cancels.clone();
        let racing: W<u32> = Widget::new(move |sink| {
            let partial_sink = Rc::clone(&sink);
            let canceler = inner.subscribe(move |o| match o {
                Outcome::Completed(a) => partial_sink(Outcome::Partial(a)),
                other => partial_sink(other),
            });
            let c = c.clone();
            Canceler::new(move || {
                c.set(c.get() + 1);
                canceler.cancel()
            })
        });
        let rec = Recorder::new();
        let _canceler = rec.attach(&racing.bind(W::pure));
        source.emit(8);
        assert_eq!(cancels.get(), 1);
        assert_eq!(rec.values(), vec![8]);
        // The first stage is gone, so later emissions reach nobody.
        assert_eq!(source.emit(9), 0);
    }

    #[test]
    fn only_first_terminal_from_multi_shot_producer_wins() {
        let source: EventSource<u32> = EventSource::new();
        let rec = Recorder::new();
        let _c = rec.attach(&source.each(String::new()).bind(|a| W::pure(a * 10)));
        source.emit(1);
        source.emit(2);
        assert_eq!(rec.values(), vec![10]);
    }

    #[test]
    fn double_cancel_is_harmless() {
        let source: EventSource<u32> = EventSource::new();
        let cancels = Rc::new(Cell::new(0));
        let widget = tracked(&source, "x", cancels.clone()).bind(W::pure);
        let rec = Recorder::new();
        let canceler = rec.attach(&widget);
        canceler.cancel();
        let second = Widget::from_callback(canceler.cancel());
        let rest = Recorder::new();
        let _c = rest.attach(&second);
        assert_eq!(cancels.get(), 1);
        assert!(rest.outcomes().is_empty());
    }

    #[test]
    fn stage_cell_transitions_once() {
        let cell = StageCell::<String, u8, u8>::new();
        assert!(cell.first_active());
        assert_eq!(cell.install_first(Canceler::inert()), None);
        assert_eq!(cell.resolve(1, false), Some(1));
        assert_eq!(cell.resolve(2, false), None);
        assert_eq!(cell.resolve(3, true), None);
        assert!(cell.second_active());
        cell.install_second(Canceler::inert());
        assert!(cell.second_active());
        assert!(!cell.first_active());
    }

    #[test]
    fn stage_cell_defers_partial_until_first_installed() {
        let cell = StageCell::<String, u8, u8>::new();
        assert_eq!(cell.resolve(7, true), None);
        assert!(cell.second_active());
        let cancels = Rc::new(Cell::new(0));
        let c = cancels.clone();
        let first = Canceler::new(move || {
            c.set(c.get() + 1);
            Callback::never()
        });
        assert_eq!(cell.install_first(first), Some(7));
        assert_eq!(cancels.get(), 1);
    }
}
