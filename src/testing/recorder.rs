//! Recorder: capture everything a widget delivers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::widget::{Outcome, Widget, WidgetCanceler};

/// Collects outcomes in delivery order.
///
/// Clones share the same log, so a recorder can be captured by callbacks
/// while the test keeps a handle to inspect it.
pub struct Recorder<V: 'static, A: 'static> {
    log: Rc<RefCell<Vec<Outcome<V, A>>>>,
}

impl<V: 'static, A: 'static> Clone for Recorder<V, A> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
        }
    }
}

impl<V: 'static, A: 'static> Default for Recorder<V, A> {
    fn default() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<V: fmt::Debug + 'static, A: fmt::Debug + 'static> fmt::Debug for Recorder<V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("log", &*self.log.borrow())
            .finish()
    }
}

impl<V: Clone + 'static, A: Clone + 'static> Recorder<V, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A consumer that appends to this recorder.
    pub fn sink(&self) -> impl Fn(Outcome<V, A>) + 'static {
        let log = Rc::clone(&self.log);
        move |outcome| log.borrow_mut().push(outcome)
    }

    /// Subscribe to `widget`, recording into this recorder. Keep the returned
    /// canceler alive for as long as the run should continue.
    pub fn attach(&self, widget: &Widget<V, A>) -> WidgetCanceler<V, A> {
        widget.subscribe(self.sink())
    }

    /// Every outcome so far.
    pub fn outcomes(&self) -> Vec<Outcome<V, A>> {
        self.log.borrow().clone()
    }

    /// Only the views, in order.
    pub fn views(&self) -> Vec<V> {
        self.log.borrow().iter().filter_map(Outcome::view).cloned().collect()
    }

    /// Only the terminal values, in order.
    pub fn values(&self) -> Vec<A> {
        self.log
            .borrow()
            .iter()
            .filter(|outcome| outcome.is_terminal())
            .filter_map(|outcome| outcome.clone().into_value())
            .collect()
    }

    /// The most recent view, if any.
    pub fn last_view(&self) -> Option<V> {
        self.log.borrow().iter().rev().find_map(Outcome::view).cloned()
    }

    /// Whether a terminal outcome has been recorded.
    pub fn is_finished(&self) -> bool {
        self.log.borrow().iter().any(Outcome::is_terminal)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Join the recorded views with `separator`, for snapshot assertions.
pub fn views_to_string<V, A>(recorder: &Recorder<V, A>, separator: &str) -> String
where
    V: Clone + fmt::Display + 'static,
    A: Clone + 'static,
{
    recorder
        .views()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let rec: Recorder<String, u8> = Recorder::new();
        let sink = rec.sink();
        sink(Outcome::View(String::from("a")));
        sink(Outcome::View(String::from("b")));
        sink(Outcome::Partial(3));
        assert_eq!(rec.views(), vec!["a", "b"]);
        assert_eq!(rec.values(), vec![3]);
        assert_eq!(rec.last_view().as_deref(), Some("b"));
        assert!(rec.is_finished());
    }

    #[test]
    fn clear_resets() {
        let rec: Recorder<String, u8> = Recorder::new();
        rec.sink()(Outcome::Completed(1));
        rec.clear();
        assert!(rec.outcomes().is_empty());
        assert!(!rec.is_finished());
    }

    #[test]
    fn views_joined() {
        let rec: Recorder<String, u8> = Recorder::new();
        let sink = rec.sink();
        sink(Outcome::View(String::from("x")));
        sink(Outcome::View(String::from("xy")));
        insta::assert_snapshot!(views_to_string(&rec, " | "), @"x | xy");
    }
}
