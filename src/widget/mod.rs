//! Widgets: one run of a component, as a callback of [`Outcome`]s.
//!
//! - [`Widget`] — the monad: [`pure`](Widget::pure), [`bind`](Widget::bind),
//!   [`map`](Widget::map) plus a few leaf constructors.
//! - [`orr`] — run several widgets at once, merging their views.
//! - [`Outcome`] — what each delivery carries.

mod bind;
pub mod monad;
pub mod merge;
pub mod outcome;

pub use monad::{Widget, WidgetCanceler};
pub use merge::orr;
pub use outcome::Outcome;
