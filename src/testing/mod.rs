//! Deterministic test harness: virtual time, outcome recording, view stubs.
//!
//! Use a [`VirtualClock`] wherever a [`Timer`](crate::runtime::Timer) is
//! needed and move time forward by hand. Use a [`Recorder`] to capture every
//! outcome a widget delivers and [`views_to_string`] to flatten the rendered
//! views for snapshot-style assertions.

pub mod clock;
pub mod recorder;
pub mod view_cell;

pub use clock::{TimerKey, VirtualClock};
pub use recorder::{views_to_string, Recorder};
pub use view_cell::ViewCell;
