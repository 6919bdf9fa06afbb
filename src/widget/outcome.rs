//! What a single delivery from a widget carries.

/// One delivery from a running widget.
///
/// A widget delivers any number of [`View`](Outcome::View)s and then one
/// terminal value. [`Partial`](Outcome::Partial) is terminal as well: it marks
/// a value produced while the producer's own cancellation was racing its
/// completion, so a sequencing consumer must cancel the producer before it
/// moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<V, A> {
    /// An intermediate view.
    View(V),
    /// The final value.
    Completed(A),
    /// A final value delivered after cancellation raced completion.
    Partial(A),
}

impl<V, A> Outcome<V, A> {
    /// `true` for `Completed` and `Partial`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::View(_))
    }

    /// The view payload, if this is a `View`.
    pub fn view(&self) -> Option<&V> {
        match self {
            Outcome::View(v) => Some(v),
            _ => None,
        }
    }

    /// The terminal value, if any.
    pub fn into_value(self) -> Option<A> {
        match self {
            Outcome::View(_) => None,
            Outcome::Completed(a) | Outcome::Partial(a) => Some(a),
        }
    }

    /// Map the terminal value, keeping the variant.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Outcome<V, B> {
        match self {
            Outcome::View(v) => Outcome::View(v),
            Outcome::Completed(a) => Outcome::Completed(f(a)),
            Outcome::Partial(a) => Outcome::Partial(f(a)),
        }
    }
}
