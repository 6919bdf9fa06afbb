//! The view payload capability.
//!
//! The engine never inspects a view. It only needs to build an empty one and
//! join two of them, which is what [`orr`](crate::widget::orr) does when it
//! merges the latest views of its members.

/// An append-only view payload: an empty value plus an associative join.
///
/// `combine` must be associative and `empty` must be its identity on both
/// sides. Joins happen left to right, so the left operand ends up first.
pub trait View: Clone + 'static {
    /// The view that shows nothing.
    fn empty() -> Self;

    /// Join `self` followed by `other`.
    fn combine(&self, other: &Self) -> Self;

    /// Join every view in order, starting from [`empty`](View::empty).
    fn concat<'a, I>(views: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        views
            .into_iter()
            .fold(Self::empty(), |acc, view| acc.combine(view))
    }
}

impl View for String {
    fn empty() -> Self {
        String::new()
    }

    fn combine(&self, other: &Self) -> Self {
        let mut joined = String::with_capacity(self.len() + other.len());
        joined.push_str(self);
        joined.push_str(other);
        joined
    }
}

impl<T: Clone + 'static> View for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn combine(&self, other: &Self) -> Self {
        let mut joined = Vec::with_capacity(self.len() + other.len());
        joined.extend_from_slice(self);
        joined.extend_from_slice(other);
        joined
    }
}

impl View for () {
    fn empty() -> Self {}

    fn combine(&self, _other: &Self) -> Self {}
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_combine_keeps_left_first() {
        let a = String::from("left");
        let b = String::from("right");
        assert_eq!(a.combine(&b), "leftright");
    }

    #[test]
    fn string_empty_is_identity() {
        let a = String::from("x");
        assert_eq!(a.combine(&String::empty()), "x");
        assert_eq!(String::empty().combine(&a), "x");
    }

    #[test]
    fn vec_concat_in_order() {
        let views = [vec![1], vec![], vec![2, 3]];
        assert_eq!(Vec::concat(views.iter()), vec![1, 2, 3]);
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let views: [String; 0] = [];
        assert_eq!(String::concat(views.iter()), "");
    }

    #[test]
    fn combine_is_associative() {
        let (a, b, c) = (String::from("a"), String::from("b"), String::from("c"));
        assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
    }
}
