//! Key ordering used by [`AvlSet`](crate::AvlSet).

use std::borrow::Borrow;
use std::cmp::Ordering;

/// A total order over keys, possibly across two key types.
///
/// `compare(lhs, rhs)` must behave like a strict weak order: `Less` means
/// `lhs` sorts before `rhs`, `Equal` means the two are equivalent. A
/// comparator that violates this leaves the set in an unspecified (but
/// memory safe) shape.
///
/// Lookups that take a borrowed form `Q` of the stored key `T` require
/// `Compare<T, Q>`, so transparent comparison is a property of the
/// comparator rather than of the set.
pub trait Compare<L: ?Sized, R: ?Sized = L> {
    fn compare(&self, lhs: &L, rhs: &R) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
///
/// Works for every borrowed form of the key, so an `AvlSet<String>` can be
/// searched with a `&str`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K, Q> Compare<K, Q> for Natural
where
    K: Borrow<Q> + ?Sized,
    Q: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &Q) -> Ordering {
        lhs.borrow().cmp(rhs)
    }
}

impl<L, R, F> Compare<L, R> for F
where
    L: ?Sized,
    R: ?Sized,
    F: Fn(&L, &R) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &L, rhs: &R) -> Ordering {
        self(lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_is_transparent() {
        let owned = String::from("b");
        assert_eq!(Natural.compare(&owned, "a"), Ordering::Greater);
        assert_eq!(Natural.compare(&owned, "b"), Ordering::Equal);
        assert_eq!(Natural.compare(&owned, "c"), Ordering::Less);
    }

    #[test]
    fn closures_compare() {
        let reverse = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(reverse.compare(&1, &2), Ordering::Greater);
        assert_eq!(reverse.compare(&2, &2), Ordering::Equal);
    }
}
