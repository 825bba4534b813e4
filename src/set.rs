//! An ordered set implemented with an AVL tree.

use std::fmt;

use crate::compare::{Compare, Natural};
use crate::cursor::{Cursor, Iter};
use crate::tree::Tree;

/// An ordered set implemented with an AVL tree.
///
/// Keys are unique with respect to the comparator `C` and iterate in
/// ascending order. The default comparator is the key's [`Ord`].
///
/// ```
/// use avlset::AvlSet;
/// let mut set = AvlSet::new();
/// set.insert(2);
/// set.insert(0);
/// set.insert(1);
/// assert_eq!(set.insert(1).1, false);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [0, 1, 2]);
/// ```
pub struct AvlSet<T, C = Natural> {
    tree: Tree<T, C>,
}

impl<T> AvlSet<T> {
    /// Creates an empty set ordered by `T: Ord`.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<T, C> AvlSet<T, C> {
    /// Creates an empty set ordered by `compare`.
    ///
    /// ```
    /// use avlset::AvlSet;
    /// let mut set = AvlSet::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// set.insert_iter([1, 3, 2]);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_comparator(compare: C) -> Self {
        Self {
            tree: Tree::new(compare),
        }
    }

    /// Returns true if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Clears the set, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the comparator ordering this set.
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Number of levels of the underlying tree, 0 for an empty set.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Gets an iterator over the values of the set in ascending order.
    /// Reverse it for descending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.tree.minimum(), self.tree.maximum(), self.tree.len())
    }

    /// Returns the smallest value.
    pub fn first(&self) -> Option<&T> {
        self.cursor_first().get()
    }

    /// Returns the largest value.
    pub fn last(&self) -> Option<&T> {
        self.cursor_last().get()
    }

    /// Cursor at the smallest value, or the end position if the set is empty.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        self.cursor(self.tree.minimum())
    }

    /// Cursor at the largest value, or the end position if the set is empty.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        self.cursor(self.tree.maximum())
    }

    /// Cursor at the end position, one past the largest value.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        self.cursor(None)
    }

    /// Returns a cursor at the value equivalent to `value`,
    /// or the end position if there is none.
    ///
    /// The value may be of any type the comparator can compare keys with.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.cursor(self.tree.find(value))
    }

    /// Returns a reference to the value in the set that is equivalent to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.find(value).get()
    }

    /// Returns true if the set contains a value equivalent to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.tree.find(value).is_some()
    }

    /// Returns the number of values equivalent to `value`, either 0 or 1.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        usize::from(self.contains(value))
    }

    /// Returns a cursor at the first value not ordered before `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.cursor(self.tree.lower_bound(value))
    }

    /// Returns a cursor at the first value ordered after `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        self.cursor(self.tree.upper_bound(value))
    }

    /// Returns the positions delimiting the values equivalent to `value`.
    /// Both cursors are equal if there is no such value.
    pub fn equal_range<Q>(&self, value: &Q) -> (Cursor<'_, T>, Cursor<'_, T>)
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        (self.lower_bound(value), self.upper_bound(value))
    }

    fn cursor(&self, at: crate::tree::Link<T>) -> Cursor<'_, T> {
        Cursor::new(self.tree.root(), at)
    }

    #[cfg(test)]
    pub(crate) fn shape(&self) -> Vec<(T, i8)>
    where
        T: Clone,
    {
        self.tree.shape()
    }
}

impl<T, C: Compare<T>> AvlSet<T, C> {
    /// Inserts a value into the set.
    ///
    /// Returns the position of the value equivalent to `value` and whether
    /// `value` was inserted. If an equivalent value was already present the
    /// set is left unchanged and `value` is dropped.
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        let (node_ptr, inserted) = self.tree.insert(value);
        (Cursor::new(self.tree.root(), Some(node_ptr)), inserted)
    }

    /// Inserts every value of `iter`, skipping values already present.
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.tree.insert(value);
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency()
    }
}

impl<T, C: Default> Default for AvlSet<T, C> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone, C: Compare<T> + Clone> Clone for AvlSet<T, C> {
    fn clone(&self) -> Self {
        let mut set = Self::with_comparator(self.comparator().clone());
        set.insert_iter(self.iter().cloned());
        set
    }
}

impl<T: PartialEq, C> PartialEq for AvlSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for AvlSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for AvlSet<T, C> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for AvlSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.insert_iter(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, C: Compare<T>> Extend<T> for AvlSet<T, C> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_iter(iter);
    }
}

impl<'a, T, C> Extend<&'a T> for AvlSet<T, C>
where
    T: Copy + 'a,
    C: Compare<T>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.insert_iter(iter.into_iter().copied());
    }
}

impl<'a, T, C> IntoIterator for &'a AvlSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
