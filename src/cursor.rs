//! Positions in an [`AvlSet`](crate::AvlSet) and in-order iteration.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::tree::{Link, NodePtr};

/// A position in a set: either an element or the end position one past the
/// last element.
///
/// Cursors only read the tree. Stepping is computed from parent links, so a
/// cursor is just two pointers and is `Copy`.
pub struct Cursor<'a, T> {
    root: Link<T>,
    current: Link<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(root: Link<T>, current: Link<T>) -> Self {
        Self {
            root,
            current,
            _marker: PhantomData,
        }
    }

    /// Returns the element at this position, or `None` at the end position.
    pub fn get(&self) -> Option<&'a T> {
        self.current.map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).key })
    }

    /// Returns true if this is the end position.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the next element in ascending order.
    /// Moving past the last element reaches the end position, which is left
    /// unchanged by further calls.
    pub fn move_next(&mut self) {
        if let Some(node_ptr) = self.current {
            self.current = unsafe { next(node_ptr) };
        }
    }

    /// Moves to the previous element in ascending order.
    ///
    /// From the end position this moves to the last element. Moving back from
    /// the first element reaches the end position.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            None => self.root.map(|root_ptr| unsafe { rightmost(root_ptr) }),
            Some(node_ptr) => unsafe { prev(node_ptr) },
        };
    }

    /// Level of the element in the tree: 1 for the root, plus one per ancestor.
    pub fn height(&self) -> Option<usize> {
        let mut node_ptr = self.current?;
        let mut height = 1;
        while let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
            height += 1;
            node_ptr = parent_ptr;
        }
        Some(height)
    }

    /// Balance factor of the element's node: right height minus left height.
    pub fn balance(&self) -> Option<i8> {
        self.current
            .map(|node_ptr| unsafe { node_ptr.as_ref().balance })
    }

    /// Returns true if the element's node has no children.
    pub fn is_leaf(&self) -> bool {
        match self.current {
            None => false,
            Some(node_ptr) => unsafe {
                node_ptr.as_ref().left.is_none() && node_ptr.as_ref().right.is_none()
            },
        }
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.current == other.current
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Cursor").field(value).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

unsafe impl<T: Sync> Send for Cursor<'_, T> {}
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

/// An iterator over the values of a set, in ascending order.
pub struct Iter<'a, T> {
    front: Link<T>,
    back: Link<T>,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> Iter<'_, T> {
    pub(crate) fn new(front: Link<T>, back: Link<T>, len: usize) -> Self {
        Self {
            front,
            back,
            len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node_ptr = self.front?;
        self.len -= 1;
        self.front = unsafe { next(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).key })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node_ptr = self.back?;
        self.len -= 1;
        self.back = unsafe { prev(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).key })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self::new(self.front, self.back, self.len)
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

/// In-order successor of `node_ptr`, or `None` after the last node.
pub(crate) unsafe fn next<T>(node_ptr: NodePtr<T>) -> Link<T> {
    if let Some(right_ptr) = node_ptr.as_ref().right {
        return Some(leftmost(right_ptr));
    }

    // Climb while coming from a right child
    let mut current = node_ptr;
    let mut parent = current.as_ref().parent;
    while let Some(parent_ptr) = parent {
        if parent_ptr.as_ref().right != Some(current) {
            break;
        }
        current = parent_ptr;
        parent = parent_ptr.as_ref().parent;
    }
    parent
}

/// In-order predecessor of `node_ptr`, or `None` before the first node.
pub(crate) unsafe fn prev<T>(node_ptr: NodePtr<T>) -> Link<T> {
    if let Some(left_ptr) = node_ptr.as_ref().left {
        return Some(rightmost(left_ptr));
    }

    // Climb while coming from a left child
    let mut current = node_ptr;
    let mut parent = current.as_ref().parent;
    while let Some(parent_ptr) = parent {
        if parent_ptr.as_ref().left != Some(current) {
            break;
        }
        current = parent_ptr;
        parent = parent_ptr.as_ref().parent;
    }
    parent
}

unsafe fn leftmost<T>(mut node_ptr: NodePtr<T>) -> NodePtr<T> {
    while let Some(left_ptr) = node_ptr.as_ref().left {
        node_ptr = left_ptr;
    }
    node_ptr
}

unsafe fn rightmost<T>(mut node_ptr: NodePtr<T>) -> NodePtr<T> {
    while let Some(right_ptr) = node_ptr.as_ref().right {
        node_ptr = right_ptr;
    }
    node_ptr
}
