use std::cmp::{self, Ordering};
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::{debug, trace};

use crate::compare::Compare;

pub(crate) type NodePtr<T> = NonNull<Node<T>>;
pub(crate) type Link<T> = Option<NodePtr<T>>;

pub(crate) struct Node<T> {
    pub(crate) key: T,
    pub(crate) parent: Link<T>,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    /// Height of the right subtree minus height of the left subtree.
    pub(crate) balance: i8,
}

/// Raw AVL tree over heap allocated, parent linked nodes.
///
/// The tree owns every node reachable from `root`. Parent links only serve
/// traversal and rebalancing. `minimum` and `maximum` cache the leftmost and
/// rightmost nodes so both ends of the in-order sequence are reachable in
/// constant time.
pub(crate) struct Tree<T, C> {
    root: Link<T>,
    minimum: Link<T>,
    maximum: Link<T>,
    num_nodes: usize,
    compare: C,
    _owns: PhantomData<Box<Node<T>>>,
}

/// Child slot a new node gets attached to.
enum Slot<T> {
    Root,
    Left(NodePtr<T>),
    Right(NodePtr<T>),
}

#[cfg(any(test, feature = "consistency_check"))]
#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<T, C> Tree<T, C> {
    pub(crate) fn new(compare: C) -> Self {
        Self {
            root: None,
            minimum: None,
            maximum: None,
            num_nodes: 0,
            compare,
            _owns: PhantomData,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.num_nodes
    }

    pub(crate) fn root(&self) -> Link<T> {
        self.root
    }

    pub(crate) fn minimum(&self) -> Link<T> {
        self.minimum
    }

    pub(crate) fn maximum(&self) -> Link<T> {
        self.maximum
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.compare
    }

    /// Number of levels, found by following the taller child at every node.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            height += 1;
            let node = unsafe { node_ptr.as_ref() };
            current = if node.balance > 0 {
                node.right
            } else {
                node.left
            };
        }
        height
    }

    /// Releases all nodes without recursion.
    ///
    /// Repeatedly descends to a leaf, unhooking each edge on the way down, then
    /// frees the leaf and resumes from its parent. Needs no memory beyond the
    /// nodes themselves, whatever the height of the tree.
    pub(crate) fn clear(&mut self) {
        let mut released = 0usize;
        let mut current = self.root.take();
        self.minimum = None;
        self.maximum = None;

        while let Some(mut node_ptr) = current {
            unsafe {
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    node_ptr.as_mut().left = None;
                    current = Some(left_ptr);
                } else if let Some(right_ptr) = node_ptr.as_ref().right {
                    node_ptr.as_mut().right = None;
                    current = Some(right_ptr);
                } else {
                    current = node_ptr.as_ref().parent;
                    Node::destroy(node_ptr);
                    released += 1;
                }
            }
        }

        debug_assert_eq!(released, self.num_nodes);
        self.num_nodes = 0;
        if released > 0 {
            debug!("released {released} nodes");
        }
    }

    /// Returns the node equivalent to `key`, if any.
    pub(crate) fn find<Q>(&self, key: &Q) -> Link<T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match self.compare.compare(&node_ptr.as_ref().key, key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().right,
                    Ordering::Greater => node_ptr.as_ref().left,
                }
            }
        }
        current
    }

    /// Returns the first node not ordered before `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Link<T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            if self.compare.compare(&node.key, key) == Ordering::Less {
                current = node.right;
            } else {
                bound = current;
                current = node.left;
            }
        }
        bound
    }

    /// Returns the first node ordered after `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Link<T>
    where
        C: Compare<T, Q>,
        Q: ?Sized,
    {
        let mut bound = None;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            if self.compare.compare(&node.key, key) == Ordering::Greater {
                bound = current;
                current = node.left;
            } else {
                current = node.right;
            }
        }
        bound
    }

    /// Inserts `key` unless an equivalent key is already present.
    ///
    /// Returns the node holding the key and whether it was newly created.
    /// A rejected key is dropped.
    pub(crate) fn insert(&mut self, key: T) -> (NodePtr<T>, bool)
    where
        C: Compare<T>,
    {
        let slot = match self.find_insert_slot(&key) {
            Ok(slot) => slot,
            Err(existing) => return (existing, false),
        };

        let node_ptr = match slot {
            Slot::Root => {
                let node_ptr = Node::create(None, key);
                self.root = Some(node_ptr);
                self.minimum = Some(node_ptr);
                self.maximum = Some(node_ptr);
                node_ptr
            }
            Slot::Left(mut parent_ptr) => {
                let node_ptr = Node::create(Some(parent_ptr), key);
                unsafe { parent_ptr.as_mut().left = Some(node_ptr) };
                if self.minimum == Some(parent_ptr) {
                    self.minimum = Some(node_ptr);
                }
                node_ptr
            }
            Slot::Right(mut parent_ptr) => {
                let node_ptr = Node::create(Some(parent_ptr), key);
                unsafe { parent_ptr.as_mut().right = Some(node_ptr) };
                if self.maximum == Some(parent_ptr) {
                    self.maximum = Some(node_ptr);
                }
                node_ptr
            }
        };

        self.num_nodes += 1;
        self.rebalance_from(node_ptr);
        (node_ptr, true)
    }

    fn find_insert_slot(&self, key: &T) -> Result<Slot<T>, NodePtr<T>>
    where
        C: Compare<T>,
    {
        let mut slot = Slot::Root;
        let mut current = self.root;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            match self.compare.compare(key, &node.key) {
                Ordering::Less => {
                    slot = Slot::Left(node_ptr);
                    current = node.left;
                }
                Ordering::Greater => {
                    slot = Slot::Right(node_ptr);
                    current = node.right;
                }
                Ordering::Equal => return Err(node_ptr),
            }
        }
        Ok(slot)
    }

    /// Updates balance factors on the path from a freshly attached node up to
    /// the root.
    ///
    /// Stops as soon as an ancestor ends up balanced, since the height of its
    /// subtree did not change, or after the single rotation that restores an
    /// ancestor at +2 or -2.
    fn rebalance_from(&mut self, node_ptr: NodePtr<T>) {
        let mut last = node_ptr;
        let mut current = unsafe { node_ptr.as_ref().parent };
        while let Some(mut cur_ptr) = current {
            unsafe {
                if cur_ptr.as_ref().left == Some(last) {
                    cur_ptr.as_mut().balance -= 1;
                } else {
                    cur_ptr.as_mut().balance += 1;
                }

                match cur_ptr.as_ref().balance {
                    0 => break,
                    2 => {
                        self.fix_right_heavy(cur_ptr);
                        break;
                    }
                    -2 => {
                        self.fix_left_heavy(cur_ptr);
                        break;
                    }
                    _ => {}
                }

                last = cur_ptr;
                current = cur_ptr.as_ref().parent;
            }
        }
    }

    fn fix_right_heavy(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            debug_assert_eq!(node_ptr.as_ref().balance, 2);
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                if right_ptr.as_ref().balance == 1 {
                    trace!("rebalance: right-right, single left rotation");
                    node_ptr.as_mut().balance = 0;
                    right_ptr.as_mut().balance = 0;
                } else if let Some(mut pivot_ptr) = right_ptr.as_ref().left {
                    trace!("rebalance: right-left, double rotation");
                    let pivot_balance = pivot_ptr.as_ref().balance;
                    node_ptr.as_mut().balance = cmp::min(0, -pivot_balance);
                    right_ptr.as_mut().balance = cmp::max(0, -pivot_balance);
                    pivot_ptr.as_mut().balance = 0;
                    self.rotate_right(right_ptr);
                }
                self.rotate_left(node_ptr);
            }
        }
    }

    fn fix_left_heavy(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            debug_assert_eq!(node_ptr.as_ref().balance, -2);
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                if left_ptr.as_ref().balance == -1 {
                    trace!("rebalance: left-left, single right rotation");
                    node_ptr.as_mut().balance = 0;
                    left_ptr.as_mut().balance = 0;
                } else if let Some(mut pivot_ptr) = left_ptr.as_ref().right {
                    trace!("rebalance: left-right, double rotation");
                    let pivot_balance = pivot_ptr.as_ref().balance;
                    node_ptr.as_mut().balance = cmp::max(0, -pivot_balance);
                    left_ptr.as_mut().balance = cmp::min(0, -pivot_balance);
                    pivot_ptr.as_mut().balance = 0;
                    self.rotate_left(left_ptr);
                }
                self.rotate_right(node_ptr);
            }
        }
    }

    /// Lifts the right child of `node_ptr` into its place.
    /// Balance factors are left untouched.
    fn rotate_left(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            if let Some(mut pivot_ptr) = node_ptr.as_ref().right {
                let parent = node_ptr.as_ref().parent;
                self.replace_child(parent, node_ptr, pivot_ptr);
                pivot_ptr.as_mut().parent = parent;

                // Pivot's left subtree moves under the right side of node
                let inner = pivot_ptr.as_ref().left;
                node_ptr.as_mut().right = inner;
                if let Some(mut inner_ptr) = inner {
                    inner_ptr.as_mut().parent = Some(node_ptr);
                }

                pivot_ptr.as_mut().left = Some(node_ptr);
                node_ptr.as_mut().parent = Some(pivot_ptr);
            }
        }
    }

    /// Lifts the left child of `node_ptr` into its place.
    /// Balance factors are left untouched.
    fn rotate_right(&mut self, mut node_ptr: NodePtr<T>) {
        unsafe {
            if let Some(mut pivot_ptr) = node_ptr.as_ref().left {
                let parent = node_ptr.as_ref().parent;
                self.replace_child(parent, node_ptr, pivot_ptr);
                pivot_ptr.as_mut().parent = parent;

                // Pivot's right subtree moves under the left side of node
                let inner = pivot_ptr.as_ref().right;
                node_ptr.as_mut().left = inner;
                if let Some(mut inner_ptr) = inner {
                    inner_ptr.as_mut().parent = Some(node_ptr);
                }

                pivot_ptr.as_mut().right = Some(node_ptr);
                node_ptr.as_mut().parent = Some(pivot_ptr);
            }
        }
    }

    /// Points the slot that holds `old` (a child slot of `parent`, or the root)
    /// at `new`.
    fn replace_child(&mut self, parent: Link<T>, old: NodePtr<T>, new: NodePtr<T>) {
        match parent {
            None => self.root = Some(new),
            Some(mut parent_ptr) => unsafe {
                if parent_ptr.as_ref().left == Some(old) {
                    parent_ptr.as_mut().left = Some(new);
                } else {
                    parent_ptr.as_mut().right = Some(new);
                }
            },
        }
    }

    /// Asserts every structural invariant of the tree.
    ///
    /// Balance factors must match the recomputed subtree heights exactly.
    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self)
    where
        C: Compare<T>,
    {
        unsafe {
            // Check root link
            match self.root {
                Some(root_ptr) => assert!(root_ptr.as_ref().parent.is_none()),
                None => {
                    assert!(self.minimum.is_none());
                    assert!(self.maximum.is_none());
                    assert_eq!(self.num_nodes, 0);
                }
            }

            // Check min/max caches
            if let Some(mut node_ptr) = self.root {
                while let Some(left_ptr) = node_ptr.as_ref().left {
                    node_ptr = left_ptr;
                }
                assert!(self.minimum == Some(node_ptr));
            }
            if let Some(mut node_ptr) = self.root {
                while let Some(right_ptr) = node_ptr.as_ref().right {
                    node_ptr = right_ptr;
                }
                assert!(self.maximum == Some(node_ptr));
            }

            // Check tree nodes, children are visited before their parent
            let mut num_nodes = 0;
            let mut heights: Vec<usize> = Vec::new();
            self.postorder(|node_ptr| {
                let node = node_ptr.as_ref();

                // Right subtree was finished last, so its height is on top
                let right_height = match node.right {
                    None => 0,
                    Some(right_ptr) => {
                        assert!(right_ptr.as_ref().parent == Some(node_ptr));
                        assert_eq!(
                            self.compare.compare(&right_ptr.as_ref().key, &node.key),
                            Ordering::Greater
                        );
                        heights.pop().unwrap()
                    }
                };
                let left_height = match node.left {
                    None => 0,
                    Some(left_ptr) => {
                        assert!(left_ptr.as_ref().parent == Some(node_ptr));
                        assert_eq!(
                            self.compare.compare(&left_ptr.as_ref().key, &node.key),
                            Ordering::Less
                        );
                        heights.pop().unwrap()
                    }
                };

                // Check AVL condition (nearly balance)
                assert_eq!(
                    node.balance as isize,
                    right_height as isize - left_height as isize
                );
                assert!((-1..=1).contains(&node.balance));

                heights.push(cmp::max(left_height, right_height) + 1);
                num_nodes += 1;
            });
            assert_eq!(heights.pop().unwrap_or(0), self.height());
            assert!(heights.is_empty());

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);

            // Check global order along the successor chain
            let mut count = 0;
            let mut current = self.minimum;
            while let Some(node_ptr) = current {
                count += 1;
                current = crate::cursor::next(node_ptr);
                if let Some(next_ptr) = current {
                    assert_eq!(
                        self.compare
                            .compare(&node_ptr.as_ref().key, &next_ptr.as_ref().key),
                        Ordering::Less
                    );
                } else {
                    assert!(self.maximum == Some(node_ptr));
                }
            }
            assert_eq!(count, self.num_nodes);
        }
    }

    #[cfg(test)]
    fn preorder<F: FnMut(NodePtr<T>)>(&self, f: F) {
        self.traverse(f, |_| {});
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn postorder<F: FnMut(NodePtr<T>)>(&self, f: F) {
        self.traverse(|_| {}, f);
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn traverse<Pre, Post>(&self, mut preorder: Pre, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<T>),
        Post: FnMut(NodePtr<T>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        postorder(node_ptr);
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            node_ptr = parent_ptr;
                        } else {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Keys and balance factors in preorder, which pins down the shape.
    #[cfg(test)]
    pub(crate) fn shape(&self) -> Vec<(T, i8)>
    where
        T: Clone,
    {
        let mut shape = Vec::with_capacity(self.num_nodes);
        self.preorder(|node_ptr| {
            let node = unsafe { node_ptr.as_ref() };
            shape.push((node.key.clone(), node.balance));
        });
        shape
    }
}

impl<T, C> Drop for Tree<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

// The tree owns its nodes exclusively, raw links never escape it.
unsafe impl<T: Send, C: Send> Send for Tree<T, C> {}
unsafe impl<T: Sync, C: Sync> Sync for Tree<T, C> {}

impl<T> Node<T> {
    fn create(parent: Link<T>, key: T) -> NodePtr<T> {
        let boxed = Box::new(Node {
            key,
            parent,
            left: None,
            right: None,
            balance: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr<T>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Natural;

    fn tree_of(keys: &[i32]) -> Tree<i32, Natural> {
        let mut tree = Tree::new(Natural);
        for &key in keys {
            tree.insert(key);
            tree.check_consistency();
        }
        tree
    }

    #[test]
    fn rotate_left_preserves_order() {
        // 1          2
        //  \        / \
        //   2  ->  1   3
        //    \
        //     3
        // Built by hand so no rebalancing runs before the rotation.
        let mut tree = Tree::new(Natural);
        let one = Node::create(None, 1);
        let two = Node::create(Some(one), 2);
        let three = Node::create(Some(two), 3);
        unsafe {
            (*one.as_ptr()).right = Some(two);
            (*two.as_ptr()).right = Some(three);
        }
        tree.root = Some(one);
        tree.minimum = Some(one);
        tree.maximum = Some(three);
        tree.num_nodes = 3;

        tree.rotate_left(one);
        assert!(tree.root == Some(two));
        assert_eq!(
            tree.shape().iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
        unsafe {
            assert!(two.as_ref().parent.is_none());
            assert!(one.as_ref().parent == Some(two));
            assert!(three.as_ref().parent == Some(two));
            assert!(one.as_ref().right.is_none());
        }
    }

    #[test]
    fn rotate_right_moves_inner_subtree() {
        //     4          2
        //    / \        / \
        //   2   5  ->  1   4
        //  / \            / \
        // 1   3          3   5
        let mut tree = Tree::new(Natural);
        let four = Node::create(None, 4);
        let two = Node::create(Some(four), 2);
        let five = Node::create(Some(four), 5);
        let one = Node::create(Some(two), 1);
        let three = Node::create(Some(two), 3);
        unsafe {
            (*four.as_ptr()).left = Some(two);
            (*four.as_ptr()).right = Some(five);
            (*two.as_ptr()).left = Some(one);
            (*two.as_ptr()).right = Some(three);
        }
        tree.root = Some(four);
        tree.minimum = Some(one);
        tree.maximum = Some(five);
        tree.num_nodes = 5;

        tree.rotate_right(four);
        assert!(tree.root == Some(two));
        assert_eq!(
            tree.shape().iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![2, 1, 4, 3, 5]
        );
        unsafe {
            assert!(three.as_ref().parent == Some(four));
            assert!(four.as_ref().parent == Some(two));
        }
    }

    #[test]
    fn insert_updates_min_max() {
        let tree = tree_of(&[5, 3, 8, 1, 9, 4]);
        unsafe {
            assert_eq!(tree.minimum().unwrap().as_ref().key, 1);
            assert_eq!(tree.maximum().unwrap().as_ref().key, 9);
        }
    }

    #[test]
    fn duplicate_returns_existing_node() {
        let mut tree = tree_of(&[2, 1, 3]);
        let existing = tree.find(&3).unwrap();
        let (node_ptr, inserted) = tree.insert(3);
        assert!(!inserted);
        assert!(node_ptr == existing);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn height_follows_balance() {
        assert_eq!(tree_of(&[]).height(), 0);
        assert_eq!(tree_of(&[1]).height(), 1);
        assert_eq!(tree_of(&[1, 2]).height(), 2);
        assert_eq!(tree_of(&[1, 2, 3]).height(), 2);
        assert_eq!(tree_of(&[4, 2, 6, 1, 3, 5, 7, 8]).height(), 4);
    }

    #[test]
    fn clear_releases_everything() {
        let mut tree = tree_of(&(0..100).collect::<Vec<_>>());
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.minimum().is_none());
        assert!(tree.maximum().is_none());
        tree.check_consistency();
    }
}
