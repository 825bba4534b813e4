//! An ordered set implemented with an AVL tree.
//!
//! [`AvlSet`] keeps unique keys in ascending order with logarithmic search
//! and insertion. Nodes carry parent links, so [`Cursor`] positions step in
//! both directions without an auxiliary stack, and both ends of the set are
//! cached for constant time access.
//!
//! Ordering is supplied by a [`Compare`] implementation. [`Natural`] uses the
//! key's [`Ord`] and accepts any borrowed form of the key for lookups; plain
//! closures work as well.
//!
//! ```
//! use avlset::AvlSet;
//!
//! let set: AvlSet<String> = ["pear", "apple", "fig"].iter().map(|s| s.to_string()).collect();
//! assert!(set.contains("fig"));
//! assert_eq!(set.lower_bound("b").get().map(String::as_str), Some("fig"));
//!
//! let mut cursor = set.cursor_end();
//! cursor.move_prev();
//! assert_eq!(cursor.get().map(String::as_str), Some("pear"));
//! ```

mod compare;
mod cursor;
mod set;
mod tree;

pub use compare::{Compare, Natural};
pub use cursor::{Cursor, Iter};
pub use set::AvlSet;
