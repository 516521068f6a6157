//! Self-balancing binary search tree containers.
//!
//! Two ordered-set containers over the same contract:
//!
//! * [`RbTree`] — a red-black tree, implemented over a raw-pointer node
//!   graph with non-owning parent back-references.
//! * [`AvlTree`] — an AVL tree, implemented over owned boxed nodes.
//!
//! Both reject duplicate keys, enforce an optional capacity limit, and
//! carry a monotonic version counter that stamps every structural
//! mutation. Neither container is internally thread safe; they rely on
//! Rust's ownership model and borrow semantics for safe sequential use.
//!
//! ```
//! use momiji::RbTree;
//!
//! let mut tree: RbTree<i32> = RbTree::new();
//! tree.insert(7).unwrap();
//! tree.insert(3).unwrap();
//! tree.insert(11).unwrap();
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.min(), Some(&3));
//! assert_eq!(tree.max(), Some(&11));
//! assert!(tree.insert(7).is_err());
//! ```

use thiserror::Error;

pub mod avl;
pub mod rbtree;

pub use avl::AvlTree;
pub use rbtree::RbTree;

/// Failures reported by the mutating container operations.
///
/// A failed operation leaves the container untouched. "Key not found" is
/// not an error: lookups return `bool` and removals return `Option`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("container is full (limit {limit})")]
    CapacityExceeded { limit: usize },

    #[error("an equal key is already present")]
    DuplicateKey,

    #[error("limit {requested} is below the current size {size}")]
    InvalidLimit { requested: usize, size: usize },
}

/// Visit order for [`RbTree::traverse`] and [`AvlTree::traverse`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Traversal {
    PreOrder,
    InOrder,
    PostOrder,
    /// Only nodes with no children, left to right.
    Leaves,
}
