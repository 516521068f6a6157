//! Height-balanced search tree over owned boxed nodes.
//!
//! [`AvlTree`] shares the container contract of [`RbTree`](crate::RbTree)
//! (duplicate rejection, capacity limit, version stamping) but keeps its
//! nodes in `Option<Box<_>>` links with no parent pointers, so every
//! structural change flows through safe recursive rebuilding instead of
//! pointer surgery.

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::mem;

use crate::{Error, Traversal};

type AvlLink<K> = Option<Box<AvlNode<K>>>;

#[derive(Clone)]
struct AvlNode<K> {
    key: K,
    height: i32,
    left: AvlLink<K>,
    right: AvlLink<K>,
}

impl<K> AvlNode<K> {
    fn new(key: K) -> AvlNode<K> {
        AvlNode {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// An AVL tree holding a set of distinct keys.
///
/// Every node's subtree heights differ by at most one, restored after each
/// insert and remove by the four standard rotation cases on the unwind path.
pub struct AvlTree<K: Ord> {
    root: AvlLink<K>,
    len: usize,
    limit: Option<usize>,
    version: u64,
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Drop for AvlTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord + Clone> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        AvlTree {
            root: self.root.clone(),
            len: self.len,
            limit: self.limit,
            version: 0,
        }
    }
}

impl<K: Ord + Debug> Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len)
            .field("limit", &self.limit)
            .field("keys", &self.traverse(Traversal::InOrder))
            .finish()
    }
}

impl<K: Ord> AvlTree<K> {
    /// Creates an empty tree with no capacity limit.
    pub fn new() -> AvlTree<K> {
        AvlTree {
            root: None,
            len: 0,
            limit: None,
            version: 0,
        }
    }

    /// Creates an empty tree holding at most `limit` keys.
    pub fn with_limit(limit: usize) -> AvlTree<K> {
        let mut tree = AvlTree::new();
        tree.limit = Some(limit);
        tree
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current capacity limit, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Counter incremented by every structural mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the capacity limit. Rejects a limit below the current
    /// size and leaves the tree untouched in that case.
    pub fn set_limit(&mut self, limit: Option<usize>) -> Result<(), Error> {
        if let Some(requested) = limit {
            if requested < self.len {
                return Err(Error::InvalidLimit {
                    requested,
                    size: self.len,
                });
            }
        }
        self.limit = limit;
        Ok(())
    }

    /// Inserts `key`, rejecting duplicates and inserts past the limit.
    /// A failed insert leaves the tree untouched.
    pub fn insert(&mut self, key: K) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            if self.len >= limit {
                return Err(Error::CapacityExceeded { limit });
            }
        }

        Self::insert_into(&mut self.root, key)?;
        self.len += 1;
        self.version += 1;
        Ok(())
    }

    /// Removes `key` and returns it, `None` when absent.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let removed = Self::remove_from(&mut self.root, key)?;
        self.len -= 1;
        self.version += 1;
        Some(removed)
    }

    /// True when an equal key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Borrows the stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(&node.key),
            }
        }
        None
    }

    /// Smallest key in the tree.
    pub fn min(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Largest key in the tree.
    pub fn max(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// Collects borrowed keys in the requested visit order.
    pub fn traverse(&self, order: Traversal) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        Self::visit(self.root.as_deref(), order, &mut keys);
        keys
    }

    /// Removes every key. The limit is kept.
    pub fn clear(&mut self) {
        if self.root.is_none() {
            return;
        }

        // Unlink iteratively so dropping a degenerate-depth tree never
        // recurses through nested box drops.
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(mut node) = stack.pop() {
            if let Some(left) = node.left.take() {
                stack.push(left);
            }
            if let Some(right) = node.right.take() {
                stack.push(right);
            }
        }

        self.len = 0;
        self.version += 1;
    }

    fn visit<'a>(link: Option<&'a AvlNode<K>>, order: Traversal, keys: &mut Vec<&'a K>) {
        let Some(node) = link else {
            return;
        };

        match order {
            Traversal::PreOrder => {
                keys.push(&node.key);
                Self::visit(node.left.as_deref(), order, keys);
                Self::visit(node.right.as_deref(), order, keys);
            }
            Traversal::InOrder => {
                Self::visit(node.left.as_deref(), order, keys);
                keys.push(&node.key);
                Self::visit(node.right.as_deref(), order, keys);
            }
            Traversal::PostOrder => {
                Self::visit(node.left.as_deref(), order, keys);
                Self::visit(node.right.as_deref(), order, keys);
                keys.push(&node.key);
            }
            Traversal::Leaves => {
                if node.left.is_none() && node.right.is_none() {
                    keys.push(&node.key);
                    return;
                }
                Self::visit(node.left.as_deref(), order, keys);
                Self::visit(node.right.as_deref(), order, keys);
            }
        }
    }

    fn insert_into(link: &mut AvlLink<K>, key: K) -> Result<(), Error> {
        let Some(node) = link else {
            *link = Some(Box::new(AvlNode::new(key)));
            return Ok(());
        };

        match key.cmp(&node.key) {
            Ordering::Less => Self::insert_into(&mut node.left, key)?,
            Ordering::Greater => Self::insert_into(&mut node.right, key)?,
            Ordering::Equal => return Err(Error::DuplicateKey),
        }

        Self::rebalance(node);
        Ok(())
    }

    fn remove_from(link: &mut AvlLink<K>, key: &K) -> Option<K> {
        let branch = key.cmp(&link.as_ref()?.key);

        let removed = match branch {
            Ordering::Less => Self::remove_from(&mut link.as_mut()?.left, key)?,
            Ordering::Greater => Self::remove_from(&mut link.as_mut()?.right, key)?,
            Ordering::Equal => {
                let mut node = link.take()?;
                match (node.left.take(), node.right.take()) {
                    (None, None) => node.key,
                    (Some(left), None) => {
                        *link = Some(left);
                        node.key
                    }
                    (None, Some(right)) => {
                        *link = Some(right);
                        node.key
                    }
                    (Some(left), Some(right)) => {
                        let mut rest = Some(right);
                        let mut successor = Self::detach_min(&mut rest)
                            .expect("non-empty right subtree has a minimum");
                        successor.left = Some(left);
                        successor.right = rest;
                        Self::rebalance(&mut successor);
                        *link = Some(successor);
                        node.key
                    }
                }
            }
        };

        if let Some(node) = link {
            Self::rebalance(node);
        }
        Some(removed)
    }

    fn detach_min(link: &mut AvlLink<K>) -> Option<Box<AvlNode<K>>> {
        if link.as_ref()?.left.is_some() {
            let node = link.as_mut()?;
            let min = Self::detach_min(&mut node.left);
            Self::rebalance(node);
            min
        } else {
            let mut node = link.take()?;
            *link = node.right.take();
            Some(node)
        }
    }

    fn height(link: &AvlLink<K>) -> i32 {
        link.as_ref().map_or(0, |node| node.height)
    }

    fn balance_factor(node: &AvlNode<K>) -> i32 {
        Self::height(&node.right) - Self::height(&node.left)
    }

    fn update(node: &mut AvlNode<K>) {
        node.height = 1 + Self::height(&node.left).max(Self::height(&node.right));
    }

    fn rebalance(node: &mut Box<AvlNode<K>>) {
        Self::update(node);
        match Self::balance_factor(node) {
            2 => {
                let right = node.right.as_mut().expect("right-heavy node has a right child");
                if Self::balance_factor(right) < 0 {
                    Self::rotate_right(right);
                }
                Self::rotate_left(node);
            }
            -2 => {
                let left = node.left.as_mut().expect("left-heavy node has a left child");
                if Self::balance_factor(left) > 0 {
                    Self::rotate_left(left);
                }
                Self::rotate_right(node);
            }
            _ => {}
        }
    }

    fn rotate_left(node: &mut Box<AvlNode<K>>) {
        let mut pivot = node.right.take().expect("left rotation needs a right child");
        node.right = pivot.left.take();
        Self::update(node);
        mem::swap(node, &mut pivot);
        node.left = Some(pivot);
        Self::update(node);
    }

    fn rotate_right(node: &mut Box<AvlNode<K>>) {
        let mut pivot = node.left.take().expect("right rotation needs a left child");
        node.left = pivot.right.take();
        Self::update(node);
        mem::swap(node, &mut pivot);
        node.right = Some(pivot);
        Self::update(node);
    }
}

#[cfg(test)]
mod avl_tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;
    use rand::prelude::*;

    use super::*;

    fn check_node(link: &AvlLink<i32>) -> i32 {
        let Some(node) = link else {
            return 0;
        };

        let left_height = check_node(&node.left);
        let right_height = check_node(&node.right);

        assert!(
            (right_height - left_height).abs() <= 1,
            "balance factor out of range at key {}",
            node.key
        );
        assert_eq!(node.height, 1 + left_height.max(right_height));

        node.height
    }

    fn assert_invariants(tree: &AvlTree<i32>) {
        check_node(&tree.root);

        let in_order = tree.traverse(Traversal::InOrder);
        assert_eq!(tree.len(), in_order.len());
        assert!(in_order.iter().tuple_windows().all(|(a, b)| a < b));
    }

    #[test]
    fn test_insert_keeps_sorted_order() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();

        // Act
        for key in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(key)?;
        }

        // Assert
        assert_eq!(tree.len(), 7);
        assert_eq!(
            tree.traverse(Traversal::InOrder),
            vec![&20, &30, &40, &50, &60, &70, &80]
        );
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_cant_insert_duplicate_key() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        tree.insert(7)?;

        // Act
        let err = tree.insert(7);

        // Assert
        assert_eq!(err, Err(Error::DuplicateKey));
        assert_eq!(tree.len(), 1);
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();

        // Act
        for key in 1..=1000 {
            tree.insert(key)?;
        }

        // Assert
        assert_eq!(tree.len(), 1000);
        assert_eq!(tree.min(), Some(&1));
        assert_eq!(tree.max(), Some(&1000));
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_descending_inserts_stay_balanced() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();

        // Act
        for key in (1..=1000).rev() {
            tree.insert(key)?;
        }

        // Assert
        assert_eq!(tree.len(), 1000);
        assert_eq!(tree.min(), Some(&1));
        assert_eq!(tree.max(), Some(&1000));
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_remove_leaf_and_missing_key() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        for key in [50, 30, 70] {
            tree.insert(key)?;
        }

        // Act
        let removed = tree.remove(&70);
        let missing = tree.remove(&99);

        // Assert
        assert_eq!(removed, Some(70));
        assert_eq!(missing, None);
        assert_eq!(tree.len(), 2);
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_remove_node_with_two_children() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        for key in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(key)?;
        }

        // Act
        let removed = tree.remove(&30);

        // Assert
        assert_eq!(removed, Some(30));
        assert_eq!(
            tree.traverse(Traversal::InOrder),
            vec![&20, &40, &50, &60, &70, &80]
        );
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_capacity_limit_lifecycle() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::with_limit(3);
        for key in [1, 2, 3] {
            tree.insert(key)?;
        }

        // Act
        let overflow = tree.insert(4);
        let shrink = tree.set_limit(Some(2));
        tree.set_limit(None)?;
        let unlimited = tree.insert(4);

        // Assert
        assert_eq!(overflow, Err(Error::CapacityExceeded { limit: 3 }));
        assert_eq!(shrink, Err(Error::InvalidLimit { requested: 2, size: 3 }));
        assert_eq!(unlimited, Ok(()));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.limit(), None);
        assert_invariants(&tree);

        Ok(())
    }

    #[test]
    fn test_traversal_orders() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        for key in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(key)?;
        }

        // Act
        let pre = tree.traverse(Traversal::PreOrder);
        let post = tree.traverse(Traversal::PostOrder);
        let leaves = tree.traverse(Traversal::Leaves);

        // Assert
        assert_eq!(pre, vec![&50, &30, &20, &40, &70, &60, &80]);
        assert_eq!(post, vec![&20, &40, &30, &60, &80, &70, &50]);
        assert_eq!(leaves, vec![&20, &40, &60, &80]);

        Ok(())
    }

    #[test]
    fn test_version_counts_structural_mutations() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();

        // Act
        tree.insert(1)?;
        tree.insert(2)?;
        let duplicate = tree.insert(1);
        tree.remove(&1);
        tree.remove(&99);
        tree.set_limit(Some(10))?;
        tree.clear();
        tree.clear();

        // Assert
        assert!(duplicate.is_err());
        assert_eq!(tree.version(), 4);

        Ok(())
    }

    #[test]
    fn test_clear_keeps_limit() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::with_limit(8);
        for key in 1..=8 {
            tree.insert(key)?;
        }

        // Act
        tree.clear();

        // Assert
        assert!(tree.is_empty());
        assert_eq!(tree.limit(), Some(8));
        tree.insert(42)?;
        assert_eq!(tree.len(), 1);

        Ok(())
    }

    #[test]
    fn test_clear_survives_degenerate_insert_order() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        for key in 0..100_000 {
            tree.insert(key)?;
        }

        // Act
        tree.clear();

        // Assert
        assert!(tree.is_empty());

        Ok(())
    }

    #[test]
    fn test_clone_is_independent() -> anyhow::Result<()> {
        // Arrange
        let mut tree = AvlTree::new();
        for key in [5, 3, 7] {
            tree.insert(key)?;
        }

        // Act
        let mut copy = tree.clone();
        copy.remove(&3);

        // Assert
        assert_eq!(copy.version(), 1);
        assert!(tree.contains(&3));
        assert!(!copy.contains(&3));
        assert_eq!(tree.len(), 3);
        assert_eq!(copy.len(), 2);

        Ok(())
    }

    #[test]
    fn test_randomized_insert_remove_round_trip() -> anyhow::Result<()> {
        // Arrange
        let mut rng = StdRng::seed_from_u64(0xA71);
        let mut keys: Vec<i32> = (0..2000).collect();
        keys.shuffle(&mut rng);
        let mut tree = AvlTree::new();

        // Act
        for &key in &keys {
            tree.insert(key)?;
        }
        assert_invariants(&tree);

        keys.shuffle(&mut rng);
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(tree.remove(&key), Some(key));
            if i % 256 == 0 {
                assert_invariants(&tree);
            }
        }

        // Assert
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);

        Ok(())
    }
}
