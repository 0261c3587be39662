use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::fanout::Fanout;

/// The core B-tree implementation backing `OrderedTree`.
///
/// Every mutation is a single top-down pass: inserts split full children before
/// entering them, removals grow minimal children before entering them, so no
/// operation ever walks back up.
#[derive(Clone)]
pub(crate) struct RawOrderedTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node. An empty tree has a keyless leaf root.
    root: Handle,
    /// Total number of key-value pairs in the tree.
    len: usize,
    fanout: Fanout,
}

impl<K, V> RawOrderedTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) fn new(fanout: Fanout) -> Self {
        Self::from_arena(Arena::new(), fanout)
    }

    /// Creates a new tree with node storage pre-sized for `capacity` keys.
    pub(crate) fn with_capacity(fanout: Fanout, capacity: usize) -> Self {
        // Non-root nodes carry at least t - 1 keys.
        let nodes = capacity.div_ceil(fanout.get() - 1).max(1);
        Self::from_arena(Arena::with_capacity(nodes), fanout)
    }

    fn from_arena(mut nodes: Arena<Node<K, V>>, fanout: Fanout) -> Self {
        let root = nodes.alloc(Node::new_leaf());
        Self {
            nodes,
            root,
            len: 0,
            fanout,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn fanout(&self) -> Fanout {
        self.fanout
    }

    /// Node slots reserved by the arena.
    #[cfg(test)]
    pub(crate) fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of live nodes.
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Clears all elements from the tree, keeping the fanout.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf());
        self.len = 0;
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Number of levels, counting the root. A lone leaf root has height 1.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.nodes.get(self.root);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
            height += 1;
        }
        height
    }

    /// Walks to the leftmost leaf.
    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.nodes.get(self.root);
        while !node.is_leaf() {
            node = self.nodes.get(node.child(0));
        }
        (node.key_count() > 0).then(|| (node.key(0), node.value(0)))
    }

    /// Walks to the rightmost leaf.
    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.nodes.get(self.root);
        while !node.is_leaf() {
            node = self.nodes.get(node.child(node.key_count()));
        }
        let last = node.key_count().checked_sub(1)?;
        Some((node.key(last), node.value(last)))
    }

    /// Splits the full child at `index` of `parent`, promoting its median into `parent`.
    fn split_child(&mut self, parent: Handle, index: usize) {
        let child = self.nodes.get(parent).child(index);
        let (key, value, right) = self.nodes.get_mut(child).split(self.fanout);
        let right = self.nodes.alloc(right);
        self.nodes.get_mut(parent).insert_separator(index, key, value, right);
    }

    /// Returns the child at `index` of `parent`, growing it first if it is minimal.
    fn descend_for_removal(&mut self, parent: Handle, index: usize) -> Handle {
        let child = self.nodes.get(parent).child(index);
        if self.nodes.get(child).is_minimal(self.fanout) {
            self.grow_child(parent, index)
        } else {
            child
        }
    }

    /// Brings the minimal child at `index` above `t` entries.
    ///
    /// Borrows from the left sibling, then the right sibling. Failing both, merges
    /// with the right sibling, or with the left one if `index` is the last child.
    /// Returns the node now holding the child's keys.
    fn grow_child(&mut self, parent: Handle, index: usize) -> Handle {
        let fanout = self.fanout;
        let node = self.nodes.get(parent);
        let target = node.child(index);
        let last = node.key_count();

        if index > 0 && self.nodes.get(node.child(index - 1)).has_surplus(fanout) {
            self.rotate_from_left(parent, index);
            target
        } else if index < last && self.nodes.get(node.child(index + 1)).has_surplus(fanout) {
            self.rotate_from_right(parent, index);
            target
        } else if index < last {
            self.merge_children(parent, index)
        } else {
            self.merge_children(parent, index - 1)
        }
    }

    /// Moves the left sibling's last entry up into the parent and the parent's
    /// separator down to the front of child `index`.
    fn rotate_from_left(&mut self, parent: Handle, index: usize) {
        let node = self.nodes.get(parent);
        let (left, target) = (node.child(index - 1), node.child(index));

        let (key, value, child) = self.nodes.get_mut(left).pop_back();
        let (key, value) = self.nodes.get_mut(parent).replace_entry(index - 1, key, value);
        self.nodes.get_mut(target).push_front(key, value, child);
    }

    /// Mirror of [`Self::rotate_from_left`].
    fn rotate_from_right(&mut self, parent: Handle, index: usize) {
        let node = self.nodes.get(parent);
        let (target, right) = (node.child(index), node.child(index + 1));

        let (key, value, child) = self.nodes.get_mut(right).pop_front();
        let (key, value) = self.nodes.get_mut(parent).replace_entry(index, key, value);
        self.nodes.get_mut(target).push_back(key, value, child);
    }

    /// Joins child `index`, separator `index` and child `index + 1` into child `index`.
    fn merge_children(&mut self, parent: Handle, index: usize) -> Handle {
        let (key, value, right) = self.nodes.get_mut(parent).remove_separator(index);
        let left = self.nodes.get(parent).child(index);
        let right = self.nodes.take(right);
        self.nodes.get_mut(left).merge_with_right(key, value, right);
        left
    }

    /// Removes the largest entry below `start`, which must hold more than `t`
    /// entries or be the root.
    fn pop_last_from(&mut self, start: Handle) -> (K, V) {
        let mut current = start;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                let (key, value, _) = self.nodes.get_mut(current).pop_back();
                return (key, value);
            }
            let last = node.key_count();
            current = self.descend_for_removal(current, last);
        }
    }

    /// Removes the smallest entry below `start`; see [`Self::pop_last_from`].
    fn pop_first_from(&mut self, start: Handle) -> (K, V) {
        let mut current = start;
        loop {
            if self.nodes.get(current).is_leaf() {
                let (key, value, _) = self.nodes.get_mut(current).pop_front();
                return (key, value);
            }
            current = self.descend_for_removal(current, 0);
        }
    }

    /// Replaces a keyless internal root with its only child.
    fn collapse_root(&mut self) {
        let root = self.nodes.get(self.root);
        if root.key_count() == 0 && !root.is_leaf() {
            let child = root.child(0);
            self.nodes.free(self.root);
            self.root = child;
            trace!(height = self.height(), "collapsed keyless root");
        }
    }

    /// Removes and returns the first key-value pair.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        let entry = self.pop_first_from(self.root);
        self.len -= 1;
        self.collapse_root();
        Some(entry)
    }

    /// Removes and returns the last key-value pair.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        let entry = self.pop_last_from(self.root);
        self.len -= 1;
        self.collapse_root();
        Some(entry)
    }
}

impl<K: Ord, V> RawOrderedTree<K, V> {
    /// Searches for a key and returns the node handle and index if found.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(index) => return Some((current, index)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(index) => current = node.child(index),
            }
        }
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, index) = self.search(key)?;
        let node = self.nodes.get(handle);
        Some((node.key(index), node.value(index)))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, index) = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut(index))
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let fanout = self.fanout;

        // The only place the tree grows taller.
        if self.nodes.get(self.root).is_full(fanout) {
            let old_root = self.root;
            self.root = self.nodes.alloc(Node::new_root_over(old_root));
            self.split_child(self.root, 0);
            trace!(height = self.height(), "split full root");
        }

        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            let mut index = match node.search(&key) {
                SearchResult::Found(index) => {
                    return Some(mem::replace(self.nodes.get_mut(current).value_mut(index), value));
                }
                SearchResult::NotFound(index) => index,
            };

            if node.is_leaf() {
                self.nodes.get_mut(current).insert_entry(index, key, value);
                self.len += 1;
                return None;
            }

            if self.nodes.get(node.child(index)).is_full(fanout) {
                self.split_child(current, index);
                let node = self.nodes.get_mut(current);
                match key.cmp(node.key(index)) {
                    Ordering::Equal => return Some(mem::replace(node.value_mut(index), value)),
                    Ordering::Greater => index += 1,
                    Ordering::Less => {}
                }
            }

            current = self.nodes.get(current).child(index);
        }
    }

    /// Removes a key from the tree and returns the key-value pair.
    ///
    /// Minimal children met on the way down are grown even when the key turns out
    /// to be absent; the key set is unchanged in that case.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let fanout = self.fanout;
        let mut current = self.root;

        let removed = loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(index) if node.is_leaf() => {
                    break Some(self.nodes.get_mut(current).remove_entry(index));
                }
                SearchResult::NotFound(_) if node.is_leaf() => break None,
                SearchResult::Found(index) => {
                    let (left, right) = (node.child(index), node.child(index + 1));
                    if self.nodes.get(left).has_surplus(fanout) {
                        let (key, value) = self.pop_last_from(left);
                        break Some(self.nodes.get_mut(current).replace_entry(index, key, value));
                    }
                    if self.nodes.get(right).has_surplus(fanout) {
                        let (key, value) = self.pop_first_from(right);
                        break Some(self.nodes.get_mut(current).replace_entry(index, key, value));
                    }
                    // Both sides minimal: the key sinks into the merged node and is found there next.
                    current = self.merge_children(current, index);
                }
                SearchResult::NotFound(index) => {
                    current = self.descend_for_removal(current, index);
                }
            }
        };

        if removed.is_some() {
            self.len -= 1;
        }
        self.collapse_root();
        removed
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tree(t: usize) -> RawOrderedTree<i32, i32> {
        RawOrderedTree::new(Fanout::new(t).unwrap())
    }

    fn root_keys(tree: &RawOrderedTree<i32, i32>) -> Vec<i32> {
        tree.node(tree.root()).keys().to_vec()
    }

    fn child_keys(tree: &RawOrderedTree<i32, i32>, index: usize) -> Vec<i32> {
        let child = tree.node(tree.root()).child(index);
        tree.node(child).keys().to_vec()
    }

    #[test]
    fn root_fills_to_threshold_without_splitting() {
        let mut tree = tree(2);
        tree.insert(40, 1);
        tree.insert(30, 2);
        tree.insert(50, 3);

        assert_eq!(root_keys(&tree), [30, 40, 50]);
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn full_root_splits_around_median() {
        let mut tree = tree(2);
        for (k, v) in [(40, 1), (30, 2), (50, 3), (0, 4)] {
            tree.insert(k, v);
        }

        assert_eq!(root_keys(&tree), [40]);
        assert_eq!(child_keys(&tree, 0), [0, 30]);
        assert_eq!(child_keys(&tree, 1), [50]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn promoted_median_matching_the_key_is_overwritten() {
        let mut tree = tree(2);
        for k in [10, 20, 30, 40, 50] {
            tree.insert(k, k);
        }
        // The full right child is split on the way down and 40 is its median.
        assert_eq!(child_keys(&tree, 1), [30, 40, 50]);
        assert_eq!(tree.insert(40, 400), Some(40));
        assert_eq!(root_keys(&tree), [20, 40]);
        assert_eq!(tree.get_key_value(&40), Some((&40, &400)));
        assert_eq!(tree.len(), 5);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn removing_sole_separator_promotes_successor() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 60] {
            tree.insert(k, k * 10);
        }
        assert_eq!(root_keys(&tree), [40]);
        assert_eq!(child_keys(&tree, 0), [30]);
        assert_eq!(child_keys(&tree, 1), [50, 60]);

        assert_eq!(tree.remove_entry(&40), Some((40, 400)));
        assert_eq!(root_keys(&tree), [50]);
        assert_eq!(child_keys(&tree, 0), [30]);
        assert_eq!(child_keys(&tree, 1), [60]);
        assert_eq!(tree.search(&40), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn removing_separator_prefers_predecessor() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 0] {
            tree.insert(k, k);
        }
        assert_eq!(tree.remove_entry(&40), Some((40, 40)));
        assert_eq!(root_keys(&tree), [30]);
        assert_eq!(child_keys(&tree, 0), [0]);
        assert_eq!(child_keys(&tree, 1), [50]);
    }

    #[test]
    fn removing_between_minimal_children_merges_and_shrinks() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 0] {
            tree.insert(k, k);
        }
        tree.remove_entry(&0);
        assert_eq!(child_keys(&tree, 0), [30]);
        assert_eq!(child_keys(&tree, 1), [50]);

        assert_eq!(tree.remove_entry(&40), Some((40, 40)));
        assert_eq!(tree.height(), 1);
        assert_eq!(root_keys(&tree), [30, 50]);
        assert_eq!(tree.node_count(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn absent_key_descent_rebalances_but_keeps_keys() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 0] {
            tree.insert(k, k);
        }
        tree.remove_entry(&0);

        assert_eq!(tree.remove_entry(&45), None);
        assert_eq!(tree.len(), 3);
        assert_eq!(root_keys(&tree), [30, 40, 50]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn rotation_from_left_sibling() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 0] {
            tree.insert(k, k);
        }
        // Left [0, 30] has surplus, right [50] is minimal.
        assert_eq!(tree.remove_entry(&50), Some((50, 50)));
        assert_eq!(root_keys(&tree), [30]);
        assert_eq!(child_keys(&tree, 0), [0]);
        assert_eq!(child_keys(&tree, 1), [40]);
    }

    #[test]
    fn rotation_from_right_sibling() {
        let mut tree = tree(2);
        for k in [40, 30, 50, 60] {
            tree.insert(k, k);
        }
        assert_eq!(tree.remove_entry(&30), Some((30, 30)));
        assert_eq!(root_keys(&tree), [50]);
        assert_eq!(child_keys(&tree, 0), [40]);
        assert_eq!(child_keys(&tree, 1), [60]);
    }

    #[test]
    fn pop_first_and_last_drain_in_order() {
        let mut tree = tree(2);
        for k in 0..50 {
            tree.insert(k, -k);
        }
        assert_eq!(tree.pop_first(), Some((0, 0)));
        assert_eq!(tree.pop_last(), Some((49, -49)));
        tree.check_invariants().unwrap();

        let mut drained = Vec::new();
        while let Some((k, _)) = tree.pop_first() {
            drained.push(k);
            tree.check_invariants().unwrap();
        }
        assert_eq!(drained, (1..49).collect::<Vec<_>>());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.pop_last(), None);
    }

    #[test]
    fn clear_resets_to_empty_leaf_root() {
        let mut tree = tree(3);
        for k in 0..100 {
            tree.insert(k, k);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.first_key_value(), None);
        assert_eq!(tree.last_key_value(), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn with_capacity_reserves_node_slots() {
        let tree: RawOrderedTree<i32, i32> = RawOrderedTree::with_capacity(Fanout::new(2).unwrap(), 100);
        assert!(tree.node_capacity() >= 100);
        assert_eq!(tree.node_count(), 1);
    }

    /// Root `[40]` over leaves `[30]` and `[50, 60]` at fanout 2.
    fn two_level_tree() -> RawOrderedTree<i32, i32> {
        let mut tree = tree(2);
        for k in [40, 30, 50, 60] {
            tree.insert(k, k * 10);
        }
        tree.check_invariants().unwrap();
        tree
    }

    fn assert_violation(tree: &RawOrderedTree<i32, i32>, needle: &str) {
        match tree.check_invariants() {
            Err(Error::InvariantViolation(detail)) => {
                assert!(detail.contains(needle), "unexpected violation: {detail}");
            }
            other => panic!("expected an invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn check_invariants_detects_leaked_node() {
        let mut tree = two_level_tree();
        tree.nodes.alloc(Node::new_leaf());
        assert_violation(&tree, "arena holds 4 nodes but 3 are reachable");
    }

    #[test]
    fn check_invariants_detects_unsorted_keys() {
        let mut tree = tree(2);
        for k in [30, 40, 50] {
            tree.insert(k, k);
        }
        tree.nodes.get_mut(tree.root).replace_entry(0, 45, 45);
        assert_violation(&tree, "out of order");
    }

    #[test]
    fn check_invariants_detects_key_outside_separators() {
        let mut tree = two_level_tree();
        tree.nodes.get_mut(tree.root).replace_entry(0, 55, 55);
        assert_violation(&tree, "at or below its left separator");
    }

    #[test]
    fn check_invariants_detects_wrong_len() {
        let mut tree = two_level_tree();
        tree.len += 1;
        assert_violation(&tree, "len is 5 but 4 keys are reachable");
    }

    #[test]
    fn check_invariants_detects_underfull_node() {
        let mut tree = two_level_tree();
        let left = tree.node(tree.root).child(0);
        tree.nodes.get_mut(left).pop_back();
        assert_violation(&tree, "has 1 entries, expected 2..=4");
    }

    #[test]
    fn check_invariants_detects_uneven_leaf_depth() {
        let mut tree = two_level_tree();

        // Swap the right leaf for an internal node `[55]` over `[50]` and `[60]`.
        let mut low = Node::new_leaf();
        low.insert_entry(0, 50, 500);
        let mut high = Node::new_leaf();
        high.insert_entry(0, 60, 600);
        let low = tree.nodes.alloc(low);
        let high = tree.nodes.alloc(high);
        let mut internal = Node::new_root_over(low);
        internal.insert_separator(0, 55, 550, high);
        let internal = tree.nodes.alloc(internal);

        let root = tree.root;
        let (key, value, old_right) = tree.nodes.get_mut(root).remove_separator(0);
        tree.nodes.get_mut(root).insert_separator(0, key, value, internal);
        tree.nodes.free(old_right);
        tree.len += 1;

        assert_violation(&tree, "other leaves are at depth 1");
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..300).prop_map(Op::Insert),
            4 => (0i32..300).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(
            t in 2usize..6,
            ops in prop::collection::vec(op_strategy(), 0..500),
        ) {
            let mut tree = tree(t);
            let mut model = alloc::collections::BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k) => prop_assert_eq!(tree.insert(k, k), model.insert(k, k)),
                    Op::Remove(k) => prop_assert_eq!(tree.remove_entry(&k), model.remove_entry(&k)),
                    Op::PopFirst => prop_assert_eq!(tree.pop_first(), model.pop_first()),
                    Op::PopLast => prop_assert_eq!(tree.pop_last(), model.pop_last()),
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.first_key_value(), model.first_key_value());
                prop_assert_eq!(tree.last_key_value(), model.last_key_value());
            }
        }
    }
}
