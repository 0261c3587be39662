use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::fanout::Fanout;

// Inline storage covers a full node at the default fanout; larger fanouts spill to the heap.
const INLINE_KEYS: usize = 2 * Fanout::DEFAULT.get() - 1;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

/// A B-tree node.
///
/// A node holding `n` keys has `n + 1` entries: one per key plus the trailing
/// sentinel that owns the rightmost child. Child `i` holds every key strictly
/// between `keys[i - 1]` and `keys[i]`. Leaves have no children at all.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    keys: SmallVec<[K; INLINE_KEYS]>,
    values: SmallVec<[V; INLINE_KEYS]>,
    children: SmallVec<[Handle; INLINE_CHILDREN]>,
}

/// Result of searching for a key in a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into, or the leaf insertion point.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    /// Creates an empty leaf: a lone sentinel.
    pub(crate) fn new_leaf() -> Self {
        Self {
            keys: SmallVec::new(),
            values: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Creates a sentinel-only internal node owning `child`. Used when the root grows.
    pub(crate) fn new_root_over(child: Handle) -> Self {
        let mut node = Self::new_leaf();
        node.children.push(child);
        node
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Entries including the trailing sentinel.
    #[inline]
    pub(crate) fn entry_count(&self) -> usize {
        self.keys.len() + 1
    }

    /// `2t` entries: must be split before anything is inserted below it.
    #[inline]
    pub(crate) fn is_full(&self, fanout: Fanout) -> bool {
        self.entry_count() >= fanout.max_entries()
    }

    /// Exactly `t` entries: must be grown before anything is removed below it.
    #[inline]
    pub(crate) fn is_minimal(&self, fanout: Fanout) -> bool {
        self.entry_count() <= fanout.min_entries()
    }

    /// More than `t` entries: can lend one to a sibling.
    #[inline]
    pub(crate) fn has_surplus(&self, fanout: Fanout) -> bool {
        self.entry_count() > fanout.min_entries()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Binary search over the keyed entries. The sentinel compares greater than every key.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Splices a new entry into a leaf.
    pub(crate) fn insert_entry(&mut self, index: usize, key: K, value: V) {
        debug_assert!(self.is_leaf());
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Splices an entry out of a leaf.
    pub(crate) fn remove_entry(&mut self, index: usize) -> (K, V) {
        debug_assert!(self.is_leaf());
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Swaps the key/value at `index` for another pair, keeping the child links.
    pub(crate) fn replace_entry(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (mem::replace(&mut self.keys[index], key), mem::replace(&mut self.values[index], value))
    }

    /// Inserts a separator at `index` whose right-hand subtree is `right`.
    pub(crate) fn insert_separator(&mut self, index: usize, key: K, value: V, right: Handle) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
        self.children.insert(index + 1, right);
    }

    /// Removes the separator at `index` together with its right-hand child.
    pub(crate) fn remove_separator(&mut self, index: usize) -> (K, V, Handle) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        let right = self.children.remove(index + 1);
        (key, value, right)
    }

    /// Pops the last keyed entry and, for internal nodes, the rightmost child.
    pub(crate) fn pop_back(&mut self) -> (K, V, Option<Handle>) {
        let key = self.keys.pop().expect("`Node::pop_back()` - node has no keys!");
        let value = self.values.pop().expect("`Node::pop_back()` - node has no values!");
        (key, value, self.children.pop())
    }

    /// Pops the first keyed entry and, for internal nodes, the leftmost child.
    pub(crate) fn pop_front(&mut self) -> (K, V, Option<Handle>) {
        assert!(!self.keys.is_empty(), "`Node::pop_front()` - node has no keys!");
        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        let child = if self.is_leaf() { None } else { Some(self.children.remove(0)) };
        (key, value, child)
    }

    /// Prepends an entry; `child` becomes the new leftmost child.
    pub(crate) fn push_front(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Appends an entry; `child` becomes the new rightmost child.
    pub(crate) fn push_back(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.push(key);
        self.values.push(value);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Splits a full node around its median.
    ///
    /// The left half stays in `self`; the median and the right half are returned.
    /// Both halves end up with exactly `t` entries.
    pub(crate) fn split(&mut self, fanout: Fanout) -> (K, V, Node<K, V>) {
        debug_assert_eq!(self.entry_count(), fanout.max_entries());
        let mid = fanout.get() - 1;

        let mut right = Node::new_leaf();
        right.keys = self.keys.drain(mid + 1..).collect();
        right.values = self.values.drain(mid + 1..).collect();
        if !self.is_leaf() {
            right.children = self.children.drain(mid + 1..).collect();
        }

        let median_key = self.keys.pop().expect("`Node::split()` - node has no median!");
        let median_value = self.values.pop().expect("`Node::split()` - node has no median!");
        (median_key, median_value, right)
    }

    /// Absorbs the separator `key`/`value` and then every entry of `right`.
    pub(crate) fn merge_with_right(&mut self, key: K, value: V, mut right: Node<K, V>) {
        self.keys.push(key);
        self.values.push(value);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.children.append(&mut right.children);
    }
}
