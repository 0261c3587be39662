use core::borrow::Borrow;
use core::ops::Bound;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::SearchResult;
use super::raw_ordered_tree::RawOrderedTree;

/// A keyed entry: `index` is a key slot of `node`.
///
/// On the cursor stack it means "key `index` is next; everything before it,
/// including child `index`, is done".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Frame {
    node: Handle,
    index: usize,
}

/// Lazy in-order walk over a tree, driven by an explicit stack of frames.
///
/// The end bound is resolved once, up front, to the first entry that must not
/// be yielded; the walk stops when it reaches that entry.
pub(crate) struct Cursor<'a, K, V> {
    tree: &'a RawOrderedTree<K, V>,
    stack: SmallVec<[Frame; 16]>,
    end: Option<Frame>,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// A cursor over every entry.
    pub(crate) fn full(tree: &'a RawOrderedTree<K, V>) -> Self {
        let mut cursor = Self {
            tree,
            stack: SmallVec::new(),
            end: None,
        };
        cursor.descend_leftmost(tree.root());
        cursor
    }

    /// A cursor that yields nothing.
    pub(crate) fn empty(tree: &'a RawOrderedTree<K, V>) -> Self {
        Self {
            tree,
            stack: SmallVec::new(),
            end: None,
        }
    }

    /// A cursor over the entries between `start` and `end`.
    ///
    /// An empty or inverted range produces an empty cursor.
    pub(crate) fn range<Q>(tree: &'a RawOrderedTree<K, V>, start: Bound<&Q>, end: Bound<&Q>) -> Self
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if is_empty_range(start, end) {
            return Self::empty(tree);
        }

        let mut cursor = Self::empty(tree);
        cursor.end = match end {
            Bound::Unbounded => None,
            Bound::Excluded(key) => first_at_or_after(tree, key, false),
            Bound::Included(key) => first_at_or_after(tree, key, true),
        };
        match start {
            Bound::Unbounded => cursor.descend_leftmost(tree.root()),
            Bound::Included(key) => cursor.seek(key, false),
            Bound::Excluded(key) => cursor.seek(key, true),
        }
        cursor
    }

    /// Pushes `handle` and its leftmost descendants.
    fn descend_leftmost(&mut self, mut handle: Handle) {
        let tree = self.tree;
        loop {
            self.stack.push(Frame { node: handle, index: 0 });
            let node = tree.node(handle);
            if node.is_leaf() {
                return;
            }
            handle = node.child(0);
        }
    }

    /// Positions the stack on the first key at or after `key` (strictly after when `skip_equal`).
    fn seek<Q>(&mut self, key: &Q, skip_equal: bool)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let tree = self.tree;
        let mut handle = tree.root();
        loop {
            let node = tree.node(handle);
            match node.search(key) {
                SearchResult::Found(index) if !skip_equal => {
                    self.stack.push(Frame { node: handle, index });
                    return;
                }
                SearchResult::Found(index) => {
                    self.stack.push(Frame { node: handle, index: index + 1 });
                    if !node.is_leaf() {
                        self.descend_leftmost(node.child(index + 1));
                    }
                    return;
                }
                SearchResult::NotFound(index) => {
                    self.stack.push(Frame { node: handle, index });
                    if node.is_leaf() {
                        return;
                    }
                    handle = node.child(index);
                }
            }
        }
    }

    /// Drops the remaining frames so every later call yields `None`.
    fn finish(&mut self) {
        self.stack.clear();
    }

    pub(crate) fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        loop {
            let frame = self.stack.last_mut()?;
            let node = tree.node(frame.node);
            if frame.index >= node.key_count() {
                self.stack.pop();
                continue;
            }

            let position = *frame;
            frame.index += 1;
            if self.end == Some(position) {
                self.finish();
                return None;
            }
            if !node.is_leaf() {
                self.descend_leftmost(node.child(position.index + 1));
            }
            return Some((node.key(position.index), node.value(position.index)));
        }
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            end: self.end,
        }
    }
}

/// Finds the first entry whose key is at or after `key` (strictly after when `skip_equal`).
fn first_at_or_after<K, V, Q>(tree: &RawOrderedTree<K, V>, key: &Q, skip_equal: bool) -> Option<Frame>
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut best = None;
    let mut handle = tree.root();
    loop {
        let node = tree.node(handle);
        let index = match node.search(key) {
            SearchResult::Found(index) if !skip_equal => return Some(Frame { node: handle, index }),
            SearchResult::Found(index) => index + 1,
            SearchResult::NotFound(index) => index,
        };
        if index < node.key_count() {
            best = Some(Frame { node: handle, index });
        }
        if node.is_leaf() {
            return best;
        }
        handle = node.child(index);
    }
}

fn is_empty_range<Q: ?Sized + Ord>(start: Bound<&Q>, end: Bound<&Q>) -> bool {
    match (start, end) {
        (Bound::Included(start), Bound::Included(end)) => start > end,
        (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) => {
            start >= end
        }
        _ => false,
    }
}
