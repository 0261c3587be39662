use super::OrderedTree;
use crate::error::Result;

impl<K, V> OrderedTree<K, V> {
    /// Returns the number of levels in the tree. An empty tree has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::with_fanout(2).unwrap();
    /// assert_eq!(tree.height(), 1);
    /// for k in 0..4 {
    ///     tree.set(k, ());
    /// }
    /// assert_eq!(tree.height(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Walks the whole tree and verifies its structure: key order inside and
    /// across nodes, entry counts per node, equal leaf depth, and agreement
    /// between [`len`](Self::len) and the stored keys.
    ///
    /// A tree only ever fails this check if a key's ordering was changed while
    /// it was stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation)
    /// describing the first problem found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check_invariants(&self) -> Result<()> {
        self.raw.check_invariants()
    }
}
