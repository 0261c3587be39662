use tracing::debug;

use super::OrderedTree;
use crate::error::Result;
use crate::fanout::Fanout;
use crate::raw::RawOrderedTree;

impl<K, V> OrderedTree<K, V> {
    /// Makes a new, empty `OrderedTree` whose nodes hold between `fanout` and
    /// `2 * fanout` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFanout`](crate::Error::InvalidFanout) if `fanout`
    /// is below [`Fanout::MIN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{Error, OrderedTree};
    ///
    /// let tree: OrderedTree<u32, u32> = OrderedTree::with_fanout(2)?;
    /// assert_eq!(tree.fanout().get(), 2);
    ///
    /// let err = OrderedTree::<u32, u32>::with_fanout(1).unwrap_err();
    /// assert_eq!(err, Error::InvalidFanout { fanout: 1, min: 2 });
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_fanout(fanout: usize) -> Result<Self> {
        Ok(Self::with_config(Fanout::new(fanout)?))
    }

    /// Makes a new, empty `OrderedTree` with an already validated fanout.
    #[must_use]
    pub fn with_config(fanout: Fanout) -> Self {
        debug!(%fanout, "created ordered tree");
        OrderedTree {
            raw: RawOrderedTree::new(fanout),
        }
    }

    /// Makes a new, empty `OrderedTree` with the default fanout and node
    /// storage reserved for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::with_capacity(1_000);
    /// tree.set("k", "v");
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let fanout = Fanout::DEFAULT;
        debug!(%fanout, capacity, "created ordered tree");
        OrderedTree {
            raw: RawOrderedTree::with_capacity(fanout, capacity),
        }
    }

    /// Returns the fanout the tree was built with.
    #[must_use]
    pub const fn fanout(&self) -> Fanout {
        self.raw.fanout()
    }
}
