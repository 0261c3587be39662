use core::fmt;

use crate::error::{Error, Result};

/// The fanout factor `t` of an [`OrderedTree`](crate::OrderedTree).
///
/// Every node other than the root holds between `t` and `2t` entries, where an
/// entry is a key/value pair plus its left child. Each node additionally ends
/// in a sentinel entry that owns the rightmost child, so a node with `t`
/// entries stores `t - 1` keys. The root may hold as few as one entry.
///
/// # Examples
///
/// ```
/// use ordtree::{Fanout, OrderedTree};
///
/// let fanout = Fanout::new(4).unwrap();
/// assert_eq!(fanout.max_entries(), 8);
///
/// let mut tree = OrderedTree::with_config(fanout);
/// tree.set(1, "one");
/// assert_eq!(tree.fanout(), fanout);
///
/// assert!(Fanout::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fanout(usize);

impl Fanout {
    /// The smallest fanout that keeps every split and merge well-formed.
    pub const MIN: Fanout = Fanout(2);

    /// The fanout used by [`OrderedTree::new`](crate::OrderedTree::new).
    pub const DEFAULT: Fanout = Fanout(6);

    /// Validates `t`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFanout`] when `t` is below [`Fanout::MIN`].
    pub fn new(t: usize) -> Result<Self> {
        if t < Self::MIN.0 {
            return Err(Error::InvalidFanout {
                fanout: t,
                min: Self::MIN.0,
            });
        }
        Ok(Fanout(t))
    }

    /// Returns `t`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Entries a non-root node may not drop below: `t`.
    #[must_use]
    pub const fn min_entries(self) -> usize {
        self.0
    }

    /// Entries at which a node is full and must split: `2t`.
    #[must_use]
    pub const fn max_entries(self) -> usize {
        2 * self.0
    }
}

impl Default for Fanout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Fanout {
    type Error = Error;

    fn try_from(t: usize) -> Result<Self> {
        Self::new(t)
    }
}

impl From<Fanout> for usize {
    fn from(fanout: Fanout) -> Self {
        fanout.0
    }
}

impl fmt::Display for Fanout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
