//! An ordered map based on a classic B-tree.
//!
//! This module holds [`OrderedTree`] and the iterators it hands out.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Bound, Index, RangeBounds};

use crate::fanout::Fanout;
use crate::raw::{Cursor, RawOrderedTree};

mod config;
mod diagnostics;

/// An ordered map based on a classic [B-Tree] with a configurable fanout.
///
/// Keys and values live in every node, not only in the leaves. Each node holds
/// between `t` and `2t` entries (the root may hold fewer), where `t` is the
/// tree's [`Fanout`]. Inserts split full nodes on the way down and removals
/// grow minimal nodes on the way down, so every mutation is a single descent
/// from the root.
///
/// Iterators obtained from functions such as [`OrderedTree::iter`],
/// [`OrderedTree::values_between`] or [`OrderedTree::range`] produce their
/// items in key order. They borrow the tree, so it cannot be modified while
/// one is alive.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the tree. The
/// behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `OrderedTree` that observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use ordtree::OrderedTree;
///
/// let mut stock = OrderedTree::new();
/// stock.set("apples", 3).set("pears", 0).set("plums", 12);
///
/// assert_eq!(stock.get("apples"), Some(&3));
/// assert_eq!(stock["plums"], 12);
///
/// // restock pears
/// stock.set("pears", 5);
/// assert_eq!(stock.len(), 3);
///
/// stock.remove("apples");
/// let remaining: Vec<_> = stock.iter().collect();
/// assert_eq!(remaining, [(&"pears", &5), (&"plums", &12)]);
/// ```
///
/// An `OrderedTree` with a known list of items can be initialized from an array:
///
/// ```
/// use ordtree::OrderedTree;
///
/// let planets = OrderedTree::from([(1, "Mercury"), (2, "Venus"), (3, "Earth"), (4, "Mars")]);
/// let inner: Vec<_> = planets.values_between(Some(&2), Some(&4)).copied().collect();
/// assert_eq!(inner, ["Venus", "Earth"]);
/// ```
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
#[derive(Clone)]
pub struct OrderedTree<K, V> {
    raw: RawOrderedTree<K, V>,
}

/// An iterator over the entries of an `OrderedTree`.
///
/// This `struct` is created by the [`iter`] method on [`OrderedTree`]. See its
/// documentation for more.
///
/// [`iter`]: OrderedTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

/// An iterator over the keys of an `OrderedTree`.
///
/// This `struct` is created by the [`keys`] method on [`OrderedTree`].
///
/// [`keys`]: OrderedTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `OrderedTree`.
///
/// This `struct` is created by the [`values`] method on [`OrderedTree`].
///
/// [`values`]: OrderedTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over a sub-range of entries in an `OrderedTree`.
///
/// This `struct` is created by the [`range`] method on [`OrderedTree`].
///
/// [`range`]: OrderedTree::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    cursor: Cursor<'a, K, V>,
}

/// An iterator over the values whose keys fall in a half-open range.
///
/// This `struct` is created by the [`values_between`] method on [`OrderedTree`].
///
/// [`values_between`]: OrderedTree::values_between
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesBetween<'a, K, V> {
    inner: Range<'a, K, V>,
}

impl<K, V> OrderedTree<K, V> {
    /// Makes a new, empty `OrderedTree` with the [default fanout](Fanout::DEFAULT).
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.set(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> OrderedTree<K, V> {
        OrderedTree::with_config(Fanout::DEFAULT)
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut a = OrderedTree::new();
    /// assert_eq!(a.len(), 0);
    /// a.set(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all elements. The fanout is kept.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first key-value pair in the tree.
    /// The key in this pair is the minimum key in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.first_key_value(), None);
    /// tree.set(2, "b").set(1, "a");
    /// assert_eq!(tree.first_key_value(), Some((&1, &"a")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the tree.
    /// The key in this pair is the maximum key in the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Removes and returns the first element in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(1, "a"), (2, "b")]);
    /// assert_eq!(tree.pop_first(), Some((1, "a")));
    /// assert_eq!(tree.pop_first(), Some((2, "b")));
    /// assert_eq!(tree.pop_first(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last element in the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.len(), 3);
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cursor: Cursor::full(&self.raw),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(2, "b"), (1, "a")]);
    /// let values: Vec<&str> = tree.values().copied().collect();
    /// assert_eq!(values, ["a", "b"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.set(1, "a");
    /// assert_eq!(tree.get(&1), Some(&"a"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value for the supplied key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(1, 10)]);
    /// if let Some(x) = tree.get_mut(&1) {
    ///     *x += 1;
    /// }
    /// assert_eq!(tree[&1], 11);
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the tree contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair, overwriting the value of an existing key, and
    /// returns the tree for chaining.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.set(1, "a").set(2, "b").set(1, "c");
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree[&1], "c");
    /// ```
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.raw.insert(key, value);
        self
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned. Otherwise
    /// the value is updated and the old value is returned; the stored key is
    /// not replaced.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.insert(37, "a"), None);
    /// assert_eq!(tree.insert(37, "b"), Some("a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the tree, returning its value if it was present.
    ///
    /// Removing an absent key leaves the key set unchanged, although nodes on
    /// the search path may be rebalanced.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(1, "a")]);
    /// assert_eq!(tree.remove(&1), Some("a"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the tree, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Gets an iterator over the values whose keys satisfy `start <= key < finish`.
    ///
    /// A `None` bound leaves that side of the range open. An empty or inverted
    /// range yields nothing.
    ///
    /// # Complexity
    ///
    /// O(log n) to position, then O(1) amortized per item.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32, i32> = (0..10).map(|k| (k, k * 100)).collect();
    /// let middle: Vec<_> = tree.values_between(Some(&3), Some(&6)).copied().collect();
    /// assert_eq!(middle, [300, 400, 500]);
    ///
    /// let head: Vec<_> = tree.values_between(None, Some(&2)).copied().collect();
    /// assert_eq!(head, [0, 100]);
    ///
    /// assert_eq!(tree.values_between(Some(&8), None).count(), 2);
    /// assert_eq!(tree.values_between(Some(&6), Some(&3)).count(), 0);
    /// ```
    pub fn values_between<Q>(&self, start: Option<&Q>, finish: Option<&Q>) -> ValuesBetween<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let start = start.map_or(Bound::Unbounded, Bound::Included);
        let finish = finish.map_or(Bound::Unbounded, Bound::Excluded);
        ValuesBetween {
            inner: Range {
                cursor: Cursor::range(&self.raw, start, finish),
            },
        }
    }

    /// Constructs an iterator over a sub-range of entries in the tree.
    ///
    /// Unlike `BTreeMap::range`, an inverted range does not panic; it yields
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::{Excluded, Included};
    /// use ordtree::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(3, "a"), (5, "b"), (8, "c")]);
    /// let found: Vec<_> = tree.range((Included(&4), Included(&8))).collect();
    /// assert_eq!(found, [(&5, &"b"), (&8, &"c")]);
    /// assert_eq!(tree.range((Excluded(&8), Included(&3))).count(), 0);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        Range {
            cursor: Cursor::range(&self.raw, range.start_bound(), range.end_bound()),
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for OrderedTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        OrderedTree::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = OrderedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for OrderedTree<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, Q, V> Index<&Q> for OrderedTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            cursor: self.cursor.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            cursor: self.cursor.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesBetween<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for ValuesBetween<'_, K, V> {}

impl<K, V> Clone for ValuesBetween<'_, K, V> {
    fn clone(&self) -> Self {
        ValuesBetween {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for ValuesBetween<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
