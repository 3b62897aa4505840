use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{Handle, RawRankTree};

mod render;

/// An order-statistic AVL tree maintaining a dynamically ranked collection.
///
/// `RankTree` stores one opaque payload per key and keeps the collection
/// height-balanced under arbitrary insertion and deletion, so lookup,
/// insertion, removal, and rank queries are all O(log n). Each node carries a
/// count of its right subtree, which makes [`rank`](RankTree::rank) a single
/// descent instead of a traversal: the largest key has rank 1, the smallest
/// rank n.
///
/// Keys must have a [total order] via [`Ord`]. A key equal to one already in
/// the tree is silently rejected by [`insert`](RankTree::insert); the tree
/// never stores duplicates. Keys are never recomputed — if a payload's score
/// changes, re-keying is a remove followed by an insert.
///
/// The structure is single-threaded by design: a mutation touches the whole
/// root-to-leaf path plus rotation-adjacent nodes, so concurrent access must
/// be serialized externally.
///
/// # Examples
///
/// ```
/// use rank_tree::RankTree;
///
/// let mut ladder = RankTree::new();
/// ladder.insert(1200, "dana");
/// ladder.insert(1812, "alice");
/// ladder.insert(1540, "bo");
///
/// // Highest key ranks first.
/// assert_eq!(ladder.rank(&1812), Some(1));
/// assert_eq!(ladder.rank(&1200), Some(3));
/// assert_eq!(ladder.rank(&9999), None);
///
/// assert_eq!(ladder.get(&1540), Some(&"bo"));
/// assert_eq!(ladder.remove(&1540), Some("bo"));
/// assert_eq!(ladder.rank(&1200), Some(2));
/// ```
///
/// [total order]: https://en.wikipedia.org/wiki/Total_order
#[derive(Clone)]
pub struct RankTree<K, P> {
    raw: RawRankTree<K, P>,
}

impl<K, P> RankTree<K, P> {
    /// Creates an empty tree.
    ///
    /// Does not allocate until the first insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let tree: RankTree<i64, &str> = RankTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawRankTree::new(),
        }
    }

    /// Creates an empty tree with room for at least `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawRankTree::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes the tree can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let mut tree = RankTree::new();
    /// tree.insert(3, "c");
    /// tree.insert(1, "a");
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single node.
    ///
    /// Balancing keeps this logarithmic in [`len`](RankTree::len).
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Visits the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let tree = RankTree::from_iter([(2, "b"), (1, "a"), (3, "c")]);
    /// let keys: Vec<i32> = tree.iter().map(|(&k, _)| k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter(&self) -> Iter<'_, K, P> {
        let mut iter = Iter {
            raw: &self.raw,
            stack: SmallVec::new(),
        };
        if let Some(root) = self.raw.root() {
            iter.push_left_spine(root);
        }
        iter
    }
}

impl<K: Ord, P> RankTree<K, P> {
    /// Returns `true` if a node with exactly this key is present.
    ///
    /// O(log n).
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.raw.contains(key)
    }

    /// Returns the payload stored under `key`, or `None` if the key is
    /// absent.
    ///
    /// O(log n).
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let mut tree = RankTree::new();
    /// tree.insert(7, "seven");
    /// assert_eq!(tree.get(&7), Some(&"seven"));
    /// assert_eq!(tree.get(&8), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&P> {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the payload stored under `key`.
    ///
    /// The key itself is never handed out mutably; changing it would break
    /// the tree's ordering invariants.
    ///
    /// O(log n).
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut P> {
        self.raw.get_mut(key)
    }

    /// Inserts `entry` under `key`, taking ownership of the payload.
    ///
    /// If the key is already present this is a silent no-op: the tree is
    /// left unchanged, the new payload is dropped, and `false` is returned.
    ///
    /// O(log n).
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let mut tree = RankTree::new();
    /// assert!(tree.insert(1, "first"));
    /// assert!(!tree.insert(1, "again"));
    /// assert_eq!(tree.get(&1), Some(&"first"));
    /// ```
    pub fn insert(&mut self, key: K, entry: P) -> bool {
        self.raw.insert(key, entry)
    }

    /// Removes the node with `key`, releasing its payload.
    ///
    /// Returns `None` (a silent no-op) if the key is absent.
    ///
    /// O(log n).
    pub fn remove(&mut self, key: &K) -> Option<P> {
        self.raw.remove(key)
    }

    /// Returns the 1-based descending rank of `key`: the largest key has
    /// rank 1, the smallest rank [`len`](RankTree::len). Returns `None` if
    /// the key is absent — callers must treat that as "not present", not as
    /// a rank.
    ///
    /// O(log n): a single descent accumulating right-subtree counts, no
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTree;
    ///
    /// let tree = RankTree::from_iter([(10, "c"), (30, "a"), (20, "b")]);
    /// assert_eq!(tree.rank(&30), Some(1));
    /// assert_eq!(tree.rank(&20), Some(2));
    /// assert_eq!(tree.rank(&10), Some(3));
    /// assert_eq!(tree.rank(&25), None);
    /// ```
    #[must_use]
    pub fn rank(&self, key: &K) -> Option<usize> {
        self.raw.rank(key)
    }
}

impl<K, P> Default for RankTree<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, P: fmt::Debug> fmt::Debug for RankTree<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, P> Extend<(K, P)> for RankTree<K, P> {
    fn extend<I: IntoIterator<Item = (K, P)>>(&mut self, iter: I) {
        for (key, entry) in iter {
            self.insert(key, entry);
        }
    }
}

impl<K: Ord, P> FromIterator<(K, P)> for RankTree<K, P> {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, P> IntoIterator for &'a RankTree<K, P> {
    type Item = (&'a K, &'a P);
    type IntoIter = Iter<'a, K, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An in-order (ascending key) iterator over a [`RankTree`].
///
/// Created by [`RankTree::iter`]. Walks the tree with an explicit stack of
/// pending nodes instead of recursion.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, P> {
    raw: &'a RawRankTree<K, P>,
    /// Nodes whose left spine has been consumed but which have not been
    /// yielded yet; the deepest pending node is on top.
    stack: SmallVec<[Handle; 16]>,
}

impl<K, P> Iter<'_, K, P> {
    fn push_left_spine(&mut self, from: Handle) {
        let mut current = Some(from);
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.raw.node(handle).left();
        }
    }
}

impl<'a, K, P> Iterator for Iter<'a, K, P> {
    type Item = (&'a K, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        // Copy the tree reference so the yielded borrows carry the iterator's
        // lifetime rather than this call's.
        let raw = self.raw;
        let node = raw.node(handle);
        if let Some(right) = node.right() {
            self.push_left_spine(right);
        }
        Some((node.key(), node.entry()))
    }
}

impl<K, P> FusedIterator for Iter<'_, K, P> {}
