use core::mem;

use super::arena::Handle;

/// A single tree node: the key, the opaque payload, both child links, the
/// non-owning parent back-reference, and the cached AVL / order-statistic
/// metadata.
///
/// The child links own their subtrees in the sense that an occupied arena
/// slot is reachable through exactly one `left`/`right` link (or is the
/// root). `parent` is a plain back-index used for bookkeeping after
/// restructuring and can never form an ownership cycle.
#[derive(Clone)]
pub(crate) struct Node<K, P> {
    key: K,
    entry: P,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    /// Number of nodes in the right subtree.
    right_weight: u32,
    /// Height of the subtree rooted here; a leaf is 1. A u8 is enough for
    /// any balanced tree that fits in memory.
    height: u8,
    /// `height(left) - height(right)`. Outside {-1, 0, 1} only while a
    /// rebalance step is pending on the unwind path.
    balance: i8,
}

impl<K, P> Node<K, P> {
    /// Creates a fresh leaf.
    pub(crate) const fn new(key: K, entry: P) -> Self {
        Self {
            key,
            entry,
            parent: None,
            left: None,
            right: None,
            right_weight: 0,
            height: 1,
            balance: 0,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn entry(&self) -> &P {
        &self.entry
    }

    #[inline]
    pub(crate) const fn entry_mut(&mut self) -> &mut P {
        &mut self.entry
    }

    /// Consumes the node, releasing its key and payload.
    pub(crate) fn into_parts(self) -> (K, P) {
        (self.key, self.entry)
    }

    /// Moves new content into the node, returning the old key and payload.
    /// Used when a deleted node absorbs its in-order successor.
    pub(crate) fn replace_content(&mut self, key: K, entry: P) -> (K, P) {
        (mem::replace(&mut self.key, key), mem::replace(&mut self.entry, entry))
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) const fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) const fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    pub(crate) const fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) const fn balance(&self) -> i8 {
        self.balance
    }

    #[inline]
    pub(crate) const fn right_weight(&self) -> u32 {
        self.right_weight
    }

    pub(crate) const fn add_right_weight(&mut self, gained: u32) {
        self.right_weight += gained;
    }

    pub(crate) const fn sub_right_weight(&mut self, lost: u32) {
        self.right_weight -= lost;
    }

    /// Recomputes the cached height and balance factor from the child
    /// heights (0 for a missing child).
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn update_metrics(&mut self, left_height: u8, right_height: u8) {
        self.height = left_height.max(right_height) + 1;
        // Transiently in {-2..=2}; the rebalance step restores {-1..=1}.
        self.balance = (i16::from(left_height) - i16::from(right_height)) as i8;
    }
}
