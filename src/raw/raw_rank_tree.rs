use core::cmp::Ordering;

use super::arena::{Arena, Handle};
use super::node::Node;

/// The core AVL implementation backing `RankTree`.
///
/// Every mutating helper takes the handle of a subtree root and returns the
/// handle of the node rooting that subtree afterwards; each recursion frame
/// reassigns its child link from the return value, and the public entry
/// points apply the same contract to `root`. On the unwind path every frame
/// re-syncs its children's parent links, recomputes its cached
/// height/balance, and runs the rebalance step, so all five structural
/// invariants hold again by the time a public call returns.
#[derive(Clone)]
pub(crate) struct RawRankTree<K, P> {
    /// Arena owning every node.
    nodes: Arena<Node<K, P>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

impl<K, P> RawRankTree<K, P> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of nodes, tracked by the arena.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height of the whole tree; 0 when empty, 1 for a single node.
    pub(crate) fn height(&self) -> usize {
        self.root.map_or(0, |root| self.nodes.get(root).height() as usize)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, P> {
        self.nodes.get(handle)
    }
}

impl<K: Ord, P> RawRankTree<K, P> {
    /// Descends by comparison and returns the handle of the matching node.
    pub(crate) fn search(&self, key: &K) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    pub(crate) fn get(&self, key: &K) -> Option<&P> {
        let handle = self.search(key)?;
        Some(self.nodes.get(handle).entry())
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut P> {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).entry_mut())
    }

    /// 1-based descending rank: the largest key has rank 1.
    ///
    /// Each leftward step leaves behind the current node and its whole right
    /// subtree, all of which outrank the target; the accumulator collects
    /// `right_weight + 1` for every such step, and the match contributes its
    /// own right subtree plus itself.
    pub(crate) fn rank(&self, key: &K) -> Option<usize> {
        let mut current = self.root;
        let mut outranked = 0usize;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key()) {
                Ordering::Equal => return Some(outranked + node.right_weight() as usize + 1),
                Ordering::Greater => current = node.right(),
                Ordering::Less => {
                    outranked += node.right_weight() as usize + 1;
                    current = node.left();
                }
            }
        }
        None
    }

    /// Inserts a key/payload pair, or does nothing and returns `false` if the
    /// key is already present.
    pub(crate) fn insert(&mut self, key: K, entry: P) -> bool {
        // Duplicate keys are rejected up front, so the descent below always
        // ends at a missing child slot.
        if self.contains(&key) {
            return false;
        }
        let new_root = match self.root {
            Some(root) => self.insert_at(root, key, entry),
            None => self.nodes.alloc(Node::new(key, entry)),
        };
        self.nodes.get_mut(new_root).set_parent(None);
        self.root = Some(new_root);
        true
    }

    fn insert_at(&mut self, handle: Handle, key: K, entry: P) -> Handle {
        if key < *self.nodes.get(handle).key() {
            let new_left = match self.nodes.get(handle).left() {
                Some(left) => self.insert_at(left, key, entry),
                None => self.nodes.alloc(Node::new(key, entry)),
            };
            self.nodes.get_mut(handle).set_left(Some(new_left));
        } else {
            // Ties route right. The duplicate pre-check in `insert` means an
            // equal key never reaches a child slot today, but the routing
            // decides where equal keys would land if that policy changed.
            let new_right = match self.nodes.get(handle).right() {
                Some(right) => self.insert_at(right, key, entry),
                None => self.nodes.alloc(Node::new(key, entry)),
            };
            let node = self.nodes.get_mut(handle);
            node.set_right(Some(new_right));
            node.add_right_weight(1);
        }
        self.reconnect_children(handle);
        self.update_metrics(handle);
        self.rebalance(handle)
    }

    /// Removes the node with `key` and releases its payload, or does nothing
    /// and returns `None` if the key is absent.
    pub(crate) fn remove(&mut self, key: &K) -> Option<P> {
        self.search(key)?;
        let root = self.root.expect("`RawRankTree::remove()` - `search` matched in an empty tree!");
        let (new_root, entry) = self.remove_at(root, key);
        if let Some(handle) = new_root {
            self.nodes.get_mut(handle).set_parent(None);
        }
        self.root = new_root;
        Some(entry)
    }

    fn remove_at(&mut self, handle: Handle, key: &K) -> (Option<Handle>, P) {
        let entry = match key.cmp(self.nodes.get(handle).key()) {
            Ordering::Less => {
                let left =
                    self.nodes.get(handle).left().expect("`RawRankTree::remove_at()` - key vanished mid-descent!");
                let (new_left, entry) = self.remove_at(left, key);
                self.nodes.get_mut(handle).set_left(new_left);
                entry
            }
            Ordering::Greater => {
                let right =
                    self.nodes.get(handle).right().expect("`RawRankTree::remove_at()` - key vanished mid-descent!");
                let (new_right, entry) = self.remove_at(right, key);
                let node = self.nodes.get_mut(handle);
                node.set_right(new_right);
                node.sub_right_weight(1);
                entry
            }
            Ordering::Equal => {
                let (left, right) = {
                    let node = self.nodes.get(handle);
                    (node.left(), node.right())
                };
                match (left, right) {
                    (None, None) => {
                        let (_key, entry) = self.nodes.take(handle).into_parts();
                        return (None, entry);
                    }
                    (Some(child), None) | (None, Some(child)) => {
                        // Splice the single child into this node's place.
                        let parent = self.nodes.get(handle).parent();
                        let (_key, entry) = self.nodes.take(handle).into_parts();
                        self.nodes.get_mut(child).set_parent(parent);
                        self.reconnect_children(child);
                        self.update_metrics(child);
                        return (Some(self.rebalance(child)), entry);
                    }
                    (Some(_), Some(right)) => {
                        // Two children: move the in-order successor's content
                        // into this node and remove the successor from the
                        // right subtree. Node identity is not preserved.
                        let (new_right, succ_key, succ_entry) = self.remove_min(right);
                        let node = self.nodes.get_mut(handle);
                        node.set_right(new_right);
                        node.sub_right_weight(1);
                        let (_old_key, old_entry) = node.replace_content(succ_key, succ_entry);
                        old_entry
                    }
                }
            }
        };
        self.reconnect_children(handle);
        self.update_metrics(handle);
        (Some(self.rebalance(handle)), entry)
    }

    /// Removes the leftmost node of the subtree rooted at `handle`, returning
    /// the new subtree root and the removed key/payload. Only left links are
    /// followed, so no `right_weight` on the path changes.
    fn remove_min(&mut self, handle: Handle) -> (Option<Handle>, K, P) {
        match self.nodes.get(handle).left() {
            Some(left) => {
                let (new_left, key, entry) = self.remove_min(left);
                self.nodes.get_mut(handle).set_left(new_left);
                self.reconnect_children(handle);
                self.update_metrics(handle);
                (Some(self.rebalance(handle)), key, entry)
            }
            None => {
                // The minimum has no left child; its right subtree (if any)
                // splices up. The caller's reconnect fixes its parent link.
                let right = self.nodes.get(handle).right();
                let (key, entry) = self.nodes.take(handle).into_parts();
                (right, key, entry)
            }
        }
    }

    /// Restores the AVL invariant at `handle`, returning the subtree's new
    /// root. A child balance of 0 takes the single-rotation branch.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let balance = self.nodes.get(handle).balance();
        let new_root = if balance < -1 {
            let right =
                self.nodes.get(handle).right().expect("`RawRankTree::rebalance()` - right-heavy without a right child!");
            if self.nodes.get(right).balance() <= 0 {
                self.rotate_left(handle)
            } else {
                // RL: rotate the right child right, then this node left.
                let new_right = self.rotate_right(right);
                self.nodes.get_mut(handle).set_right(Some(new_right));
                self.rotate_left(handle)
            }
        } else if balance > 1 {
            let left =
                self.nodes.get(handle).left().expect("`RawRankTree::rebalance()` - left-heavy without a left child!");
            if self.nodes.get(left).balance() >= 0 {
                self.rotate_right(handle)
            } else {
                // LR: rotate the left child left, then this node right.
                let new_left = self.rotate_left(left);
                self.nodes.get_mut(handle).set_left(Some(new_left));
                self.rotate_right(handle)
            }
        } else {
            handle
        };
        self.update_metrics(new_root);
        new_root
    }

    /// Promotes `handle`'s right child over `handle`.
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let right = self.nodes.get(handle).right().expect("`RawRankTree::rotate_left()` - no right child to promote!");
        let parent = self.nodes.get(handle).parent();
        let right_left = self.nodes.get(right).left();

        let promoted = self.nodes.get_mut(right);
        promoted.set_left(Some(handle));
        promoted.set_parent(parent);

        let demoted = self.nodes.get_mut(handle);
        demoted.set_right(right_left);
        demoted.set_parent(Some(right));

        self.reconnect_children(handle);
        self.update_metrics(handle);
        self.update_metrics(right);

        // The promoted node and its right subtree left `handle`'s right
        // subtree.
        let moved = self.nodes.get(right).right_weight() + 1;
        self.nodes.get_mut(handle).sub_right_weight(moved);
        right
    }

    /// Promotes `handle`'s left child over `handle`.
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let left = self.nodes.get(handle).left().expect("`RawRankTree::rotate_right()` - no left child to promote!");
        let parent = self.nodes.get(handle).parent();
        let left_right = self.nodes.get(left).right();

        let promoted = self.nodes.get_mut(left);
        promoted.set_right(Some(handle));
        promoted.set_parent(parent);

        let demoted = self.nodes.get_mut(handle);
        demoted.set_left(left_right);
        demoted.set_parent(Some(left));

        self.reconnect_children(handle);
        self.update_metrics(handle);
        self.update_metrics(left);

        // The demoted node and its right subtree joined the promoted node's
        // right subtree.
        let moved = self.nodes.get(handle).right_weight() + 1;
        self.nodes.get_mut(left).add_right_weight(moved);
        left
    }

    /// Re-points both children's parent links at `handle`.
    fn reconnect_children(&mut self, handle: Handle) {
        let (left, right) = {
            let node = self.nodes.get(handle);
            (node.left(), node.right())
        };
        if let Some(left) = left {
            self.nodes.get_mut(left).set_parent(Some(handle));
        }
        if let Some(right) = right {
            self.nodes.get_mut(right).set_parent(Some(handle));
        }
    }

    /// Recomputes `handle`'s cached height and balance from its children.
    fn update_metrics(&mut self, handle: Handle) {
        let (left_height, right_height) = {
            let node = self.nodes.get(handle);
            let left_height = node.left().map_or(0, |left| self.nodes.get(left).height());
            let right_height = node.right().map_or(0, |right| self.nodes.get(right).height());
            (left_height, right_height)
        };
        self.nodes.get_mut(handle).update_metrics(left_height, right_height);
    }
}

#[cfg(test)]
impl<K: Ord, P> RawRankTree<K, P> {
    /// Re-derives every cached field from scratch and panics on any mismatch
    /// with the stored structure.
    pub(crate) fn assert_invariants(&self) {
        match self.root {
            Some(root) => {
                assert_eq!(self.nodes.get(root).parent(), None, "root has a parent");
                let size = self.check_subtree(root, None, None);
                assert_eq!(size, self.len(), "len out of sync with the node count");
            }
            None => assert_eq!(self.len(), 0, "empty tree with a nonzero len"),
        }
    }

    /// Checks the subtree at `handle` against `(lower, upper)` key bounds and
    /// returns its node count.
    fn check_subtree(&self, handle: Handle, lower: Option<&K>, upper: Option<&K>) -> usize {
        let node = self.nodes.get(handle);
        if let Some(lower) = lower {
            assert!(node.key() > lower, "BST order violated below a right link");
        }
        if let Some(upper) = upper {
            assert!(node.key() < upper, "BST order violated below a left link");
        }

        let (mut left_height, mut right_height) = (0u8, 0u8);
        let mut left_size = 0;
        if let Some(left) = node.left() {
            assert_eq!(self.nodes.get(left).parent(), Some(handle), "left child's parent link is broken");
            left_size = self.check_subtree(left, lower, Some(node.key()));
            left_height = self.nodes.get(left).height();
        }
        let mut right_size = 0;
        if let Some(right) = node.right() {
            assert_eq!(self.nodes.get(right).parent(), Some(handle), "right child's parent link is broken");
            right_size = self.check_subtree(right, Some(node.key()), upper);
            right_height = self.nodes.get(right).height();
        }

        assert_eq!(node.right_weight() as usize, right_size, "right_weight out of sync");
        assert_eq!(node.height(), left_height.max(right_height) + 1, "cached height out of sync");
        let balance = i16::from(left_height) - i16::from(right_height);
        assert_eq!(i16::from(node.balance()), balance, "cached balance factor out of sync");
        assert!((-1..=1).contains(&balance), "AVL balance violated");

        left_size + right_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn tree_of(keys: &[i64]) -> RawRankTree<i64, i64> {
        let mut tree = RawRankTree::new();
        for &key in keys {
            assert!(tree.insert(key, key * 10));
            tree.assert_invariants();
        }
        tree
    }

    fn in_order_keys(tree: &RawRankTree<i64, i64>) -> Vec<i64> {
        fn walk(tree: &RawRankTree<i64, i64>, handle: Option<Handle>, out: &mut Vec<i64>) {
            if let Some(handle) = handle {
                let node = tree.node(handle);
                walk(tree, node.left(), out);
                out.push(*node.key());
                walk(tree, node.right(), out);
            }
        }
        let mut out = Vec::new();
        walk(tree, tree.root(), &mut out);
        out
    }

    #[test]
    fn empty_tree() {
        let tree: RawRankTree<i64, ()> = RawRankTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.rank(&1), None);
        assert_eq!(tree.get(&1), None);
    }

    #[test]
    fn balanced_seven_keys() {
        let tree = tree_of(&[50, 30, 70, 20, 40, 60, 80]);
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), 3);
        // Descending rank: the largest key ranks first.
        assert_eq!(tree.rank(&80), Some(1));
        assert_eq!(tree.rank(&70), Some(2));
        assert_eq!(tree.rank(&50), Some(4));
        assert_eq!(tree.rank(&20), Some(7));
        assert_eq!(tree.rank(&55), None);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        // Worst case for a naive BST; rotations must keep the height at 3.
        let tree = tree_of(&[10, 20, 30, 40, 50]);
        assert_eq!(tree.height(), 3);
        assert_eq!(in_order_keys(&tree), [10, 20, 30, 40, 50]);
    }

    #[test]
    fn descending_inserts_stay_balanced() {
        let tree = tree_of(&[50, 40, 30, 20, 10]);
        assert_eq!(tree.height(), 3);
        assert_eq!(in_order_keys(&tree), [10, 20, 30, 40, 50]);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert!(!tree.insert(5, 999));
        assert_eq!(tree.len(), 3);
        // The original payload survives.
        assert_eq!(tree.get(&5), Some(&50));
        tree.assert_invariants();
    }

    #[test]
    fn absent_remove_is_a_no_op() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.remove(&4), None);
        assert_eq!(tree.len(), 3);
        tree.assert_invariants();
    }

    #[test]
    fn remove_releases_the_payload() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.remove(&3), Some(30));
        assert_eq!(in_order_keys(&tree), [5, 8]);
        tree.assert_invariants();
    }

    #[test]
    fn remove_root_with_two_children() {
        let mut tree = tree_of(&[50, 30, 70, 20, 40, 60, 80]);
        assert_eq!(tree.remove(&50), Some(500));
        // The in-order sequence loses exactly the removed key; the former
        // successor (60) now roots the tree.
        assert_eq!(in_order_keys(&tree), [20, 30, 40, 60, 70, 80]);
        let root = tree.root().unwrap();
        assert_eq!(*tree.node(root).key(), 60);
        assert_eq!(tree.get(&60), Some(&600));
        tree.assert_invariants();
    }

    #[test]
    fn insert_then_remove_round_trips() {
        let mut tree = tree_of(&[50, 30, 70]);
        let before = in_order_keys(&tree);
        assert!(tree.insert(42, 420));
        assert_eq!(tree.get(&42), Some(&420));
        assert_eq!(tree.remove(&42), Some(420));
        assert_eq!(in_order_keys(&tree), before);
        tree.assert_invariants();
    }

    #[test]
    fn ranks_form_a_descending_permutation() {
        let tree = tree_of(&[3, 1, 4, 15, 9, 2, 6, 5, 35, 8]);
        let mut keys = in_order_keys(&tree);
        keys.reverse();
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(tree.rank(key), Some(index + 1), "rank of {key}");
        }
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert!(tree.insert(1, 10));
        tree.assert_invariants();
    }

    proptest! {
        /// Random insert/remove interleavings, with the full from-scratch
        /// invariant check after every operation.
        #[test]
        fn invariants_survive_random_ops(ops in proptest::collection::vec((any::<bool>(), -64i64..64), 1..200)) {
            let mut tree: RawRankTree<i64, i64> = RawRankTree::new();
            let mut model: alloc::collections::BTreeMap<i64, i64> = alloc::collections::BTreeMap::new();

            for (is_insert, key) in ops {
                if is_insert {
                    let inserted = tree.insert(key, key * 10);
                    prop_assert_eq!(inserted, !model.contains_key(&key));
                    model.entry(key).or_insert(key * 10);
                } else {
                    prop_assert_eq!(tree.remove(&key), model.remove(&key));
                }
                tree.assert_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let keys: Vec<i64> = model.keys().copied().collect();
            prop_assert_eq!(in_order_keys(&tree), keys);
            for (index, key) in model.keys().rev().enumerate() {
                prop_assert_eq!(tree.rank(key), Some(index + 1));
            }
        }
    }
}
