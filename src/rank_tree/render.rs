use alloc::string::String;
use core::fmt::Write as _;

use super::RankTree;
use crate::Entry;
use crate::raw::Handle;

impl<K, P: Entry> RankTree<K, P> {
    /// Renders the tree structure as nested parentheses: every node becomes
    /// `(<left><name><right>)`, with missing children contributing nothing.
    /// The empty tree renders as an empty string.
    ///
    /// Purely a diagnostic; O(n).
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::{Entry, RankTree};
    ///
    /// struct Player(&'static str, u32, i32);
    ///
    /// impl Entry for Player {
    ///     type Id = u32;
    ///     type Score = i32;
    ///     fn name(&self) -> &str {
    ///         self.0
    ///     }
    ///     fn id(&self) -> u32 {
    ///         self.1
    ///     }
    ///     fn score(&self) -> i32 {
    ///         self.2
    ///     }
    /// }
    ///
    /// let mut tree = RankTree::new();
    /// tree.insert(2, Player("bo", 1, 1540));
    /// tree.insert(1, Player("dana", 2, 1200));
    /// tree.insert(3, Player("alice", 3, 1812));
    /// assert_eq!(tree.tree_string(), "((dana)bo(alice))");
    /// ```
    #[must_use]
    pub fn tree_string(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.raw.root() {
            self.render_subtree(root, &mut out);
        }
        out
    }

    fn render_subtree(&self, handle: Handle, out: &mut String) {
        let node = self.raw.node(handle);
        out.push('(');
        if let Some(left) = node.left() {
            self.render_subtree(left, out);
        }
        out.push_str(node.entry().name());
        if let Some(right) = node.right() {
            self.render_subtree(right, out);
        }
        out.push(')');
    }

    /// Renders the full scoreboard, highest key first: a `NAME\tID\tSCORE`
    /// header followed by one tab-separated row per entry (reverse in-order
    /// traversal).
    ///
    /// O(n).
    #[must_use]
    pub fn scoreboard(&self) -> String {
        let mut out = String::from("NAME\tID\tSCORE\n");
        if let Some(root) = self.raw.root() {
            self.scoreboard_rows(root, &mut out);
        }
        out
    }

    fn scoreboard_rows(&self, handle: Handle, out: &mut String) {
        let node = self.raw.node(handle);
        if let Some(right) = node.right() {
            self.scoreboard_rows(right, out);
        }
        let entry = node.entry();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}\t{}\t{}", entry.name(), entry.id(), entry.score());
        if let Some(left) = node.left() {
            self.scoreboard_rows(left, out);
        }
    }
}
