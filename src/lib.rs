//! An order-statistic AVL tree for dynamically ranked collections.
//!
//! This crate provides [`RankTree`], a height-balanced binary search tree
//! whose nodes are augmented with a right-subtree count, giving O(log n)
//! insert, delete, lookup-by-key, and descending [`rank`](RankTree::rank)
//! queries (highest key first) without ever walking the whole tree.
//!
//! Payloads are opaque to the tree. The optional [`Entry`] trait exposes the
//! display name, identifier, and score the two textual renderings need:
//! [`tree_string`](RankTree::tree_string), a parenthesized dump of the tree
//! shape, and [`scoreboard`](RankTree::scoreboard), the collection ordered
//! from highest key to lowest.
//!
//! # Example
//!
//! ```
//! use rank_tree::RankTree;
//!
//! let mut ladder = RankTree::new();
//! ladder.insert(1812, "alice");
//! ladder.insert(1200, "dana");
//! ladder.insert(1540, "bo");
//!
//! assert_eq!(ladder.rank(&1812), Some(1)); // highest key, rank 1
//! assert_eq!(ladder.rank(&1200), Some(3));
//! assert_eq!(ladder.get(&1540), Some(&"bo"));
//!
//! // Duplicate keys are rejected silently.
//! assert!(!ladder.insert(1540, "mallory"));
//! ```
//!
//! # Implementation
//!
//! Nodes live in a slot arena and reference each other by niche-optimized
//! handles; child links own their subtrees while the per-node parent link is
//! a plain back-index, so upward bookkeeping never creates an ownership
//! cycle. Every mutation rebalances bottom-up along the search path with
//! classic AVL rotations, and each rotation adjusts the right-subtree
//! counters in O(1) so rank queries stay a single descent.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **O(log n) rank queries** - Descending rank via right-subtree count
//!   augmentation
//! - **Single-threaded by design** - callers requiring concurrent access
//!   must serialize it externally

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

mod entry;
mod raw;

pub mod rank_tree;

pub use entry::Entry;
pub use rank_tree::{Iter, RankTree};
