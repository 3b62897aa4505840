use core::fmt::Display;

/// Display contract for payloads stored in a [`RankTree`](crate::RankTree).
///
/// The tree treats its payloads as opaque: core operations never look at
/// them, and only the two renderings ([`tree_string`] and [`scoreboard`])
/// require this trait. Implementations expose a stable display name, an
/// identifier, and a score/label; the tree never mutates any of them.
///
/// [`tree_string`]: crate::RankTree::tree_string
/// [`scoreboard`]: crate::RankTree::scoreboard
///
/// # Examples
///
/// ```
/// use rank_tree::Entry;
///
/// struct Player {
///     name: String,
///     id: u32,
///     elo: i32,
/// }
///
/// impl Entry for Player {
///     type Id = u32;
///     type Score = i32;
///
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn id(&self) -> u32 {
///         self.id
///     }
///
///     fn score(&self) -> i32 {
///         self.elo
///     }
/// }
/// ```
pub trait Entry {
    /// Identifier type shown in the scoreboard's ID column.
    type Id: Display;
    /// Score type shown in the scoreboard's SCORE column.
    type Score: Display;

    /// Stable display name, used by both renderings.
    fn name(&self) -> &str;

    /// Identifier for the scoreboard row.
    fn id(&self) -> Self::Id;

    /// Score (or label) for the scoreboard row.
    fn score(&self) -> Self::Score;
}
