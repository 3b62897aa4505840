mod arena;
mod node;
mod raw_rank_tree;

pub(crate) use arena::Handle;
pub(crate) use raw_rank_tree::RawRankTree;
