// Bookmark store state managers
// Managers own mutable state: the bookmark tree and its lookup indexes.

pub mod bookmark_index;
pub mod bookmark_tree;
