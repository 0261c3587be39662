mod arena;
mod cursor;
mod handle;
mod node;
mod raw_ordered_tree;
mod validate;

pub(crate) use cursor::Cursor;
pub(crate) use raw_ordered_tree::RawOrderedTree;
