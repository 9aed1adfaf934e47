mod allocator;
pub mod avl_tree;
mod display;
mod node;

#[cfg(test)]
mod proptests;

pub use avl_tree::AVLTree;
pub use avl_tree::Iter;
pub use avl_tree::NodeMut;
pub use avl_tree::NodeRef;
