//! Self-balancing binary search tree (AVL) whose nodes carry a payload
//! attached to their key.
//!
//! ```
//! use fast_avl::{AVLTree, TreeError};
//!
//! let mut tree: AVLTree<u32, u64> = AVLTree::new();
//!
//! for key in [30, 20, 10] {
//!     *tree.insert(key)?.value_mut() = u64::from(key) * 2;
//! }
//!
//! assert_eq!(*tree.root().unwrap().key(), 20);
//! assert_eq!(tree.get(&10), Some(&20));
//! assert_eq!(tree.insert(10).err(), Some(TreeError::DuplicateKey));
//!
//! tree.check()?;
//! # Ok::<(), TreeError>(())
//! ```

pub mod collections;
pub mod error;
pub mod types;

pub use collections::AVLTree;
pub use error::TreeError;
pub use types::NoPayload;
