use thiserror::Error;

/// Recoverable failures reported by tree operations.
///
/// None of these leave the tree partially modified: every condition is
/// detected before the first structural change.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("key to insert already in tree")]
    DuplicateKey,

    #[error("key to delete not in tree")]
    KeyNotFound,

    /// Sibling subtrees differ in height by more than one.
    #[error("not an AVL tree: subtree heights {smaller} and {greater}")]
    NotAvl { smaller: usize, greater: usize },

    /// A stored balance factor disagrees with the measured subtrees.
    #[error("balance not in line: stored {stored}, measured {measured}")]
    BalanceMismatch { stored: i8, measured: isize },

    /// The cached tree height disagrees with the structure.
    #[error("height not in line: cached {cached}, measured {measured}")]
    HeightMismatch { cached: usize, measured: usize },
}
