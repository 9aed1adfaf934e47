use std::fmt;

use super::avl_tree::{AVLTree, NodeRef};

/// Number of spaces used to indent each level.
const INDENT: usize = 8;

/// Renders the tree sideways: smaller keys above, greater keys below, deeper
/// levels further to the left. Each line shows the side of the link (`W` for
/// the root), the level, the key, the balance and the payload.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for AVLTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtree(f, self.root(), self.height(), 'W')?;

        match self.check() {
            Ok(()) => writeln!(f, "\nAVL status: good"),
            Err(error) => writeln!(f, "\nAVL status: {error}"),
        }
    }
}

fn write_subtree<K: fmt::Display, V: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    node: Option<NodeRef<'_, K, V>>,
    level: usize,
    side: char,
) -> fmt::Result {
    let indent = level * INDENT;

    match node {
        Some(node) => {
            write_subtree(f, node.smaller(), level.saturating_sub(1), 'L')?;
            writeln!(
                f,
                "{:indent$}{side}{level}: {} ({}){}",
                "",
                node.key(),
                node.balance(),
                node.value(),
            )?;
            write_subtree(f, node.greater(), level.saturating_sub(1), 'R')
        }
        None => writeln!(f, "{:indent$}{side}{level}: ÷", ""),
    }
}
