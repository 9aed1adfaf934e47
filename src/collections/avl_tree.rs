use log::{debug, warn};

use super::allocator::{Allocator, SENTINEL};
use super::node::{self, Register};
use crate::error::TreeError;
use crate::types::NoPayload;

/// AVL tree struct, which is a self-balancing binary search tree. Keys in the
/// tree are stored as such the height of two sibling subtrees differ by one at
/// most.
///
/// Every node carries a payload of type `V` next to its key. The payload is
/// created with `V::default()` when the key is inserted and is handed back
/// when the key is removed; in between it is reachable through the node
/// handles returned by the tree.
pub struct AVLTree<K, V = NoPayload> {
    /// Node allocator.
    allocator: Allocator<K, V>,

    /// Index of the root node.
    root: u32,

    /// Cached height of the tree (`0` when empty).
    height: usize,
}

impl<K, V> AVLTree<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            allocator: Allocator::new(),
            root: SENTINEL,
            height: 0,
        }
    }

    /// Creates an empty tree with space for at least `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: Allocator::with_capacity(capacity),
            root: SENTINEL,
            height: 0,
        }
    }

    /// Returns the number of nodes the tree can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    /// Indicates whether the tree is empty or not.
    pub fn is_empty(&self) -> bool {
        self.root == SENTINEL
    }

    /// Returns the cached height of the tree.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Removes every node from the tree.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.root = SENTINEL;
        self.height = 0;
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        NodeRef::at(&self.allocator, self.root)
    }

    /// Returns the node holding the lowest key.
    pub fn lowest(&self) -> Option<NodeRef<'_, K, V>> {
        self.outermost(Register::Smaller)
    }

    /// Returns the node holding the highest key.
    pub fn highest(&self) -> Option<NodeRef<'_, K, V>> {
        self.outermost(Register::Greater)
    }

    /// An iterator visiting all nodes in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            allocator: &self.allocator,
            stack: Vec::with_capacity(self.height),
        };
        iter.descend(self.root);
        iter
    }

    /// Verifies the structure of the tree.
    ///
    /// The height is recomputed from the nodes, checking the AVL rule and the
    /// stored balance of every node, and compared with the cached height.
    pub fn check(&self) -> Result<(), TreeError> {
        let measured = node::calc_height(&self.allocator, self.root).map_err(|error| {
            warn!("structural check failed: {error}");
            error
        })?;

        if measured != self.height {
            warn!("cached height {} does not match {measured}", self.height);

            return Err(TreeError::HeightMismatch {
                cached: self.height,
                measured,
            });
        }

        Ok(())
    }

    fn outermost(&self, register: Register) -> Option<NodeRef<'_, K, V>> {
        let mut index = self.root;

        if index == SENTINEL {
            return None;
        }

        while self.allocator.node(index).get_register(register) != SENTINEL {
            index = self.allocator.node(index).get_register(register);
        }

        NodeRef::at(&self.allocator, index)
    }
}

impl<K: Ord, V> AVLTree<K, V> {
    /// Returns the node holding `key`, if one is found.
    pub fn find(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
        node::find(&self.allocator, self.root, key)
            .and_then(|index| NodeRef::at(&self.allocator, index))
    }

    /// Returns a mutable handle to the node holding `key`, if one is found.
    pub fn find_mut(&mut self, key: &K) -> Option<NodeMut<'_, K, V>> {
        node::find(&self.allocator, self.root, key)
            .map(|index| NodeMut::at(&mut self.allocator, index))
    }

    /// Checks whether a key is present in the tree or not.
    pub fn contains(&self, key: &K) -> bool {
        node::find(&self.allocator, self.root, key).is_some()
    }

    /// Returns the payload attached to `key`, if one is found.
    pub fn get(&self, key: &K) -> Option<&V> {
        node::find(&self.allocator, self.root, key)
            .map(|index| self.allocator.node(index).value())
    }

    /// Returns a mutable reference to the payload attached to `key`, if one
    /// is found.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        node::find(&self.allocator, self.root, key)
            .map(|index| self.allocator.node_mut(index).value_mut())
    }

    /// Removes `key` from the tree, returning its payload.
    ///
    /// Fails with [`TreeError::KeyNotFound`] if the key is not in the tree; the
    /// tree is not modified in that case.
    ///
    /// Removing a node with two children moves its in-order successor into
    /// its place, so any position-based assumptions about the remaining nodes
    /// do not survive the call.
    pub fn remove(&mut self, key: &K) -> Result<V, TreeError> {
        let mut removed = None;

        if node::remove(&mut self.allocator, &mut self.root, key, &mut removed)? {
            self.height -= 1;
            debug!("tree height decreased to {}", self.height);
        }

        // a successful removal always detaches a node
        Ok(removed.unwrap_or_else(|| unreachable!("removal reported no payload")))
    }

    /// Removes `key` from the tree if it is present, returning its payload.
    pub fn safe_remove(&mut self, key: &K) -> Option<V> {
        if self.contains(key) {
            self.remove(key).ok()
        } else {
            None
        }
    }
}

impl<K: Ord, V: Default> AVLTree<K, V> {
    /// Inserts `key` in the tree, returning a handle to the new node.
    ///
    /// The payload of the new node is `V::default()`. Fails with
    /// [`TreeError::DuplicateKey`] if the key is already in the tree; the tree
    /// is not modified in that case.
    pub fn insert(&mut self, key: K) -> Result<NodeMut<'_, K, V>, TreeError> {
        let mut inserted = SENTINEL;

        if node::insert(&mut self.allocator, &mut self.root, key, &mut inserted)? {
            self.height += 1;
            debug!("tree height increased to {}", self.height);
        }

        debug!("inserted node {inserted} ({} nodes)", self.allocator.len());

        Ok(NodeMut::at(&mut self.allocator, inserted))
    }

    /// Returns the node holding `key`, inserting it first if it is not in the
    /// tree.
    pub fn safe_insert(&mut self, key: K) -> NodeMut<'_, K, V> {
        if let Some(index) = node::find(&self.allocator, self.root, &key) {
            return NodeMut::at(&mut self.allocator, index);
        }

        match self.insert(key) {
            Ok(node) => node,
            Err(error) => unreachable!("{error} for a key not in the tree"),
        }
    }
}

impl<K, V> Default for AVLTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a AVLTree<K, V> {
    type Item = NodeRef<'a, K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read-only handle to a node of the tree.
///
/// The handle borrows the tree, so it cannot outlive any modification.
pub struct NodeRef<'a, K, V> {
    allocator: &'a Allocator<K, V>,
    index: u32,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    fn at(allocator: &'a Allocator<K, V>, index: u32) -> Option<Self> {
        (index != SENTINEL).then_some(Self { allocator, index })
    }

    pub fn key(&self) -> &'a K {
        self.allocator.node(self.index).key()
    }

    pub fn value(&self) -> &'a V {
        self.allocator.node(self.index).value()
    }

    /// Height of the greater subtree minus height of the smaller subtree.
    pub fn balance(&self) -> i8 {
        self.allocator.node(self.index).balance()
    }

    /// Returns the root of the subtree holding the smaller keys.
    pub fn smaller(&self) -> Option<Self> {
        Self::at(
            self.allocator,
            self.allocator.node(self.index).get_register(Register::Smaller),
        )
    }

    /// Returns the root of the subtree holding the greater keys.
    pub fn greater(&self) -> Option<Self> {
        Self::at(
            self.allocator,
            self.allocator.node(self.index).get_register(Register::Greater),
        )
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

/// Handle to a node of the tree giving mutable access to its payload.
///
/// The key of a node never changes once inserted.
pub struct NodeMut<'a, K, V> {
    allocator: &'a mut Allocator<K, V>,
    index: u32,
}

impl<'a, K, V> NodeMut<'a, K, V> {
    fn at(allocator: &'a mut Allocator<K, V>, index: u32) -> Self {
        Self { allocator, index }
    }

    pub fn key(&self) -> &K {
        self.allocator.node(self.index).key()
    }

    pub fn value(&self) -> &V {
        self.allocator.node(self.index).value()
    }

    pub fn value_mut(&mut self) -> &mut V {
        self.allocator.node_mut(self.index).value_mut()
    }

    /// Converts the handle into a mutable reference to the payload, keeping
    /// the tree borrowed for as long as the reference lives.
    pub fn into_value_mut(self) -> &'a mut V {
        let allocator = self.allocator;
        allocator.node_mut(self.index).value_mut()
    }

    /// Height of the greater subtree minus height of the smaller subtree.
    pub fn balance(&self) -> i8 {
        self.allocator.node(self.index).balance()
    }
}

/// In-order iterator over the nodes of a tree.
pub struct Iter<'a, K, V> {
    allocator: &'a Allocator<K, V>,
    /// Nodes whose smaller subtree is being visited.
    stack: Vec<u32>,
}

impl<K, V> Iter<'_, K, V> {
    fn descend(&mut self, mut index: u32) {
        while index != SENTINEL {
            self.stack.push(index);
            index = self.allocator.node(index).get_register(Register::Smaller);
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = NodeRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;

        self.descend(self.allocator.node(index).get_register(Register::Greater));

        NodeRef::at(self.allocator, index)
    }
}
