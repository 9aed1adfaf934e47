use super::node::Node;

/// Constant to represent an empty link.
pub(crate) const SENTINEL: u32 = 0;

/// Macro to access a slot by its (1-based) index.
macro_rules! slot {
    ( $array:expr, $index:expr ) => {
        $array[($index - 1) as usize]
    };
}

/// A slot of the allocator, either holding a node or linking to the next
/// free slot.
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Free { next: u32 },
}

/// The allocator owns every node of a tree.
///
/// Nodes are addressed by stable indices starting at `1`, so that `SENTINEL`
/// can represent an absent child. Released slots form a linked list starting
/// at `free_list_head` and are reused before the array grows.
pub(crate) struct Allocator<K, V> {
    /// Array of slots.
    slots: Vec<Slot<K, V>>,

    /// Index of the first free slot (`SENTINEL` when there is none).
    free_list_head: u32,

    /// Number of occupied slots.
    size: u32,
}

impl<K, V> Allocator<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list_head: SENTINEL,
            size: 0,
        }
    }

    /// Returns the number of nodes allocated.
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Returns the number of slots that can be held without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Releases every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list_head = SENTINEL;
        self.size = 0;
    }

    /// Stores a node and returns its index.
    ///
    /// Running out of indices is fatal: the tree cannot address more nodes.
    pub fn add(&mut self, node: Node<K, V>) -> u32 {
        let index = if self.free_list_head != SENTINEL {
            let index = self.free_list_head;

            let slot = &mut slot!(self.slots, index);

            self.free_list_head = match slot {
                Slot::Free { next } => *next,
                Slot::Occupied(_) => panic!("free list points to occupied node {index}"),
            };
            *slot = Slot::Occupied(node);

            index
        } else {
            let index = u32::try_from(self.slots.len() + 1)
                .unwrap_or_else(|_| panic!("allocator is full ({} nodes)", self.size));

            self.slots.push(Slot::Occupied(node));

            index
        };

        self.size += 1;

        index
    }

    /// Releases the node at `index`, returning it.
    pub fn remove(&mut self, index: u32) -> Node<K, V> {
        let released = std::mem::replace(
            &mut slot!(self.slots, index),
            Slot::Free {
                next: self.free_list_head,
            },
        );

        match released {
            Slot::Occupied(node) => {
                self.free_list_head = index;
                self.size -= 1;
                node
            }
            Slot::Free { .. } => panic!("node {index} released twice"),
        }
    }

    #[inline]
    pub fn node(&self, index: u32) -> &Node<K, V> {
        match &slot!(self.slots, index) {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => panic!("dangling node index {index}"),
        }
    }

    #[inline]
    pub fn node_mut(&mut self, index: u32) -> &mut Node<K, V> {
        match &mut slot!(self.slots, index) {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => panic!("dangling node index {index}"),
        }
    }
}
