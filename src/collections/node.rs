use log::trace;
use std::cmp::{max, Ordering};

use super::allocator::{Allocator, SENTINEL};
use crate::error::TreeError;

/// Enum representing the child links of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Register {
    Smaller,
    Greater,
}

impl Register {
    /// Returns the child on the side of a (non-zero) balance factor.
    #[inline(always)]
    fn heavy(balance: i8) -> Self {
        if balance < 0 {
            Register::Smaller
        } else {
            Register::Greater
        }
    }

    #[inline(always)]
    fn opposite(self) -> Self {
        match self {
            Register::Smaller => Register::Greater,
            Register::Greater => Register::Smaller,
        }
    }
}

/// Unit of storage of the tree: a key with its attached payload.
pub(crate) struct Node<K, V> {
    /// Registers for a node:
    ///   [0] - smaller child
    ///   [1] - greater child
    registers: [u32; 2],
    /// Height of the greater subtree minus height of the smaller one.
    balance: i8,
    key: K,
    value: V,
}

impl<K, V: Default> Node<K, V> {
    pub fn new(key: K) -> Self {
        Self {
            registers: [SENTINEL, SENTINEL],
            balance: 0,
            key,
            value: V::default(),
        }
    }
}

impl<K, V> Node<K, V> {
    #[inline(always)]
    pub fn get_register(&self, register: Register) -> u32 {
        self.registers[register as usize]
    }

    #[inline(always)]
    pub fn set_register(&mut self, register: Register, value: u32) {
        self.registers[register as usize] = value;
    }

    #[inline(always)]
    pub fn balance(&self) -> i8 {
        self.balance
    }

    #[inline(always)]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline(always)]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline(always)]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

/// Iterative search for `key` in the subtree rooted at `index`.
pub(crate) fn find<K: Ord, V>(allocator: &Allocator<K, V>, mut index: u32, key: &K) -> Option<u32> {
    while index != SENTINEL {
        let node = allocator.node(index);

        index = match key.cmp(&node.key) {
            Ordering::Less => node.get_register(Register::Smaller),
            Ordering::Greater => node.get_register(Register::Greater),
            Ordering::Equal => return Some(index),
        };
    }

    None
}

/// Adds `offset` to the balance of the node at `link` and rotates the subtree
/// when the balance leaves the AVL range.
///
/// Returns `true` when the height change of the subtree continues upward.
/// `link` is updated when a rotation moves a different node to the top of
/// the subtree.
///
/// # Panics
///
/// The offset must be `-1` or `+1` and the link must not be empty. Finding a
/// balance outside `-2..=2` means the tree was unbalanced before the call.
pub(crate) fn rebalance<K, V>(
    allocator: &mut Allocator<K, V>,
    link: &mut u32,
    offset: i8,
    insert: bool,
) -> bool {
    assert!(
        offset == -1 || offset == 1,
        "illegal offset {offset} while rebalancing"
    );
    assert!(*link != SENTINEL, "cannot rebalance an empty subtree");

    let p = *link;
    let balance = allocator.node(p).balance + offset;
    allocator.node_mut(p).balance = balance;

    match balance {
        // On insert the grown side caught up with the other one; on remove
        // the taller side shrank, so the subtree is lower now.
        0 => !insert,
        // On insert one of two equal sides grew; on remove one of two equal
        // sides shrank and the other one keeps the height.
        -1 | 1 => insert,
        -2 | 2 => {
            let heavy = Register::heavy(balance);
            let light = heavy.opposite();
            let sign = balance.signum();

            let q = allocator.node(p).get_register(heavy);
            let q_balance = allocator.node(q).balance;

            // a zero balance on the heavy child only happens on remove
            if q_balance == 0 || q_balance.signum() == sign {
                trace!("single rotation: node {q} replaces node {p}");

                let inner = allocator.node(q).get_register(light);

                let node = allocator.node_mut(p);
                node.balance = if q_balance == 0 { sign } else { 0 };
                node.set_register(heavy, inner);

                let node = allocator.node_mut(q);
                node.balance = if q_balance == 0 { -sign } else { 0 };
                node.set_register(light, p);

                *link = q;

                (q_balance == 0) == insert
            } else {
                let r = allocator.node(q).get_register(light);

                trace!("double rotation: node {r} replaces node {p}");

                let r_node = allocator.node(r);
                let r_balance = r_node.balance;
                let r_light = r_node.get_register(light);
                let r_heavy = r_node.get_register(heavy);

                let node = allocator.node_mut(p);
                node.balance = if r_balance == sign { -sign } else { 0 };
                node.set_register(heavy, r_light);

                let node = allocator.node_mut(q);
                node.balance = if r_balance == -sign { sign } else { 0 };
                node.set_register(light, r_heavy);

                let node = allocator.node_mut(r);
                node.balance = 0;
                node.set_register(light, p);
                node.set_register(heavy, q);

                *link = r;

                !insert
            }
        }
        _ => panic!("irregular balance {balance} at node {p}"),
    }
}

/// Inserts `key` in the subtree at `link`.
///
/// The index of the new node is written to `inserted`. Returns `true` while
/// the height change of the subtree continues upward.
pub(crate) fn insert<K: Ord, V: Default>(
    allocator: &mut Allocator<K, V>,
    link: &mut u32,
    key: K,
    inserted: &mut u32,
) -> Result<bool, TreeError> {
    if *link == SENTINEL {
        *link = allocator.add(Node::new(key));
        *inserted = *link;
        // a new leaf always grows its subtree
        return Ok(true);
    }

    let (register, offset) = match key.cmp(&allocator.node(*link).key) {
        Ordering::Less => (Register::Smaller, -1),
        Ordering::Greater => (Register::Greater, 1),
        Ordering::Equal => return Err(TreeError::DuplicateKey),
    };

    let mut child = allocator.node(*link).get_register(register);
    let grown = insert(allocator, &mut child, key, inserted)?;
    allocator.node_mut(*link).set_register(register, child);

    Ok(grown && rebalance(allocator, link, offset, true))
}

/// Removes `key` from the subtree at `link`.
///
/// The payload of the removed node is moved into `removed`. Returns `true`
/// while the height change of the subtree continues upward.
pub(crate) fn remove<K: Ord, V>(
    allocator: &mut Allocator<K, V>,
    link: &mut u32,
    key: &K,
    removed: &mut Option<V>,
) -> Result<bool, TreeError> {
    if *link == SENTINEL {
        return Err(TreeError::KeyNotFound);
    }

    let p = *link;
    let smaller = allocator.node(p).get_register(Register::Smaller);
    let greater = allocator.node(p).get_register(Register::Greater);

    let (register, offset) = match key.cmp(&allocator.node(p).key) {
        Ordering::Less => (Register::Smaller, 1),
        Ordering::Greater => (Register::Greater, -1),
        Ordering::Equal if smaller == SENTINEL || greater == SENTINEL => {
            *link = if greater == SENTINEL { smaller } else { greater };
            *removed = Some(allocator.remove(p).into_value());
            return Ok(true);
        }
        Ordering::Equal => {
            // The payload is attached to the node, so instead of copying the
            // successor's key into `p` the two nodes trade places: links and
            // balances are exchanged and `p` ends up with at most one child.
            let mut q = greater;
            let mut r = p;

            while allocator.node(q).get_register(Register::Smaller) != SENTINEL {
                r = q;
                q = allocator.node(q).get_register(Register::Smaller);
            }

            if r != p {
                allocator.node_mut(r).set_register(Register::Smaller, p);
            } else {
                allocator.node_mut(r).set_register(Register::Greater, p);
            }

            let p_node = allocator.node(p);
            let p_state = (p_node.registers, p_node.balance);
            let q_node = allocator.node(q);
            let q_state = (q_node.registers, q_node.balance);

            let node = allocator.node_mut(p);
            (node.registers, node.balance) = q_state;
            let node = allocator.node_mut(q);
            (node.registers, node.balance) = p_state;

            *link = q;

            (Register::Greater, -1)
        }
    };

    let mut child = allocator.node(*link).get_register(register);
    let shrunk = remove(allocator, &mut child, key, removed)?;
    allocator.node_mut(*link).set_register(register, child);

    Ok(shrunk && rebalance(allocator, link, offset, false))
}

/// Computes the real height of the subtree rooted at `index`, verifying the
/// AVL rule and the stored balance of every node on the way.
pub(crate) fn calc_height<K, V>(allocator: &Allocator<K, V>, index: u32) -> Result<usize, TreeError> {
    if index == SENTINEL {
        return Ok(0);
    }

    let node = allocator.node(index);
    let smaller = calc_height(allocator, node.get_register(Register::Smaller))?;
    let greater = calc_height(allocator, node.get_register(Register::Greater))?;

    if smaller.abs_diff(greater) > 1 {
        return Err(TreeError::NotAvl { smaller, greater });
    }

    let measured = greater as isize - smaller as isize;

    if measured != node.balance as isize {
        return Err(TreeError::BalanceMismatch {
            stored: node.balance,
            measured,
        });
    }

    Ok(max(smaller, greater) + 1)
}
