//! # Indexed Priority Queue
//!
//! Binary heap over validator addresses, ordered by a power function the
//! caller supplies on every operation. Powers live in the validator records,
//! not in the heap, so the same queue can be re-seated after a record changes.
//!
//! Positions are 1-based: the parent of `i` is `i >> 1`, its children are
//! `2i` and `2i + 1`. The slot arena and the address index are kept mutually
//! inverse.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use shared_types::{Address, U256};
use thiserror::Error;

/// Misuse of a priority queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityQueueError {
    /// `pop` or `root` on an empty queue.
    #[error("Priority queue is empty")]
    Empty,

    /// Address inserted twice.
    #[error("Address {0} already in queue")]
    AlreadyPresent(Address),

    /// Address not in the queue.
    #[error("Address {0} not in queue")]
    NotFound(Address),
}

/// Ordering of a heap: which power belongs nearer the root.
pub trait HeapOrder {
    /// True when the root holds the maximum power.
    const ROOT_IS_MAX: bool;

    /// Whether `a` must sit above `b`. Strict, so ties never swap.
    fn outranks(a: U256, b: U256) -> bool {
        if Self::ROOT_IS_MAX {
            a > b
        } else {
            a < b
        }
    }
}

/// Minimum at the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinOrder;

impl HeapOrder for MinOrder {
    const ROOT_IS_MAX: bool = false;
}

/// Maximum at the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxOrder;

impl HeapOrder for MaxOrder {
    const ROOT_IS_MAX: bool = true;
}

/// Indexed binary heap.
pub struct PriorityQueue<O: HeapOrder> {
    slots: Vec<Address>,
    positions: HashMap<Address, usize>,
    _order: PhantomData<O>,
}

/// Heap with the weakest validator at the root.
pub type MinPQ = PriorityQueue<MinOrder>;

/// Heap with the strongest validator at the root.
pub type MaxPQ = PriorityQueue<MaxOrder>;

impl<O: HeapOrder> Default for PriorityQueue<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: HeapOrder> Clone for PriorityQueue<O> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            positions: self.positions.clone(),
            _order: PhantomData,
        }
    }
}

impl<O: HeapOrder> fmt::Debug for PriorityQueue<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("root_is_max", &O::ROOT_IS_MAX)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<O: HeapOrder> PriorityQueue<O> {
    /// Empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            positions: HashMap::new(),
            _order: PhantomData,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the queue holds nobody.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `addr` is a member.
    pub fn contains(&self, addr: &Address) -> bool {
        self.positions.contains_key(addr)
    }

    /// 1-based position of `addr`.
    pub fn position(&self, addr: &Address) -> Option<usize> {
        self.positions.get(addr).copied()
    }

    /// Member at the root.
    pub fn root(&self) -> Option<Address> {
        self.slots.first().copied()
    }

    /// Root member with its power.
    pub fn root_with_power<F>(&self, power: F) -> Option<(Address, U256)>
    where
        F: Fn(&Address) -> U256,
    {
        self.root().map(|addr| (addr, power(&addr)))
    }

    /// Members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.slots.iter()
    }

    /// Add `addr` and swim it into place.
    pub fn insert<F>(&mut self, addr: Address, power: F) -> Result<(), PriorityQueueError>
    where
        F: Fn(&Address) -> U256,
    {
        if self.contains(&addr) {
            return Err(PriorityQueueError::AlreadyPresent(addr));
        }
        self.slots.push(addr);
        let pos = self.slots.len();
        self.positions.insert(addr, pos);
        self.swim(pos, &power);
        self.debug_check();
        Ok(())
    }

    /// Remove and return the root.
    pub fn pop<F>(&mut self, power: F) -> Result<Address, PriorityQueueError>
    where
        F: Fn(&Address) -> U256,
    {
        let root = self.root().ok_or(PriorityQueueError::Empty)?;
        let last = self.slots.len();
        self.exchange(1, last);
        self.remove_last();
        if !self.is_empty() {
            self.sink(1, &power);
        }
        self.debug_check();
        Ok(root)
    }

    /// Remove an arbitrary member.
    ///
    /// The element moved into the hole may belong above or below it, so the
    /// hole is both swum and sunk.
    pub fn delete_reheapify<F>(&mut self, addr: &Address, power: F) -> Result<(), PriorityQueueError>
    where
        F: Fn(&Address) -> U256,
    {
        let pos = self
            .position(addr)
            .ok_or(PriorityQueueError::NotFound(*addr))?;
        let last = self.slots.len();
        self.exchange(pos, last);
        self.remove_last();

        if pos <= self.slots.len() {
            let settled = self.swim(pos, &power);
            if settled == pos {
                self.sink(pos, &power);
            }
        }
        self.debug_check();
        Ok(())
    }

    /// Re-seat `addr` after its power grew.
    pub fn increase_reheapify<F>(&mut self, addr: &Address, power: F) -> Result<(), PriorityQueueError>
    where
        F: Fn(&Address) -> U256,
    {
        let pos = self
            .position(addr)
            .ok_or(PriorityQueueError::NotFound(*addr))?;
        if O::ROOT_IS_MAX {
            self.swim(pos, &power);
        } else {
            self.sink(pos, &power);
        }
        self.debug_check();
        Ok(())
    }

    /// Re-seat `addr` after its power shrank.
    pub fn decrease_reheapify<F>(&mut self, addr: &Address, power: F) -> Result<(), PriorityQueueError>
    where
        F: Fn(&Address) -> U256,
    {
        let pos = self
            .position(addr)
            .ok_or(PriorityQueueError::NotFound(*addr))?;
        if O::ROOT_IS_MAX {
            self.sink(pos, &power);
        } else {
            self.swim(pos, &power);
        }
        self.debug_check();
        Ok(())
    }

    // =========================================================================
    // HEAP PRIMITIVES
    // =========================================================================

    fn at(&self, pos: usize) -> &Address {
        &self.slots[pos - 1]
    }

    fn above<F: Fn(&Address) -> U256>(&self, a: usize, b: usize, power: &F) -> bool {
        O::outranks(power(self.at(a)), power(self.at(b)))
    }

    /// Move up while outranking the parent. Returns the final position.
    fn swim<F: Fn(&Address) -> U256>(&mut self, mut pos: usize, power: &F) -> usize {
        while pos > 1 && self.above(pos, pos >> 1, power) {
            self.exchange(pos, pos >> 1);
            pos >>= 1;
        }
        pos
    }

    /// Move down while a child outranks it.
    fn sink<F: Fn(&Address) -> U256>(&mut self, mut pos: usize, power: &F) {
        let len = self.slots.len();
        while 2 * pos <= len {
            let mut child = 2 * pos;
            if child < len && self.above(child + 1, child, power) {
                child += 1;
            }
            if !self.above(child, pos, power) {
                break;
            }
            self.exchange(pos, child);
            pos = child;
        }
    }

    fn exchange(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.slots.swap(a - 1, b - 1);
        let addr_a = self.slots[a - 1];
        let addr_b = self.slots[b - 1];
        self.positions.insert(addr_a, a);
        self.positions.insert(addr_b, b);
    }

    fn remove_last(&mut self) {
        if let Some(addr) = self.slots.pop() {
            self.positions.remove(&addr);
        }
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.slots.len(), self.positions.len());
        debug_assert!(self
            .slots
            .iter()
            .enumerate()
            .all(|(i, addr)| self.positions.get(addr) == Some(&(i + 1))));
    }
}
