//! Array-backed segment trees over priority values.
//!
//! A [`SegmentTree`] is a complete binary tree stored in a flat array of
//! `2 * capacity` nodes, where `capacity` is a power of two. Node `k` has
//! children `2k` and `2k + 1`, the root is node `1` and leaf `i` is stored at
//! node `capacity + i`. Node `0` is unused.
//!
//! The combine operator is injected as a type parameter implementing
//! [`Operation`], so the sum tree and the min tree used by the prioritized
//! replay buffer are two instantiations of the same structure:
//!
//! * [`SumTree`] - `+` with neutral element `0`, additionally supports
//!   [`SumTree::index_of_prefix_sum`] for priority-weighted sampling.
//! * [`MinTree`] - `min` with neutral element `+inf`.
//!
//! ```rust
//! use replay_memory::segment_tree::{SumTree, UpdateMode};
//!
//! let mut tree = SumTree::new(3);
//! tree.update(0, 1.0, UpdateMode::Replace).unwrap();
//! tree.update(1, 2.0, UpdateMode::Replace).unwrap();
//! tree.update(2, 3.0, UpdateMode::Replace).unwrap();
//!
//! assert_eq!(tree.len(), 4);
//! assert_eq!(tree.root_value(), 6.0);
//! assert_eq!(tree.reduce(1, 2).unwrap(), 5.0);
//! assert_eq!(tree.index_of_prefix_sum(2.5).unwrap(), 1);
//! ```
use crate::error::MemoryError;
use std::{fmt::Debug, marker::PhantomData};

/// An associative and commutative operator with a neutral element.
pub trait Operation {
    /// The identity element of [`Operation::combine`].
    fn neutral() -> f32;

    /// Combines two values.
    fn combine(a: f32, b: f32) -> f32;
}

/// Addition, neutral element `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum;

impl Operation for Sum {
    #[inline]
    fn neutral() -> f32 {
        0.0
    }

    #[inline]
    fn combine(a: f32, b: f32) -> f32 {
        a + b
    }
}

/// Minimum, neutral element `+inf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Min;

impl Operation for Min {
    #[inline]
    fn neutral() -> f32 {
        f32::INFINITY
    }

    #[inline]
    fn combine(a: f32, b: f32) -> f32 {
        a.min(b)
    }
}

/// How [`SegmentTree::update`] writes a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// The leaf is overwritten with the given value.
    Replace,

    /// The leaf becomes `combine(old_leaf, value)`.
    Accumulate,
}

/// Segment tree over `f32` values with the combine operator `O`.
#[derive(Clone)]
pub struct SegmentTree<O> {
    /// Number of leaves, a power of two.
    capacity: usize,

    /// `nodes[1]` is the root, leaves start at `nodes[capacity]`.
    nodes: Vec<f32>,

    phantom: PhantomData<O>,
}

/// Segment tree of sums.
pub type SumTree = SegmentTree<Sum>;

/// Segment tree of minimums.
pub type MinTree = SegmentTree<Min>;

impl<O: Operation> SegmentTree<O> {
    /// Creates a tree with at least `capacity` leaves, all set to the neutral
    /// element.
    ///
    /// The number of leaves is the smallest power of two `>= capacity`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            capacity,
            nodes: vec![O::neutral(); 2 * capacity],
            phantom: PhantomData,
        }
    }

    /// Returns the number of leaves.
    pub fn len(&self) -> usize {
        self.capacity
    }

    /// Returns the value of the root, i.e., the reduction over all leaves.
    #[inline]
    pub fn root_value(&self) -> f32 {
        self.nodes[1]
    }

    /// Returns the value of leaf `index`.
    pub fn leaf(&self, index: usize) -> Result<f32, MemoryError> {
        self.check_index(index)?;
        Ok(self.nodes[self.capacity + index])
    }

    /// Returns all leaves.
    pub fn leaves(&self) -> &[f32] {
        &self.nodes[self.capacity..]
    }

    /// Writes leaf `index` and recomputes its ancestors up to the root.
    pub fn update(&mut self, index: usize, value: f32, mode: UpdateMode) -> Result<(), MemoryError> {
        self.check_index(index)?;

        let mut ix = index + self.capacity;
        self.nodes[ix] = match mode {
            UpdateMode::Replace => value,
            UpdateMode::Accumulate => O::combine(self.nodes[ix], value),
        };

        ix /= 2;
        while ix >= 1 {
            self.nodes[ix] = O::combine(self.nodes[2 * ix], self.nodes[2 * ix + 1]);
            ix /= 2;
        }

        Ok(())
    }

    /// Returns the reduction over leaves `start..=limit`.
    ///
    /// Only the subtrees covering the range are visited. An empty range
    /// (`start > limit`) yields the neutral element.
    pub fn reduce(&self, start: usize, limit: usize) -> Result<f32, MemoryError> {
        self.check_index(limit)?;
        if start > limit {
            return Ok(O::neutral());
        }

        // Half-open range [lo, hi) over node positions.
        let mut lo = start + self.capacity;
        let mut hi = limit + self.capacity + 1;
        let mut acc_left = O::neutral();
        let mut acc_right = O::neutral();

        while lo < hi {
            if lo & 1 == 1 {
                acc_left = O::combine(acc_left, self.nodes[lo]);
                lo += 1;
            }
            if hi & 1 == 1 {
                hi -= 1;
                acc_right = O::combine(self.nodes[hi], acc_right);
            }
            lo /= 2;
            hi /= 2;
        }

        Ok(O::combine(acc_left, acc_right))
    }

    fn check_index(&self, index: usize) -> Result<(), MemoryError> {
        if index >= self.capacity {
            return Err(MemoryError::IndexOutOfRange {
                index,
                bound: self.capacity,
            });
        }
        Ok(())
    }
}

impl SegmentTree<Sum> {
    /// Finds the leaf at which the running sum of leaves first exceeds `target`.
    ///
    /// The returned index `i` satisfies `prefix(i - 1) <= target < prefix(i)`
    /// where `prefix(k)` is the sum of leaves `0..=k`. `target` must lie in
    /// `[0, root_value())`.
    pub fn index_of_prefix_sum(&self, target: f32) -> Result<usize, MemoryError> {
        let total = self.root_value();
        if !(total > 0.0 && total.is_finite()) {
            return Err(MemoryError::DegeneratePriority(total));
        }
        if !(target >= 0.0 && target < total) {
            return Err(MemoryError::PrefixSumOutOfRange { target, total });
        }

        let mut ix = 1;
        let mut target = target;
        while ix < self.capacity {
            let left = self.nodes[2 * ix];
            if target < left {
                ix = 2 * ix;
            } else {
                target -= left;
                ix = 2 * ix + 1;
            }
        }

        Ok(ix - self.capacity)
    }
}

impl<O> Debug for SegmentTree<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentTree")
            .field("capacity", &self.capacity)
            .field("leaves", &&self.nodes[self.capacity..])
            .finish()
    }
}
