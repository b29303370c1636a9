//! Errors in the library.
use thiserror::Error;

/// Errors raised by the replay memory and its segment trees.
///
/// Every variant is a contract violation detected before any structure is
/// mutated, so a failed call leaves the buffer exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// Invalid construction parameters, e.g., `alpha <= 0` or zero capacity.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A batch of records does not match the configured fields.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// An index outside of the valid slot range.
    #[error("Index {index} is out of range (bound {bound})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,

        /// Exclusive upper bound of valid indices.
        bound: usize,
    },

    /// Sampling from a buffer into which nothing has been inserted.
    #[error("Sampling from an empty buffer")]
    EmptyBuffer,

    /// Total priority mass is zero or not finite.
    #[error("Degenerate priority mass: {0}")]
    DegeneratePriority(f32),

    /// A prefix-sum target outside of `[0, total)`.
    #[error("Prefix sum target {target} is outside of [0, {total})")]
    PrefixSumOutOfRange {
        /// The requested target.
        target: f32,

        /// Total mass of the tree.
        total: f32,
    },

    /// A caller-supplied draw outside of `[0, 1)`.
    #[error("Uniform draw {0} is outside of [0, 1)")]
    InvalidUniform(f32),

    /// The numbers of indices and priorities differ.
    #[error("Got {indices} indices but {priorities} priorities")]
    LengthMismatch {
        /// Number of indices.
        indices: usize,

        /// Number of priorities.
        priorities: usize,
    },

    /// A priority which is not a finite positive number, or whose
    /// exponentiated weight is zero or too large to be summed.
    #[error("Invalid priority {priority} for index {index}")]
    InvalidPriority {
        /// Index the priority was given for.
        index: usize,

        /// The rejected priority.
        priority: f32,
    },

    /// The lock guarding a shared buffer was poisoned by a panicking thread.
    #[error("Lock of the shared replay buffer is poisoned")]
    LockPoisoned,

    /// The receiving side of an insert channel is gone.
    #[error("Insert worker is disconnected")]
    Disconnected,
}
