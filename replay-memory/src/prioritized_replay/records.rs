//! Flattened transition records.
//!
//! Structured observations are flattened by the caller into named leaf fields
//! before they reach the buffer. A batch of `n` records is a [`Records`]
//! value mapping every field name to `n * dim` values laid out row by row,
//! where `dim` is given by the field's [`FieldSpec`].
//!
//! State fields are named `states` or `states/<leaf>`. When next states are
//! enabled, sampled batches carry them under `next_states` and
//! `next_states/<leaf>` respectively.
use serde::{Deserialize, Serialize};
use std::collections::{btree_map::Iter, BTreeMap};

/// Name of the terminal flag field, required in every schema.
pub const TERMINALS: &str = "terminals";

/// Name of the state field, or prefix of flattened state leaves.
pub const STATES: &str = "states";

/// Counterpart of [`STATES`] in sampled batches.
pub const NEXT_STATES: &str = "next_states";

/// A flattened leaf field of the record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name of the field.
    pub name: String,

    /// Number of values per record.
    pub dim: usize,
}

impl FieldSpec {
    /// Creates a field holding `dim` values per record.
    pub fn new(name: impl Into<String>, dim: usize) -> Self {
        Self {
            name: name.into(),
            dim,
        }
    }

    /// Creates a field holding a single value per record.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, 1)
    }

    /// Returns `true` if the field is part of the state.
    pub fn is_state(&self) -> bool {
        is_state_key(&self.name)
    }
}

pub(crate) fn is_state_key(name: &str) -> bool {
    name == STATES || name.starts_with("states/")
}

/// Maps `states` to `next_states` and `states/<leaf>` to `next_states/<leaf>`.
pub(crate) fn next_state_key(name: &str) -> String {
    format!("{}{}", NEXT_STATES, &name[STATES.len()..])
}

/// A batch of records, keyed by field name.
///
/// ```rust
/// use replay_memory::Records;
///
/// let records = Records::new()
///     .with_field("states", vec![0.0, 0.1, 1.0, 1.1])
///     .with_field("actions", vec![0.0, 1.0])
///     .with_field("rewards", vec![1.0, -1.0])
///     .with_field("terminals", vec![0.0, 1.0]);
///
/// assert_eq!(records.get("rewards"), Some(&[1.0, -1.0][..]));
/// assert_eq!(records.row("states", 1, 2), Some(&[1.0, 1.1][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records(BTreeMap<String, Vec<f32>>);

impl Records {
    /// Creates an empty set of fields.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.insert(name, values);
        self
    }

    /// Inserts or replaces the values of a field.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f32>) {
        self.0.insert(name.into(), values);
    }

    /// Returns the values of a field.
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.0.get(name).map(|v| v.as_slice())
    }

    /// Returns the `i`-th row of a field with `dim` values per record.
    pub fn row(&self, name: &str, i: usize, dim: usize) -> Option<&[f32]> {
        self.get(name)?.get(i * dim..(i + 1) * dim)
    }

    /// Removes a field and returns its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<f32>> {
        self.0.remove(name)
    }

    /// Returns `true` if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns the number of fields.
    pub fn num_fields(&self) -> usize {
        self.0.len()
    }

    /// Iterates over fields and their values.
    pub fn iter(&self) -> Iter<'_, String, Vec<f32>> {
        self.0.iter()
    }
}

/// A batch drawn from a prioritized replay buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledBatch {
    /// Records at the sampled slots, including next states if enabled.
    pub records: Records,

    /// Sampled slot indices, to be passed back with new priorities.
    pub indices: Vec<usize>,

    /// Importance sampling weights in `(0, 1]`.
    pub weights: Vec<f32>,
}

impl SampledBatch {
    /// Returns the number of sampled records.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if no records were sampled.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Decomposes the batch into records, indices and weights.
    pub fn unpack(self) -> (Records, Vec<usize>, Vec<f32>) {
        (self.records, self.indices, self.weights)
    }
}
