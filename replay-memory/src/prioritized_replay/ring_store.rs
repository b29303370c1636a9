//! Fixed-capacity circular storage of records.
use super::records::{is_state_key, next_state_key, FieldSpec, Records, NEXT_STATES, TERMINALS};
use crate::error::MemoryError;
use std::collections::{BTreeMap, HashSet};

/// Per-field circular arrays sharing one slot index space.
///
/// Slot `i` of every field belongs to the same transition. Writes advance a
/// cursor modulo the capacity, so once the store is full the oldest slots are
/// overwritten. Next states are not stored; they are read from the state
/// fields of slot `(i + 1) % capacity`.
#[derive(Debug, Clone)]
pub struct RingRecordStore {
    capacity: usize,

    /// Next slot to be written.
    cursor: usize,

    /// Number of slots written at least once.
    size: usize,

    schema: Vec<FieldSpec>,

    /// `capacity * dim` values per field.
    fields: BTreeMap<String, Vec<f32>>,

    next_states: bool,
}

impl RingRecordStore {
    /// Allocates storage for `capacity` records of the given schema.
    pub fn new(
        capacity: usize,
        schema: Vec<FieldSpec>,
        next_states: bool,
    ) -> Result<Self, MemoryError> {
        validate_schema(capacity, &schema, next_states)?;

        let fields = schema
            .iter()
            .map(|f| (f.name.clone(), vec![0f32; capacity * f.dim]))
            .collect();

        Ok(Self {
            capacity,
            cursor: 0,
            size: 0,
            schema,
            fields,
            next_states,
        })
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the next slot to be written.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of slots written at least once.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the field schema.
    pub fn schema(&self) -> &[FieldSpec] {
        &self.schema
    }

    /// Returns `true` if sampled batches carry next states.
    pub fn next_states(&self) -> bool {
        self.next_states
    }

    /// Checks `records` against the schema and returns the batch length.
    pub fn batch_len(&self, records: &Records) -> Result<usize, MemoryError> {
        if records.num_fields() != self.schema.len() {
            return Err(MemoryError::SchemaMismatch(format!(
                "expected fields {:?}, got {:?}",
                self.schema.iter().map(|f| &f.name).collect::<Vec<_>>(),
                records.keys().collect::<Vec<_>>()
            )));
        }

        let mut len = None;
        for f in self.schema.iter() {
            let values = records.get(&f.name).ok_or_else(|| {
                MemoryError::SchemaMismatch(format!("missing field {:?}", f.name))
            })?;
            if values.len() % f.dim != 0 {
                return Err(MemoryError::SchemaMismatch(format!(
                    "field {:?} has {} values, not a multiple of dim {}",
                    f.name,
                    values.len(),
                    f.dim
                )));
            }
            let n = values.len() / f.dim;
            match len {
                None => len = Some(n),
                Some(m) if m != n => {
                    return Err(MemoryError::SchemaMismatch(format!(
                        "field {:?} has {} records, expected {}",
                        f.name, n, m
                    )));
                }
                _ => {}
            }
        }

        Ok(len.unwrap_or(0))
    }

    /// Writes a batch at the cursor and returns the slots written, in order.
    ///
    /// A batch longer than the capacity wraps around, so its last `capacity`
    /// records are the ones kept.
    pub fn insert(&mut self, records: &Records) -> Result<Vec<usize>, MemoryError> {
        let n = self.batch_len(records)?;
        let i = self.cursor;

        for f in self.schema.iter() {
            if let (Some(src), Some(dst)) = (records.get(&f.name), self.fields.get_mut(&f.name)) {
                push_rows(dst, src, i, f.dim, self.capacity);
            }
        }

        let write_indices = (0..n).map(|j| (i + j) % self.capacity).collect();
        self.cursor = (i + n) % self.capacity;
        self.size = (self.size + n).min(self.capacity);

        Ok(write_indices)
    }

    /// Gathers the records at `indices`, which need not be contiguous.
    ///
    /// With next states enabled, state fields of slot `(i + 1) % capacity`
    /// are added under the `next_states` keys. That slot is not checked
    /// against the write boundary: for the most recently written slot it
    /// holds an older transition, which consumers mask with the terminal flag.
    pub fn read(&self, indices: &[usize]) -> Result<Records, MemoryError> {
        if let Some(&index) = indices.iter().find(|&&ix| ix >= self.capacity) {
            return Err(MemoryError::IndexOutOfRange {
                index,
                bound: self.capacity,
            });
        }

        let mut records = Records::new();
        for f in self.schema.iter() {
            let values = &self.fields[&f.name];
            records.insert(f.name.clone(), gather_rows(values, indices.iter().cloned(), f.dim));

            if self.next_states && f.is_state() {
                let next_indices = indices.iter().map(|ix| (ix + 1) % self.capacity);
                records.insert(next_state_key(&f.name), gather_rows(values, next_indices, f.dim));
            }
        }

        Ok(records)
    }
}

#[inline]
fn push_rows(dst: &mut [f32], src: &[f32], i: usize, dim: usize, capacity: usize) {
    let mut j = i;
    for row in src.chunks(dim) {
        dst[j * dim..(j + 1) * dim].copy_from_slice(row);
        j += 1;
        if j == capacity {
            j = 0;
        }
    }
}

fn gather_rows(values: &[f32], ixs: impl Iterator<Item = usize>, dim: usize) -> Vec<f32> {
    ixs.flat_map(|ix| values[ix * dim..(ix + 1) * dim].iter().cloned())
        .collect()
}

fn validate_schema(
    capacity: usize,
    schema: &[FieldSpec],
    next_states: bool,
) -> Result<(), MemoryError> {
    let invalid = |msg: String| Err(MemoryError::InvalidConfiguration(msg));

    if capacity == 0 {
        return invalid("capacity must be positive".into());
    }
    if schema.is_empty() {
        return invalid("record schema has no fields".into());
    }

    let mut names = HashSet::new();
    for f in schema.iter() {
        if f.dim == 0 {
            return invalid(format!("field {:?} has zero dim", f.name));
        }
        if f.name == NEXT_STATES || f.name.starts_with("next_states/") {
            return invalid(format!("field {:?} collides with derived next states", f.name));
        }
        if !names.insert(f.name.as_str()) {
            return invalid(format!("duplicate field {:?}", f.name));
        }
    }

    if !names.contains(TERMINALS) {
        return invalid(format!("record schema must contain {:?}", TERMINALS));
    }
    if next_states && !names.iter().any(|name| is_state_key(name)) {
        return invalid("next states require a state field".into());
    }

    Ok(())
}
