//! Thread-safe handle to a prioritized replay buffer.
use crate::{
    error::MemoryError,
    prioritized_replay::{PrioritizedReplay, PrioritizedReplayConfig, Records, SampledBatch},
    ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard};

/// A cloneable handle sharing one [`PrioritizedReplay`] between threads.
///
/// Every call takes the lock once, so an insert, a sample or an update is a
/// single critical section covering the ring store and both segment trees. A
/// sample never observes a slot whose record or priorities are half written.
#[derive(Clone)]
pub struct SharedReplay {
    inner: Arc<Mutex<PrioritizedReplay>>,
}

impl SharedReplay {
    /// Wraps a buffer.
    pub fn new(buffer: PrioritizedReplay) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PrioritizedReplay>, MemoryError> {
        self.inner.lock().map_err(|_| MemoryError::LockPoisoned)
    }

    /// See [`PrioritizedReplay::insert`].
    pub fn insert(&self, records: &Records) -> Result<(), MemoryError> {
        self.lock()?.insert(records)
    }

    /// See [`PrioritizedReplay::sample`].
    pub fn sample(&self, n: usize) -> Result<SampledBatch, MemoryError> {
        self.lock()?.sample(n)
    }

    /// See [`PrioritizedReplay::sample_with_uniforms`].
    pub fn sample_with_uniforms(&self, uniforms: &[f32]) -> Result<SampledBatch, MemoryError> {
        self.lock()?.sample_with_uniforms(uniforms)
    }

    /// See [`PrioritizedReplay::update`].
    pub fn update(&self, indices: &[usize], priorities: &[f32]) -> Result<(), MemoryError> {
        self.lock()?.update(indices, priorities)
    }

    /// Returns the number of records stored.
    pub fn len(&self) -> Result<usize, MemoryError> {
        Ok(self.lock()?.len())
    }

    /// Runs `f` on the buffer while holding the lock.
    pub fn with<T>(&self, f: impl FnOnce(&PrioritizedReplay) -> T) -> Result<T, MemoryError> {
        Ok(f(&*self.lock()?))
    }
}

impl ExperienceBufferBase for SharedReplay {
    type Item = Records;

    fn push(&mut self, records: Self::Item) -> Result<()> {
        Ok(self.insert(&records)?)
    }

    /// Returns `0` if the lock is poisoned.
    fn len(&self) -> usize {
        SharedReplay::len(self).unwrap_or_else(|e| {
            warn!("Reporting an empty buffer: {}", e);
            0
        })
    }
}

impl ReplayBufferBase for SharedReplay {
    type Config = PrioritizedReplayConfig;
    type Batch = SampledBatch;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(Self::new(PrioritizedReplay::build(config)?))
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        Ok(self.sample(size)?)
    }

    fn update_priority(&mut self, ixs: &[usize], priorities: &[f32]) -> Result<()> {
        Ok(self.update(ixs, priorities)?)
    }
}
