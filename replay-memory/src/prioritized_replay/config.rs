//! Configuration of [`PrioritizedReplay`](super::PrioritizedReplay).
//!
//! The configuration can be built in code with builder-style setters or read
//! from a YAML file.
use super::{
    records::{FieldSpec, STATES, TERMINALS},
    BetaSchedule,
};
use crate::error::MemoryError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PrioritizedReplay`](super::PrioritizedReplay).
///
/// # Examples
///
/// ```rust
/// use replay_memory::{BetaSchedule, FieldSpec, PrioritizedReplayConfig};
///
/// let config = PrioritizedReplayConfig::default()
///     .capacity(50_000)
///     .alpha(0.6)
///     .beta(0.4)
///     .beta_schedule(Some(BetaSchedule::new(1.0, 100_000)))
///     .fields(vec![
///         FieldSpec::new("states/position", 3),
///         FieldSpec::new("states/velocity", 3),
///         FieldSpec::scalar("actions"),
///         FieldSpec::scalar("rewards"),
///         FieldSpec::scalar("terminals"),
///     ]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PrioritizedReplayConfig {
    /// Maximum number of records. When the buffer is full, new records
    /// replace the oldest ones.
    pub capacity: usize,

    /// Exponent applied to priorities. Must be positive.
    pub alpha: f32,

    /// Initial exponent of importance sampling weights. `0` disables the
    /// correction.
    pub beta: f32,

    /// Optional annealing of `beta` over priority updates.
    pub beta_schedule: Option<BetaSchedule>,

    /// If `true`, sampled batches carry next states read from the following
    /// slot.
    pub next_states: bool,

    /// Random seed used for sampling.
    pub seed: u64,

    /// Flattened record fields. Must contain `terminals`.
    pub fields: Vec<FieldSpec>,
}

impl Default for PrioritizedReplayConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            alpha: 0.6,
            beta: 0.4,
            beta_schedule: None,
            next_states: true,
            seed: 42,
            fields: vec![
                FieldSpec::scalar(STATES),
                FieldSpec::scalar("actions"),
                FieldSpec::scalar("rewards"),
                FieldSpec::scalar(TERMINALS),
            ],
        }
    }
}

impl PrioritizedReplayConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the priority exponent.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the initial importance sampling exponent.
    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the annealing schedule of the importance sampling exponent.
    pub fn beta_schedule(mut self, beta_schedule: Option<BetaSchedule>) -> Self {
        self.beta_schedule = beta_schedule;
        self
    }

    /// Enables or disables next states in sampled batches.
    pub fn next_states(mut self, next_states: bool) -> Self {
        self.next_states = next_states;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the record fields.
    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Checks the exponents.
    ///
    /// The record schema is checked when the buffer is built.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(MemoryError::InvalidConfiguration(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        let betas = std::iter::once(self.beta).chain(self.beta_schedule.as_ref().map(|s| s.beta_final));
        for beta in betas {
            if !(beta >= 0.0 && beta.is_finite()) {
                return Err(MemoryError::InvalidConfiguration(format!(
                    "beta must be non-negative, got {}",
                    beta
                )));
            }
        }
        if self.capacity == 0 {
            return Err(MemoryError::InvalidConfiguration(
                "capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
