//! Prioritized experience replay.
//!
//! This module provides a fixed-capacity replay buffer which samples stored
//! transitions with probability proportional to `priority^alpha` and returns
//! importance sampling weights correcting for the non-uniform draw.
//!
//! # Key Components
//!
//! - [`PrioritizedReplay`]: The buffer, combining a ring store and two segment trees
//! - [`RingRecordStore`]: Per-field circular arrays of records
//! - [`Records`]: A batch of flattened records keyed by field name
//! - [`PrioritizedReplayConfig`]: Configuration, loadable from YAML
//! - [`BetaSchedule`]: Optional annealing of the importance sampling exponent
//!
//! # Examples
//!
//! ```rust
//! use replay_memory::{PrioritizedReplay, PrioritizedReplayConfig, Records};
//!
//! let config = PrioritizedReplayConfig::default().capacity(1000).seed(1);
//! let mut buffer = PrioritizedReplay::build(&config).unwrap();
//!
//! buffer.insert(&Records::new()
//!     .with_field("states", vec![0.0, 1.0])
//!     .with_field("actions", vec![1.0, 0.0])
//!     .with_field("rewards", vec![0.0, 1.0])
//!     .with_field("terminals", vec![0.0, 1.0])).unwrap();
//!
//! let batch = buffer.sample(4).unwrap();
//! let td_errors = vec![0.3; batch.len()];
//! buffer.update(&batch.indices, &td_errors).unwrap();
//! ```
mod base;
mod beta_schedule;
mod config;
mod records;
mod ring_store;
pub use base::PrioritizedReplay;
pub use beta_schedule::BetaSchedule;
pub use config::PrioritizedReplayConfig;
pub use records::{FieldSpec, Records, SampledBatch, NEXT_STATES, STATES, TERMINALS};
pub use ring_store::RingRecordStore;
