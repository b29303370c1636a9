#![warn(missing_docs)]
//! Prioritized experience replay for reinforcement learning.
//!
//! The crate provides a fixed-capacity buffer of transition records which is
//! sampled with probability proportional to `priority^alpha`. Priorities live
//! in two segment trees, a sum tree for drawing samples by prefix-sum
//! inversion and a min tree for normalizing importance sampling weights, so
//! inserting, sampling and updating priorities take logarithmic time per
//! record.
//!
//! * [`PrioritizedReplay`] - the buffer
//! * [`SharedReplay`] - a handle sharing a buffer between threads
//! * [`InsertProxy`] and [`spawn_insert_worker`] - feeding a shared buffer
//!   from actor threads over a channel
//! * [`segment_tree`] - the underlying segment trees
pub mod error;
pub mod segment_tree;

mod base;
pub use base::{ExperienceBufferBase, ReplayBufferBase};

mod prioritized_replay;
pub use prioritized_replay::{
    BetaSchedule, FieldSpec, PrioritizedReplay, PrioritizedReplayConfig, Records,
    RingRecordStore, SampledBatch, NEXT_STATES, STATES, TERMINALS,
};

mod shared;
pub use shared::SharedReplay;

mod proxy;
pub use proxy::{spawn_insert_worker, InsertMessage, InsertProxy, InsertProxyConfig};
