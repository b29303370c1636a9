//! Producer-side proxy feeding a shared buffer over a channel.
//!
//! Actors push records into an [`InsertProxy`], which collects `n_buffer`
//! batches and sends them as one [`InsertMessage`]. A worker thread started
//! with [`spawn_insert_worker`] drains the channel into a [`SharedReplay`].
//!
//! ```rust
//! use crossbeam_channel::unbounded;
//! use replay_memory::{
//!     spawn_insert_worker, ExperienceBufferBase, InsertProxy, InsertProxyConfig,
//!     PrioritizedReplay, PrioritizedReplayConfig, Records, SharedReplay,
//! };
//!
//! let buffer = SharedReplay::new(PrioritizedReplay::build(&PrioritizedReplayConfig::default()).unwrap());
//! let (sender, receiver) = unbounded();
//! let worker = spawn_insert_worker(buffer.clone(), receiver);
//!
//! let mut proxy = InsertProxy::build_with_sender(0, &InsertProxyConfig { n_buffer: 2 }, sender);
//! for k in 0..3 {
//!     proxy.push(Records::new()
//!         .with_field("states", vec![k as f32])
//!         .with_field("actions", vec![0.0])
//!         .with_field("rewards", vec![0.0])
//!         .with_field("terminals", vec![0.0])).unwrap();
//! }
//! proxy.flush().unwrap();
//! drop(proxy);
//!
//! assert_eq!(worker.join().unwrap().unwrap(), 3);
//! assert_eq!(buffer.len().unwrap(), 3);
//! ```
use crate::{error::MemoryError, prioritized_replay::Records, shared::SharedReplay, ExperienceBufferBase};
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::{error, trace, warn};
use std::thread::{self, JoinHandle};

/// Batches of records sent from a proxy to the insert worker.
pub struct InsertMessage {
    /// Id of the sending proxy.
    pub id: usize,

    /// Batches in the order they were pushed.
    pub batches: Vec<Records>,
}

/// Configuration of [`InsertProxy`].
#[derive(Clone, Debug)]
pub struct InsertProxyConfig {
    /// Number of batches buffered until sent to the worker.
    pub n_buffer: usize,
}

impl Default for InsertProxyConfig {
    fn default() -> Self {
        Self { n_buffer: 1 }
    }
}

/// A producer-side stand-in for a replay buffer.
pub struct InsertProxy {
    id: usize,

    /// Sender of [`InsertMessage`].
    sender: Sender<InsertMessage>,

    /// Number of batches buffered until sent to the worker.
    n_buffer: usize,

    /// Batches not sent yet.
    buffer: Vec<Records>,
}

impl InsertProxy {
    /// Creates a proxy sending to the given channel.
    pub fn build_with_sender(
        id: usize,
        config: &InsertProxyConfig,
        sender: Sender<InsertMessage>,
    ) -> Self {
        let n_buffer = config.n_buffer.max(1);
        Self {
            id,
            sender,
            n_buffer,
            buffer: Vec::with_capacity(n_buffer),
        }
    }

    /// Sends buffered batches, if any.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut batches = Vec::with_capacity(self.n_buffer);
        std::mem::swap(&mut self.buffer, &mut batches);
        let msg = InsertMessage {
            id: self.id,
            batches,
        };

        self.sender
            .send(msg)
            .map_err(|_| MemoryError::Disconnected)?;
        Ok(())
    }
}

impl ExperienceBufferBase for InsertProxy {
    type Item = Records;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.buffer.push(tr);
        if self.buffer.len() == self.n_buffer {
            self.flush()?;
        }
        Ok(())
    }

    /// Returns the number of batches not sent yet.
    fn len(&self) -> usize {
        self.buffer.len()
    }
}

/// Starts a thread inserting received batches into `buffer`.
///
/// The thread ends when every sender is dropped and yields the number of
/// batches inserted. Batches rejected by the buffer are logged and skipped.
/// A poisoned lock stops the thread with [`MemoryError::LockPoisoned`].
pub fn spawn_insert_worker(
    buffer: SharedReplay,
    receiver: Receiver<InsertMessage>,
) -> JoinHandle<Result<usize, MemoryError>> {
    thread::spawn(move || {
        let mut n_inserted = 0;
        for msg in receiver.iter() {
            trace!("Received {} batches from proxy {}", msg.batches.len(), msg.id);
            for batch in msg.batches.iter() {
                match buffer.insert(batch) {
                    Ok(()) => n_inserted += 1,
                    Err(MemoryError::LockPoisoned) => {
                        error!("Insert worker stopped after {} batches: lock poisoned", n_inserted);
                        return Err(MemoryError::LockPoisoned);
                    }
                    Err(e) => warn!("Dropped a batch from proxy {}: {}", msg.id, e),
                }
            }
        }
        Ok(n_inserted)
    })
}
