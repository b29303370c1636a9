//! Scheduling the exponent of importance weight.
use serde::{Deserialize, Serialize};

/// Linear annealing of $\beta$ towards a final value.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BetaSchedule {
    /// Final value of $\beta$.
    pub beta_final: f32,

    /// Number of priority updates after which $\beta$ reaches `beta_final`.
    pub n_updates_final: usize,
}

impl BetaSchedule {
    /// Creates a schedule.
    pub fn new(beta_final: f32, n_updates_final: usize) -> Self {
        Self {
            beta_final,
            n_updates_final,
        }
    }
}

/// Scheduler of the exponent of importance weight.
///
/// Without a [`BetaSchedule`] the exponent stays at its initial value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BetaScheduler {
    beta_0: f32,
    beta_final: f32,
    n_updates_final: usize,
    n_updates: usize,
}

impl BetaScheduler {
    pub fn new(beta_0: f32, schedule: Option<&BetaSchedule>) -> Self {
        let (beta_final, n_updates_final) = match schedule {
            Some(s) => (s.beta_final, s.n_updates_final),
            None => (beta_0, 0),
        };
        Self {
            beta_0,
            beta_final,
            n_updates_final,
            n_updates: 0,
        }
    }

    /// Gets the current exponent of importance sampling weight.
    pub fn beta(&self) -> f32 {
        if self.n_updates >= self.n_updates_final {
            self.beta_final
        } else {
            let d = self.beta_final - self.beta_0;
            self.beta_0 + d * (self.n_updates as f32 / self.n_updates_final as f32)
        }
    }

    /// Counts a priority update.
    pub fn add_n_updates(&mut self) {
        self.n_updates += 1;
    }
}
