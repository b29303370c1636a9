//! Prioritized replay buffer.
use super::{
    beta_schedule::BetaScheduler,
    records::{FieldSpec, Records, SampledBatch},
    ring_store::RingRecordStore,
    PrioritizedReplayConfig,
};
use crate::{
    error::MemoryError,
    segment_tree::{MinTree, SumTree, UpdateMode},
    ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;
use log::{debug, log_enabled, trace, Level::Trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A fixed-capacity replay buffer with priority-weighted sampling.
///
/// Records live in a [`RingRecordStore`]; slot `i` of the store and leaf `i`
/// of both segment trees describe the same transition. Leaf `i` holds
/// `priority(i)^alpha`, or the neutral element if slot `i` was never written.
///
/// ```mermaid
/// graph LR
///     Producer -- insert --> Ring[RingRecordStore]
///     Ring -- max_priority^alpha --> Trees[Sum/Min trees]
///     Trainer -- sample --> Trees
///     Trees -- indices, weights --> Ring
///     Trainer -- update --> Trees
/// ```
///
/// * `insert` writes a batch into the ring and seeds every written slot with
///   the running maximum priority, so new records are sampled at least once
///   before they are scored.
/// * `sample` draws slots proportionally to `priority^alpha` by prefix-sum
///   inversion on the sum tree and computes importance weights
///   `(N * P(i))^-beta / max_j (N * P(j))^-beta` using the min tree.
/// * `update` replaces the priorities of sampled slots.
///
/// Every operation validates its arguments before mutating anything.
///
/// # Examples
///
/// ```rust
/// use replay_memory::{FieldSpec, PrioritizedReplay, Records};
///
/// let fields = vec![
///     FieldSpec::scalar("states"),
///     FieldSpec::scalar("rewards"),
///     FieldSpec::scalar("terminals"),
/// ];
/// let mut buffer = PrioritizedReplay::new(4, 1.0, 0.5, true, fields).unwrap();
///
/// buffer.insert(&Records::new()
///     .with_field("states", vec![0.0, 1.0, 2.0])
///     .with_field("rewards", vec![0.0, 0.0, 1.0])
///     .with_field("terminals", vec![0.0, 0.0, 1.0])).unwrap();
///
/// let batch = buffer.sample(2).unwrap();
/// assert!(batch.weights.iter().all(|&w| w > 0.0 && w <= 1.0));
///
/// buffer.update(&batch.indices, &[0.5, 2.0]).unwrap();
/// assert_eq!(buffer.max_priority(), 2.0);
/// ```
pub struct PrioritizedReplay {
    store: RingRecordStore,

    sum_tree: SumTree,

    min_tree: MinTree,

    /// Priority exponent.
    alpha: f32,

    beta: BetaScheduler,

    /// Running maximum of raw priorities, seed of newly inserted slots.
    max_priority: f32,

    rng: StdRng,
}

impl PrioritizedReplay {
    /// Creates a buffer of `capacity` records with the given fields.
    ///
    /// Fails if `alpha <= 0`, `beta < 0`, `capacity == 0` or the fields do not
    /// form a valid schema.
    pub fn new(
        capacity: usize,
        alpha: f32,
        beta: f32,
        next_states: bool,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, MemoryError> {
        let config = PrioritizedReplayConfig::default()
            .capacity(capacity)
            .alpha(alpha)
            .beta(beta)
            .next_states(next_states)
            .fields(fields);
        Self::build(&config)
    }

    /// Creates a buffer from a configuration.
    pub fn build(config: &PrioritizedReplayConfig) -> Result<Self, MemoryError> {
        config.validate()?;
        let store = RingRecordStore::new(config.capacity, config.fields.clone(), config.next_states)?;
        let sum_tree = SumTree::new(config.capacity);
        let min_tree = MinTree::new(config.capacity);

        debug!(
            "Prioritized replay: capacity={}, priority capacity={}, alpha={}, beta={}",
            config.capacity,
            sum_tree.len(),
            config.alpha,
            config.beta
        );

        Ok(Self {
            store,
            sum_tree,
            min_tree,
            alpha: config.alpha,
            beta: BetaScheduler::new(config.beta, config.beta_schedule.as_ref()),
            max_priority: 1.0,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Appends a batch of records.
    ///
    /// Each written slot gets the weight `max_priority^alpha` in both trees.
    pub fn insert(&mut self, records: &Records) -> Result<(), MemoryError> {
        let write_indices = self.store.insert(records)?;
        let weight = self.max_priority.powf(self.alpha);

        for &ix in write_indices.iter() {
            self.sum_tree.update(ix, weight, UpdateMode::Replace)?;
            self.min_tree.update(ix, weight, UpdateMode::Replace)?;
        }

        trace!(
            "Inserted {} records, cursor={}, size={}",
            write_indices.len(),
            self.store.cursor(),
            self.store.len()
        );

        Ok(())
    }

    /// Draws `n` records with probability proportional to `priority^alpha`.
    pub fn sample(&mut self, n: usize) -> Result<SampledBatch, MemoryError> {
        self.total_mass()?;
        let rng = &mut self.rng;
        let uniforms = (0..n).map(|_| rng.gen::<f32>()).collect::<Vec<_>>();
        self.sample_with_uniforms(&uniforms)
    }

    /// Samples with caller-supplied draws, each in `[0, 1)`.
    ///
    /// Draw `u` selects the slot at which the running sum of priority weights
    /// first exceeds `u` times the total mass.
    pub fn sample_with_uniforms(&self, uniforms: &[f32]) -> Result<SampledBatch, MemoryError> {
        let total_mass = self.total_mass()?;
        if let Some(&u) = uniforms.iter().find(|&&u| !(u >= 0.0 && u < 1.0)) {
            return Err(MemoryError::InvalidUniform(u));
        }

        let size = self.store.len();
        // `total_mass` and the root are summed in different orders.
        let bound = self.sum_tree.root_value() * (1.0 - f32::EPSILON);
        let indices = uniforms
            .iter()
            .map(|u| {
                let target = (u * total_mass).min(bound);
                // Rounding may land on a zero-weight padding leaf.
                Ok(self.sum_tree.index_of_prefix_sum(target)?.min(size - 1))
            })
            .collect::<Result<Vec<_>, MemoryError>>()?;

        let weights = self.importance_weights(&indices)?;
        let records = self.store.read(&indices)?;

        trace!("Sampled indices {:?}", indices);
        if log_enabled!(Trace) {
            trace!("Sum tree leaves {:?}", self.sum_tree.leaves());
        }

        Ok(SampledBatch {
            records,
            indices,
            weights,
        })
    }

    /// Replaces the priorities of the given slots.
    ///
    /// Priorities must be finite and positive, and so must `priority^alpha`.
    /// It is also bounded so that the total mass of all leaves stays finite.
    /// The running maximum priority becomes the maximum of its previous value
    /// and the new priorities.
    pub fn update(&mut self, indices: &[usize], priorities: &[f32]) -> Result<(), MemoryError> {
        if indices.len() != priorities.len() {
            return Err(MemoryError::LengthMismatch {
                indices: indices.len(),
                priorities: priorities.len(),
            });
        }
        let capacity = self.store.capacity();
        for (&index, &priority) in indices.iter().zip(priorities.iter()) {
            if index >= capacity {
                return Err(MemoryError::IndexOutOfRange {
                    index,
                    bound: capacity,
                });
            }
            let scored = priority.powf(self.alpha);
            if !(priority > 0.0
                && priority.is_finite()
                && scored >= f32::MIN_POSITIVE
                && scored <= self.max_leaf_weight())
            {
                return Err(MemoryError::InvalidPriority { index, priority });
            }
        }

        for (&index, &priority) in indices.iter().zip(priorities.iter()) {
            let scored = priority.powf(self.alpha);
            self.sum_tree.update(index, scored, UpdateMode::Replace)?;
            self.min_tree.update(index, scored, UpdateMode::Replace)?;
            self.max_priority = self.max_priority.max(priority);
        }
        self.beta.add_n_updates();

        trace!(
            "Updated {} priorities, max priority={}",
            indices.len(),
            self.max_priority
        );

        Ok(())
    }

    /// Returns the number of records stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the maximum number of records.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Returns the next slot to be overwritten.
    pub fn cursor(&self) -> usize {
        self.store.cursor()
    }

    /// Returns the number of leaves of the segment trees.
    pub fn priority_capacity(&self) -> usize {
        self.sum_tree.len()
    }

    /// Returns the priority exponent.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the importance sampling exponent used by the next sample.
    pub fn current_beta(&self) -> f32 {
        self.beta.beta()
    }

    /// Returns the running maximum of raw priorities.
    pub fn max_priority(&self) -> f32 {
        self.max_priority
    }

    /// Returns the sum tree of priority weights.
    pub fn sum_tree(&self) -> &SumTree {
        &self.sum_tree
    }

    /// Returns the min tree of priority weights.
    pub fn min_tree(&self) -> &MinTree {
        &self.min_tree
    }

    /// Returns the record fields.
    pub fn schema(&self) -> &[FieldSpec] {
        self.store.schema()
    }

    /// Sum of the weights of stored slots.
    fn total_mass(&self) -> Result<f32, MemoryError> {
        let size = self.store.len();
        if size == 0 {
            return Err(MemoryError::EmptyBuffer);
        }
        let total_mass = self.sum_tree.reduce(0, size - 1)?;
        if !(total_mass > 0.0 && total_mass.is_finite()) {
            return Err(MemoryError::DegeneratePriority(total_mass));
        }
        Ok(total_mass)
    }

    /// Upper bound of a leaf weight. Keeps the sum of all leaves finite.
    fn max_leaf_weight(&self) -> f32 {
        f32::MAX / (2 * self.sum_tree.len()) as f32
    }

    /// `(N * P(i))^-beta / (N * P_min)^-beta`, computed as `(w_min / w_i)^beta`
    /// so that the probabilities never underflow.
    fn importance_weights(&self, indices: &[usize]) -> Result<Vec<f32>, MemoryError> {
        let beta = self.beta.beta();
        let min_weight = self.min_tree.root_value();

        indices
            .iter()
            .map(|&ix| {
                let weight = (min_weight / self.sum_tree.leaf(ix)?).powf(beta);
                // The ratio underflows for priorities far apart.
                Ok(weight.max(f32::MIN_POSITIVE).min(1.0))
            })
            .collect()
    }
}

impl ExperienceBufferBase for PrioritizedReplay {
    type Item = Records;

    fn push(&mut self, records: Self::Item) -> Result<()> {
        Ok(self.insert(&records)?)
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}

impl ReplayBufferBase for PrioritizedReplay {
    type Config = PrioritizedReplayConfig;
    type Batch = SampledBatch;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(PrioritizedReplay::build(config)?)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        Ok(self.sample(size)?)
    }

    fn update_priority(&mut self, ixs: &[usize], priorities: &[f32]) -> Result<()> {
        Ok(self.update(ixs, priorities)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prioritized_replay::{records::TERMINALS, BetaSchedule};
    use test_log::test;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("states", 2),
            FieldSpec::scalar("actions"),
            FieldSpec::scalar("rewards"),
            FieldSpec::scalar(TERMINALS),
        ]
    }

    fn records(start: usize, n: usize) -> Records {
        let ids = (start..start + n).map(|k| k as f32).collect::<Vec<_>>();
        Records::new()
            .with_field("states", ids.iter().flat_map(|&k| vec![k, -k]).collect())
            .with_field("actions", ids.iter().map(|k| k + 100.0).collect())
            .with_field("rewards", ids.iter().map(|k| k * 0.5).collect())
            .with_field(TERMINALS, vec![0.0; n])
    }

    fn buffer(capacity: usize, alpha: f32, beta: f32) -> PrioritizedReplay {
        PrioritizedReplay::new(capacity, alpha, beta, true, fields()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_alpha() {
        for &alpha in [0.0f32, -0.5].iter() {
            assert!(matches!(
                PrioritizedReplay::new(4, alpha, 0.0, true, fields()),
                Err(MemoryError::InvalidConfiguration(_))
            ));
        }
        assert!(matches!(
            PrioritizedReplay::new(0, 1.0, 0.0, true, fields()),
            Err(MemoryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_priority_capacity() {
        assert_eq!(buffer(4, 1.0, 0.0).priority_capacity(), 4);
        assert_eq!(buffer(5, 1.0, 0.0).priority_capacity(), 8);
        assert_eq!(buffer(1, 1.0, 0.0).priority_capacity(), 1);
    }

    #[test]
    fn test_insert_seeds_max_priority() {
        let mut b = buffer(6, 0.5, 0.0);
        b.insert(&records(0, 2)).unwrap();
        assert_eq!(b.sum_tree().root_value(), 2.0);

        b.update(&[0, 1], &[4.0, 9.0]).unwrap();
        assert_eq!(b.max_priority(), 9.0);
        assert_eq!(b.sum_tree().leaves()[..2], [2.0, 3.0]);

        // New slots get 9^0.5.
        b.insert(&records(2, 2)).unwrap();
        assert_eq!(b.sum_tree().leaves()[..4], [2.0, 3.0, 3.0, 3.0]);
        assert_eq!(b.min_tree().root_value(), 2.0);
        assert_eq!(b.sum_tree().root_value(), 11.0);

        // Padding leaves stay neutral.
        assert!(b.sum_tree().leaves()[6..].iter().all(|&v| v == 0.0));
        assert!(b.min_tree().leaves()[4..].iter().all(|&v| v == f32::INFINITY));
    }

    #[test]
    fn test_sample_empty_buffer() {
        let mut b = buffer(4, 1.0, 0.4);
        assert_eq!(b.sample(1), Err(MemoryError::EmptyBuffer));
        assert_eq!(b.sample_with_uniforms(&[0.5]), Err(MemoryError::EmptyBuffer));
    }

    #[test]
    fn test_sample_rejects_out_of_range_draws() {
        let mut b = buffer(4, 1.0, 0.4);
        b.insert(&records(0, 2)).unwrap();
        assert_eq!(b.sample_with_uniforms(&[0.5, 1.0]), Err(MemoryError::InvalidUniform(1.0)));
        assert_eq!(b.sample_with_uniforms(&[-0.1]), Err(MemoryError::InvalidUniform(-0.1)));
        assert!(matches!(
            b.sample_with_uniforms(&[f32::NAN]),
            Err(MemoryError::InvalidUniform(u)) if u.is_nan()
        ));
    }

    #[test]
    fn test_sample_only_written_slots() {
        let mut b = buffer(8, 1.0, 0.4);
        b.insert(&records(0, 3)).unwrap();
        let batch = b.sample(200).unwrap();
        assert_eq!(batch.len(), 200);
        assert!(batch.indices.iter().all(|&ix| ix < 3));

        let edge = b.sample_with_uniforms(&[0.0, 0.999_999_9]).unwrap();
        assert_eq!(edge.indices, vec![0, 2]);
    }

    #[test]
    fn test_sample_records_match_indices() {
        let mut b = buffer(5, 1.0, 0.0);
        b.insert(&records(0, 5)).unwrap();
        let batch = b.sample(16).unwrap();
        for (i, &ix) in batch.indices.iter().enumerate() {
            let k = ix as f32;
            let next = ((ix + 1) % 5) as f32;
            assert_eq!(batch.records.row("actions", i, 1).unwrap(), &[k + 100.0]);
            assert_eq!(batch.records.row("states", i, 2).unwrap(), &[k, -k]);
            assert_eq!(batch.records.row("next_states", i, 2).unwrap(), &[next, -next]);
        }
    }

    #[test]
    fn test_weights_in_unit_interval() {
        let mut b = buffer(10, 0.7, 0.6);
        b.insert(&records(0, 10)).unwrap();
        let ixs = (0..10).collect::<Vec<_>>();
        let ps = ixs.iter().map(|&ix| 0.1 + ix as f32 * 0.3).collect::<Vec<_>>();
        b.update(&ixs, &ps).unwrap();

        let batch = b.sample(500).unwrap();
        assert!(batch.weights.iter().all(|&w| w > 0.0 && w <= 1.0));

        // Slot 0 holds the minimum priority and gets the largest weight.
        let batch = b.sample_with_uniforms(&[0.0]).unwrap();
        assert_eq!(batch.indices, vec![0]);
        assert!((batch.weights[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_weights_are_one_without_correction() {
        let mut b = buffer(10, 1.0, 0.0);
        b.insert(&records(0, 7)).unwrap();
        b.update(&[0, 3, 6], &[0.01, 5.0, 100.0]).unwrap();
        let batch = b.sample(100).unwrap();
        assert!(batch.weights.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_weights_follow_priorities() {
        let mut b = buffer(2, 1.0, 1.0);
        b.insert(&records(0, 2)).unwrap();
        b.update(&[0, 1], &[1.0, 3.0]).unwrap();

        // P(0) = 1/4, P(1) = 3/4, so w(1) / w(0) = 1/3.
        let batch = b.sample_with_uniforms(&[0.1, 0.9]).unwrap();
        assert_eq!(batch.indices, vec![0, 1]);
        assert!((batch.weights[0] - 1.0).abs() < 1e-6);
        assert!((batch.weights[1] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_writes_both_trees() {
        let mut b = buffer(8, 0.5, 0.4);
        b.insert(&records(0, 8)).unwrap();
        let before_sum = b.sum_tree().leaves().to_vec();
        let before_min = b.min_tree().leaves().to_vec();

        b.update(&[5], &[16.0]).unwrap();
        for ix in 0..8 {
            let (sum, min) = (b.sum_tree().leaf(ix).unwrap(), b.min_tree().leaf(ix).unwrap());
            if ix == 5 {
                assert_eq!(sum, 4.0);
                assert_eq!(min, 4.0);
            } else {
                assert_eq!(sum, before_sum[ix]);
                assert_eq!(min, before_min[ix]);
            }
        }
    }

    #[test]
    fn test_update_keeps_running_max() {
        let mut b = buffer(4, 1.0, 0.0);
        b.insert(&records(0, 4)).unwrap();
        b.update(&[0, 1], &[0.5, 3.0]).unwrap();
        assert_eq!(b.max_priority(), 3.0);
        b.update(&[2], &[2.0]).unwrap();
        assert_eq!(b.max_priority(), 3.0);
    }

    #[test]
    fn test_update_validates_before_writing() {
        let mut b = buffer(4, 1.0, 0.0);
        b.insert(&records(0, 4)).unwrap();
        let leaves = b.sum_tree().leaves().to_vec();

        assert_eq!(
            b.update(&[0, 1], &[2.0]),
            Err(MemoryError::LengthMismatch {
                indices: 2,
                priorities: 1
            })
        );
        assert_eq!(
            b.update(&[0, 4], &[2.0, 2.0]),
            Err(MemoryError::IndexOutOfRange { index: 4, bound: 4 })
        );
        assert!(matches!(
            b.update(&[0, 1], &[2.0, 0.0]),
            Err(MemoryError::InvalidPriority { index: 1, .. })
        ));
        assert!(b.update(&[0], &[f32::INFINITY]).is_err());

        assert_eq!(b.sum_tree().leaves(), &leaves[..]);
        assert_eq!(b.max_priority(), 1.0);
    }

    #[test]
    fn test_insert_schema_mismatch_leaves_trees_untouched() {
        let mut b = buffer(4, 1.0, 0.0);
        b.insert(&records(0, 1)).unwrap();
        let bad = records(1, 2).with_field("rewards", vec![1.0]);
        assert!(matches!(b.insert(&bad), Err(MemoryError::SchemaMismatch(_))));
        assert_eq!(b.len(), 1);
        assert_eq!(b.sum_tree().root_value(), 1.0);
    }

    #[test]
    fn test_beta_schedule() {
        let config = PrioritizedReplayConfig::default()
            .capacity(4)
            .alpha(1.0)
            .beta(0.0)
            .beta_schedule(Some(BetaSchedule::new(1.0, 2)))
            .fields(fields());
        let mut b = PrioritizedReplay::build(&config).unwrap();
        b.insert(&records(0, 4)).unwrap();
        assert_eq!(b.current_beta(), 0.0);
        b.update(&[0], &[4.0]).unwrap();
        assert_eq!(b.current_beta(), 0.5);

        // Leaves are [4, 1, 1, 1]; slot 0 is weighted (1 / 4)^beta.
        let draws = [0.1, 0.9];
        let batch = b.sample_with_uniforms(&draws).unwrap();
        assert_eq!(batch.indices, vec![0, 3]);
        assert!((batch.weights[0] - 0.5).abs() < 1e-6);
        assert_eq!(batch.weights[1], 1.0);

        b.update(&[1], &[1.0]).unwrap();
        b.update(&[2], &[1.0]).unwrap();
        assert_eq!(b.current_beta(), 1.0);
        let batch = b.sample_with_uniforms(&draws).unwrap();
        assert_eq!(batch.indices, vec![0, 3]);
        assert!((batch.weights[0] - 0.25).abs() < 1e-6);
        assert_eq!(batch.weights[1], 1.0);
    }

    #[test]
    fn test_update_rejects_priorities_degenerate_after_exponent() {
        let mut b = buffer(4, 2.0, 0.5);
        b.insert(&records(0, 4)).unwrap();
        let sum_leaves = b.sum_tree().leaves().to_vec();
        let min_leaves = b.min_tree().leaves().to_vec();

        // 1e20^2 overflows, 1e-30^2 underflows, (-2)^2 is positive.
        for &p in [1e20f32, 1e-30, 1e19, -2.0].iter() {
            assert_eq!(
                b.update(&[1, 0], &[2.0, p]),
                Err(MemoryError::InvalidPriority { index: 0, priority: p })
            );
        }
        assert_eq!(b.sum_tree().leaves(), &sum_leaves[..]);
        assert_eq!(b.min_tree().leaves(), &min_leaves[..]);
        assert_eq!(b.max_priority(), 1.0);

        // The buffer still samples and new slots are seeded with a finite weight.
        let batch = b.sample_with_uniforms(&[0.5, 0.9]).unwrap();
        assert_eq!(batch.weights, vec![1.0, 1.0]);
        b.insert(&records(4, 1)).unwrap();
        assert_eq!(b.sum_tree().root_value(), 4.0);
    }

    #[test]
    fn test_weights_positive_for_extreme_priorities() {
        let mut b = buffer(4, 1.0, 1.0);
        b.insert(&records(0, 4)).unwrap();
        b.update(&[0, 1, 2, 3], &[1e-30, 1.0, 1e30, 1.0]).unwrap();
        assert!(b.sum_tree().root_value().is_finite());
        assert_eq!(b.min_tree().root_value(), 1e-30);

        let batch = b.sample_with_uniforms(&[0.0, 0.5]).unwrap();
        assert_eq!(batch.indices, vec![0, 2]);
        assert_eq!(batch.weights[0], 1.0);
        assert!(batch.weights[1] > 0.0 && batch.weights[1] < 1e-30);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut b1 = buffer(16, 0.6, 0.4);
        let mut b2 = buffer(16, 0.6, 0.4);
        for b in [&mut b1, &mut b2].iter_mut() {
            b.insert(&records(0, 16)).unwrap();
            b.update(&[1, 2, 3], &[5.0, 0.2, 2.0]).unwrap();
        }
        assert_eq!(b1.sample(32).unwrap(), b2.sample(32).unwrap());
    }

    #[test]
    fn test_trait_objects_agree() {
        fn fill<R: ExperienceBufferBase<Item = Records>>(r: &mut R) -> Result<()> {
            r.push(records(0, 3))?;
            r.push(records(3, 3))
        }

        let mut b = <PrioritizedReplay as ReplayBufferBase>::build(
            &PrioritizedReplayConfig::default().capacity(4).fields(fields()),
        )
        .unwrap();
        fill(&mut b).unwrap();
        assert_eq!(ExperienceBufferBase::len(&b), 4);

        let batch = b.batch(3).unwrap();
        b.update_priority(&batch.indices, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(b.max_priority(), 3.0);

        let err = b.update_priority(&[9], &[1.0]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MemoryError>(),
            Some(&MemoryError::IndexOutOfRange { index: 9, bound: 4 })
        );
    }
}
