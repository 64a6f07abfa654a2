//! Fixed-capacity replay memory.
use super::{BatchBase, Minibatch, ReplayMemoryConfig, StackableBatch, Transition};
use crate::{error::FringeError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

/// Fixed-capacity store of [`Transition`]s with circular overwrite and
/// uniformly-random minibatch sampling.
///
/// The memory has two macro-states: FILLING (`len() < capacity`) and FULL
/// (`len() == capacity`), with a one-way transition the first time the
/// write cursor wraps. Pushing never fails; overwriting the oldest slot is
/// the defined steady-state behavior of a full memory, not an error.
///
/// All mutable state (`cursor`, `size`, the row stores) is owned by this
/// struct and mutated only through its methods, so concurrent use only
/// needs an external `Mutex` around the whole memory.
/// [`build_minibatch`](Self::build_minibatch) copies data out under
/// `&self`, so each minibatch is a consistent snapshot.
///
/// Sampling is deterministic for a given seed; [`new`](Self::new) uses a
/// fixed default seed, [`with_seed`](Self::with_seed) or
/// [`ReplayMemoryConfig::seed`] give control over it.
pub struct ReplayMemory<O, A>
where
    O: StackableBatch,
    A: BatchBase,
{
    capacity: usize,
    history_length: usize,

    /// Next slot to overwrite. Wraps at `capacity`.
    cursor: usize,

    /// Number of valid slots. Saturates at `capacity`.
    size: usize,

    obs: O,
    act: A,
    next_obs: O,
    reward: Vec<f32>,
    is_terminated: Vec<bool>,
    rng: StdRng,
}

impl<O, A> ReplayMemory<O, A>
where
    O: StackableBatch,
    A: BatchBase,
{
    /// Creates an empty memory with a default sampling seed.
    ///
    /// Fails with [`FringeError::InvalidConfiguration`] when `capacity` or
    /// `history_length` is zero.
    pub fn new(capacity: usize, history_length: usize) -> Result<Self, FringeError> {
        Self::with_seed(capacity, history_length, 42)
    }

    /// Creates an empty memory with the given sampling seed.
    pub fn with_seed(
        capacity: usize,
        history_length: usize,
        seed: u64,
    ) -> Result<Self, FringeError> {
        if capacity == 0 {
            return Err(FringeError::InvalidConfiguration(
                "capacity must be positive".into(),
            ));
        }
        if history_length == 0 {
            return Err(FringeError::InvalidConfiguration(
                "history_length must be positive".into(),
            ));
        }

        Ok(Self {
            capacity,
            history_length,
            cursor: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_terminated: vec![false; capacity],
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// The number of valid transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` before the first push.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The maximum number of stored transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of frames composing one reconstructed state.
    pub fn history_length(&self) -> usize {
        self.history_length
    }

    /// The next slot to overwrite.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Stores a transition, overwriting the oldest entry once full.
    pub fn push(&mut self, tr: Transition<O, A>) {
        let i = self.cursor;
        self.obs.push(i, tr.obs);
        self.act.push(i, tr.act);
        self.next_obs.push(i, tr.next_obs);
        self.reward[i] = tr.reward;
        self.is_terminated[i] = tr.is_terminated;

        self.cursor = (self.cursor + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Draws `batch_size` distinct slot indices uniformly at random from
    /// the sampleable range.
    ///
    /// Fails with [`FringeError::InvalidConfiguration`] when `batch_size`
    /// is zero and with [`FringeError::InsufficientData`] when fewer than
    /// `batch_size` indices are sampleable. The latter is expected while
    /// the memory fills up; callers should skip the update step and retry
    /// after more pushes.
    pub fn sample_indices(&mut self, batch_size: usize) -> Result<Vec<usize>, FringeError> {
        if batch_size == 0 {
            return Err(FringeError::InvalidConfiguration(
                "batch_size must be positive".into(),
            ));
        }

        let candidates = self.sampleable_indices();
        if batch_size > candidates.len() {
            return Err(FringeError::InsufficientData {
                len: candidates.len(),
                requested: batch_size,
            });
        }

        let ixs = rand::seq::index::sample(&mut self.rng, candidates.len(), batch_size)
            .into_iter()
            .map(|k| candidates[k])
            .collect();
        Ok(ixs)
    }

    /// Builds the five aligned sequences for the given indices.
    ///
    /// `obs` and `next_obs` are reconstructed as `history_length`-frame
    /// stacks ending at each index; see the module documentation for the
    /// boundary rules. Pure read: calling this twice with the same indices
    /// on an unchanged memory yields identical output.
    pub fn build_minibatch(&self, ixs: &[usize]) -> Minibatch<O, A> {
        debug_assert!(ixs.iter().all(|&ix| ix < self.size));

        let windows = ixs
            .iter()
            .map(|&i| self.stack_window(i))
            .collect::<Vec<_>>();

        Minibatch {
            obs: self.obs.stack(&windows),
            act: self.act.sample(ixs),
            next_obs: self.next_obs.stack(&windows),
            reward: ixs.iter().map(|&i| self.reward[i]).collect(),
            is_terminated: ixs.iter().map(|&i| self.is_terminated[i]).collect(),
        }
    }

    /// The number of indices [`sample_indices`](Self::sample_indices) can
    /// currently draw from.
    ///
    /// Smaller than [`len`](Self::len) only when the memory is full and
    /// `history_length > 1`, where the `history_length - 1` oldest slots
    /// are held back (their stacks would splice the newest frames onto the
    /// oldest, see below).
    pub fn num_sampleable(&self) -> usize {
        self.sampleable_indices().len()
    }

    fn sampleable_indices(&self) -> Vec<usize> {
        if self.history_length == 1 || self.size < self.capacity {
            (0..self.size).collect()
        } else {
            // In ring order the oldest slot is `cursor`. A stack window
            // ending within the first `history_length - 1` slots of that
            // order would walk backwards across the overwrite boundary,
            // mixing frames from opposite ends of the recording.
            (0..self.size)
                .filter(|&i| self.ring_pos(i) >= self.history_length - 1)
                .collect()
        }
    }

    /// Position of slot `i` in oldest-to-newest order; the oldest stored
    /// slot has position 0.
    fn ring_pos(&self, i: usize) -> usize {
        (i + self.capacity - self.cursor) % self.capacity
    }

    /// The window of slot indices whose frames form the stacked state
    /// ending at `i`, oldest first.
    ///
    /// The backward walk stops at the oldest stored slot, at the start of
    /// the recording, and at episode boundaries (a terminated slot earlier
    /// in the window belongs to a previous episode). Short windows are
    /// padded by duplicating their earliest frame.
    fn stack_window(&self, i: usize) -> Vec<usize> {
        let full = self.size == self.capacity;
        let mut w = Vec::with_capacity(self.history_length);
        w.push(i);

        let mut j = i;
        for _ in 1..self.history_length {
            if full {
                if j == self.cursor {
                    break;
                }
            } else if j == 0 {
                break;
            }
            let prev = if j == 0 { self.capacity - 1 } else { j - 1 };
            if self.is_terminated[prev] {
                break;
            }
            j = prev;
            w.push(j);
        }

        while w.len() < self.history_length {
            w.push(j);
        }
        w.reverse();
        w
    }
}

impl<O, A> ExperienceBufferBase for ReplayMemory<O, A>
where
    O: StackableBatch,
    A: BatchBase,
{
    type Item = Transition<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        ReplayMemory::push(self, tr);
        Ok(())
    }
}

impl<O, A> ReplayBufferBase for ReplayMemory<O, A>
where
    O: StackableBatch,
    A: BatchBase,
{
    type Config = ReplayMemoryConfig;
    type Batch = Minibatch<O, A>;

    fn build(config: &Self::Config) -> Result<Self> {
        let memory = Self::with_seed(config.capacity, config.history_length, config.seed)?;
        Ok(memory)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let ixs = self.sample_indices(size)?;
        Ok(self.build_minibatch(&ixs))
    }
}
