//! Transition record and minibatch storage.
use crate::TransitionBatch;

/// A trait defining row storage for one field of the replay memory.
///
/// Implementors hold up to `capacity` fixed-width rows. Writes wrap at
/// `capacity`, mirroring the write cursor of the owning memory.
pub trait BatchBase {
    /// Creates a new storage with the given capacity.
    fn new(capacity: usize) -> Self;

    /// Writes the rows of `data` starting at row `ix`, wrapping at the
    /// capacity given at construction.
    fn push(&mut self, ix: usize, data: Self);

    /// Returns a new batch holding copies of the rows at `ixs`, in order.
    fn sample(&self, ixs: &[usize]) -> Self;
}

/// Row storage supporting frame-stacking reconstruction.
///
/// A stacked row is the concatenation of several stored rows, oldest first.
/// This is how `history_length`-frame states are rebuilt from single-frame
/// slots.
pub trait StackableBatch: BatchBase {
    /// For each window of row indices, concatenates the rows at those
    /// indices (oldest first) into one row of the returned batch.
    ///
    /// With windows of length 1 this is equivalent to
    /// [`sample`](BatchBase::sample).
    fn stack(&self, windows: &[Vec<usize>]) -> Self;
}

/// One experience tuple. Immutable once stored.
///
/// `obs` and `next_obs` each hold a single frame (a one-row batch); states
/// spanning `history_length` frames are reconstructed by
/// [`ReplayMemory::build_minibatch`](super::ReplayMemory::build_minibatch).
pub struct Transition<O, A> {
    /// Observation at `t`.
    pub obs: O,

    /// Action taken at `t`.
    pub act: A,

    /// Observation at `t+1`.
    pub next_obs: O,

    /// Reward `r_t`.
    pub reward: f32,

    /// If the episode terminated with this transition.
    pub is_terminated: bool,
}

/// A minibatch of transitions sampled from a [`ReplayMemory`](super::ReplayMemory).
///
/// Five aligned sequences in the order of the indices used to build the
/// batch. `obs` and `next_obs` hold `history_length`-frame stacks.
pub struct Minibatch<O, A> {
    /// Stacked observations `o_t`.
    pub obs: O,

    /// Actions `a_t`.
    pub act: A,

    /// Stacked observations `o_t+1`.
    pub next_obs: O,

    /// Rewards `r_t`.
    pub reward: Vec<f32>,

    /// Termination flags `term_t`.
    pub is_terminated: Vec<bool>,
}

impl<O, A> TransitionBatch for Minibatch<O, A> {
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<bool>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }

    fn next_obs(&self) -> &Self::ObsBatch {
        &self.next_obs
    }

    fn reward(&self) -> &[f32] {
        &self.reward
    }

    fn is_terminated(&self) -> &[bool] {
        &self.is_terminated
    }
}
