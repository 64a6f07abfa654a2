//! Replay buffer interfaces.
//!
//! Two traits split the two call directions of an experience replay buffer:
//! [`ExperienceBufferBase`] is the push side, used while interacting with an
//! environment, and [`ReplayBufferBase`] is the sampling side, used during
//! optimization steps.
use anyhow::Result;

/// Interface for buffers that store experiences from an environment.
pub trait ExperienceBufferBase {
    /// Items stored in the buffer.
    type Item;

    /// Pushes an item into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// The number of items in the buffer.
    fn len(&self) -> usize;

    /// Returns `true` when no item has been pushed yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for replay buffers that generate minibatches for training.
pub trait ReplayBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// Minibatch generated from the buffer.
    type Batch;

    /// Builds a replay buffer from the given configuration.
    ///
    /// Fails with [`FringeError::InvalidConfiguration`] when the
    /// configuration holds non-positive sizes.
    ///
    /// [`FringeError::InvalidConfiguration`]: crate::error::FringeError::InvalidConfiguration
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Constructs a minibatch of the given size.
    ///
    /// Fails with [`FringeError::InsufficientData`] when the buffer holds
    /// fewer sampleable transitions than `size`. The caller is expected to
    /// treat this as a recoverable condition and skip the optimization step.
    ///
    /// [`FringeError::InsufficientData`]: crate::error::FringeError::InsufficientData
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
