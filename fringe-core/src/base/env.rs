//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configuration of the environment.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performs an environment step.
    ///
    /// The second return value carries environment-specific metrics,
    /// which will be stored by the recorder of the training loop.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step and resets the environment if the
    /// episode ended with that step.
    ///
    /// The [`Step`] object returned by this method has its
    /// [`init_obs`](Step::init_obs) field set when the episode ended,
    /// holding the initial observation of the next episode.
    fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way, typically as a random seed for
    /// episode initialization. [`DefaultEvaluator`](crate::DefaultEvaluator)
    /// calls this method with the episode count to make evaluation episodes
    /// reproducible.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;
}
