//! Agent.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Sets the policy to training mode.
    fn train(&mut self);

    /// Sets the policy to evaluation mode.
    fn eval(&mut self);

    /// Returns if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step.
    ///
    /// `buffer` is a replay buffer from which transition minibatches are
    /// taken for updating the parameters of the agent.
    ///
    /// Returns `None` when the agent skipped the optimization step, for
    /// example because the buffer has not yet collected enough transitions.
    fn opt(&mut self, buffer: &mut R) -> Option<Record>;

    /// Saves the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files in the directory. For
    /// example, the DQN agent in the `fringe-dqn` crate saves two
    /// action-value functions corresponding to the online and target
    /// networks.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
