//! Interface to the external action-value function.
use anyhow::Result;
use std::path::Path;

/// Narrow interface to an externally implemented action-value function.
///
/// The agent in this crate does not implement neural networks, automatic
/// differentiation or optimizers; it only requires what this trait
/// describes: a batched forward pass, one fitted gradient step toward
/// given targets, a hard parameter copy for target-network sync, and
/// checkpointing. Backends (a deep network on some ML framework, a linear
/// approximator, a table) implement it outside of this crate.
pub trait QModel {
    /// Batched observations accepted by the model.
    type ObsBatch;

    /// The number of actions.
    fn n_actions(&self) -> usize;

    /// Q-values for each observation in the batch, row-major with
    /// [`n_actions`](Self::n_actions) values per row.
    fn forward(&self, obs: &Self::ObsBatch) -> Vec<f32>;

    /// Performs one gradient step pulling the Q-values of the taken
    /// actions `act` toward `tgt`, and returns the loss.
    ///
    /// `act` and `tgt` are aligned with the rows of `obs`.
    fn backward_step(&mut self, obs: &Self::ObsBatch, act: &[u32], tgt: &[f32]) -> Result<f32>;

    /// Overwrites the parameters of `self` with those of `other`.
    fn copy_from(&mut self, other: &Self);

    /// Saves the model parameters under the given path.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads the model parameters from the given path.
    fn load(&mut self, path: &Path) -> Result<()>;
}
