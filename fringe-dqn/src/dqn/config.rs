//! Configuration of [`Dqn`](super::Dqn).
use super::{DqnExplorer, EpsilonGreedy};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Minibatches per optimization step.
    pub n_updates_per_opt: usize,

    /// The minimum number of buffered transitions before optimizing.
    pub min_transitions_warmup: usize,

    /// Minibatch size.
    pub batch_size: usize,

    /// Discount factor for future rewards.
    pub discount_factor: f64,

    /// Interval of hard target-network syncs in optimization steps.
    pub sync_interval: usize,

    /// Selects the next-state action with the online network instead of
    /// the target network when computing TD targets.
    pub double_dqn: bool,

    /// Exploration strategy.
    pub explorer: DqnExplorer,

    /// Seed of the acting RNG.
    pub seed: u64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            n_updates_per_opt: 1,
            min_transitions_warmup: 100,
            batch_size: 32,
            discount_factor: 0.99,
            sync_interval: 1000,
            double_dqn: false,
            explorer: DqnExplorer::EpsilonGreedy(EpsilonGreedy::new()),
            seed: 42,
        }
    }
}

impl DqnConfig {
    /// Sets the number of minibatches per optimization step.
    pub fn n_updates_per_opt(mut self, v: usize) -> Self {
        self.n_updates_per_opt = v;
        self
    }

    /// Sets the minimum number of buffered transitions before optimizing.
    pub fn min_transitions_warmup(mut self, v: usize) -> Self {
        self.min_transitions_warmup = v;
        self
    }

    /// Sets the minibatch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the interval of target-network syncs in optimization steps.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Enables or disables double DQN.
    pub fn double_dqn(mut self, v: bool) -> Self {
        self.double_dqn = v;
        self
    }

    /// Sets the exploration strategy.
    pub fn explorer(mut self, v: DqnExplorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the seed of the acting RNG.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`DqnConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
