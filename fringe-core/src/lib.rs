#![warn(missing_docs)]
//! A library for deep Q-learning with experience replay.
//!
//! The crate is organized around a small set of traits describing the
//! objects of a reinforcement-learning run ([`Env`], [`Policy`],
//! [`Agent`], [`StepProcessor`] and the replay buffer interfaces), plus
//! concrete implementations of the pieces that do not depend on a machine
//! learning backend: the [`replay_memory`] (a fixed-capacity transition
//! store with frame-stacking reconstruction), the [`Trainer`] driving the
//! interaction/optimization loop, and the [`record`] types for metrics.
//!
//! Neural networks, automatic differentiation and optimizers are
//! deliberately not part of this crate; agents reach them through narrow
//! interfaces such as the `QModel` trait of the `fringe-dqn` crate.
pub mod error;
pub mod record;
pub mod replay_memory;

mod base;
pub use base::{
    Act, Agent, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase, Step,
    StepProcessor, TransitionBatch,
};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
