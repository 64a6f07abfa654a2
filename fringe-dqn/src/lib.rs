#![warn(missing_docs)]
//! DQN agent for the `fringe-core` training loop.
//!
//! The agent implements epsilon-greedy (or softmax) acting, TD-target
//! computation with a periodically synced target network, and model
//! checkpoint delegation. The action-value function itself is reached
//! through the [`dqn::QModel`] trait and lives outside this crate.
pub mod act;
pub mod dqn;
