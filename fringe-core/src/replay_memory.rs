//! Replay memory with circular overwrite and frame-stacking reconstruction.
//!
//! The [`ReplayMemory`] stores a sliding window of the most recent
//! transitions in a fixed-capacity ring and serves uniformly-random
//! minibatches for off-policy training. Uniform sampling (as opposed to
//! prioritized) breaks the temporal correlation between consecutive
//! environment steps; sampling without replacement inside one minibatch
//! avoids duplicate gradient contributions in a single update.
//!
//! Observations are stored one frame per slot. States of `history_length`
//! frames are reconstructed at sampling time, which keeps the memory
//! footprint at one copy per frame instead of one copy per state.
mod base;
mod batch;
mod config;
mod step_proc;
mod vec_batch;
pub use base::ReplayMemory;
pub use batch::{BatchBase, Minibatch, StackableBatch, Transition};
pub use config::ReplayMemoryConfig;
pub use step_proc::{SimpleStepProcessor, SimpleStepProcessorConfig};
pub use vec_batch::VecBatch;
