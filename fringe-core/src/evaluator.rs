//! Evaluate [`Policy`].
use crate::{Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluates a policy.
pub trait Evaluator<E: Env, A: Policy<E>> {
    /// Runs evaluation episodes and returns a performance measure,
    /// typically the mean episode return.
    ///
    /// The caller of this method needs to handle the internal state of the
    /// policy, like training/evaluation mode.
    fn evaluate(&mut self, policy: &mut A) -> Result<f32>;
}
