//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{Env, Policy};
use anyhow::Result;
use std::marker::PhantomData;

/// Runs a fixed number of episodes and reports the mean episode return.
///
/// Episode `ix` is started with [`Env::reset_with_index`]`(ix)`, so a
/// deterministic environment produces reproducible evaluations.
pub struct DefaultEvaluator<E: Env, A: Policy<E>> {
    n_episodes: usize,
    env: E,
    phantom: PhantomData<A>,
}

impl<E: Env, A: Policy<E>> Evaluator<E, A> for DefaultEvaluator<E, A> {
    fn evaluate(&mut self, policy: &mut A) -> Result<f32> {
        let mut r_total = 0f32;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;

            loop {
                let act = policy.sample(&prev_obs);
                let (step, _) = self.env.step(&act);
                r_total += step.reward;
                if step.is_done {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        Ok(r_total / self.n_episodes as f32)
    }
}

impl<E: Env, A: Policy<E>> DefaultEvaluator<E, A> {
    /// Constructs a [`DefaultEvaluator`] running `n_episodes` episodes per
    /// evaluation.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
            phantom: PhantomData,
        })
    }
}
