//! Step processor producing [`Transition`]s.
use super::{BatchBase, Transition};
use crate::{Env, Step, StepProcessor};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`SimpleStepProcessor`].
#[derive(Clone, Debug)]
pub struct SimpleStepProcessorConfig {}

impl Default for SimpleStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Converts [`Step`] objects into [`Transition`]s with a 1-step backup.
///
/// The processor keeps the previous observation `o_t`; each incoming step
/// contributes `(a_t, o_t+1, r_t, term_t)`. At an episode end the kept
/// observation is replaced by the initial observation of the next episode.
pub struct SimpleStepProcessor<E, O, A> {
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for SimpleStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = SimpleStepProcessorConfig;
    type Output = Transition<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    fn process(&mut self, step: Step<E>) -> Self::Output {
        let is_done = step.is_done;
        let next_obs: O = step.obs.clone().into();
        let obs = self
            .prev_obs
            .replace(step.obs.into())
            .expect("prev_obs is not set. Forgot to call reset()?");

        let transition = Transition {
            obs,
            act: step.act.into(),
            next_obs,
            reward: step.reward,
            is_terminated: is_done,
        };

        if is_done {
            let init_obs = step.init_obs.expect("terminal step carries no init_obs");
            self.prev_obs = Some(init_obs.into());
        }

        transition
    }
}
