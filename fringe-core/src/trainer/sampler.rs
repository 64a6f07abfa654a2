//! Samples transitions and pushes them into a replay buffer.
use crate::{
    record::{Record, RecordValue},
    Env, ExperienceBufferBase, Policy, StepProcessor,
};
use anyhow::Result;
use std::{collections::VecDeque, time::SystemTime};

/// Window of the rolling average of episode returns.
const RUNNING_RETURN_WINDOW: usize = 100;

/// Drives the interaction between a policy and an environment, processes
/// the resulting steps into transitions, and pushes them into an
/// experience buffer.
///
/// The sampler also tracks the per-episode return, its rolling average
/// over the last 100 episodes, and the environment frames per second.
pub struct Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    env: E,
    prev_obs: Option<E::Obs>,
    step_processor: P,
    episode_return: f32,
    episode_returns: VecDeque<f32>,
    n_frames: usize,
    time: SystemTime,
}

impl<E, P> Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    /// Creates a sampler for the given environment and step processor.
    pub fn new(env: E, step_processor: P) -> Self {
        Self {
            env,
            prev_obs: None,
            step_processor,
            episode_return: 0.,
            episode_returns: VecDeque::with_capacity(RUNNING_RETURN_WINDOW),
            n_frames: 0,
            time: SystemTime::now(),
        }
    }

    /// Performs one environment step and pushes the resulting transition
    /// into `buffer`.
    ///
    /// At an episode end the returned record carries `episode_return` and
    /// its rolling average `running_return_100`.
    pub fn sample_and_push<A, R>(&mut self, agent: &mut A, buffer: &mut R) -> Result<Record>
    where
        A: Policy<E>,
        R: ExperienceBufferBase<Item = P::Output>,
    {
        // Lazily reset on the first call of a run.
        if self.prev_obs.is_none() {
            self.prev_obs = Some(self.env.reset()?);
            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        let act = agent.sample(self.prev_obs.as_ref().unwrap());
        let (step, mut record) = self.env.step_with_reset(&act);
        let is_done = step.is_done;
        self.episode_return += step.reward;
        self.n_frames += 1;

        self.prev_obs = match is_done {
            true => Some(
                step.init_obs
                    .clone()
                    .expect("terminal step carries no init_obs"),
            ),
            false => Some(step.obs.clone()),
        };

        let transition = self.step_processor.process(step);
        buffer.push(transition)?;

        if is_done {
            if self.episode_returns.len() == RUNNING_RETURN_WINDOW {
                self.episode_returns.pop_front();
            }
            self.episode_returns.push_back(self.episode_return);
            let running = self.episode_returns.iter().sum::<f32>()
                / self.episode_returns.len() as f32;

            record.insert("episode_return", RecordValue::Scalar(self.episode_return));
            record.insert("running_return_100", RecordValue::Scalar(running));
            self.episode_return = 0.;

            self.step_processor
                .reset(self.prev_obs.as_ref().unwrap().clone());
        }

        Ok(record)
    }

    /// Environment steps per second since the last counter reset.
    pub fn fps(&self) -> f32 {
        let elapsed = self.time.elapsed().map(|e| e.as_millis()).unwrap_or(0);
        match elapsed {
            0 => 0.,
            ms => 1000. * self.n_frames as f32 / ms as f32,
        }
    }

    /// Resets the frame counter of [`fps`](Self::fps).
    pub fn reset_fps_counter(&mut self) {
        self.n_frames = 0;
        self.time = SystemTime::now();
    }
}
