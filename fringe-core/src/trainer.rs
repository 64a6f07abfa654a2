//! Train [`Agent`].
mod config;
mod sampler;
use std::time::{Duration, SystemTime};

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Evaluator, ExperienceBufferBase, ReplayBufferBase, StepProcessor,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
pub use sampler::Sampler;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop and related objects.
///
/// # Training loop
///
/// 1. Build instances of [`Env`], [`StepProcessor`] and the replay buffer
///    implementing [`ReplayBufferBase`], and wrap the first two in a
///    [`Sampler`].
/// 2. Do an environment step with [`Sampler::sample_and_push`], which
///    pushes the resulting transition into the replay buffer, and
///    increment the environment step counter.
/// 3. After the warmup period, every `opt_interval` environment steps, ask
///    the agent for an optimization step with minibatches sampled from the
///    replay buffer. The agent may still skip the step, e.g. while the
///    buffer holds fewer transitions than its own warmup threshold.
/// 4. Every `eval_interval` optimization steps, evaluate the agent and
///    record the result as `eval_reward`; the best model so far is saved
///    under `(model_dir)/best`.
/// 5. Every `save_interval` optimization steps, save the model under
///    `(model_dir)/(opt_steps)`.
/// 6. Stop after `max_opts` optimization steps.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|Transition|D[ReplayBufferBase]
///     D -->|TransitionBatch|A
/// ```
///
/// The [`Agent`] emits an action based on the observation received from the
/// [`Env`]. The resulting [`Step`](crate::Step) object is processed into a
/// transition and pushed into the replay buffer; minibatches sampled from
/// the buffer drive the agent's optimization steps.
pub struct Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Configuration of the environment for training.
    env_config: E::Config,

    /// Configuration of the transition producer.
    step_proc_config: P::Config,

    /// Configuration of the replay buffer.
    replay_buffer_config: R::Config,

    /// Where to save the trained model.
    model_dir: Option<String>,

    /// Interval of optimization in environment steps.
    opt_interval: usize,

    /// Warmup period, for filling the replay buffer, in environment steps.
    warmup_period: usize,

    /// Interval of recording computational cost in optimization steps.
    record_compute_cost_interval: usize,

    /// Interval of flushing records in optimization steps.
    flush_record_interval: usize,

    /// Interval of evaluation in optimization steps.
    eval_interval: usize,

    /// Interval of saving the model in optimization steps.
    save_interval: usize,

    /// The maximal number of optimization steps.
    max_opts: usize,

    /// Optimization steps for computing optimization steps per second.
    opt_steps_for_ops: usize,

    /// Timer for computing optimization steps per second.
    timer_for_ops: Duration,
}

impl<E, P, R> Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: ExperienceBufferBase<Item = P::Output> + ReplayBufferBase,
{
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        step_proc_config: P::Config,
        replay_buffer_config: R::Config,
    ) -> Self {
        Self {
            env_config,
            step_proc_config,
            replay_buffer_config,
            model_dir: config.model_dir,
            opt_interval: config.opt_interval,
            warmup_period: config.warmup_period,
            record_compute_cost_interval: config.record_compute_cost_interval,
            flush_record_interval: config.flush_record_interval,
            eval_interval: config.eval_interval,
            save_interval: config.save_interval,
            max_opts: config.max_opts,
            opt_steps_for_ops: 0,
            timer_for_ops: Duration::new(0, 0),
        }
    }

    fn save_model<A: Agent<E, R>>(agent: &A, model_dir: String) {
        match agent.save_params(model_dir.as_ref()) {
            Ok(()) => info!("Saved the model in {:?}.", &model_dir),
            Err(_) => info!("Failed to save model in {:?}.", &model_dir),
        }
    }

    fn save_best_model<A: Agent<E, R>>(agent: &A, model_dir: String) {
        let model_dir = model_dir + "/best";
        Self::save_model(agent, model_dir);
    }

    fn save_model_with_steps<A: Agent<E, R>>(agent: &A, model_dir: String, steps: usize) {
        let model_dir = model_dir + format!("/{}", steps).as_str();
        Self::save_model(agent, model_dir);
    }

    /// Returns optimization steps per second, then resets the internal
    /// counters.
    fn opt_steps_per_sec(&mut self) -> f32 {
        let osps = 1000. * self.opt_steps_for_ops as f32 / (self.timer_for_ops.as_millis() as f32);
        self.opt_steps_for_ops = 0;
        self.timer_for_ops = Duration::new(0, 0);
        osps
    }

    /// Performs a training step.
    ///
    /// A training step is always one environment step, pushing one
    /// transition, and every `opt_interval` environment steps past the
    /// warmup period also an optimization step of the agent.
    ///
    /// The second return value tells if an optimization step was done.
    pub fn train_step<A>(
        &mut self,
        agent: &mut A,
        buffer: &mut R,
        sampler: &mut Sampler<E, P>,
        env_steps: &mut usize,
        opt_steps: &mut usize,
    ) -> Result<(Record, bool)>
    where
        A: Agent<E, R>,
    {
        let record = sampler.sample_and_push(agent, buffer)?;
        *env_steps += 1;

        if *env_steps < self.warmup_period || *env_steps % self.opt_interval != 0 {
            return Ok((record, false));
        }

        let timer = SystemTime::now();
        match agent.opt(buffer) {
            None => Ok((record, false)),
            Some(record_agent) => {
                *opt_steps += 1;
                self.timer_for_ops += timer.elapsed()?;
                self.opt_steps_for_ops += 1;
                Ok((record.merge(record_agent), true))
            }
        }
    }

    /// Trains the agent until `max_opts` optimization steps are done.
    pub fn train<A, S, D>(
        &mut self,
        agent: &mut A,
        recorder: &mut S,
        evaluator: &mut D,
    ) -> Result<()>
    where
        A: Agent<E, R>,
        S: Recorder,
        D: Evaluator<E, A>,
    {
        let env = E::build(&self.env_config, 0)?;
        let step_processor = P::build(&self.step_proc_config);
        let mut buffer = R::build(&self.replay_buffer_config)?;
        let mut sampler = Sampler::new(env, step_processor);
        let mut max_eval_reward = f32::MIN;
        let mut env_steps: usize = 0;
        let mut opt_steps: usize = 0;
        sampler.reset_fps_counter();
        agent.train();

        loop {
            let (mut record, is_opt) = self.train_step(
                agent,
                &mut buffer,
                &mut sampler,
                &mut env_steps,
                &mut opt_steps,
            )?;

            if is_opt {
                if opt_steps % self.record_compute_cost_interval == 0 {
                    record.insert("fps", Scalar(sampler.fps()));
                    record.insert("opt_steps_per_sec", Scalar(self.opt_steps_per_sec()));
                    sampler.reset_fps_counter();
                }

                if opt_steps % self.eval_interval == 0 {
                    info!("Starts evaluation of the trained model");
                    agent.eval();
                    let eval_reward = evaluator.evaluate(agent)?;
                    agent.train();
                    record.insert("eval_reward", Scalar(eval_reward));

                    // Save the best model up to the current iteration.
                    if eval_reward > max_eval_reward {
                        max_eval_reward = eval_reward;
                        if let Some(model_dir) = self.model_dir.clone() {
                            Self::save_best_model(agent, model_dir);
                        }
                    }
                }

                if opt_steps % self.save_interval == 0 {
                    if let Some(model_dir) = self.model_dir.clone() {
                        Self::save_model_with_steps(agent, model_dir, opt_steps);
                    }
                }
            }

            if !record.is_empty() {
                recorder.store(record);
            }

            if is_opt {
                if opt_steps % self.flush_record_interval == 0 {
                    recorder.flush(opt_steps as _);
                }

                if opt_steps == self.max_opts {
                    recorder.flush(opt_steps as _);
                    break;
                }
            }
        }

        Ok(())
    }
}
