//! End-to-end check of the training loop on a deterministic toy
//! environment with a random policy.
use anyhow::Result;
use fringe_core::{
    record::{NullRecorder, Record, Recorder},
    replay_memory::{
        ReplayMemory, ReplayMemoryConfig, SimpleStepProcessor, SimpleStepProcessorConfig,
        VecBatch,
    },
    Act, Agent, DefaultEvaluator, Env, ExperienceBufferBase, Obs, Policy, ReplayBufferBase,
    Sampler, Step, StepProcessor, Trainer, TrainerConfig,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;

#[derive(Clone)]
struct CorridorConfig {
    length: usize,
    max_steps: usize,
}

#[derive(Clone, Debug)]
struct CorridorObs(f32);

impl Obs for CorridorObs {}

impl From<CorridorObs> for VecBatch {
    fn from(obs: CorridorObs) -> Self {
        VecBatch::from_row(vec![obs.0])
    }
}

#[derive(Clone, Debug)]
struct CorridorAct(u32);

impl Act for CorridorAct {}

impl From<CorridorAct> for VecBatch {
    fn from(act: CorridorAct) -> Self {
        VecBatch::from_row(vec![act.0 as f32])
    }
}

/// A one-dimensional corridor. Action 1 moves right, action 0 moves left.
/// Reaching the right end gives reward 1 and ends the episode; episodes
/// are cut off after `max_steps` steps.
struct Corridor {
    config: CorridorConfig,
    pos: usize,
    steps: usize,
}

impl Env for Corridor {
    type Config = CorridorConfig;
    type Obs = CorridorObs;
    type Act = CorridorAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: 0,
            steps: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        self.steps += 1;
        match a.0 {
            1 => self.pos += 1,
            _ => self.pos = self.pos.saturating_sub(1),
        }

        let at_goal = self.pos + 1 == self.config.length;
        let is_done = at_goal || self.steps >= self.config.max_steps;
        let reward = if at_goal { 1. } else { -0.01 };
        let step = Step::new(
            CorridorObs(self.pos as f32),
            a.clone(),
            reward,
            is_done,
            (),
            None,
        );
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = 0;
        self.steps = 0;
        Ok(CorridorObs(0.))
    }

    fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
        let (mut step, record) = self.step(a);
        if step.is_done {
            step.init_obs = Some(self.reset().expect("corridor reset cannot fail"));
        }
        (step, record)
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

type Memory = ReplayMemory<VecBatch, VecBatch>;
type Proc = SimpleStepProcessor<Corridor, VecBatch, VecBatch>;

/// Acts uniformly at random and counts its optimization steps.
struct RandomAgent {
    rng: StdRng,
    train: bool,
    min_transitions: usize,
    n_opts: usize,
}

impl RandomAgent {
    fn new(min_transitions: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(7),
            train: true,
            min_transitions,
            n_opts: 0,
        }
    }
}

impl Policy<Corridor> for RandomAgent {
    fn sample(&mut self, _obs: &CorridorObs) -> CorridorAct {
        CorridorAct(self.rng.gen_range(0..2))
    }
}

impl Agent<Corridor, Memory> for RandomAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, buffer: &mut Memory) -> Option<Record> {
        if ExperienceBufferBase::len(buffer) < self.min_transitions {
            return None;
        }
        let batch = buffer.batch(4).ok()?;
        self.n_opts += 1;
        Some(Record::from_scalar("batch_len", batch.reward.len() as f32))
    }

    fn save_params(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

struct CountingRecorder {
    n_stored: usize,
    n_flushed: usize,
}

impl Recorder for CountingRecorder {
    fn store(&mut self, _record: Record) {
        self.n_stored += 1;
    }

    fn flush(&mut self, _step: i64) {
        self.n_flushed += 1;
    }
}

fn env_config() -> CorridorConfig {
    CorridorConfig {
        length: 5,
        max_steps: 20,
    }
}

#[test]
fn trains_until_max_opts() -> Result<()> {
    let trainer_config = TrainerConfig::default()
        .max_opts(50)
        .opt_interval(2)
        .warmup_period(10)
        .eval_interval(25)
        .flush_record_interval(10)
        .record_compute_cost_interval(20);
    let mut trainer: Trainer<Corridor, Proc, Memory> = Trainer::build(
        trainer_config,
        env_config(),
        SimpleStepProcessorConfig::default(),
        ReplayMemoryConfig::default().capacity(100),
    );

    let mut agent = RandomAgent::new(8);
    let mut recorder = CountingRecorder {
        n_stored: 0,
        n_flushed: 0,
    };
    let mut evaluator = DefaultEvaluator::new(&env_config(), 0, 2)?;

    trainer.train(&mut agent, &mut recorder, &mut evaluator)?;

    assert_eq!(agent.n_opts, 50);
    assert!(recorder.n_stored > 0);
    assert!(recorder.n_flushed >= 5);
    Ok(())
}

#[test]
fn trains_with_null_recorder() -> Result<()> {
    let trainer_config = TrainerConfig::default()
        .max_opts(5)
        .opt_interval(1)
        .warmup_period(4);
    let mut trainer: Trainer<Corridor, Proc, Memory> = Trainer::build(
        trainer_config,
        env_config(),
        SimpleStepProcessorConfig::default(),
        ReplayMemoryConfig::default().capacity(50),
    );

    let mut agent = RandomAgent::new(4);
    let mut evaluator = DefaultEvaluator::new(&env_config(), 0, 1)?;
    trainer.train(&mut agent, &mut NullRecorder::new(), &mut evaluator)?;

    assert_eq!(agent.n_opts, 5);
    Ok(())
}

#[test]
fn buffer_saturates_at_capacity_during_training() -> Result<()> {
    let trainer_config = TrainerConfig::default()
        .max_opts(usize::MAX)
        .opt_interval(2)
        .warmup_period(10);
    let mut trainer: Trainer<Corridor, Proc, Memory> = Trainer::build(
        trainer_config,
        env_config(),
        SimpleStepProcessorConfig::default(),
        ReplayMemoryConfig::default().capacity(20),
    );

    let env = Corridor::build(&env_config(), 0)?;
    let step_processor = Proc::build(&SimpleStepProcessorConfig::default());
    let mut buffer = Memory::build(&ReplayMemoryConfig::default().capacity(20))?;
    let mut sampler = Sampler::new(env, step_processor);
    let mut agent = RandomAgent::new(4);
    let mut env_steps = 0;
    let mut opt_steps = 0;

    for _ in 0..200 {
        trainer.train_step(
            &mut agent,
            &mut buffer,
            &mut sampler,
            &mut env_steps,
            &mut opt_steps,
        )?;
    }

    assert_eq!(env_steps, 200);
    // One opt step at every second env step from the warmup period on.
    assert_eq!(opt_steps, 96);
    assert_eq!(buffer.len(), 20);
    Ok(())
}
