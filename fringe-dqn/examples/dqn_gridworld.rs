//! DQN on a one-dimensional gridworld with a tabular action-value
//! function.
//!
//! The example wires every piece of the training loop together: the
//! environment, the step processor, the replay memory, the DQN agent with
//! epsilon-greedy exploration, evaluation and TensorBoard recording. The
//! tabular [`QModel`] backend stands in for a neural network; it keeps the
//! example self-contained and free of ML-framework dependencies.
use anyhow::Result;
use clap::Parser;
use fringe_core::{
    record::Record,
    replay_memory::{
        ReplayMemory, ReplayMemoryConfig, SimpleStepProcessor, SimpleStepProcessorConfig,
        VecBatch,
    },
    Agent as _, DefaultEvaluator, Env, Evaluator as _, Step, Trainer, TrainerConfig,
};
use fringe_dqn::{
    act::DiscreteActBatch,
    dqn::{Dqn, DqnConfig, DqnExplorer, EpsilonGreedy, QModel},
};
use fringe_tensorboard::TensorboardRecorder;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

const GRID_LENGTH: usize = 8;
const MAX_EPISODE_STEPS: usize = 50;
const N_ACTIONS: usize = 2;
const LEARNING_RATE: f32 = 0.2;
const DISCOUNT_FACTOR: f64 = 0.99;
const BATCH_SIZE: usize = 16;
const REPLAY_MEMORY_CAPACITY: usize = 1000;
const WARMUP_PERIOD: usize = 100;
const OPT_INTERVAL: usize = 1;
const SYNC_INTERVAL: usize = 20;
const EVAL_INTERVAL: usize = 200;
const FLUSH_INTERVAL: usize = 100;
const N_EPISODES_PER_EVAL: usize = 5;

mod env {
    use super::*;

    #[derive(Clone)]
    pub struct GridworldConfig {
        pub length: usize,
        pub max_steps: usize,
    }

    /// One-hot encoding of the agent position.
    #[derive(Clone, Debug)]
    pub struct Obs(pub Vec<f32>);

    impl fringe_core::Obs for Obs {}

    impl From<Obs> for VecBatch {
        fn from(obs: Obs) -> Self {
            VecBatch::from_row(obs.0)
        }
    }

    /// 0 moves left, 1 moves right.
    #[derive(Clone, Debug)]
    pub struct Act(pub u32);

    impl fringe_core::Act for Act {}

    impl From<u32> for Act {
        fn from(a: u32) -> Self {
            Act(a)
        }
    }

    impl From<Act> for DiscreteActBatch {
        fn from(act: Act) -> Self {
            DiscreteActBatch::from_act(act.0)
        }
    }

    /// A corridor of `length` cells. The agent starts at the left end;
    /// reaching the right end gives reward 1 and ends the episode. Every
    /// other step costs 0.01, and episodes are cut off after `max_steps`
    /// steps.
    pub struct Gridworld {
        config: GridworldConfig,
        pos: usize,
        steps: usize,
    }

    impl Gridworld {
        fn obs(&self) -> Obs {
            let mut one_hot = vec![0.; self.config.length];
            one_hot[self.pos] = 1.;
            Obs(one_hot)
        }
    }

    impl Env for Gridworld {
        type Config = GridworldConfig;
        type Obs = Obs;
        type Act = Act;
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
                1 => self.pos = (self.pos + 1).min(self.config.length - 1),
                _ => self.pos = self.pos.saturating_sub(1),
            }

            let at_goal = self.pos + 1 == self.config.length;
            let is_done = at_goal || self.steps >= self.config.max_steps;
            let reward = if at_goal { 1. } else { -0.01 };
            let step = Step::new(self.obs(), a.clone(), reward, is_done, (), None);
            (step, Record::empty())
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.pos = 0;
            self.steps = 0;
            Ok(self.obs())
        }

        fn step_with_reset(&mut self, a: &Self::Act) -> (Step<Self>, Record) {
            let (mut step, record) = self.step(a);
            if step.is_done {
                step.init_obs = Some(self.reset().expect("gridworld reset cannot fail"));
            }
            (step, record)
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
            self.reset()
        }
    }
}

mod model {
    use super::*;

    /// Tabular action-value function with a fixed learning rate.
    ///
    /// Observations must be one-hot rows; the row width is the number of
    /// states.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TabularQ {
        n_states: usize,
        n_actions: usize,
        lr: f32,
        table: Vec<f32>,
    }

    impl TabularQ {
        pub fn new(n_states: usize, n_actions: usize, lr: f32) -> Self {
            Self {
                n_states,
                n_actions,
                lr,
                table: vec![0.; n_states * n_actions],
            }
        }

        fn state_of_row(&self, row: &[f32]) -> usize {
            let mut best = 0;
            for (i, v) in row.iter().enumerate() {
                if *v > row[best] {
                    best = i;
                }
            }
            best
        }
    }

    impl QModel for TabularQ {
        type ObsBatch = VecBatch;

        fn n_actions(&self) -> usize {
            self.n_actions
        }

        fn forward(&self, obs: &VecBatch) -> Vec<f32> {
            obs.as_slice()
                .chunks(self.n_states)
                .flat_map(|row| {
                    let s = self.state_of_row(row);
                    self.table[s * self.n_actions..(s + 1) * self.n_actions].to_vec()
                })
                .collect()
        }

        fn backward_step(&mut self, obs: &VecBatch, act: &[u32], tgt: &[f32]) -> Result<f32> {
            let mut loss = 0f32;
            for (row, (&a, &t)) in obs
                .as_slice()
                .chunks(self.n_states)
                .zip(act.iter().zip(tgt.iter()))
            {
                let s = self.state_of_row(row);
                let q = &mut self.table[s * self.n_actions + a as usize];
                loss += (t - *q) * (t - *q);
                *q += self.lr * (t - *q);
            }
            Ok(loss / act.len() as f32)
        }

        fn copy_from(&mut self, other: &Self) {
            self.table = other.table.clone();
        }

        fn save(&self, path: &Path) -> Result<()> {
            fs::write(path, serde_yaml::to_string(self)?)?;
            Ok(())
        }

        fn load(&mut self, path: &Path) -> Result<()> {
            *self = serde_yaml::from_str(&fs::read_to_string(path)?)?;
            Ok(())
        }
    }
}

use env::{Gridworld, GridworldConfig};
use model::TabularQ;

type StepProc = SimpleStepProcessor<Gridworld, VecBatch, DiscreteActBatch>;
type Memory = ReplayMemory<VecBatch, DiscreteActBatch>;
type Agent = Dqn<Gridworld, TabularQ, Memory>;
type Eval = DefaultEvaluator<Gridworld, Agent>;

fn env_config() -> GridworldConfig {
    GridworldConfig {
        length: GRID_LENGTH,
        max_steps: MAX_EPISODE_STEPS,
    }
}

fn agent_config() -> DqnConfig {
    DqnConfig::default()
        .batch_size(BATCH_SIZE)
        .discount_factor(DISCOUNT_FACTOR)
        .min_transitions_warmup(WARMUP_PERIOD)
        .sync_interval(SYNC_INTERVAL)
        .explorer(DqnExplorer::EpsilonGreedy(EpsilonGreedy {
            n_steps: 0,
            eps_init: 1.0,
            eps_final: 0.1,
            eps_terminal: 0.01,
            warmup_steps: WARMUP_PERIOD,
            final_step: 2000,
            terminal_step: 10_000,
        }))
}

fn build_agent() -> Agent {
    let qnet = TabularQ::new(GRID_LENGTH, N_ACTIONS, LEARNING_RATE);
    let qnet_tgt = qnet.clone();
    Dqn::build(agent_config(), qnet, qnet_tgt)
}

/// Train/eval a DQN agent in a gridworld environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Evaluate the agent stored in the model directory instead of
    /// training
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Directory for model parameters and TensorBoard logs
    #[arg(short, long, default_value = "model/dqn_gridworld")]
    model_dir: String,

    /// The number of optimization steps to train for
    #[arg(long, default_value_t = 3000)]
    max_opts: usize,
}

fn train(args: &Args) -> Result<()> {
    let trainer_config = TrainerConfig::default()
        .max_opts(args.max_opts)
        .opt_interval(OPT_INTERVAL)
        .warmup_period(WARMUP_PERIOD)
        .eval_interval(EVAL_INTERVAL)
        .flush_record_interval(FLUSH_INTERVAL)
        .record_compute_cost_interval(EVAL_INTERVAL)
        .save_interval(args.max_opts)
        .model_dir(&args.model_dir);
    let mut trainer: Trainer<Gridworld, StepProc, Memory> = Trainer::build(
        trainer_config,
        env_config(),
        SimpleStepProcessorConfig::default(),
        ReplayMemoryConfig::default().capacity(REPLAY_MEMORY_CAPACITY),
    );

    let mut agent = build_agent();
    let mut recorder = TensorboardRecorder::new(format!("{}/tb", args.model_dir));
    let mut evaluator = Eval::new(&env_config(), 0, N_EPISODES_PER_EVAL)?;

    trainer.train(&mut agent, &mut recorder, &mut evaluator)?;

    log::info!("Finished training, model saved under {}", args.model_dir);
    Ok(())
}

fn eval(args: &Args) -> Result<()> {
    let mut agent = build_agent();
    agent.load_params(Path::new(&format!("{}/best", args.model_dir)))?;
    agent.eval();

    let mut evaluator = Eval::new(&env_config(), 0, N_EPISODES_PER_EVAL)?;
    let eval_reward = evaluator.evaluate(&mut agent)?;
    println!("Mean evaluation return: {:.2}", eval_reward);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    let args = Args::parse();

    match args.eval {
        true => eval(&args),
        false => train(&args),
    }
}
