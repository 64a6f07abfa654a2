//! DQN agent.
use super::{
    config::DqnConfig,
    explorer::{argmax, DqnExplorer},
    model::QModel,
};
use anyhow::Result;
use fringe_core::{
    record::{Record, RecordValue},
    Agent, Env, ExperienceBufferBase, Policy, ReplayBufferBase, TransitionBatch,
};
use log::debug;
use rand::{rngs::SmallRng, SeedableRng};
use std::{fs, marker::PhantomData, path::Path};

/// DQN agent with a main and a target action-value function.
///
/// The agent is generic over the value-function backend `Q`; it computes
/// TD targets `r + gamma * max_a' Q_tgt(s', a')` (terminal transitions
/// bootstrap nothing) and delegates the actual gradient step to
/// [`QModel::backward_step`]. The target function is synced by a hard
/// parameter copy every `sync_interval` optimization steps.
///
/// In training mode actions come from the configured explorer; in
/// evaluation mode the agent acts greedily.
pub struct Dqn<E, Q, R>
where
    E: Env,
    Q: QModel,
    R: ReplayBufferBase,
{
    n_updates_per_opt: usize,
    min_transitions_warmup: usize,
    batch_size: usize,
    discount_factor: f64,
    sync_interval: usize,
    sync_counter: usize,
    double_dqn: bool,
    explorer: DqnExplorer,
    train: bool,
    n_opts: usize,
    qnet: Q,
    qnet_tgt: Q,
    rng: SmallRng,
    phantom: PhantomData<(E, R)>,
}

impl<E, Q, R> Dqn<E, Q, R>
where
    E: Env,
    Q: QModel,
    R: ReplayBufferBase,
    E::Obs: Into<Q::ObsBatch>,
    E::Act: From<u32>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::ObsBatch>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Vec<u32>>,
{
    /// Constructs a DQN agent from a configuration and two instances of
    /// the value-function backend.
    ///
    /// The parameters of `qnet_tgt` are overwritten with those of `qnet`,
    /// so the two functions start out identical.
    pub fn build(config: DqnConfig, qnet: Q, mut qnet_tgt: Q) -> Self {
        qnet_tgt.copy_from(&qnet);

        Self {
            n_updates_per_opt: config.n_updates_per_opt,
            min_transitions_warmup: config.min_transitions_warmup,
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            sync_interval: config.sync_interval,
            sync_counter: 0,
            double_dqn: config.double_dqn,
            explorer: config.explorer,
            train: false,
            n_opts: 0,
            qnet,
            qnet_tgt,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        }
    }

    /// The number of optimization steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn update_critic(&mut self, buffer: &mut R) -> Result<f32> {
        let batch = buffer.batch(self.batch_size)?;
        let (obs, act, next_obs, reward, is_terminated) = batch.unpack();
        let obs: Q::ObsBatch = obs.into();
        let act: Vec<u32> = act.into();
        let next_obs: Q::ObsBatch = next_obs.into();

        let n_actions = self.qnet.n_actions();
        let q_next = self.qnet_tgt.forward(&next_obs);
        let max_next: Vec<f32> = if self.double_dqn {
            // The online network picks the action, the target network
            // provides its value.
            let q_online = self.qnet.forward(&next_obs);
            q_online
                .chunks(n_actions)
                .zip(q_next.chunks(n_actions))
                .map(|(qo, qt)| qt[argmax(qo) as usize])
                .collect()
        } else {
            q_next
                .chunks(n_actions)
                .map(|row| row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b)))
                .collect()
        };

        let tgt: Vec<f32> = reward
            .iter()
            .zip(max_next.iter())
            .zip(is_terminated.iter())
            .map(|((&r, &q), &t)| match t {
                true => r,
                false => r + self.discount_factor as f32 * q,
            })
            .collect();

        self.qnet.backward_step(&obs, &act, &tgt)
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let mut loss = 0f32;

        for _ in 0..self.n_updates_per_opt {
            loss += self.update_critic(buffer)?;
        }
        loss /= self.n_updates_per_opt as f32;

        self.sync_counter += 1;
        if self.sync_counter == self.sync_interval {
            self.sync_counter = 0;
            self.qnet_tgt.copy_from(&self.qnet);
        }

        self.n_opts += 1;

        let mut record = Record::from_scalar("loss", loss);
        if let DqnExplorer::EpsilonGreedy(eg) = &self.explorer {
            record.insert("eps", RecordValue::Scalar(eg.eps(eg.n_steps) as f32));
        }
        Ok(record)
    }
}

impl<E, Q, R> Policy<E> for Dqn<E, Q, R>
where
    E: Env,
    Q: QModel,
    R: ReplayBufferBase,
    E::Obs: Into<Q::ObsBatch>,
    E::Act: From<u32>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::ObsBatch>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Vec<u32>>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let q = self.qnet.forward(&obs.clone().into());
        let a = if self.train {
            match &mut self.explorer {
                DqnExplorer::EpsilonGreedy(eg) => eg.action(&q, &mut self.rng),
                DqnExplorer::Softmax(softmax) => softmax.action(&q, &mut self.rng),
            }
        } else {
            argmax(&q)
        };
        a.into()
    }
}

impl<E, Q, R> Agent<E, R> for Dqn<E, Q, R>
where
    E: Env,
    Q: QModel,
    R: ExperienceBufferBase + ReplayBufferBase,
    E::Obs: Into<Q::ObsBatch>,
    E::Act: From<u32>,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Q::ObsBatch>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Vec<u32>>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    /// Skips the optimization step while the buffer holds fewer than
    /// `min_transitions_warmup` transitions or cannot serve a full
    /// minibatch yet.
    fn opt(&mut self, buffer: &mut R) -> Option<Record> {
        if buffer.len() < self.min_transitions_warmup {
            return None;
        }
        match self.opt_(buffer) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipped an optimization step: {}", e);
                None
            }
        }
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(&path.join("qnet"))?;
        self.qnet_tgt.save(&path.join("qnet_tgt"))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(&path.join("qnet"))?;
        self.qnet_tgt.load(&path.join("qnet_tgt"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{act::DiscreteActBatch, dqn::EpsilonGreedy};
    use fringe_core::{
        replay_memory::{ReplayMemory, Transition, VecBatch},
        Step,
    };
    use std::{cell::Cell, cell::RefCell, rc::Rc};

    #[derive(Clone, Debug)]
    struct TObs(f32);

    impl fringe_core::Obs for TObs {}

    impl From<TObs> for VecBatch {
        fn from(obs: TObs) -> Self {
            VecBatch::from_row(vec![obs.0])
        }
    }

    #[derive(Clone, Debug)]
    struct TAct(u32);

    impl fringe_core::Act for TAct {}

    impl From<u32> for TAct {
        fn from(a: u32) -> Self {
            TAct(a)
        }
    }

    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();
        type Obs = TObs;
        type Act = TAct;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn step(&mut self, _a: &Self::Act) -> (Step<Self>, Record) {
            unimplemented!();
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            unimplemented!();
        }

        fn step_with_reset(&mut self, _a: &Self::Act) -> (Step<Self>, Record) {
            unimplemented!();
        }

        fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
            unimplemented!();
        }
    }

    type Memory = ReplayMemory<VecBatch, DiscreteActBatch>;
    type TestDqn = Dqn<TestEnv, MockQ, Memory>;

    /// Returns the same Q-value row for every observation and captures
    /// the arguments of every backward step.
    #[derive(Clone)]
    struct MockQ {
        q_row: Vec<f32>,
        calls: Rc<RefCell<Vec<(Vec<f32>, Vec<u32>, Vec<f32>)>>>,
        n_syncs: Rc<Cell<usize>>,
    }

    impl MockQ {
        fn new(q_row: Vec<f32>) -> Self {
            Self {
                q_row,
                calls: Rc::new(RefCell::new(vec![])),
                n_syncs: Rc::new(Cell::new(0)),
            }
        }
    }

    impl QModel for MockQ {
        type ObsBatch = VecBatch;

        fn n_actions(&self) -> usize {
            self.q_row.len()
        }

        fn forward(&self, obs: &VecBatch) -> Vec<f32> {
            (0..obs.n_rows()).flat_map(|_| self.q_row.clone()).collect()
        }

        fn backward_step(&mut self, obs: &VecBatch, act: &[u32], tgt: &[f32]) -> Result<f32> {
            self.calls
                .borrow_mut()
                .push((obs.as_slice().to_vec(), act.to_vec(), tgt.to_vec()));
            Ok(0.5)
        }

        fn copy_from(&mut self, other: &Self) {
            self.q_row = other.q_row.clone();
            self.n_syncs.set(self.n_syncs.get() + 1);
        }

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn load(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn greedy_config() -> DqnConfig {
        DqnConfig::default()
            .batch_size(4)
            .min_transitions_warmup(1)
            .sync_interval(1000)
            .explorer(DqnExplorer::EpsilonGreedy(
                EpsilonGreedy::new().eps_init(0.).eps_final(0.).eps_terminal(0.),
            ))
    }

    /// Observation of transition `k` is `k`, its reward is `k`, and it
    /// terminates iff `k == 2`.
    fn filled_memory(n: usize) -> Memory {
        let mut memory = Memory::new(10, 1).unwrap();
        for k in 0..n {
            memory.push(Transition {
                obs: VecBatch::from_row(vec![k as f32]),
                act: DiscreteActBatch::from_act(k as u32 % 2),
                next_obs: VecBatch::from_row(vec![k as f32 + 1.]),
                reward: k as f32,
                is_terminated: k == 2,
            });
        }
        memory
    }

    #[test]
    fn computes_td_targets() {
        let qnet = MockQ::new(vec![1., 2.]);
        let calls = qnet.calls.clone();
        let mut agent: TestDqn = Dqn::build(greedy_config(), qnet, MockQ::new(vec![0., 0.]));
        let mut memory = filled_memory(6);

        let record = agent.opt(&mut memory).unwrap();
        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        let (obs, act, tgt) = &calls[0];
        assert_eq!(obs.len(), 4);

        // The target network was synced with the online one at build
        // time, so max_a' Q_tgt(s', a') == 2 everywhere.
        for j in 0..4 {
            let k = obs[j];
            assert_eq!(act[j], k as u32 % 2);
            let expected = match k as u32 == 2 {
                true => k,
                false => k + 0.99 * 2.,
            };
            assert!((tgt[j] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn syncs_target_network_at_interval() {
        let qnet = MockQ::new(vec![1., 2.]);
        let qnet_tgt = MockQ::new(vec![1., 2.]);
        let n_syncs = qnet_tgt.n_syncs.clone();
        let config = greedy_config().sync_interval(2);
        let mut agent: TestDqn = Dqn::build(config, qnet, qnet_tgt);
        let mut memory = filled_memory(6);

        // One sync from the initial copy at build time.
        assert_eq!(n_syncs.get(), 1);

        agent.opt(&mut memory).unwrap();
        assert_eq!(n_syncs.get(), 1);
        agent.opt(&mut memory).unwrap();
        assert_eq!(n_syncs.get(), 2);
        assert_eq!(agent.n_opts(), 2);
    }

    #[test]
    fn skips_opt_during_warmup() {
        let config = greedy_config().min_transitions_warmup(100);
        let mut agent: TestDqn =
            Dqn::build(config, MockQ::new(vec![1., 2.]), MockQ::new(vec![1., 2.]));
        let mut memory = filled_memory(5);

        assert!(agent.opt(&mut memory).is_none());
    }

    #[test]
    fn skips_opt_on_insufficient_data() {
        let config = greedy_config().batch_size(8);
        let mut agent: TestDqn =
            Dqn::build(config, MockQ::new(vec![1., 2.]), MockQ::new(vec![1., 2.]));
        let mut memory = filled_memory(5);

        assert!(agent.opt(&mut memory).is_none());
    }

    #[test]
    fn acts_greedily_in_eval_mode() {
        let mut agent: TestDqn = Dqn::build(
            greedy_config(),
            MockQ::new(vec![1., 2.]),
            MockQ::new(vec![1., 2.]),
        );
        agent.eval();

        for _ in 0..10 {
            let TAct(a) = agent.sample(&TObs(0.));
            assert_eq!(a, 1);
        }
    }
}
