//! Exploration strategies of DQN.
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};

/// Index of the largest Q-value in a row.
pub(crate) fn argmax(q: &[f32]) -> u32 {
    let mut best = 0;
    for (i, v) in q.iter().enumerate() {
        if *v > q[best] {
            best = i;
        }
    }
    best as u32
}

/// Explorers for DQN.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum DqnExplorer {
    /// Softmax action selection.
    Softmax(Softmax),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

/// Softmax explorer for DQN.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {}

#[allow(clippy::new_without_default)]
impl Softmax {
    /// Constructs a softmax explorer.
    pub fn new() -> Self {
        Self {}
    }

    /// Takes an action with probabilities proportional to `exp(q)`.
    ///
    /// * `q` - action values of a single observation.
    pub fn action(&mut self, q: &[f32], rng: &mut impl Rng) -> u32 {
        let max = q.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let weights = q.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
        WeightedIndex::new(&weights).unwrap().sample(rng) as u32
    }
}

/// Epsilon-greedy explorer for DQN with a piecewise-linear annealing
/// schedule.
///
/// The exploration rate stays at `eps_init` for `warmup_steps` acting
/// steps, decays linearly to `eps_final` at `final_step`, then decays
/// linearly to `eps_terminal` at `terminal_step` and stays there.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// The number of acting steps taken so far.
    pub n_steps: usize,

    /// Exploration rate during warmup.
    pub eps_init: f64,

    /// Exploration rate at the end of the first decay segment.
    pub eps_final: f64,

    /// Exploration rate after the second decay segment.
    pub eps_terminal: f64,

    /// Steps of pure exploration at `eps_init`.
    pub warmup_steps: usize,

    /// Step at which `eps_final` is reached.
    pub final_step: usize,

    /// Step at which `eps_terminal` is reached.
    pub terminal_step: usize,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs an epsilon-greedy explorer with the schedule of the
    /// classic Atari setting.
    pub fn new() -> Self {
        Self {
            n_steps: 0,
            eps_init: 1.0,
            eps_final: 0.1,
            eps_terminal: 0.01,
            warmup_steps: 10_000,
            final_step: 1_000_000,
            terminal_step: 25_000_000,
        }
    }

    /// Constructs an epsilon-greedy explorer reaching `eps_final` at the
    /// given step.
    pub fn with_final_step(final_step: usize) -> DqnExplorer {
        DqnExplorer::EpsilonGreedy(Self {
            final_step,
            terminal_step: 25 * final_step,
            ..Self::new()
        })
    }

    /// The exploration rate at acting step `n`.
    pub fn eps(&self, n: usize) -> f64 {
        if n < self.warmup_steps {
            self.eps_init
        } else if n < self.final_step {
            let d = (self.eps_final - self.eps_init)
                / (self.final_step - self.warmup_steps) as f64;
            self.eps_init + d * (n - self.warmup_steps) as f64
        } else if n < self.terminal_step {
            let d = (self.eps_terminal - self.eps_final)
                / (self.terminal_step - self.final_step) as f64;
            self.eps_final + d * (n - self.final_step) as f64
        } else {
            self.eps_terminal
        }
    }

    /// Takes an epsilon-greedy action and advances the schedule.
    ///
    /// * `q` - action values of a single observation.
    pub fn action(&mut self, q: &[f32], rng: &mut impl Rng) -> u32 {
        let eps = self.eps(self.n_steps);
        self.n_steps += 1;

        if rng.gen::<f64>() < eps {
            rng.gen_range(0..q.len()) as u32
        } else {
            argmax(q)
        }
    }

    /// Sets the exploration rate during warmup.
    pub fn eps_init(mut self, v: f64) -> Self {
        self.eps_init = v;
        self
    }

    /// Sets the exploration rate at the end of the first decay segment.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Sets the final exploration rate.
    pub fn eps_terminal(mut self, v: f64) -> Self {
        self.eps_terminal = v;
        self
    }

    /// Sets the number of warmup steps.
    pub fn warmup_steps(mut self, v: usize) -> Self {
        self.warmup_steps = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn schedule() -> EpsilonGreedy {
        EpsilonGreedy {
            n_steps: 0,
            eps_init: 1.0,
            eps_final: 0.1,
            eps_terminal: 0.01,
            warmup_steps: 100,
            final_step: 1100,
            terminal_step: 2100,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn schedule_is_piecewise_linear() {
        let eg = schedule();
        assert!(close(eg.eps(0), 1.0));
        assert!(close(eg.eps(99), 1.0));
        assert!(close(eg.eps(100), 1.0));
        assert!(close(eg.eps(600), 0.55));
        assert!(close(eg.eps(1100), 0.1));
        assert!(close(eg.eps(1600), 0.055));
        assert!(close(eg.eps(2100), 0.01));
        assert!(close(eg.eps(1_000_000), 0.01));
    }

    #[test]
    fn zero_eps_is_greedy() {
        let mut eg = schedule().eps_init(0.).eps_final(0.).eps_terminal(0.);
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(eg.action(&[0.5, 2.0, -1.0], &mut rng), 1);
        }
    }

    #[test]
    fn actions_stay_in_range() {
        let mut eg = schedule();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(eg.action(&[0.1, 0.2, 0.3], &mut rng) < 3);
        }
    }

    #[test]
    fn softmax_prefers_dominant_action() {
        let mut softmax = Softmax::new();
        let mut rng = SmallRng::seed_from_u64(2);
        let n_dominant = (0..200)
            .filter(|_| softmax.action(&[0., 10., 0.], &mut rng) == 1)
            .count();
        assert!(n_dominant > 150);
    }
}
