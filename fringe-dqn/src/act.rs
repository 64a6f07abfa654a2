//! Batched discrete actions.
use fringe_core::replay_memory::BatchBase;

/// A batch of discrete action indices.
///
/// DQN acts on a finite action set, so this is the natural action storage
/// of the replay memory: one `u32` index per transition.
#[derive(Clone, Debug)]
pub struct DiscreteActBatch {
    data: Vec<u32>,
    capacity: usize,
}

impl DiscreteActBatch {
    /// A batch of one action.
    pub fn from_act(act: u32) -> Self {
        Self {
            data: vec![act],
            capacity: 1,
        }
    }

    /// The stored action indices.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}

impl BatchBase for DiscreteActBatch {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            capacity,
        }
    }

    fn push(&mut self, ix: usize, data: Self) {
        let mut j = ix;
        for a in data.data.iter() {
            self.data[j] = *a;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        Self {
            data: ixs.iter().map(|&ix| self.data[ix]).collect(),
            capacity: ixs.len(),
        }
    }
}

impl From<DiscreteActBatch> for Vec<u32> {
    fn from(b: DiscreteActBatch) -> Self {
        b.data
    }
}
