use super::agent::Agent;
use super::agent::Phase;
use crate::Age;
use crate::Reward;
use crate::Weight;

/// A save-point sufficient to rewind an agent to an earlier cycle. It
/// carries scalars only; the context tree itself is rewound by replaying
/// reverts, never by deep copy.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    age: Age,
    total_reward: Reward,
    history_size: usize,
    phase: Phase,
    log_block: Weight,
}

impl From<&Agent> for Snapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            age: agent.age(),
            total_reward: agent.total_reward(),
            history_size: agent.history_size(),
            phase: agent.phase(),
            log_block: agent.model().log_block_probability(),
        }
    }
}

impl Snapshot {
    pub fn age(&self) -> Age {
        self.age
    }

    pub fn total_reward(&self) -> Reward {
        self.total_reward
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// block log-probability at capture time, checked on restore
    pub fn log_block(&self) -> Weight {
        self.log_block
    }
}
