use super::undo::Snapshot;
use crate::Action;
use crate::Age;
use crate::Percept;
use crate::Reward;
use crate::coding;
use crate::config::Settings;
use crate::model::ContextTree;
use rand::Rng;

/// Which half of the interaction cycle the model expects next. The
/// percept/action alternation is a hard protocol: every update checks it,
/// and rewinding walks it backwards unit by unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Percept,
    Action,
}

/// The agent's mind: one context tree over the interleaved bit encoding
/// of everything it has seen and done, plus the bookkeeping scalars. The
/// agent encodes percepts and actions as bits, feeds them to the model,
/// and serves the planner as its own simulator of the world.
pub struct Agent {
    actions: Action,
    action_bits: u32,
    observation_bits: u32,
    reward_bits: u32,
    horizon: usize,
    simulations: usize,
    model: ContextTree,
    age: Age,
    total_reward: Reward,
    phase: Phase,
}

/// bits needed to address n alternatives
fn width(n: u64) -> u32 {
    (n.max(2) - 1).ilog2() + 1
}

/// largest value representable in `width` bits
fn ceiling(width: u32) -> Percept {
    (1 << width) - 1
}

fn clamped(value: Percept, width: u32, label: &str) -> Percept {
    let max = ceiling(width);
    if value > max {
        log::warn!("{} {} exceeds {} bits, clamping to {}", label, value, width, max);
        max
    } else {
        value
    }
}

impl Agent {
    pub fn new(settings: &Settings) -> Self {
        Self {
            actions: settings.agent_actions,
            action_bits: width(settings.agent_actions),
            observation_bits: settings.observation_bits,
            reward_bits: settings.reward_bits,
            horizon: settings.agent_horizon,
            simulations: settings.mc_simulations,
            model: ContextTree::new(settings.ct_depth),
            age: 0,
            total_reward: 0.0,
            phase: Phase::Percept,
        }
    }

    /// completed interaction cycles
    pub fn age(&self) -> Age {
        self.age
    }

    pub fn total_reward(&self) -> Reward {
        self.total_reward
    }

    pub fn average_reward(&self) -> Reward {
        match self.age {
            0 => 0.0,
            age => self.total_reward / age as Reward,
        }
    }

    /// largest reward a single percept can carry
    pub fn max_reward(&self) -> Reward {
        ceiling(self.reward_bits) as Reward
    }

    pub fn min_reward(&self) -> Reward {
        0.0
    }

    pub fn num_actions(&self) -> Action {
        self.actions
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn simulations(&self) -> usize {
        self.simulations
    }

    pub fn history_size(&self) -> usize {
        self.model.history_len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn model(&self) -> &ContextTree {
        &self.model
    }

    /// Absorb a percept from the environment: observation bits first, then
    /// reward bits, all through the model. Values wider than their
    /// configured widths are clamped rather than corrupting the stream.
    pub fn model_update_percept(&mut self, observation: Percept, reward: Percept) {
        assert!(self.phase == Phase::Percept, "percept update out of turn");
        let observation = clamped(observation, self.observation_bits, "observation");
        let reward = clamped(reward, self.reward_bits, "reward");
        let mut symbols = Vec::with_capacity((self.observation_bits + self.reward_bits) as usize);
        coding::encode(&mut symbols, observation, self.observation_bits);
        coding::encode(&mut symbols, reward, self.reward_bits);
        self.model.update_all(&symbols);
        self.total_reward += reward as Reward;
        self.phase = Phase::Action;
    }

    /// Absorb the agent's own action. Actions join the model's history as
    /// context but are not themselves predicted, so only the history moves.
    pub fn model_update_action(&mut self, action: Action) {
        assert!(self.phase == Phase::Action, "action update out of turn");
        assert!(action < self.actions, "action {} out of range", action);
        let mut symbols = Vec::with_capacity(self.action_bits as usize);
        coding::encode(&mut symbols, action, self.action_bits);
        self.model.update_history(&symbols);
        self.age += 1;
        self.phase = Phase::Percept;
    }

    /// Dream one percept from the model and absorb it, exactly as if the
    /// environment had produced it. This is the planner's simulator.
    pub fn gen_percept_and_update<R: Rng>(&mut self, rng: &mut R) -> (Percept, Percept) {
        assert!(self.phase == Phase::Percept, "percept update out of turn");
        let count = (self.observation_bits + self.reward_bits) as usize;
        let symbols = self.model.gen_random_symbols_and_update(rng, count);
        let observation = coding::decode(&symbols[..self.observation_bits as usize], self.observation_bits);
        let reward = coding::decode(&symbols[self.observation_bits as usize..], self.reward_bits);
        self.total_reward += reward as Reward;
        self.phase = Phase::Action;
        (observation, reward)
    }

    pub fn gen_random_action<R: Rng>(&self, rng: &mut R) -> Action {
        rng.random_range(0..self.actions)
    }

    pub fn save_point(&self) -> Snapshot {
        Snapshot::from(self)
    }

    /// Rewind to a save-point by replaying reverts, walking the
    /// percept/action alternation backwards one unit at a time. The block
    /// probability must land back on its captured value.
    pub fn model_revert(&mut self, undo: &Snapshot) {
        assert!(
            undo.history_size() <= self.model.history_len(),
            "snapshot is ahead of the model"
        );
        while self.model.history_len() > undo.history_size() {
            match self.phase {
                // the most recent unit is a percept: pull its bits back
                // out of the tree
                Phase::Action => {
                    for _ in 0..self.observation_bits + self.reward_bits {
                        self.model.revert();
                    }
                    self.phase = Phase::Percept;
                }
                // the most recent unit is an action: it never entered the
                // tree, so only the history shrinks
                Phase::Percept => {
                    let size = self.model.history_len() - self.action_bits as usize;
                    self.model.revert_history(size);
                    self.phase = Phase::Action;
                }
            }
        }
        self.age = undo.age();
        self.total_reward = undo.total_reward();
        self.phase = undo.phase();
        let drift = (self.model.log_block_probability() - undo.log_block()).abs();
        assert!(
            drift < crate::REVERT_PRECISION,
            "block probability drifted by {} across a save/revert cycle",
            drift
        );
    }

    /// Seal everything observed so far; the live loop calls this once per
    /// cycle since nothing before the present can ever be rewound.
    pub fn commit(&mut self) {
        self.model.commit();
    }
}
