use super::planner::playout;
use crate::Action;
use crate::Percept;
use crate::Reward;
use crate::agent::Agent;
use rand::Rng;
use std::collections::BTreeMap;

/// A planning-tree node where the agent is to move. Children are indexed
/// by candidate action and lead to chance nodes. Keeping the two roles as
/// two types keeps action keys and percept keys from ever crossing.
#[derive(Default)]
pub struct DecisionNode {
    visits: u64,
    mean: Reward,
    children: BTreeMap<Action, ChanceNode>,
}

/// A planning-tree node where the model is to move. Children are indexed
/// by the sampled (observation, reward) pair and lead back to decision
/// nodes.
#[derive(Default)]
pub struct ChanceNode {
    visits: u64,
    mean: Reward,
    children: BTreeMap<(Percept, Percept), DecisionNode>,
}

impl DecisionNode {
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// running mean of the total reward sampled through this node
    pub fn mean(&self) -> Reward {
        self.mean
    }

    pub fn child(&self, action: Action) -> Option<&ChanceNode> {
        self.children.get(&action)
    }

    /// One rollout through this node with `horizon` cycles to go. A first
    /// visit is valued by a random playout; afterwards UCB picks an action,
    /// the agent's model moves forward with it, and the rollout continues
    /// through the matching chance node. The agent is deliberately not
    /// rewound here; the planner rewinds once per simulation at the top.
    pub fn sample<R: Rng>(&mut self, agent: &mut Agent, rng: &mut R, horizon: usize) -> Reward {
        if horizon == 0 {
            return 0.0;
        }
        let reward = if self.visits == 0 {
            playout(agent, rng, horizon)
        } else {
            let action = self.select_action(agent, rng);
            agent.model_update_action(action);
            self.children
                .entry(action)
                .or_default()
                .sample(agent, rng, horizon)
        };
        self.absorb(reward);
        reward
    }

    /// UCB1 over the actions, normalized by the best possible return over
    /// the horizon. Anything unexplored is tried first, uniformly.
    fn select_action<R: Rng>(&self, agent: &Agent, rng: &mut R) -> Action {
        let unexplored = (0..agent.num_actions())
            .filter(|a| self.children.get(a).is_none_or(|c| c.visits() == 0))
            .collect::<Vec<_>>();
        if !unexplored.is_empty() {
            return unexplored[rng.random_range(0..unexplored.len())];
        }
        let normalizer = agent.horizon() as Reward * agent.max_reward();
        let mut best = Vec::new();
        let mut score = f64::NEG_INFINITY;
        for (&action, child) in &self.children {
            let exploit = child.mean() / normalizer;
            let explore = ((self.visits as f64).ln() / child.visits() as f64).sqrt();
            let ucb = exploit + crate::UCB_EXPLORATION * explore;
            if ucb > score {
                score = ucb;
                best.clear();
                best.push(action);
            } else if ucb == score {
                best.push(action);
            }
        }
        best[rng.random_range(0..best.len())]
    }

    /// the visited child with the highest mean return, ties uniform
    pub fn best_action<R: Rng>(&self, rng: &mut R) -> Option<Action> {
        let mut best = Vec::new();
        let mut mean = f64::NEG_INFINITY;
        for (&action, child) in self.children.iter().filter(|(_, c)| c.visits() > 0) {
            if child.mean() > mean {
                mean = child.mean();
                best.clear();
                best.push(action);
            } else if child.mean() == mean {
                best.push(action);
            }
        }
        if best.is_empty() {
            None
        } else {
            Some(best[rng.random_range(0..best.len())])
        }
    }

    fn absorb(&mut self, reward: Reward) {
        self.mean = (reward + self.visits as Reward * self.mean) / (self.visits as Reward + 1.0);
        self.visits += 1;
    }
}

impl ChanceNode {
    pub fn visits(&self) -> u64 {
        self.visits
    }

    pub fn mean(&self) -> Reward {
        self.mean
    }

    pub fn child(&self, observation: Percept, reward: Percept) -> Option<&DecisionNode> {
        self.children.get(&(observation, reward))
    }

    /// One rollout through this node: the model dreams a percept, the
    /// rollout descends into the decision node for that percept with one
    /// fewer cycle to go, and the dreamed reward joins the return.
    pub fn sample<R: Rng>(&mut self, agent: &mut Agent, rng: &mut R, horizon: usize) -> Reward {
        if horizon == 0 {
            return 0.0;
        }
        let (observation, reward) = agent.gen_percept_and_update(rng);
        let future = self
            .children
            .entry((observation, reward))
            .or_default()
            .sample(agent, rng, horizon - 1);
        let reward = reward as Reward + future;
        self.absorb(reward);
        reward
    }

    fn absorb(&mut self, reward: Reward) {
        self.mean = (reward + self.visits as Reward * self.mean) / (self.visits as Reward + 1.0);
        self.visits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentKind;
    use crate::config::Settings;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn agent(actions: u64) -> Agent {
        Agent::new(&Settings {
            environment: EnvironmentKind::CoinFlip,
            ct_depth: 4,
            agent_horizon: 3,
            mc_simulations: 16,
            agent_actions: actions,
            observation_bits: 1,
            reward_bits: 1,
            exploration: 0.0,
            explore_decay: 1.0,
            terminate_age: None,
            seed: 0,
            coin_flip_p: 0.7,
            left_door_p: 0.5,
            listen_p: 0.85,
        })
    }

    #[test]
    fn is_selection_visiting_every_action_first() {
        let mut rng = SmallRng::seed_from_u64(29);
        let mut agent = agent(3);
        agent.model_update_percept(1, 0);
        let undo = agent.save_point();
        let mut root = DecisionNode::default();
        // the first visit is a playout; the next three must each open a
        // distinct untried action before UCB takes over
        for _ in 0..4 {
            root.sample(&mut agent, &mut rng, 3);
            agent.model_revert(&undo);
        }
        assert_eq!(root.visits(), 4);
        assert_eq!(root.children.len(), 3);
        assert!((0..3).all(|a| root.child(a).is_some_and(|c| c.visits() == 1)));
    }

    #[test]
    fn is_backpropagation_averaging() {
        let mut node = DecisionNode::default();
        node.absorb(2.0);
        node.absorb(1.0);
        node.absorb(0.0);
        assert_eq!(node.visits(), 3);
        assert!((node.mean() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn is_terminal_sample_worthless() {
        let mut rng = SmallRng::seed_from_u64(31);
        let mut agent = agent(2);
        agent.model_update_percept(1, 1);
        let mut root = DecisionNode::default();
        // an exhausted horizon contributes nothing, not even a visit
        assert_eq!(root.sample(&mut agent, &mut rng, 0), 0.0);
        assert_eq!(root.visits(), 0);
        assert!(root.children.is_empty());
    }

    #[test]
    fn is_unvisited_tree_returning_no_action() {
        let mut rng = SmallRng::seed_from_u64(37);
        let root = DecisionNode::default();
        assert_eq!(root.best_action(&mut rng), None);
    }

    #[test]
    fn is_best_action_by_mean_not_visits() {
        let mut rng = SmallRng::seed_from_u64(41);
        let mut root = DecisionNode::default();
        let mut poor = ChanceNode::default();
        poor.absorb(0.0);
        poor.absorb(0.0);
        poor.absorb(0.0);
        let mut rich = ChanceNode::default();
        rich.absorb(2.0);
        root.children.insert(0, poor);
        root.children.insert(1, rich);
        assert_eq!(root.best_action(&mut rng), Some(1));
    }
}
