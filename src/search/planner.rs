use super::node::DecisionNode;
use crate::Action;
use crate::Reward;
use crate::agent::Agent;
use rand::Rng;

/// Walk the agent's model through `length` cycles of uniformly random
/// actions, accumulating the dreamed rewards. This values a decision node
/// on its first visit, before any statistics exist to steer by. The model
/// is left rolled forward; the caller owns the rewind.
pub(crate) fn playout<R: Rng>(agent: &mut Agent, rng: &mut R, length: usize) -> Reward {
    let mut reward = 0.0;
    for _ in 0..length {
        let action = agent.gen_random_action(rng);
        agent.model_update_action(action);
        let (_, dreamed) = agent.gen_percept_and_update(rng);
        reward += dreamed as Reward;
    }
    reward
}

/// Pick the agent's next action by ρUCT: grow a fresh planning tree with
/// one simulation per budget unit, each rolled forward through the agent's
/// own model and rewound to the save-point afterwards, then take the root
/// child with the highest mean return. An unvisited root falls back to a
/// random action. The tree dies with the decision.
pub fn search<R: Rng>(agent: &mut Agent, rng: &mut R) -> Action {
    let undo = agent.save_point();
    let horizon = agent.horizon();
    let mut root = DecisionNode::default();
    for _ in 0..agent.simulations() {
        root.sample(agent, rng, horizon);
        agent.model_revert(&undo);
    }
    root.best_action(rng)
        .unwrap_or_else(|| agent.gen_random_action(rng))
}
