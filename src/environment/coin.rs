use super::Environment;
use crate::Action;
use crate::Percept;
use crate::Probability;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// A biased coin is flipped each cycle; the agent is paid 1 for calling
/// the flip and 0 otherwise. The flips ignore the agent entirely.
pub struct CoinFlip {
    bias: Probability,
    observation: Percept,
    reward: Percept,
    rng: SmallRng,
}

impl CoinFlip {
    pub fn new(bias: Probability, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let observation = Percept::from(rng.random::<f64>() < bias);
        Self {
            bias,
            observation,
            reward: 0,
            rng,
        }
    }
}

impl Environment for CoinFlip {
    fn perform_action(&mut self, action: Action) {
        self.observation = Percept::from(self.rng.random::<f64>() < self.bias);
        self.reward = Percept::from(action == self.observation);
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        self.reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_reward_paid_for_a_correct_call() {
        let mut env = CoinFlip::new(0.5, 53);
        for _ in 0..50 {
            env.perform_action(1);
            assert_eq!(env.reward(), Percept::from(env.observation() == 1));
        }
    }

    #[test]
    fn is_sure_coin_predictable() {
        let mut env = CoinFlip::new(1.0, 53);
        for _ in 0..10 {
            env.perform_action(1);
            assert_eq!(env.observation(), 1);
            assert_eq!(env.reward(), 1);
        }
    }

    #[test]
    fn is_flip_sequence_reproducible() {
        let mut a = CoinFlip::new(0.7, 61);
        let mut b = CoinFlip::new(0.7, 61);
        for _ in 0..20 {
            a.perform_action(0);
            b.perform_action(0);
            assert_eq!(a.observation(), b.observation());
        }
    }
}
