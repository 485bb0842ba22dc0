use super::Environment;
use crate::Action;
use crate::Percept;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const ROCK: Percept = 0;

/// shifts the -1..=1 round outcome into the unsigned domain
const OFFSET: i64 = 1;

/// Rock-paper-scissors against an exploitable opponent: whenever it wins
/// a round with rock it plays rock again, otherwise it plays uniformly.
/// The observation is the opponent's move; a perceptive agent answers the
/// repeat with paper.
pub struct BiasedRps {
    repeat_rock: bool,
    observation: Percept,
    signed_reward: i64,
    rng: SmallRng,
}

impl BiasedRps {
    pub fn new(seed: u64) -> Self {
        Self {
            repeat_rock: false,
            observation: 0,
            signed_reward: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

/// a beats b in the 0=rock, 1=scissors, 2=paper cycle
fn beats(a: u64, b: u64) -> bool {
    (a + 1) % 3 == b
}

impl Environment for BiasedRps {
    fn perform_action(&mut self, action: Action) {
        self.observation = if self.repeat_rock {
            ROCK
        } else {
            self.rng.random_range(0..3)
        };
        self.signed_reward = if beats(action, self.observation) {
            1
        } else if action == self.observation {
            0
        } else {
            -1
        };
        self.repeat_rock = self.observation == ROCK && self.signed_reward == -1;
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        (self.signed_reward + OFFSET) as Percept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCISSORS: Action = 1;
    const PAPER: Action = 2;

    #[test]
    fn is_outcome_inside_two_bits() {
        let mut env = BiasedRps::new(97);
        for turn in 0..100u64 {
            env.perform_action(turn % 3);
            assert!(env.observation() < 3);
            assert!(env.reward() < 3);
        }
    }

    #[test]
    fn is_winning_rock_repeated() {
        let mut env = BiasedRps::new(101);
        // keep throwing scissors until rock beats it, then the opponent
        // is locked onto rock for as long as rock keeps winning
        for _ in 0..100 {
            env.perform_action(SCISSORS);
            if env.observation() == ROCK {
                break;
            }
        }
        assert_eq!(env.observation(), ROCK);
        for _ in 0..10 {
            env.perform_action(SCISSORS);
            assert_eq!(env.observation(), ROCK);
            assert_eq!(env.reward(), 0);
        }
        // paper breaks the streak
        env.perform_action(PAPER);
        assert_eq!(env.observation(), ROCK);
        assert_eq!(env.reward(), 2);
    }
}
