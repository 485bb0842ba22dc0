use super::Environment;
use crate::Action;
use crate::Percept;
use crate::Probability;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const OPEN_LEFT: Action = 0;
const OPEN_RIGHT: Action = 1;
const LISTEN: Action = 2;

/// observation when nothing has been heard
const SILENCE: Percept = 2;

/// shifts the -100..=10 reward range into the unsigned domain
const OFFSET: i64 = 100;

/// Two doors, gold behind one, a tiger behind the other. Listening costs
/// 1 and reports the tiger's door with some accuracy; opening pays 10 for
/// gold, -100 for tiger, and redeals the doors either way.
pub struct Tiger {
    gold_bias: Probability,
    listen_accuracy: Probability,
    gold_door: Percept,
    observation: Percept,
    signed_reward: i64,
    rng: SmallRng,
}

impl Tiger {
    pub fn new(gold_bias: Probability, listen_accuracy: Probability, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let gold_door = Percept::from(rng.random::<f64>() < gold_bias);
        Self {
            gold_bias,
            listen_accuracy,
            gold_door,
            observation: SILENCE,
            signed_reward: 0,
            rng,
        }
    }

    fn tiger_door(&self) -> Percept {
        1 - self.gold_door
    }
}

impl Environment for Tiger {
    fn perform_action(&mut self, action: Action) {
        match action {
            LISTEN => {
                self.signed_reward = -1;
                self.observation = if self.rng.random::<f64>() < self.listen_accuracy {
                    self.tiger_door()
                } else {
                    self.gold_door
                };
            }
            door => {
                self.signed_reward = match door {
                    OPEN_LEFT | OPEN_RIGHT if door == self.gold_door => 10,
                    _ => -100,
                };
                self.observation = SILENCE;
                self.gold_door = Percept::from(self.rng.random::<f64>() < self.gold_bias);
            }
        }
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

    #[test]
    fn is_listening_costly() {
        let mut env = Tiger::new(0.5, 0.85, 67);
        env.perform_action(LISTEN);
        assert_eq!(env.reward(), 99);
        assert!(env.observation() < SILENCE);
    }

    #[test]
    fn is_opening_decisive() {
        let mut env = Tiger::new(0.5, 0.85, 71);
        for _ in 0..30 {
            env.perform_action(OPEN_LEFT);
            assert!(env.reward() == 110 || env.reward() == 0);
            assert_eq!(env.observation(), SILENCE);
        }
    }

    #[test]
    fn is_reward_inside_seven_bits() {
        let mut env = Tiger::new(0.5, 0.85, 73);
        for turn in 0..60u64 {
            env.perform_action(turn % 3);
            assert!(env.reward() < 128);
            assert!(env.observation() < 4);
        }
    }

    #[test]
    fn is_perfect_listening_truthful() {
        let mut env = Tiger::new(0.5, 1.0, 79);
        env.perform_action(LISTEN);
        let heard = env.observation();
        // the heard door hides the tiger; opening the other one pays out
        env.perform_action(1 - heard);
        assert_eq!(env.reward(), 110);
    }
}
