use super::Environment;
use crate::Action;
use crate::Percept;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// highest coordinate on either axis
const EDGE: i64 = 4;

const NORTH: Action = 0;
const EAST: Action = 1;
const SOUTH: Action = 2;
const WEST: Action = 3;

/// A featureless 5x5 board. The agent wanders blind (the observation is
/// always 0), collects 1 for standing on the far corner, and is then
/// dropped somewhere at random. Everything it can learn lives in the
/// model's memory of its own moves.
pub struct GridWorld {
    x: i64,
    y: i64,
    observation: Percept,
    reward: Percept,
    rng: SmallRng,
}

impl GridWorld {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let x = rng.random_range(0..=EDGE);
        let y = rng.random_range(0..=EDGE);
        Self {
            x,
            y,
            observation: 0,
            reward: 0,
            rng,
        }
    }

    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }
}

impl Environment for GridWorld {
    fn perform_action(&mut self, action: Action) {
        self.reward = 0;
        if (self.x, self.y) == (EDGE, EDGE) {
            self.reward = 1;
            self.x = self.rng.random_range(0..=EDGE);
            self.y = self.rng.random_range(0..=EDGE);
        }
        match action {
            NORTH => self.y += 1,
            EAST => self.x += 1,
            SOUTH => self.y -= 1,
            WEST => self.x -= 1,
            unknown => log::debug!("ignoring unknown move {}", unknown),
        }
        self.x = self.x.clamp(0, EDGE);
        self.y = self.y.clamp(0, EDGE);
        log::debug!("position {},{}", self.x, self.y);
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
    use rand::rngs::SmallRng;

    #[test]
    fn is_board_bounded() {
        let mut env = GridWorld::new(83);
        for turn in 0..200u64 {
            env.perform_action(turn % 4);
            let (x, y) = env.position();
            assert!((0..=EDGE).contains(&x));
            assert!((0..=EDGE).contains(&y));
            assert_eq!(env.observation(), 0);
            assert!(env.reward() <= 1);
        }
    }

    #[test]
    fn is_corner_paying_and_teleporting() {
        let mut env = GridWorld::new(89);
        env.x = EDGE;
        env.y = EDGE;
        env.perform_action(WEST);
        assert_eq!(env.reward(), 1);
    }

    #[test]
    fn is_wandering_eventually_paid() {
        let mut rng = SmallRng::seed_from_u64(91);
        let mut env = GridWorld::new(89);
        let mut collected = 0;
        for _ in 0..2000 {
            env.perform_action(rng.random_range(0..4));
            collected += env.reward();
        }
        assert!(collected > 0);
    }
}
