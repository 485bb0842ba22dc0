use super::Environment;
use crate::Action;
use crate::Percept;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const PASS: u64 = 0;
const BET: u64 = 1;

/// shifts the -2..=2 pot swing into the unsigned domain
const OFFSET: i64 = 2;

/// One-card poker from a three-card deck, one round per cycle, against an
/// opponent who bets at random. The observation packs the agent's card
/// with the opponent's opening action; the reward is the agent's net take
/// from the pot after the betting resolves.
pub struct KuhnPoker {
    player_card: u64,
    opponent_card: u64,
    opponent_action: u64,
    observation: Percept,
    signed_reward: i64,
    rng: SmallRng,
}

impl KuhnPoker {
    pub fn new(seed: u64) -> Self {
        let mut round = Self {
            player_card: 0,
            opponent_card: 0,
            opponent_action: PASS,
            observation: 0,
            signed_reward: 0,
            rng: SmallRng::seed_from_u64(seed),
        };
        round.deal();
        round
    }

    /// deal fresh cards, let the opponent open, and expose the result
    fn deal(&mut self) {
        self.opponent_card = self.rng.random_range(0..3);
        self.player_card = (self.opponent_card + self.rng.random_range(1..3)) % 3;
        self.opponent_action = self.rng.random_range(0..2);
        self.observation = 2 * self.player_card + self.opponent_action;
    }

    fn showdown(&self) -> bool {
        self.player_card > self.opponent_card
    }
}

impl Environment for KuhnPoker {
    fn perform_action(&mut self, action: Action) {
        let mut pot = 2;
        let mut investment = 1;
        let won = match (self.opponent_action, action) {
            (PASS, PASS) => self.showdown(),
            (PASS, _) => {
                pot += 1;
                investment += 1;
                if self.rng.random_range(0..2) == PASS {
                    // opponent folds to the raise
                    true
                } else {
                    pot += 1;
                    self.showdown()
                }
            }
            (BET, PASS) => false,
            (BET, _) => {
                pot += 2;
                investment += 1;
                self.showdown()
            }
            _ => unreachable!("opponent_action is always PASS or BET"),
        };
        self.signed_reward = if won { pot - investment } else { -investment };
        self.deal();
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        (self.signed_reward + OFFSET) as Percept
    }
}
