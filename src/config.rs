use crate::Age;
use crate::environment::BiasedRps;
use crate::environment::CoinFlip;
use crate::environment::Environment;
use crate::environment::GridWorld;
use crate::environment::KuhnPoker;
use crate::environment::Pacman;
use crate::environment::Tiger;
use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;

/// The command line surface. Core keys left unset are filled from the
/// chosen environment's defaults before anything runs.
#[derive(Debug, Parser)]
#[command(name = "mcaixi", about = "a general reinforcement learning agent")]
pub struct Options {
    /// environment driver to run against
    #[arg(long, value_enum)]
    pub environment: EnvironmentKind,
    /// maximum context depth of the agent's model
    #[arg(long)]
    pub ct_depth: Option<usize>,
    /// planning horizon in cycles
    #[arg(long)]
    pub agent_horizon: Option<usize>,
    /// simulations per decision
    #[arg(long)]
    pub mc_simulations: Option<usize>,
    /// number of discrete actions
    #[arg(long)]
    pub agent_actions: Option<u64>,
    /// bits per observation
    #[arg(long)]
    pub observation_bits: Option<u32>,
    /// bits per reward
    #[arg(long)]
    pub reward_bits: Option<u32>,
    /// chance of taking a random action instead of planning
    #[arg(long, default_value_t = 0.0)]
    pub exploration: f64,
    /// multiplicative decay of the exploration rate, per cycle
    #[arg(long, default_value_t = 1.0)]
    pub explore_decay: f64,
    /// stop after this many cycles
    #[arg(long)]
    pub terminate_age: Option<Age>,
    /// seed for every stream of randomness in the run
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// heads probability for the coin-flip environment
    #[arg(long, default_value_t = 0.7)]
    pub coin_flip_p: f64,
    /// probability the gold is redealt behind the left door
    #[arg(long, default_value_t = 0.5)]
    pub left_door_p: f64,
    /// accuracy of listening at the tiger doors
    #[arg(long, default_value_t = 0.85)]
    pub listen_p: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentKind {
    CoinFlip,
    Tiger,
    GridWorld,
    BiasedRps,
    KuhnPoker,
    Pacman,
}

impl EnvironmentKind {
    /// (model depth, horizon, actions, observation bits, reward bits)
    fn defaults(self) -> (usize, usize, u64, u32, u32) {
        match self {
            Self::CoinFlip => (4, 16, 2, 1, 1),
            Self::Tiger => (36, 5, 3, 2, 7),
            Self::GridWorld => (36, 12, 4, 1, 1),
            Self::BiasedRps => (32, 4, 3, 2, 2),
            Self::KuhnPoker => (42, 2, 2, 3, 3),
            Self::Pacman => (96, 4, 4, 16, 8),
        }
    }
}

/// Everything a run needs, resolved and validated once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: EnvironmentKind,
    pub ct_depth: usize,
    pub agent_horizon: usize,
    pub mc_simulations: usize,
    pub agent_actions: u64,
    pub observation_bits: u32,
    pub reward_bits: u32,
    pub exploration: f64,
    pub explore_decay: f64,
    pub terminate_age: Option<Age>,
    pub seed: u64,
    pub coin_flip_p: f64,
    pub left_door_p: f64,
    pub listen_p: f64,
}

impl Settings {
    pub fn resolve(options: Options) -> anyhow::Result<Self> {
        let (depth, horizon, actions, observation, reward) = options.environment.defaults();
        let settings = Self {
            environment: options.environment,
            ct_depth: options.ct_depth.unwrap_or(depth),
            agent_horizon: options.agent_horizon.unwrap_or(horizon),
            mc_simulations: options.mc_simulations.unwrap_or(100),
            agent_actions: options.agent_actions.unwrap_or(actions),
            observation_bits: options.observation_bits.unwrap_or(observation),
            reward_bits: options.reward_bits.unwrap_or(reward),
            exploration: options.exploration,
            explore_decay: options.explore_decay,
            terminate_age: options.terminate_age,
            seed: options.seed,
            coin_flip_p: options.coin_flip_p,
            left_door_p: options.left_door_p,
            listen_p: options.listen_p,
        };
        if settings.ct_depth == 0 {
            bail!("ct-depth must be a positive integer");
        }
        if settings.agent_horizon == 0 {
            bail!("agent-horizon must be a positive integer");
        }
        if settings.mc_simulations == 0 {
            bail!("mc-simulations must be a positive integer");
        }
        if settings.agent_actions == 0 {
            bail!("agent-actions must be a positive integer");
        }
        if !(1..=32).contains(&settings.observation_bits) {
            bail!("observation-bits must lie in 1..=32");
        }
        if !(1..=32).contains(&settings.reward_bits) {
            bail!("reward-bits must lie in 1..=32");
        }
        for (rate, key) in [
            (settings.exploration, "exploration"),
            (settings.explore_decay, "explore-decay"),
            (settings.coin_flip_p, "coin-flip-p"),
            (settings.left_door_p, "left-door-p"),
            (settings.listen_p, "listen-p"),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                bail!("{} must lie in [0, 1]", key);
            }
        }
        Ok(settings)
    }

    /// construct the environment driver this run plays against
    pub fn driver(&self) -> Box<dyn Environment> {
        // decouple the world's randomness from the agent's
        let seed = self.seed.wrapping_add(1);
        match self.environment {
            EnvironmentKind::CoinFlip => Box::new(CoinFlip::new(self.coin_flip_p, seed)),
            EnvironmentKind::Tiger => Box::new(Tiger::new(self.left_door_p, self.listen_p, seed)),
            EnvironmentKind::GridWorld => Box::new(GridWorld::new(seed)),
            EnvironmentKind::BiasedRps => Box::new(BiasedRps::new(seed)),
            EnvironmentKind::KuhnPoker => Box::new(KuhnPoker::new(seed)),
            EnvironmentKind::Pacman => Box::new(Pacman::new(seed)),
        }
    }
}
