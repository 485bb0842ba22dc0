use crate::Reward;
use crate::agent::Agent;
use crate::config::Settings;
use crate::environment::Environment;
use crate::search::search;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Drives the live interaction: percept in, plan (or explore), act, and
/// keep the agent's model in lockstep with what actually happened.
pub struct Engine {
    agent: Agent,
    environment: Box<dyn Environment>,
    rng: SmallRng,
    explore_rate: f64,
    explore_decay: f64,
    terminate_age: Option<u64>,
}

impl Engine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            agent: Agent::new(settings),
            environment: settings.driver(),
            rng: SmallRng::seed_from_u64(settings.seed),
            explore_rate: settings.exploration,
            explore_decay: settings.explore_decay,
            terminate_age: settings.terminate_age,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Run cycles until the environment finishes or the age cap is hit.
    /// Returns the total reward accumulated over the run.
    pub fn run(&mut self) -> Reward {
        for cycle in 1u64.. {
            if self.environment.is_finished() {
                log::info!("environment finished at cycle {}", cycle);
                break;
            }
            if self.terminate_age.is_some_and(|cap| self.agent.age() > cap) {
                log::info!("terminating agent at age {}", self.agent.age());
                break;
            }
            let observation = self.environment.observation();
            let reward = self.environment.reward();
            self.agent.model_update_percept(observation, reward);
            let explored = self.explore_rate > 0.0 && self.rng.random::<f64>() < self.explore_rate;
            let action = match explored {
                true => self.agent.gen_random_action(&mut self.rng),
                false => search(&mut self.agent, &mut self.rng),
            };
            self.environment.perform_action(action);
            self.agent.model_update_action(action);
            self.agent.commit();
            log::debug!(
                "cycle {}, observation {}, reward {}, action {}, explored {}, rate {:.4}, total {}, average {:.4}",
                cycle,
                observation,
                reward,
                action,
                explored,
                self.explore_rate,
                self.agent.total_reward(),
                self.agent.average_reward(),
            );
            if cycle.is_power_of_two() {
                log::info!(
                    "cycle {}, average reward {:.4}, model of {} nodes over {} bits",
                    cycle,
                    self.agent.average_reward(),
                    self.agent.model().size(),
                    self.agent.history_size(),
                );
            }
            self.explore_rate *= self.explore_decay;
        }
        log::info!(
            "agent age {}, average reward {:.4}",
            self.agent.age(),
            self.agent.average_reward(),
        );
        self.agent.total_reward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentKind;

    fn settings() -> Settings {
        Settings {
            environment: EnvironmentKind::CoinFlip,
            ct_depth: 4,
            agent_horizon: 2,
            mc_simulations: 4,
            agent_actions: 2,
            observation_bits: 1,
            reward_bits: 1,
            exploration: 0.0,
            explore_decay: 1.0,
            terminate_age: Some(3),
            seed: 5,
            coin_flip_p: 0.7,
            left_door_p: 0.5,
            listen_p: 0.85,
        }
    }

    #[test]
    fn is_run_honoring_the_age_cap() {
        let mut engine = Engine::new(&settings());
        engine.run();
        // the cap is strict: the cycle that passes it still completes
        assert_eq!(engine.agent().age(), 4);
    }

    #[test]
    fn is_exploration_still_advancing_the_model() {
        let mut settings = settings();
        settings.exploration = 1.0;
        settings.terminate_age = Some(5);
        let mut engine = Engine::new(&settings);
        engine.run();
        assert_eq!(engine.agent().age(), 6);
        // one percept and one action unit per cycle
        assert_eq!(engine.agent().history_size(), 18);
    }
}
