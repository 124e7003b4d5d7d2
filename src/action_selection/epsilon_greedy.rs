use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ExplorationConfig;
use crate::env::ActionSpace;
use crate::error::ConfigError;
use crate::policy::TabularPolicy;

/// ε-greedy action selection with a multiplicative, floored ε schedule.
///
/// Choosing an action never touches ε; [`EpsilonGreedy::update`] is called
/// once per environment step by the training loop.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    epsilon_decay: f64,
    min_epsilon: f64,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(
        epsilon: f64,
        epsilon_decay: f64,
        min_epsilon: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(ConfigError::Invalid(format!(
                "initial epsilon {} must lie in [0, 1]",
                epsilon
            )));
        }
        if !(0.0..=epsilon).contains(&min_epsilon) {
            return Err(ConfigError::Invalid(format!(
                "minimum epsilon {} must lie in [0, {}]",
                min_epsilon, epsilon
            )));
        }
        if !(epsilon_decay > 0.0 && epsilon_decay <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "epsilon decay {} must lie in (0, 1]",
                epsilon_decay
            )));
        }
        Ok(Self {
            epsilon,
            epsilon_decay,
            min_epsilon,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_config(config: &ExplorationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(
            config.initial_epsilon,
            config.epsilon_decay,
            config.min_epsilon,
            seed,
        )
    }

    /// Never explores: always the first-max action.
    pub fn greedy(seed: u64) -> Self {
        Self {
            epsilon: 0.0,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.rng.gen::<f64>() < self.epsilon
    }

    pub fn get_action(
        &mut self,
        state: usize,
        policy: &TabularPolicy,
        action_space: &ActionSpace,
    ) -> usize {
        if self.should_explore() {
            action_space.sample(&mut self.rng)
        } else {
            policy.best_action(state)
        }
    }

    pub fn update(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.min_epsilon);
    }

    pub fn get_epsilon(&self) -> f64 {
        self.epsilon
    }
}
