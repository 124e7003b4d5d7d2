use super::{Experience, PolicyUpdate, TemporalDifference};
use crate::action_selection::EpsilonGreedy;
use crate::config::Variant;
use crate::env::DiscreteEnv;
use crate::error::Error;
use crate::policy::TabularPolicy;
use crate::trainer::{TrainResults, Trainer};

/// Off-policy one-step Q-learning.
#[derive(Debug, Clone)]
pub struct QStep {
    learning_rate: f64,
    discount_factor: f64,
}

impl QStep {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }
}

impl TemporalDifference for QStep {
    const ON_POLICY: bool = false;

    fn update(&self, policy: &mut TabularPolicy, experience: &Experience) -> f64 {
        let future_q_value = policy.max_value(experience.next_obs);
        let target = experience.reward + self.discount_factor * future_q_value;
        policy.blend(
            experience.curr_obs,
            experience.curr_action,
            self.learning_rate,
            target,
        )
    }
}

impl PolicyUpdate for QStep {
    fn variant(&self) -> Variant {
        Variant::QLearning
    }

    fn fit(
        &mut self,
        policy: &mut TabularPolicy,
        action_selection: &mut EpsilonGreedy,
        env: &mut dyn DiscreteEnv,
        trainer: &Trainer,
    ) -> Result<TrainResults, Error> {
        trainer.run_episodes(&*self, policy, action_selection, env)
    }
}
