use super::{Experience, PolicyUpdate, TemporalDifference};
use crate::action_selection::EpsilonGreedy;
use crate::config::Variant;
use crate::env::DiscreteEnv;
use crate::error::Error;
use crate::policy::TabularPolicy;
use crate::trainer::{TrainResults, Trainer};

/// On-policy one-step SARSA.
#[derive(Debug, Clone)]
pub struct SarsaStep {
    learning_rate: f64,
    discount_factor: f64,
}

impl SarsaStep {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            learning_rate,
            discount_factor,
        }
    }
}

impl TemporalDifference for SarsaStep {
    const ON_POLICY: bool = true;

    fn update(&self, policy: &mut TabularPolicy, experience: &Experience) -> f64 {
        let next_action = experience
            .next_action
            .unwrap_or_else(|| policy.best_action(experience.next_obs));
        let future_q_value = policy.get(experience.next_obs, next_action);
        let target = experience.reward + self.discount_factor * future_q_value;
        policy.blend(
            experience.curr_obs,
            experience.curr_action,
            self.learning_rate,
            target,
        )
    }
}

impl PolicyUpdate for SarsaStep {
    fn variant(&self) -> Variant {
        Variant::Sarsa
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
