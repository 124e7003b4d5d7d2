mod q_step;
mod sarsa_step;
mod value_iteration;

use enum_dispatch::enum_dispatch;

pub use q_step::QStep;
pub use sarsa_step::SarsaStep;
pub use value_iteration::ValueIteration;

use crate::action_selection::EpsilonGreedy;
use crate::config::{Hyperparameters, Variant};
use crate::env::DiscreteEnv;
use crate::error::Error;
use crate::policy::TabularPolicy;
use crate::trainer::{TrainResults, Trainer};

/// One transition of an episode, as seen by an online update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Experience {
    pub curr_obs: usize,
    pub curr_action: usize,
    pub reward: f64,
    pub next_obs: usize,
    /// The action that will actually be taken from `next_obs`; only
    /// on-policy rules receive one.
    pub next_action: Option<usize>,
    pub terminated: bool,
}

/// One-step temporal-difference rule driven by [`Trainer::run_episodes`].
pub trait TemporalDifference {
    /// On-policy rules get the next action chosen before their update, and the
    /// loop then takes that same action on the following step.
    const ON_POLICY: bool;

    /// Updates `Q[curr_obs, curr_action]` in place and returns the temporal difference.
    fn update(&self, policy: &mut TabularPolicy, experience: &Experience) -> f64;
}

#[enum_dispatch]
pub trait PolicyUpdate {
    fn variant(&self) -> Variant;

    fn fit(
        &mut self,
        policy: &mut TabularPolicy,
        action_selection: &mut EpsilonGreedy,
        env: &mut dyn DiscreteEnv,
        trainer: &Trainer,
    ) -> Result<TrainResults, Error>;
}

#[enum_dispatch(PolicyUpdate)]
#[derive(Debug, Clone)]
pub enum UpdateRule {
    QLearning(QStep),
    Sarsa(SarsaStep),
    ValueIteration(ValueIteration),
}

impl UpdateRule {
    pub fn new(variant: Variant, hyperparameters: &Hyperparameters) -> Self {
        match variant {
            Variant::QLearning => QStep::new(
                hyperparameters.learning_rate,
                hyperparameters.discount_factor,
            )
            .into(),
            Variant::Sarsa => SarsaStep::new(
                hyperparameters.learning_rate,
                hyperparameters.discount_factor,
            )
            .into(),
            Variant::ValueIteration => ValueIteration::new(
                hyperparameters.discount_factor,
                hyperparameters.convergence_threshold,
            )
            .into(),
        }
    }
}
