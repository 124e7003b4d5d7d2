use log::info;

use super::PolicyUpdate;
use crate::action_selection::EpsilonGreedy;
use crate::config::Variant;
use crate::env::DiscreteEnv;
use crate::error::{EnvError, Error};
use crate::policy::{StateValues, TabularPolicy};
use crate::trainer::{TrainResults, Trainer};

/// Model-based value iteration over the environment's transition model.
///
/// Only the first listed outcome of `P[state][action]` is consulted, so the
/// model is treated as deterministic. Sweeps update `V` in place.
#[derive(Debug, Clone)]
pub struct ValueIteration {
    discount_factor: f64,
    convergence_threshold: f64,
    state_values: StateValues,
}

impl ValueIteration {
    pub fn new(discount_factor: f64, convergence_threshold: f64) -> Self {
        Self {
            discount_factor,
            convergence_threshold,
            state_values: StateValues::new(0),
        }
    }

    pub fn state_values(&self) -> &StateValues {
        &self.state_values
    }

    fn lookahead(&self, env: &dyn DiscreteEnv, state: usize, action: usize) -> Result<f64, EnvError> {
        let outcome = env
            .transitions(state, action)?
            .first()
            .copied()
            .ok_or(EnvError::EmptyTransitions { state, action })?;
        Ok(outcome.probability
            * (outcome.reward + self.discount_factor * self.state_values.get(outcome.next_state)))
    }

    /// One Bellman-optimality pass over every state; returns the largest change.
    pub fn sweep(&mut self, env: &dyn DiscreteEnv) -> Result<f64, EnvError> {
        let n_states = env.observation_space();
        if self.state_values.len() != n_states {
            self.state_values = StateValues::new(n_states);
        }
        let n_actions = env.action_space().size;
        let mut delta: f64 = 0.0;
        for state in 0..n_states {
            let mut max_value = f64::NEG_INFINITY;
            for action in 0..n_actions {
                max_value = max_value.max(self.lookahead(env, state, action)?);
            }
            delta = delta.max(self.state_values.set(state, max_value));
        }
        Ok(delta)
    }

    /// Fills `policy` with the one-step lookahead values of the current `V`.
    pub fn derive_policy(&self, env: &dyn DiscreteEnv, policy: &mut TabularPolicy) -> Result<(), EnvError> {
        for state in 0..policy.n_states() {
            for action in 0..policy.n_actions() {
                policy.set(state, action, self.lookahead(env, state, action)?);
            }
        }
        Ok(())
    }

    /// Sweeps until a sweep changes no state by `convergence_threshold` or
    /// more, or until `max_sweeps` have run.
    pub fn solve(&mut self, env: &dyn DiscreteEnv, max_sweeps: usize) -> Result<(Vec<f64>, Option<usize>), EnvError> {
        self.state_values = StateValues::new(env.observation_space());
        let mut deltas = Vec::new();
        for epoch in 0..max_sweeps {
            let delta = self.sweep(env)?;
            deltas.push(delta);
            if epoch % 100 == 0 {
                info!("Epoch = {}, delta = {}", epoch, delta);
            }
            if delta < self.convergence_threshold {
                info!("Converged after {} iterations.", epoch);
                return Ok((deltas, Some(epoch)));
            }
        }
        Ok((deltas, None))
    }
}

impl PolicyUpdate for ValueIteration {
    fn variant(&self) -> Variant {
        Variant::ValueIteration
    }

    fn fit(
        &mut self,
        policy: &mut TabularPolicy,
        _action_selection: &mut EpsilonGreedy,
        env: &mut dyn DiscreteEnv,
        trainer: &Trainer,
    ) -> Result<TrainResults, Error> {
        info!("Training...");
        let (sweep_deltas, converged_at) = self.solve(env, trainer.epochs)?;
        self.derive_policy(env, policy)?;
        Ok(TrainResults {
            sweep_deltas,
            converged_at,
            ..TrainResults::default()
        })
    }
}
