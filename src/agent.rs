use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::action_selection::EpsilonGreedy;
use crate::config::{RunConfig, Variant};
use crate::env::{ActionSpace, DiscreteEnv};
use crate::error::{ConfigError, Error};
use crate::persistence::{load_table, save_table};
use crate::policy::TabularPolicy;
use crate::policy_update::{PolicyUpdate, UpdateRule};
use crate::trainer::{EvaluationReport, Evaluator, Session, TrainResults, Trainer};

/// A tabular agent: one value table, one ε schedule and one update rule.
///
/// The table is created zero-filled, mutated only by the update rule while
/// training, and replaced wholesale by [`TabularAgent::load`].
pub struct TabularAgent {
    policy: TabularPolicy,
    action_selection: EpsilonGreedy,
    update_rule: UpdateRule,
    trainer: Trainer,
    evaluator: Evaluator,
    table_path: PathBuf,
}

impl TabularAgent {
    pub fn new(config: &RunConfig, n_states: usize, n_actions: usize) -> Result<Self, Error> {
        config.validate()?;
        let hyperparameters = config.hyperparameters();
        Ok(Self {
            policy: TabularPolicy::new(n_states, n_actions),
            action_selection: EpsilonGreedy::from_config(&config.exploration, config.seed)?,
            update_rule: UpdateRule::new(config.variant, &hyperparameters),
            trainer: Trainer::new(hyperparameters.epochs, config.max_steps)
                .with_progress(config.show_progress),
            evaluator: Evaluator {
                episodes: config.eval_episodes,
                max_steps: config.max_steps,
                penalty_reward: config.penalty_reward,
                step_delay: Duration::from_millis(config.step_delay_ms),
                render: config.render,
            },
            table_path: config.table_path(),
        })
    }

    /// Sizes the table from the environment's observation and action spaces.
    pub fn for_env(config: &RunConfig, env: &dyn DiscreteEnv) -> Result<Self, Error> {
        Self::new(config, env.observation_space(), env.action_space().size)
    }

    pub fn with_action_selection(mut self, action_selection: EpsilonGreedy) -> Self {
        self.action_selection = action_selection;
        self
    }

    pub fn variant(&self) -> Variant {
        self.update_rule.variant()
    }

    pub fn policy(&self) -> &TabularPolicy {
        &self.policy
    }

    pub fn exploration_rate(&self) -> f64 {
        self.action_selection.get_epsilon()
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn get_action(&mut self, state: usize, action_space: &ActionSpace) -> usize {
        self.action_selection
            .get_action(state, &self.policy, action_space)
    }

    fn check_shape(&self, env: &dyn DiscreteEnv) -> Result<(), ConfigError> {
        let env_shape = (env.observation_space(), env.action_space().size);
        if env_shape != self.policy.shape() {
            return Err(ConfigError::Invalid(format!(
                "agent table is {:?} but the environment is {:?}",
                self.policy.shape(),
                env_shape
            )));
        }
        Ok(())
    }

    /// Learns from `env`, then writes the table to this variant's file.
    /// The environment is closed however training ends.
    pub fn train<E: DiscreteEnv>(&mut self, env: E) -> Result<TrainResults, Error> {
        let mut session = Session::new(env);
        self.check_shape(&*session)?;
        let results = self.update_rule.fit(
            &mut self.policy,
            &mut self.action_selection,
            &mut *session,
            &self.trainer,
        )?;
        self.save()?;
        Ok(results)
    }

    /// Loads this variant's saved table and replays it greedily on `env`.
    /// A missing or mismatched table is an error; there is no fallback.
    pub fn evaluate<E: DiscreteEnv>(&mut self, env: E) -> Result<Vec<EvaluationReport>, Error> {
        let mut session = Session::new(env);
        self.check_shape(&*session)?;
        self.load()?;
        self.evaluator.evaluate(&self.policy, &mut *session)
    }

    /// Greedy replay of the table currently in memory.
    pub fn replay<E: DiscreteEnv>(&self, env: E) -> Result<Vec<EvaluationReport>, Error> {
        let mut session = Session::new(env);
        self.check_shape(&*session)?;
        self.evaluator.evaluate(&self.policy, &mut *session)
    }

    pub fn save(&self) -> Result<(), Error> {
        save_table(&self.table_path, self.policy.values())?;
        Ok(())
    }

    pub fn load(&mut self) -> Result<(), Error> {
        let values = load_table(&self.table_path, self.policy.shape())?;
        self.policy.replace(values);
        Ok(())
    }
}
