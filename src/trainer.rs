use std::ops::{Deref, DerefMut};
use std::thread::sleep;
use std::time::Duration;

use kdam::{tqdm, BarExt};
use log::info;

use crate::action_selection::EpsilonGreedy;
use crate::env::DiscreteEnv;
use crate::error::Error;
use crate::policy::TabularPolicy;
use crate::policy_update::{Experience, TemporalDifference};

/// Per-episode bookkeeping of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainResults {
    pub episode_rewards: Vec<f64>,
    pub episode_lengths: Vec<u128>,
    pub training_error: Vec<f64>,
    /// Value iteration only: the largest change of every sweep.
    pub sweep_deltas: Vec<f64>,
    /// Value iteration only: the sweep index that met the threshold.
    pub converged_at: Option<usize>,
}

/// Owns an environment for the length of one training or evaluation run and
/// closes it when dropped, whichever way the run ends.
pub struct Session<E: DiscreteEnv> {
    env: E,
}

impl<E: DiscreteEnv> Session<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

impl<E: DiscreteEnv> Deref for Session<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.env
    }
}

impl<E: DiscreteEnv> DerefMut for Session<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: DiscreteEnv> Drop for Session<E> {
    fn drop(&mut self) {
        self.env.close();
    }
}

/// Budget and presentation of the shared episode loop.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub epochs: usize,
    pub max_steps: usize,
    pub show_progress: bool,
}

impl Trainer {
    pub fn new(epochs: usize, max_steps: usize) -> Self {
        Self {
            epochs,
            max_steps,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs `epochs` episodes of ε-greedy control with a one-step TD rule.
    ///
    /// ε is decayed after every environment step. Off-policy rules pick a
    /// fresh action at the start of each step; on-policy rules pick the next
    /// action before updating and then take it.
    pub fn run_episodes<U: TemporalDifference>(
        &self,
        rule: &U,
        policy: &mut TabularPolicy,
        action_selection: &mut EpsilonGreedy,
        env: &mut dyn DiscreteEnv,
    ) -> Result<TrainResults, Error> {
        info!("Training for {} epochs...", self.epochs);
        let action_space = env.action_space();
        let mut results = TrainResults::default();

        let mut pb = if self.show_progress {
            Some(tqdm!(total = self.epochs))
        } else {
            None
        };

        for _episode in 0..self.epochs {
            let mut curr_obs = env.reset();
            let mut carried_action: Option<usize> = None;
            let mut terminated = false;
            let mut steps: u128 = 0;
            let mut epi_reward: f64 = 0.0;

            while !terminated && steps < self.max_steps as u128 {
                let curr_action = match carried_action.take() {
                    Some(action) => action,
                    None => action_selection.get_action(curr_obs, policy, &action_space),
                };
                let (next_obs, reward, done) = env.step(curr_action)?;
                let next_action = if U::ON_POLICY {
                    Some(action_selection.get_action(next_obs, policy, &action_space))
                } else {
                    None
                };

                let td = rule.update(
                    policy,
                    &Experience {
                        curr_obs,
                        curr_action,
                        reward,
                        next_obs,
                        next_action,
                        terminated: done,
                    },
                );
                action_selection.update();

                results.training_error.push(td);
                epi_reward += reward;
                curr_obs = next_obs;
                carried_action = next_action;
                terminated = done;
                steps += 1;
            }
            results.episode_rewards.push(epi_reward);
            results.episode_lengths.push(steps);

            if let Some(pb) = pb.as_mut() {
                pb.set_postfix(format!("epsilon={:.4}", action_selection.get_epsilon()));
                pb.update(1);
            }
        }
        if let Some(pb) = pb.as_mut() {
            pb.refresh();
            eprintln!();
        }
        Ok(results)
    }
}

/// Outcome of one greedy evaluation episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub episode: usize,
    pub terminated: bool,
    pub steps: usize,
    pub penalties: usize,
    pub total_reward: f64,
}

impl EvaluationReport {
    pub fn average_reward(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_reward / self.steps as f64
        }
    }
}

/// Replays a learned table greedily and reports what happened. Never learns.
#[derive(Debug, Clone)]
pub struct Evaluator {
    pub episodes: usize,
    pub max_steps: usize,
    /// Rewards equal to this count as penalties.
    pub penalty_reward: f64,
    pub step_delay: Duration,
    pub render: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            episodes: 3,
            max_steps: 100,
            penalty_reward: -10.0,
            step_delay: Duration::ZERO,
            render: false,
        }
    }
}

impl Evaluator {
    pub fn evaluate(
        &self,
        policy: &TabularPolicy,
        env: &mut dyn DiscreteEnv,
    ) -> Result<Vec<EvaluationReport>, Error> {
        env.set_render(self.render);
        let mut reports = Vec::with_capacity(self.episodes);
        for episode in 1..=self.episodes {
            let mut state = env.reset();
            let mut report = EvaluationReport {
                episode,
                terminated: false,
                steps: 0,
                penalties: 0,
                total_reward: 0.0,
            };
            if self.render {
                println!("{}", env.render());
            }

            while !report.terminated && report.steps < self.max_steps {
                if !self.step_delay.is_zero() {
                    sleep(self.step_delay);
                }
                let action = policy.best_action(state);
                let (new_state, reward, done) = env.step(action)?;
                if self.render {
                    println!("{}", env.render());
                }
                println!(
                    "{} - {} -> {}; reward: {}",
                    state,
                    env.action_label(action),
                    new_state,
                    reward
                );

                if reward == self.penalty_reward {
                    report.penalties += 1;
                }
                state = new_state;
                report.total_reward += reward;
                report.terminated = done;
                report.steps += 1;
            }

            println!(
                "Epoch {} is {}: steps={}, penalties={}, avg_reward={:.2} \n\n",
                report.episode,
                report.terminated,
                report.steps,
                report.penalties,
                report.average_reward()
            );
            reports.push(report);
        }
        Ok(reports)
    }
}
