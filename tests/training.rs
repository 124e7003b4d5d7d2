mod common;

use common::ToyEnv;
use tabular_rl::action_selection::EpsilonGreedy;
use tabular_rl::config::{RunConfig, Variant};
use tabular_rl::env::DiscreteEnv;
use tabular_rl::error::{EnvError, Error};
use tabular_rl::TabularAgent;
use tempfile::TempDir;

fn config(variant: Variant, dir: &TempDir, epochs: usize) -> RunConfig {
    let mut config = RunConfig::for_variant(variant);
    config.hyperparameters.epochs = Some(epochs);
    config.table_dir = dir.path().to_path_buf();
    config.show_progress = false;
    config.render = false;
    config
}

fn greedy_agent(variant: Variant, dir: &TempDir) -> TabularAgent {
    let env = ToyEnv::new();
    TabularAgent::for_env(&config(variant, dir, 20), &env)
        .unwrap()
        .with_action_selection(EpsilonGreedy::greedy(0))
}

fn single_episode(variant: Variant, dir: &TempDir) -> TabularAgent {
    let env = ToyEnv::new();
    TabularAgent::for_env(&config(variant, dir, 1), &env)
        .unwrap()
        .with_action_selection(EpsilonGreedy::greedy(0))
}

#[test]
fn sarsa_takes_the_action_chosen_before_its_update() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = single_episode(Variant::Sarsa, &dir);
    let results = agent.train(ToyEnv::new()).unwrap();
    // the second "stay" was picked while Q(0, stay) was still 0; choosing
    // again after the update would have advanced instead
    assert_eq!(results.episode_lengths, vec![4]);
    assert_eq!(results.episode_rewards, vec![4.0]);
    let expected = 0.35 * -0.65 + 0.65 * -1.0;
    assert!((agent.policy().get(0, 0) - expected).abs() < 1e-12);
}

#[test]
fn qlearning_chooses_after_its_update() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = single_episode(Variant::QLearning, &dir);
    let results = agent.train(ToyEnv::new()).unwrap();
    assert_eq!(results.episode_lengths, vec![3]);
    assert_eq!(results.episode_rewards, vec![5.0]);
    assert!((agent.policy().get(0, 0) + 0.95).abs() < 1e-12);
}

#[test]
fn qlearning_finds_optimal_actions_without_exploration() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = greedy_agent(Variant::QLearning, &dir);
    agent.train(ToyEnv::new()).unwrap();
    assert_eq!(agent.policy().best_action(0), 1);
    assert_eq!(agent.policy().best_action(1), 0);
}

#[test]
fn sarsa_finds_optimal_actions_without_exploration() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = greedy_agent(Variant::Sarsa, &dir);
    agent.train(ToyEnv::new()).unwrap();
    assert_eq!(agent.policy().best_action(0), 1);
    assert_eq!(agent.policy().best_action(1), 0);
}

#[test]
fn value_iteration_finds_optimal_actions() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let env = ToyEnv::new();
    let mut agent = TabularAgent::for_env(&config(Variant::ValueIteration, &dir, 10000), &env).unwrap();
    let results = agent.train(env).unwrap();
    assert!(results.converged_at.is_some());
    assert!(results.sweep_deltas.iter().all(|d| *d >= 0.0));
    assert!(results.episode_rewards.is_empty());
    assert_eq!(agent.policy().best_action(0), 1);
    assert_eq!(agent.policy().best_action(1), 0);
}

#[test]
fn greedy_episodes_settle_on_two_steps() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = greedy_agent(Variant::QLearning, &dir);
    let results = agent.train(ToyEnv::new()).unwrap();
    assert_eq!(results.episode_lengths.len(), 20);
    assert_eq!(results.episode_rewards.len(), 20);
    assert_eq!(*results.episode_lengths.last().unwrap(), 2);
    assert_eq!(*results.episode_rewards.last().unwrap(), 6.0);
    let total_steps: u128 = results.episode_lengths.iter().sum();
    assert_eq!(results.training_error.len() as u128, total_steps);
}

#[test]
fn exploration_decays_once_per_step() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let env = ToyEnv::new();
    let mut agent = TabularAgent::for_env(&config(Variant::QLearning, &dir, 5), &env).unwrap();
    let results = agent.train(env).unwrap();
    let steps: u128 = results.episode_lengths.iter().sum();
    let expected = (0.999f64.powi(steps as i32)).max(0.0001);
    assert!((agent.exploration_rate() - expected).abs() < 1e-9);
}

#[test]
fn episodes_stop_at_the_step_ceiling() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = config(Variant::QLearning, &dir, 3);
    config.max_steps = 1;
    let env = ToyEnv::new();
    let mut agent = TabularAgent::for_env(&config, &env).unwrap();
    let results = agent.train(env).unwrap();
    assert_eq!(results.episode_lengths, vec![1, 1, 1]);
}

#[test]
fn training_writes_the_variant_table() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for variant in [Variant::QLearning, Variant::Sarsa, Variant::ValueIteration] {
        let env = ToyEnv::new();
        let mut agent = TabularAgent::for_env(&config(variant, &dir, 10), &env).unwrap();
        agent.train(env).unwrap();
        assert!(dir.path().join(variant.file_name()).exists());
    }
}

#[test]
fn training_closes_the_environment() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let env = ToyEnv::new();
    let closes = env.close_counter();
    let mut agent = greedy_agent(Variant::Sarsa, &dir);
    agent.train(env).unwrap();
    assert_eq!(closes.get(), 1);
}

#[test]
fn adapter_failures_propagate_and_still_close() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let env = ToyEnv::failing_after(3);
    let closes = env.close_counter();
    let mut agent = greedy_agent(Variant::QLearning, &dir);
    let result = agent.train(env);
    assert!(matches!(result, Err(Error::Env(EnvError::NotReady))));
    assert_eq!(closes.get(), 1);
    assert!(!dir.path().join(Variant::QLearning.file_name()).exists());
}

#[test]
fn mismatched_environment_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = TabularAgent::new(&config(Variant::QLearning, &dir, 1), 3, 2).unwrap();
    let env = ToyEnv::new();
    let closes = env.close_counter();
    assert!(matches!(agent.train(env), Err(Error::Config(_))));
    assert_eq!(closes.get(), 1);
}

#[test]
fn table_entries_stay_finite() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for variant in [Variant::QLearning, Variant::Sarsa] {
        let env = ToyEnv::new();
        let mut agent = TabularAgent::for_env(&config(variant, &dir, 200), &env).unwrap();
        agent.train(env).unwrap();
        assert!(agent.policy().values().iter().all(|v| v.is_finite()));
        // rewards lie in [-10, 5] and gamma < 1, so no entry can leave this band
        let bound = 10.0 / (1.0 - 0.6);
        assert!(agent.policy().values().iter().all(|v| v.abs() <= bound));
    }
}

#[test]
fn selection_uses_the_learned_table() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut agent = greedy_agent(Variant::QLearning, &dir);
    agent.train(ToyEnv::new()).unwrap();
    let space = ToyEnv::new().action_space();
    assert_eq!(agent.get_action(0, &space), 1);
    assert_eq!(agent.get_action(1, &space), 0);
}

#[test]
fn training_with_the_progress_bar() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = config(Variant::Sarsa, &dir, 5);
    config.show_progress = true;
    let env = ToyEnv::new();
    let mut agent = TabularAgent::for_env(&config, &env).unwrap();
    let results = agent.train(env).unwrap();
    assert_eq!(results.episode_rewards.len(), 5);
}
