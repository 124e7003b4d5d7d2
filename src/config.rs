use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which update rule an agent learns with. Also decides the table file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    QLearning,
    Sarsa,
    ValueIteration,
}

impl Variant {
    pub fn file_name(&self) -> &'static str {
        match self {
            Variant::QLearning => "qtable.txt",
            Variant::Sarsa => "sarsa_qtable.txt",
            Variant::ValueIteration => "value_qtable.txt",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::QLearning => "q-learning",
            Variant::Sarsa => "sarsa",
            Variant::ValueIteration => "value-iteration",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "q-learning" | "qlearning" | "q" => Ok(Variant::QLearning),
            "sarsa" => Ok(Variant::Sarsa),
            "value-iteration" | "value" | "vi" => Ok(Variant::ValueIteration),
            other => Err(ConfigError::Invalid(format!("unknown agent variant `{}`", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    /// Step size of the online updates. Unused by value iteration.
    pub learning_rate: f64,
    pub discount_factor: f64,
    /// Value iteration stops once a sweep changes no state by this much.
    pub convergence_threshold: f64,
    pub epochs: usize,
}

impl Hyperparameters {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::QLearning => Self {
                learning_rate: 0.95,
                discount_factor: 0.5,
                convergence_threshold: 0.0,
                epochs: 1000,
            },
            Variant::Sarsa => Self {
                learning_rate: 0.65,
                discount_factor: 0.6,
                convergence_threshold: 0.0,
                epochs: 1000,
            },
            Variant::ValueIteration => Self {
                learning_rate: 0.0,
                discount_factor: 0.75,
                convergence_threshold: 0.85,
                epochs: 10000,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(ConfigError::Invalid(format!(
                "learning rate {} must lie in [0, 1]",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(ConfigError::Invalid(format!(
                "discount factor {} must lie in [0, 1]",
                self.discount_factor
            )));
        }
        if !(self.convergence_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "convergence threshold {} must be non-negative",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}

/// Hyperparameters named in a config file or on the command line.
///
/// Each unset entry keeps the value the chosen variant would use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterOverrides {
    pub learning_rate: Option<f64>,
    pub discount_factor: Option<f64>,
    pub convergence_threshold: Option<f64>,
    pub epochs: Option<usize>,
}

impl HyperparameterOverrides {
    pub fn apply(&self, base: Hyperparameters) -> Hyperparameters {
        Hyperparameters {
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            discount_factor: self.discount_factor.unwrap_or(base.discount_factor),
            convergence_threshold: self
                .convergence_threshold
                .unwrap_or(base.convergence_threshold),
            epochs: self.epochs.unwrap_or(base.epochs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            initial_epsilon: 1.0,
            epsilon_decay: 0.999,
            min_epsilon: 0.0001,
        }
    }
}

/// Everything a training or evaluation run needs besides the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub variant: Variant,
    /// Missing entries fall back to the variant's defaults.
    pub hyperparameters: HyperparameterOverrides,
    pub exploration: ExplorationConfig,
    pub max_steps: usize,
    pub eval_episodes: usize,
    pub penalty_reward: f64,
    pub step_delay_ms: u64,
    pub table_dir: PathBuf,
    pub seed: u64,
    pub show_progress: bool,
    pub render: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            variant: Variant::QLearning,
            hyperparameters: HyperparameterOverrides::default(),
            exploration: ExplorationConfig::default(),
            max_steps: 100,
            eval_episodes: 3,
            penalty_reward: -10.0,
            step_delay_ms: 0,
            table_dir: PathBuf::from("."),
            seed: 42,
            show_progress: true,
            render: true,
        }
    }
}

impl RunConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        self.hyperparameters
            .apply(Hyperparameters::for_variant(self.variant))
    }

    pub fn table_path(&self) -> PathBuf {
        self.table_dir.join(self.variant.file_name())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hyperparameters().validate()?;
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_steps must allow at least one step".to_string(),
            ));
        }
        let exploration = &self.exploration;
        if !(0.0..=exploration.initial_epsilon).contains(&exploration.min_epsilon)
            || exploration.initial_epsilon > 1.0
        {
            return Err(ConfigError::Invalid(format!(
                "epsilon schedule {} -> {} is not a decreasing range inside [0, 1]",
                exploration.initial_epsilon, exploration.min_epsilon
            )));
        }
        Ok(())
    }
}
