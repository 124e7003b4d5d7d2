use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by an environment adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("environment must be reset before stepping")]
    NotReady,
    #[error("action {action} is outside the action space of size {size}")]
    InvalidAction { action: usize, size: usize },
    #[error("state {state} is outside the observation space of size {size}")]
    InvalidState { state: usize, size: usize },
    #[error("environment does not expose a transition model")]
    ModelUnavailable,
    #[error("transition model has no outcome for state {state}, action {action}")]
    EmptyTransitions { state: usize, action: usize },
}

/// Failures while reading or writing a value table.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} line {line}: `{token}` is not a number")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{path:?} line {line}: table entries must be finite")]
    NonFinite { path: PathBuf, line: usize },
    #[error("{path:?} holds a {found:?} table, expected {expected:?}")]
    ShapeMismatch {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("{path:?} contains no table rows")]
    Empty { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
