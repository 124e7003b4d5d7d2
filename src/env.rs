mod action_space;
mod taxi;

pub use crate::error::EnvError;
pub use action_space::ActionSpace;
pub use taxi::TaxiEnv;

/// One outcome of the explicit transition model: `P[state][action]` lists these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub probability: f64,
    pub next_state: usize,
    pub reward: f64,
    pub terminated: bool,
}

impl Transition {
    pub fn new(probability: f64, next_state: usize, reward: f64, terminated: bool) -> Self {
        Self {
            probability,
            next_state,
            reward,
            terminated,
        }
    }
}

/// Discrete-state, discrete-action environment the agents learn against.
///
/// Only `reset`, `step` and the two space sizes are required. Model-based
/// agents also need `transitions`; adapters without an explicit model keep
/// the default, which reports [`EnvError::ModelUnavailable`].
pub trait DiscreteEnv {
    fn reset(&mut self) -> usize;

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool), EnvError>;

    fn observation_space(&self) -> usize;

    fn action_space(&self) -> ActionSpace;

    fn transitions(&self, _state: usize, _action: usize) -> Result<&[Transition], EnvError> {
        Err(EnvError::ModelUnavailable)
    }

    /// Switches the adapter in or out of human render mode.
    fn set_render(&mut self, _render: bool) {}

    fn render(&self) -> String {
        String::new()
    }

    fn action_label(&self, action: usize) -> String {
        action.to_string()
    }

    /// Releases whatever the adapter holds. Called exactly once per session.
    fn close(&mut self) {}
}
