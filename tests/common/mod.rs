#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use tabular_rl::env::{ActionSpace, DiscreteEnv, EnvError, Transition};

/// Two states, two actions, deterministic.
///
/// * state 0, action 0: stay, reward -1
/// * state 0, action 1: move to state 1, reward +1
/// * state 1, action 0: deliver, reward +5, episode ends
/// * state 1, action 1: back to state 0, reward -10 (penalty)
///
/// The optimal action is 1 in state 0 and 0 in state 1.
pub struct ToyEnv {
    model: [[[Transition; 1]; 2]; 2],
    state: usize,
    ready: bool,
    pub closes: Rc<Cell<usize>>,
    pub fail_after: Option<usize>,
    pub render_mode: Rc<Cell<Option<bool>>>,
    steps: usize,
}

impl ToyEnv {
    pub fn new() -> Self {
        Self {
            model: [
                [
                    [Transition::new(1.0, 0, -1.0, false)],
                    [Transition::new(1.0, 1, 1.0, false)],
                ],
                [
                    [Transition::new(1.0, 0, 5.0, true)],
                    [Transition::new(1.0, 0, -10.0, false)],
                ],
            ],
            state: 0,
            ready: false,
            closes: Rc::new(Cell::new(0)),
            fail_after: None,
            render_mode: Rc::new(Cell::new(None)),
            steps: 0,
        }
    }

    /// Rejects every step after the first `steps`.
    pub fn failing_after(steps: usize) -> Self {
        Self {
            fail_after: Some(steps),
            ..Self::new()
        }
    }

    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }

    /// Last value passed to `set_render`, `None` if it was never called.
    pub fn render_switch(&self) -> Rc<Cell<Option<bool>>> {
        Rc::clone(&self.render_mode)
    }
}

impl DiscreteEnv for ToyEnv {
    fn reset(&mut self) -> usize {
        self.state = 0;
        self.ready = true;
        self.state
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool), EnvError> {
        if !self.ready {
            return Err(EnvError::NotReady);
        }
        if action >= 2 {
            return Err(EnvError::InvalidAction { action, size: 2 });
        }
        if let Some(limit) = self.fail_after {
            if self.steps >= limit {
                return Err(EnvError::NotReady);
            }
        }
        self.steps += 1;
        let outcome = self.model[self.state][action][0];
        self.state = outcome.next_state;
        if outcome.terminated {
            self.ready = false;
        }
        Ok((outcome.next_state, outcome.reward, outcome.terminated))
    }

    fn observation_space(&self) -> usize {
        2
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::new(2)
    }

    fn transitions(&self, state: usize, action: usize) -> Result<&[Transition], EnvError> {
        Ok(&self.model[state][action][..])
    }

    fn set_render(&mut self, render: bool) {
        self.render_mode.set(Some(render));
    }

    fn action_label(&self, action: usize) -> String {
        ["stay/back", "advance/deliver"][action].to_string()
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}
