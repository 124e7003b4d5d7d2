use ndarray::Array2;

use crate::utils::{argmax, max};

/// Dense action-value table, `n_states x n_actions`, zero-filled on creation.
///
/// Entries change only through [`TabularPolicy::blend`], which the update
/// rules call, or wholesale through [`TabularPolicy::replace`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabularPolicy {
    values: Array2<f64>,
}

impl TabularPolicy {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            values: Array2::zeros((n_states, n_actions)),
        }
    }

    pub fn n_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_actions(&self) -> usize {
        self.values.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[[state, action]]
    }

    pub fn best_action(&self, state: usize) -> usize {
        argmax(self.values.row(state))
    }

    pub fn max_value(&self, state: usize) -> f64 {
        max(self.values.row(state))
    }

    /// `Q[s,a] <- (1 - alpha) * Q[s,a] + alpha * target`, returning the
    /// temporal difference `target - Q[s,a]` measured before the write.
    pub fn blend(&mut self, state: usize, action: usize, learning_rate: f64, target: f64) -> f64 {
        let old_value = self.values[[state, action]];
        self.values[[state, action]] = (1.0 - learning_rate) * old_value + learning_rate * target;
        target - old_value
    }

    pub(crate) fn set(&mut self, state: usize, action: usize, value: f64) {
        self.values[[state, action]] = value;
    }

    /// Swaps in a whole table. The caller is responsible for the shape.
    pub(crate) fn replace(&mut self, values: Array2<f64>) {
        self.values = values;
    }
}
