use ndarray::Array1;

/// State-value table used by value iteration, one entry per state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateValues {
    values: Array1<f64>,
}

impl StateValues {
    pub fn new(n_states: usize) -> Self {
        Self {
            values: Array1::zeros(n_states),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, state: usize) -> f64 {
        self.values[state]
    }

    /// Writes the new value and returns the absolute change.
    pub(crate) fn set(&mut self, state: usize, value: f64) -> f64 {
        let change = (self.values[state] - value).abs();
        self.values[state] = value;
        change
    }
}
