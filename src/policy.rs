mod state_values;
mod tabular_policy;

pub use state_values::StateValues;
pub use tabular_policy::TabularPolicy;
