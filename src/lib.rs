pub mod action_selection;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod persistence;
pub mod policy;
pub mod policy_update;
pub mod trainer;
pub mod utils;

pub use agent::TabularAgent;
pub use config::{RunConfig, Variant};
pub use error::Error;
