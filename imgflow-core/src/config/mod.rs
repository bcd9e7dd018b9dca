//! Configuration types for imgflow.
//!
//! These types represent the validated runtime configuration used by the
//! processors. Loading and parsing the TOML file is handled by the server
//! crate.

mod config_store;
mod execution;
mod workflow;

pub use config_store::{ConfigStore, ConfigWatcher};
pub use execution::ExecutionConfig;
pub use workflow::WorkflowConfig;
