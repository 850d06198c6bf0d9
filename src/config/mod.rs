// src/config/mod.rs

//! Configuration for dsq.
//!
//! Responsibilities:
//! - Define the optional TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a `ConfigFile` (`validate.rs`).
//! - Capture the supervisor's identity from the execution environment
//!   (`env.rs`).

pub mod env;
pub mod loader;
pub mod model;
pub mod validate;

pub use env::SupervisorEnv;
pub use loader::{DEFAULT_CONFIG_PATH, load_and_validate, load_from_path, load_or_default};
pub use model::{
    AutopsySection, ConfigFile, RawAutopsySection, RawConfigFile, SchedulerSection, StatusSection,
};
