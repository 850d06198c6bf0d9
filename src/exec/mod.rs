// src/exec/mod.rs

//! Per-element execution.
//!
//! - [`signals`] turns OS signals into messages on a channel.
//! - [`supervisor`] runs one task under a shell, forwards those signals to
//!   it, and appends the outcome to the job's status log.

pub mod signals;
pub mod supervisor;

pub use signals::{FORWARDED_SIGNALS, SignalListener};
pub use supervisor::{Supervisor, SupervisorOutcome, exit_code_of};
