// src/autopsy/mod.rs

//! Post-hoc reconciliation of an array job ("autopsy").
//!
//! Two independent modes:
//! - [`status_mode`] reads the status log written by the supervisors and
//!   splits tasks into succeeded / failed / not run.
//! - [`state_mode`] asks the scheduler for per-element state via a
//!   [`query::SchedulerQuery`] and selects elements in rerun-worthy states.
//!
//! Both write rerun command lines to stdout and their summaries to stderr.

pub mod query;
pub mod state_mode;
pub mod states;
pub mod status_mode;

pub use query::{SacctQuery, SchedulerQuery, StateRow};
pub use state_mode::{StateReport, query_and_reconcile, reconcile_states};
pub use states::{DEFAULT_RERUN_STATES, JobState, parse_rerun_states};
pub use status_mode::{Disposition, StatusReport, reconcile_status_file};
