// src/status/mod.rs

//! Append-only status log shared by every element of an array job.
//!
//! - [`record`] defines one tab-separated [`StatusRecord`] line.
//! - [`log`] owns the per-job file: atomic appends from many writers, and
//!   tolerant reads of partial logs.

pub mod log;
pub mod record;

pub use log::{StatusLog, ATOMIC_APPEND_LIMIT};
pub use record::{StatusRecord, STATUS_HEADER, TIME_FORMAT};
