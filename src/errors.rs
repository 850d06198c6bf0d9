// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Child-process failures are not errors here: a task exiting non-zero is a
//! recorded outcome, not a supervisor failure.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DsqError {
    #[error("malformed index range '{input}': {reason}")]
    MalformedRange { input: String, reason: String },

    #[error("cannot read task file {path:?}: {source}")]
    TaskFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task file {path:?} has no task at index {index}")]
    IndexNotFound { path: PathBuf, index: u64 },

    #[error("unknown state: {token}. Choose from {allowed}.")]
    UnknownState { token: String, allowed: String },

    #[error("{job_id} does not look like a job array (reported id '{reported}')")]
    NotAnArrayJob { job_id: String, reported: String },

    #[error("execution environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("execution environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("error looking up job {job_id}: {reason}")]
    SchedulerQuery { job_id: String, reason: String },

    #[error("status log {path:?}: {source}")]
    StatusLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DsqError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        DsqError::MalformedRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DsqError>;
