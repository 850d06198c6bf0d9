// src/config/env.rs

//! The supervisor's identity, taken from the scheduler-provided environment.

use crate::errors::{DsqError, Result};

/// Array job id of the running element.
pub const JOB_ID_VAR: &str = "SLURM_ARRAY_JOB_ID";
/// Array index of the running element.
pub const TASK_INDEX_VAR: &str = "SLURM_ARRAY_TASK_ID";

/// Who this supervisor is: built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorEnv {
    pub job_id: String,
    pub task_index: u64,
}

impl SupervisorEnv {
    /// Read both variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let job_id = lookup(JOB_ID_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(DsqError::MissingEnv(JOB_ID_VAR))?;

        let raw_index = lookup(TASK_INDEX_VAR).ok_or(DsqError::MissingEnv(TASK_INDEX_VAR))?;
        let task_index = raw_index
            .trim()
            .parse::<u64>()
            .map_err(|_| DsqError::InvalidEnv {
                name: TASK_INDEX_VAR,
                value: raw_index.clone(),
            })?;

        Ok(Self { job_id, task_index })
    }
}
