// src/autopsy/states.rs

//! The fixed set of scheduler job states a rerun selection may name.

use std::fmt;
use std::str::FromStr;

use crate::errors::{DsqError, Result};

/// States the default rerun selection targets.
pub const DEFAULT_RERUN_STATES: &str = "CANCELLED,NODE_FAIL,PREEMPTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobState {
    BootFail,
    Cancelled,
    Completed,
    Deadline,
    Failed,
    NodeFail,
    OutOfMemory,
    Pending,
    Preempted,
    Running,
    Requeued,
    Resizing,
    Revoked,
    Suspended,
    Timeout,
}

impl JobState {
    pub const ALL: [JobState; 15] = [
        JobState::BootFail,
        JobState::Cancelled,
        JobState::Completed,
        JobState::Deadline,
        JobState::Failed,
        JobState::NodeFail,
        JobState::OutOfMemory,
        JobState::Pending,
        JobState::Preempted,
        JobState::Running,
        JobState::Requeued,
        JobState::Resizing,
        JobState::Revoked,
        JobState::Suspended,
        JobState::Timeout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::BootFail => "BOOT_FAIL",
            JobState::Cancelled => "CANCELLED",
            JobState::Completed => "COMPLETED",
            JobState::Deadline => "DEADLINE",
            JobState::Failed => "FAILED",
            JobState::NodeFail => "NODE_FAIL",
            JobState::OutOfMemory => "OUT_OF_MEMORY",
            JobState::Pending => "PENDING",
            JobState::Preempted => "PREEMPTED",
            JobState::Running => "RUNNING",
            JobState::Requeued => "REQUEUED",
            JobState::Resizing => "RESIZING",
            JobState::Revoked => "REVOKED",
            JobState::Suspended => "SUSPENDED",
            JobState::Timeout => "TIMEOUT",
        }
    }

    /// Whether a reported state belongs to this state.
    ///
    /// The scheduler may append detail, e.g. `"CANCELLED by 12345"`.
    pub fn matches(&self, reported: &str) -> bool {
        reported.starts_with(self.as_str())
    }

    fn allowed_list() -> String {
        JobState::ALL
            .iter()
            .map(JobState::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = DsqError;

    /// Case-sensitive: `"cancelled"` is not a state.
    fn from_str(s: &str) -> Result<Self> {
        JobState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| DsqError::UnknownState {
                token: s.to_string(),
                allowed: JobState::allowed_list(),
            })
    }
}

/// Parse a comma-separated rerun selection such as `"NODE_FAIL,PREEMPTED"`.
///
/// The first unknown token aborts the whole selection.
pub fn parse_rerun_states(list: &str) -> Result<Vec<JobState>> {
    let mut states = Vec::new();
    for token in list.split(',') {
        let state: JobState = token.parse()?;
        if !states.contains(&state) {
            states.push(state);
        }
    }
    Ok(states)
}
