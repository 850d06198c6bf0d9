// src/autopsy/query.rs

//! Pluggable scheduler state query.
//!
//! The autopsy talks to a `SchedulerQuery` instead of running `sacct`
//! directly, so tests can feed canned state rows.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{DsqError, Result};

/// One row of scheduler accounting output: `JobID|State`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRow {
    /// Reported id, e.g. `"1234_7"` or `"1234_[8-20%4]"`.
    pub job_id: String,
    /// Reported state, possibly with detail (`"CANCELLED by 501"`).
    pub state: String,
}

impl StateRow {
    pub fn new(job_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            state: state.into(),
        }
    }
}

/// Trait abstracting how per-element scheduler state is fetched.
pub trait SchedulerQuery: Send {
    fn array_states(
        &self,
        job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StateRow>>> + Send + '_>>;
}

/// Production query backed by Slurm's `sacct`.
#[derive(Debug, Clone)]
pub struct SacctQuery {
    program: String,
}

impl SacctQuery {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SacctQuery {
    fn default() -> Self {
        Self::new("sacct")
    }
}

impl SchedulerQuery for SacctQuery {
    fn array_states(
        &self,
        job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StateRow>>> + Send + '_>> {
        let job_id = job_id.to_string();

        Box::pin(async move {
            let query_err = |reason: String| DsqError::SchedulerQuery {
                job_id: job_id.clone(),
                reason,
            };

            debug!(program = %self.program, job_id = %job_id, "querying scheduler state");

            let output = Command::new(&self.program)
                .arg("-oJobID,State")
                .arg("-nXPj")
                .arg(&job_id)
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| query_err(format!("running {}: {e}", self.program)))?;

            if !output.status.success() {
                return Err(query_err(format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }

            Ok(parse_state_rows(&String::from_utf8_lossy(&output.stdout)))
        })
    }
}

/// Parse `JobID|State` lines, ignoring anything without exactly two fields.
pub fn parse_state_rows(text: &str) -> Vec<StateRow> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split('|');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(id), Some(state), None) => Some(StateRow::new(id.trim(), state.trim())),
                _ => None,
            }
        })
        .collect()
}
