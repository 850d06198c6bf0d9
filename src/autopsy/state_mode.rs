// src/autopsy/state_mode.rs

//! Scheduler-state reconciliation: group array elements by the state the
//! scheduler reports, and pick out the ones worth rerunning.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use tracing::{debug, info};

use crate::autopsy::query::{SchedulerQuery, StateRow};
use crate::autopsy::states::JobState;
use crate::errors::{DsqError, Result};
use crate::range::{collapse, expand};
use crate::taskfile::TaskFile;

const SUMMARY_HEADER: [&str; 3] = ["State", "Num_Jobs", "Indices"];

#[derive(Debug, Clone, Default)]
pub struct StateReport {
    pub job_id: String,
    /// Indices per reported state text.
    pub by_state: BTreeMap<String, BTreeSet<u64>>,
    /// Indices whose state matched one of the rerun states.
    pub reruns: BTreeSet<u64>,
}

impl StateReport {
    /// States ordered by number of elements, largest first.
    pub fn states_by_count(&self) -> Vec<(&str, &BTreeSet<u64>)> {
        let mut rows: Vec<(&str, &BTreeSet<u64>)> = self
            .by_state
            .iter()
            .map(|(state, idx)| (state.as_str(), idx))
            .collect();
        rows.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        rows
    }

    /// Write the per-state summary table.
    pub fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        let rows: Vec<(&str, usize, String)> = self
            .states_by_count()
            .into_iter()
            .map(|(state, idx)| (state, idx.len(), collapse(idx.iter().copied())))
            .collect();

        let mut widths = SUMMARY_HEADER.map(|h| h.len() + 2);
        for (state, _, indices) in &rows {
            widths[0] = widths[0].max(state.len() + 2);
            widths[2] = widths[2].max(indices.len() + 2);
        }

        writeln!(out, "State Summary for Array {}", self.job_id)?;
        write_summary_row(out, &widths, SUMMARY_HEADER.map(str::to_string))?;
        write_summary_row(out, &widths, SUMMARY_HEADER.map(|h| "-".repeat(h.len())))?;
        for (state, count, indices) in rows {
            write_summary_row(out, &widths, [state.to_string(), count.to_string(), indices])?;
        }
        Ok(())
    }

    /// Write the task file lines for every rerun index, in file order.
    pub fn write_reruns(&self, task_file: &TaskFile, out: &mut impl Write) -> Result<()> {
        if self.reruns.is_empty() {
            return Ok(());
        }
        for task in task_file.tasks()? {
            let task = task?;
            if self.reruns.contains(&task.index) {
                writeln!(out, "{}", task.command)?;
            }
        }
        Ok(())
    }
}

fn write_summary_row(
    out: &mut impl Write,
    widths: &[usize; 3],
    cells: [String; 3],
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<w0$}{:^w1$}{:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    )
}

/// Split a reported id such as `1234_7` or `1234_[8-10%2]` into its indices.
pub fn array_indices(job_id: &str, reported: &str) -> Result<BTreeSet<u64>> {
    let (_, suffix) = reported
        .split_once('_')
        .ok_or_else(|| DsqError::NotAnArrayJob {
            job_id: job_id.to_string(),
            reported: reported.to_string(),
        })?;
    expand(suffix)
}

/// Group rows by state and collect rerun indices.
///
/// Any row without an array index suffix fails the whole reconciliation.
pub fn reconcile_states(
    job_id: &str,
    rows: &[StateRow],
    rerun_states: &[JobState],
) -> Result<StateReport> {
    let mut report = StateReport {
        job_id: job_id.to_string(),
        ..StateReport::default()
    };

    for row in rows {
        let indices = array_indices(job_id, &row.job_id)?;

        if rerun_states.iter().any(|s| s.matches(&row.state)) {
            report.reruns.extend(indices.iter().copied());
        }
        report
            .by_state
            .entry(row.state.clone())
            .or_default()
            .extend(indices);
    }

    debug!(
        job_id,
        states = report.by_state.len(),
        reruns = report.reruns.len(),
        "scheduler-state reconciliation complete"
    );

    Ok(report)
}

/// Query the scheduler for `job_id` and reconcile the result.
pub async fn query_and_reconcile<Q>(
    query: &Q,
    job_id: &str,
    rerun_states: &[JobState],
) -> Result<StateReport>
where
    Q: SchedulerQuery + ?Sized,
{
    let rows = query.array_states(job_id).await?;
    info!(job_id, rows = rows.len(), "received scheduler state rows");
    reconcile_states(job_id, &rows, rerun_states)
}
