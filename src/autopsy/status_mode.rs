// src/autopsy/status_mode.rs

//! Status-file reconciliation: task file + status log -> succeeded / failed /
//! not run.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::range::collapse;
use crate::status::StatusLog;
use crate::taskfile::{Task, TaskFile};

/// How a task ended up, according to the status log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Succeeded,
    Failed,
    NotRun,
}

/// Outcome of a status-file reconciliation.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub succeeded: BTreeSet<u64>,
    pub failed: BTreeSet<u64>,
    pub not_run: BTreeSet<u64>,
    /// Every task not in `succeeded`, in task file order.
    pub reruns: Vec<Task>,
}

impl StatusReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.not_run.len()
    }

    pub fn disposition_of(&self, index: u64) -> Option<Disposition> {
        if self.succeeded.contains(&index) {
            Some(Disposition::Succeeded)
        } else if self.failed.contains(&index) {
            Some(Disposition::Failed)
        } else if self.not_run.contains(&index) {
            Some(Disposition::NotRun)
        } else {
            None
        }
    }

    /// Write the rerun command lines, one per line.
    pub fn write_reruns(&self, out: &mut impl Write) -> std::io::Result<()> {
        for task in &self.reruns {
            writeln!(out, "{}", task.command)?;
        }
        Ok(())
    }

    /// Write the one-line category summary.
    pub fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(
            out,
            "Succeeded: {}  Failed: {}  Not run: {}",
            self.succeeded.len(),
            self.failed.len(),
            self.not_run.len()
        )?;
        if !self.failed.is_empty() {
            writeln!(out, "  failed indices: {}", collapse(self.failed.iter().copied()))?;
        }
        if !self.not_run.is_empty() {
            writeln!(out, "  not run indices: {}", collapse(self.not_run.iter().copied()))?;
        }
        Ok(())
    }
}

/// Classify every task in `task_file` against the records in `log`.
///
/// An index with several records succeeded if any of them exited zero.
/// Records for indices that are not tasks in the file are ignored.
pub fn reconcile_status_file(task_file: &TaskFile, log: &StatusLog) -> Result<StatusReport> {
    let tasks = task_file.read_all()?;
    let records = log.read_records()?;

    let mut best_exit: BTreeMap<u64, bool> = BTreeMap::new();
    for rec in &records {
        let ok = best_exit.entry(rec.index).or_insert(false);
        *ok |= rec.succeeded();
    }

    let mut report = StatusReport::default();
    for task in tasks {
        match best_exit.remove(&task.index) {
            Some(true) => {
                report.succeeded.insert(task.index);
                continue;
            }
            Some(false) => {
                report.failed.insert(task.index);
            }
            None => {
                report.not_run.insert(task.index);
            }
        }
        report.reruns.push(task);
    }

    if !best_exit.is_empty() {
        warn!(
            path = ?log.path(),
            indices = %collapse(best_exit.keys().copied()),
            "status log has records for indices that are not tasks in the task file"
        );
    }

    debug!(
        records = records.len(),
        tasks = report.total(),
        "status-file reconciliation complete"
    );

    Ok(report)
}
