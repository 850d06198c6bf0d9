// src/lib.rs

pub mod autopsy;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod range;
pub mod status;
pub mod taskfile;

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::autopsy::{
    JobState, SacctQuery, SchedulerQuery, parse_rerun_states, query_and_reconcile,
    reconcile_status_file,
};
use crate::cli::{AutopsyMode, CliArgs, Command};
use crate::config::{ConfigFile, SupervisorEnv, load_or_default};
use crate::errors::Result;
use crate::exec::Supervisor;
use crate::status::StatusLog;
use crate::taskfile::TaskFile;

/// High-level entry point used by `main.rs`.
///
/// Returns the status the process should exit with. For `run` that is the
/// task's own exit status; everything else exits 0 on success.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Run {
            task_file,
            status_dir,
            lock_appends,
        } => {
            // Identity comes from the scheduler; read it exactly once.
            let env = SupervisorEnv::from_env()?;
            let dir = status_dir.unwrap_or_else(|| cfg.status.dir.clone());
            let log = StatusLog::for_job(&dir, &env.job_id)
                .with_lock_appends(lock_appends || cfg.status.lock_appends);

            let supervisor = Supervisor::new(env, TaskFile::new(task_file), log);
            let outcome = supervisor.run().await?;
            if !outcome.forwarded.is_empty() {
                info!(forwarded = ?outcome.forwarded, "signals passed to the task");
            }
            Ok(outcome.exit_code())
        }

        Command::Autopsy {
            mode: AutopsyMode::Status {
                task_file,
                status_file,
            },
        } => {
            autopsy_status(&task_file, &status_file)?;
            Ok(0)
        }

        Command::Autopsy {
            mode: AutopsyMode::State {
                job_id,
                task_file,
                states,
            },
        } => {
            let rerun_states = resolve_rerun_states(states.as_deref(), &cfg)?;
            let query = SacctQuery::new(cfg.scheduler.sacct.clone());
            autopsy_state(&query, &job_id, task_file.as_deref(), &rerun_states).await?;
            Ok(0)
        }

        Command::ArrayRange { task_file } => {
            let range = TaskFile::new(task_file).array_range()?;
            if range.is_empty() {
                warn!("task file has no tasks; nothing to submit");
            }
            println!("{range}");
            eprintln!("{} tasks", range.count());
            Ok(0)
        }
    }
}

/// States named on the command line win over the config file.
fn resolve_rerun_states(cli: Option<&str>, cfg: &ConfigFile) -> Result<Vec<JobState>> {
    match cli {
        Some(list) => parse_rerun_states(list),
        None => Ok(cfg.autopsy.rerun_states.clone()),
    }
}

/// Status-file autopsy: rerun commands to stdout, summary to stderr.
pub fn autopsy_status(task_file: &Path, status_file: &Path) -> Result<()> {
    let report = reconcile_status_file(&TaskFile::new(task_file), &StatusLog::at(status_file))?;

    info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        not_run = report.not_run.len(),
        "status-file autopsy"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report.write_reruns(&mut out)?;
    out.flush()?;

    report.write_summary(&mut std::io::stderr().lock())?;
    Ok(())
}

/// Scheduler-state autopsy: summary to stderr and, given a task file, the
/// commands of rerun-worthy elements to stdout.
///
/// The task file is opened before the scheduler is queried, so a bad path
/// fails without a wasted query.
pub async fn autopsy_state<Q>(
    query: &Q,
    job_id: &str,
    task_file: Option<&Path>,
    rerun_states: &[JobState],
) -> Result<()>
where
    Q: SchedulerQuery + ?Sized,
{
    let task_file = match task_file {
        Some(path) => {
            let tf = TaskFile::new(path);
            tf.tasks()?;
            Some(tf)
        }
        None => None,
    };

    let report = query_and_reconcile(query, job_id, rerun_states).await?;
    report.write_summary(&mut std::io::stderr().lock())?;

    if let Some(tf) = task_file {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        report.write_reruns(&tf, &mut out)?;
        out.flush()?;
    } else {
        debug!(job_id, "no task file given; not printing rerun commands");
    }

    Ok(())
}
