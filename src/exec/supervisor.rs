// src/exec/supervisor.rs

//! Runs exactly one array element end to end.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::SupervisorEnv;
use crate::errors::Result;
use crate::exec::signals::{FORWARDED_SIGNALS, SignalListener};
use crate::status::{StatusLog, StatusRecord};
use crate::taskfile::TaskFile;

/// What happened to the supervised task.
#[derive(Debug, Clone)]
pub struct SupervisorOutcome {
    /// The record appended to the status log.
    pub record: StatusRecord,
    /// Signals forwarded to the child while it ran, in arrival order.
    pub forwarded: Vec<Signal>,
}

impl SupervisorOutcome {
    /// Status this process should exit with.
    pub fn exit_code(&self) -> i32 {
        self.record.exit_code
    }
}

#[derive(Debug, Clone)]
pub struct Supervisor {
    env: SupervisorEnv,
    task_file: TaskFile,
    status_log: StatusLog,
}

impl Supervisor {
    pub fn new(env: SupervisorEnv, task_file: TaskFile, status_log: StatusLog) -> Self {
        Self {
            env,
            task_file,
            status_log,
        }
    }

    /// Resolve, run and record this element's task.
    ///
    /// Fails without writing a record if the task cannot be resolved or
    /// started. A task that runs and exits non-zero is not an error.
    pub async fn run(&self) -> Result<SupervisorOutcome> {
        let task = self.task_file.get(self.env.task_index)?;
        let hostname = local_hostname();

        info!(
            job_id = %self.env.job_id,
            index = task.index,
            host = %hostname,
            cmd = %task.command,
            "starting task"
        );

        // Listen before spawning so a signal can never hit the default action
        // while the child is already running.
        let mut listener = SignalListener::install(&FORWARDED_SIGNALS)?;

        let start_time = Local::now().naive_local();
        let clock = Instant::now();

        let mut child = shell_command(&task.command)
            .spawn()
            .with_context(|| format!("spawning shell for task {}", task.index))?;

        let (status, forwarded) = wait_forwarding(&mut child, &mut listener).await?;

        let elapsed_seconds = clock.elapsed().as_secs_f64();
        let end_time = Local::now().naive_local();
        let exit_code = exit_code_of(status);

        info!(
            job_id = %self.env.job_id,
            index = task.index,
            exit_code,
            elapsed_secs = elapsed_seconds,
            "task exited"
        );

        let record = StatusRecord {
            index: task.index,
            exit_code,
            hostname,
            start_time,
            end_time,
            elapsed_seconds,
            command: task.command,
        };
        self.status_log.append(&record)?;

        Ok(SupervisorOutcome { record, forwarded })
    }
}

fn shell_command(cmd: &str) -> Command {
    let mut c = Command::new("sh");
    c.arg("-c")
        .arg(cmd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    c
}

/// Wait for `child`, re-delivering every signal the listener reports.
///
/// The supervisor never exits on its own account: after forwarding it keeps
/// waiting until the child's exit is observed.
async fn wait_forwarding(
    child: &mut Child,
    listener: &mut SignalListener,
) -> Result<(ExitStatus, Vec<Signal>)> {
    let mut forwarded = Vec::new();

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.context("waiting for task process")?;
                return Ok((status, forwarded));
            }
            Some(sig) = listener.recv() => {
                if let Some(pid) = child.id() {
                    forward_signal(pid, sig);
                    forwarded.push(sig);
                }
            }
        }
    }
}

fn forward_signal(pid: u32, sig: Signal) {
    match kill(Pid::from_raw(pid as i32), sig) {
        Ok(()) => info!(pid, signal = %sig, "forwarded signal to task"),
        // Raced with the child exiting; the wait will pick that up.
        Err(Errno::ESRCH) => debug!(pid, signal = %sig, "task already gone; signal dropped"),
        Err(e) => warn!(pid, signal = %sig, error = %e, "failed to forward signal"),
    }
}

/// Map an exit status to a shell-style code: the exit code, or
/// `128 + signo` when the process was killed by a signal.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(sig)) => 128 + sig,
        (None, None) => -1,
    }
}

fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!(error = %e, "could not determine hostname");
            "unknown".to_string()
        }
    }
}
