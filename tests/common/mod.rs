#![allow(dead_code)]

use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};

pub use dsq_test_utils::builders;
pub use dsq_test_utils::fake_scheduler;
pub use dsq_test_utils::init_tracing;

/// `dsq run <task_file>` for one array element, as the scheduler would
/// launch it.
pub fn supervisor_command(task_file: &Path, status_dir: &Path, job_id: &str, index: u64) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dsq"));
    cmd.arg("run")
        .arg(task_file)
        .arg("--status-dir")
        .arg(status_dir)
        .env("SLURM_ARRAY_JOB_ID", job_id)
        .env("SLURM_ARRAY_TASK_ID", index.to_string())
        .env_remove("DSQ_LOG");
    cmd
}

/// Wait for a child process, panicking if it outlives `limit`.
pub fn wait_with_limit(child: &mut Child, limit: Duration) -> ExitStatus {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().expect("polling child") {
            return status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("process did not exit within {limit:?}");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Poll until `path` exists.
pub fn wait_for_file(path: &Path, limit: Duration) {
    let deadline = Instant::now() + limit;
    while !path.exists() {
        if Instant::now() > deadline {
            panic!("{} did not appear within {limit:?}", path.display());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
