// tests/config_and_cli.rs
mod common;
use crate::common::builders::TaskFileBuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::NamedTempFile;

use dsq::autopsy::JobState;
use dsq::config::{ConfigFile, load_and_validate, load_or_default};
use dsq::errors::DsqError;

type TestResult = Result<(), Box<dyn Error>>;

fn dsq() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dsq"));
    cmd.env_remove("DSQ_LOG");
    cmd
}

#[test]
fn full_config_file_is_loaded() -> TestResult {
    init_tracing();

    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[status]
dir = "/scratch/me/status"
lock_appends = true

[scheduler]
sacct = "/opt/slurm/bin/sacct"

[autopsy]
rerun_states = ["TIMEOUT", "OUT_OF_MEMORY"]
"#
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.status.dir, PathBuf::from("/scratch/me/status"));
    assert!(cfg.status.lock_appends);
    assert_eq!(cfg.scheduler.sacct, "/opt/slurm/bin/sacct");
    assert_eq!(
        cfg.autopsy.rerun_states,
        vec![JobState::Timeout, JobState::OutOfMemory]
    );
    Ok(())
}

#[test]
fn empty_config_file_means_defaults() -> TestResult {
    init_tracing();

    let file = NamedTempFile::new()?;
    let cfg = load_and_validate(file.path())?;
    let defaults = ConfigFile::default();

    assert_eq!(cfg.status.dir, defaults.status.dir);
    assert!(!cfg.status.lock_appends);
    assert_eq!(cfg.scheduler.sacct, "sacct");
    assert_eq!(cfg.autopsy.rerun_states, defaults.autopsy.rerun_states);
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    init_tracing();

    let mut file = NamedTempFile::new()?;
    write!(file, "[status]\ndirectory = \"x\"\n")?;
    assert!(matches!(load_and_validate(file.path()), Err(DsqError::Toml(_))));
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        load_or_default(Some(&missing)),
        Err(DsqError::Config(_))
    ));
}

#[test]
fn unknown_state_aborts_before_the_scheduler_is_queried() -> TestResult {
    init_tracing();

    let scratch = tempfile::tempdir()?;
    let marker = scratch.path().join("queried");
    let fake_sacct = scratch.path().join("fake-sacct");
    std::fs::write(
        &fake_sacct,
        format!("#!/bin/sh\ntouch {}\necho '1_0|COMPLETED'\n", marker.display()),
    )?;
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&fake_sacct, std::fs::Permissions::from_mode(0o755))?;
    }
    let cfg = scratch.path().join("dsq.toml");
    std::fs::write(
        &cfg,
        format!("[scheduler]\nsacct = \"{}\"\n", fake_sacct.display()),
    )?;

    let out = dsq()
        .args(["autopsy", "state", "-j", "1", "-s", "NODE_FAIL,Bogus"])
        .arg("--config")
        .arg(&cfg)
        .output()?;

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown state: Bogus"), "stderr: {stderr}");
    assert!(!marker.exists(), "scheduler must not be queried");

    // The same setup with valid states does reach the (fake) scheduler.
    let built = TaskFileBuilder::new().task("echo zero").build();
    let out = dsq()
        .args(["autopsy", "state", "-j", "1", "-s", "COMPLETED", "-f"])
        .arg(&built.path)
        .arg("--config")
        .arg(&cfg)
        .output()?;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(marker.exists());
    assert_eq!(String::from_utf8(out.stdout)?, "echo zero\n");
    assert!(String::from_utf8_lossy(&out.stderr).contains("State Summary for Array 1"));
    Ok(())
}

#[test]
fn status_autopsy_prints_reruns_to_stdout_and_counts_to_stderr() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new().echo_tasks(3).build();
    let status = built.dir().join("job_9_status.tsv");
    std::fs::write(
        &status,
        "1\t0\tn1\t2024-05-01 12:00:00\t2024-05-01 12:00:01\t1.00\techo task-1\n",
    )?;

    let out = dsq()
        .args(["autopsy", "status"])
        .arg(&built.path)
        .arg(&status)
        .output()?;

    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout)?, "echo task-0\necho task-2\n");
    assert!(String::from_utf8_lossy(&out.stderr).contains("Succeeded: 1  Failed: 0  Not run: 2"));
    Ok(())
}

#[test]
fn array_range_reports_sparse_indices() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new()
        .echo_tasks(3)
        .comment("gap")
        .echo_tasks(1)
        .blank()
        .echo_tasks(2)
        .build();

    let out = dsq().arg("array-range").arg(&built.path).output()?;
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout)?, "0-2,4,6-7\n");
    assert!(String::from_utf8_lossy(&out.stderr).contains("6 tasks"));
    Ok(())
}

#[test]
fn array_range_warns_when_nothing_would_run() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new().comment("all commented out").blank().build();

    let out = dsq().arg("array-range").arg(&built.path).output()?;
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout)?, "\n");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("0 tasks"), "stderr: {stderr}");
    assert!(stderr.contains("task file has no tasks"), "stderr: {stderr}");
    Ok(())
}
