// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `dsq`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dsq",
    version,
    about = "Run a file of independent shell commands as a scheduler job array, and find out which ones need rerunning.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// If omitted, `dsq.toml` in the working directory is used when present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DSQ_LOG` or a default level of `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run this array element's task (called by the scheduler, once per index).
    ///
    /// Reads SLURM_ARRAY_JOB_ID and SLURM_ARRAY_TASK_ID from the environment.
    Run {
        /// Task file, one command per line.
        task_file: PathBuf,

        /// Directory for the job's status log (overrides `[status].dir`).
        #[arg(long, value_name = "DIR")]
        status_dir: Option<PathBuf>,

        /// Lock the status log around every append.
        #[arg(long)]
        lock_appends: bool,
    },

    /// Work out which tasks of a job need rerunning.
    Autopsy {
        #[command(subcommand)]
        mode: AutopsyMode,
    },

    /// Print the array index range covering every task in a task file.
    ArrayRange {
        /// Task file, one command per line.
        task_file: PathBuf,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AutopsyMode {
    /// Classify tasks from a job's status log; print commands that did not
    /// succeed.
    Status {
        /// Task file the job was submitted with.
        task_file: PathBuf,

        /// The job's status log (`job_<id>_status.tsv`).
        status_file: PathBuf,
    },

    /// Summarise scheduler state per element; with `--task-file`, print the
    /// commands of elements in one of `--states`.
    State {
        /// Job id of the array.
        #[arg(short = 'j', long, value_name = "JOBID")]
        job_id: String,

        /// Task file the job was submitted with.
        #[arg(short = 'f', long, value_name = "PATH")]
        task_file: Option<PathBuf>,

        /// Comma-separated states to rerun (default from config, else
        /// CANCELLED,NODE_FAIL,PREEMPTED).
        #[arg(short = 's', long, value_name = "STATES")]
        states: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_state_autopsy_flags() {
        let args = CliArgs::try_parse_from([
            "dsq", "autopsy", "state", "-j", "1243", "-f", "jobs.txt", "-s", "NODE_FAIL,PREEMPTED",
        ])
        .unwrap();
        match args.command {
            Command::Autopsy {
                mode: AutopsyMode::State { job_id, task_file, states },
            } => {
                assert_eq!(job_id, "1243");
                assert_eq!(task_file, Some(PathBuf::from("jobs.txt")));
                assert_eq!(states.as_deref(), Some("NODE_FAIL,PREEMPTED"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["dsq", "run", "tasks.txt", "--log-level", "debug"]).unwrap();
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(matches!(args.command, Command::Run { .. }));
    }
}
