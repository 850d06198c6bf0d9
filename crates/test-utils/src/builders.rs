#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dsq::status::StatusRecord;
use dsq::taskfile::TaskFile;
use tempfile::TempDir;

/// Builds a task file inside its own temp directory.
///
/// Lines are written exactly as given, so comments and blanks keep their
/// index slots.
pub struct TaskFileBuilder {
    lines: Vec<String>,
}

impl TaskFileBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn task(mut self, cmd: &str) -> Self {
        self.lines.push(cmd.to_string());
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {text}"));
        self
    }

    pub fn blank(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    /// Append `n` tasks `echo task-<i>` numbered by their line index.
    pub fn echo_tasks(mut self, n: usize) -> Self {
        for _ in 0..n {
            let idx = self.lines.len();
            self.lines.push(format!("echo task-{idx}"));
        }
        self
    }

    pub fn build(self) -> BuiltTaskFile {
        let dir = tempfile::tempdir().expect("creating temp dir for task file");
        let path = dir.path().join("tasks.txt");
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        fs::write(&path, contents).expect("writing task file");
        BuiltTaskFile { dir, path }
    }
}

impl Default for TaskFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A task file on disk; the directory is removed on drop.
pub struct BuiltTaskFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl BuiltTaskFile {
    pub fn task_file(&self) -> TaskFile {
        TaskFile::new(&self.path)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// A status record with fixed timestamps.
pub fn status_record(index: u64, exit_code: i32, command: &str) -> StatusRecord {
    let t = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid fixed timestamp");
    StatusRecord {
        index,
        exit_code,
        hostname: "node001".to_string(),
        start_time: t,
        end_time: t,
        elapsed_seconds: 1.0,
        command: command.to_string(),
    }
}
