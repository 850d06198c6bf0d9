// src/status/log.rs

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::{debug, warn};

use crate::errors::{DsqError, Result};
use crate::status::record::{STATUS_HEADER, StatusRecord};

/// Largest record we trust the OS to append in one piece without a lock.
///
/// This matches `PIPE_BUF` on Linux; `O_APPEND` writes of this size land as a
/// single contiguous chunk on local and most shared filesystems.
pub const ATOMIC_APPEND_LIMIT: usize = 4096;

/// The per-job status log file.
///
/// Every [`StatusLog::append`] opens the file in append mode under an
/// advisory `flock`. Ordinary records take the lock shared and go out in
/// exactly one `write`, so writers do not wait on each other. Oversized
/// records, or every record when `lock_appends` is set, take it exclusively
/// and may be written in several pieces.
#[derive(Debug, Clone)]
pub struct StatusLog {
    path: PathBuf,
    lock_appends: bool,
}

impl StatusLog {
    /// The log for `job_id` inside `dir` (`<dir>/job_<job_id>_status.tsv`).
    pub fn for_job(dir: impl AsRef<Path>, job_id: &str) -> Self {
        Self::at(dir.as_ref().join(file_name_for_job(job_id)))
    }

    /// A log at an explicit path, e.g. one handed to the autopsy.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_appends: false,
        }
    }

    pub fn with_lock_appends(mut self, lock_appends: bool) -> Self {
        self.lock_appends = lock_appends;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line.
    pub fn append(&self, record: &StatusRecord) -> Result<()> {
        if record.command.contains('\t') {
            warn!(
                index = record.index,
                "task command contains a tab; the status line will not split cleanly"
            );
        }

        let line = record.to_line();
        let exclusive = self.lock_appends || line.len() > ATOMIC_APPEND_LIMIT;

        self.append_line(line.as_bytes(), exclusive)
            .map_err(|source| DsqError::StatusLog {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = ?self.path,
            index = record.index,
            bytes = line.len(),
            exclusive,
            "appended status record"
        );
        Ok(())
    }

    fn append_line(&self, bytes: &[u8], exclusive: bool) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Readable too: NFS emulates `flock` with byte-range locks, and a
        // shared one of those needs a read descriptor.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Shared holders issue one write each; an exclusive holder may write
        // in pieces while everyone else waits.
        let mode = if exclusive {
            FlockArg::LockExclusive
        } else {
            FlockArg::LockShared
        };
        let mut guard =
            Flock::lock(file, mode).map_err(|(_, errno)| io::Error::from(errno))?;

        if exclusive {
            guard.write_all(bytes)?;
            guard.flush()
        } else {
            write_once(&mut guard, bytes)
        }
    }

    /// Read every well-formed record currently in the log.
    ///
    /// The log may still be growing. Blank lines, the header row and lines
    /// that do not parse (e.g. a writer's line not yet complete) are skipped.
    pub fn read_records(&self) -> Result<Vec<StatusRecord>> {
        let file = File::open(&self.path).map_err(|source| DsqError::StatusLog {
            path: self.path.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| DsqError::StatusLog {
                path: self.path.clone(),
                source,
            })?;

            if line.trim().is_empty() || line.starts_with(STATUS_HEADER[0]) {
                continue;
            }

            match line.parse::<StatusRecord>() {
                Ok(rec) => records.push(rec),
                Err(err) => warn!(
                    path = ?self.path,
                    line = lineno + 1,
                    error = %err,
                    "skipping malformed status line"
                ),
            }
        }

        Ok(records)
    }
}

/// File name of the status log for a job.
pub fn file_name_for_job(job_id: &str) -> String {
    format!("job_{job_id}_status.tsv")
}

/// One `write` call; a short write would leave a torn line, so it is an error.
fn write_once(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    let written = file.write(bytes)?;
    if written != bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short append: wrote {written} of {} bytes", bytes.len()),
        ));
    }
    Ok(())
}
