// src/taskfile/mod.rs

//! Task file indexing.
//!
//! A task file holds one shell command per line. The index of a task is its
//! zero-based line number in the raw file, so that it lines up with the
//! scheduler's array index. Blank lines and `#` comments are not tasks, but
//! they still take up an index slot.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::errors::{DsqError, Result};
use crate::range::ArrayRange;

/// A single task: its array index and the command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: u64,
    pub command: String,
}

/// Handle on a task file on disk.
///
/// Nothing is read until [`TaskFile::tasks`] is called, and every call opens
/// the file afresh, so the sequence can be walked any number of times.
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily iterate over the tasks in file order.
    pub fn tasks(&self) -> Result<TaskIter> {
        let file = File::open(&self.path).map_err(|source| DsqError::TaskFile {
            path: self.path.clone(),
            source,
        })?;
        Ok(TaskIter {
            path: self.path.clone(),
            lines: BufReader::new(file).lines(),
            next_index: 0,
        })
    }

    /// Collect every task in file order.
    pub fn read_all(&self) -> Result<Vec<Task>> {
        self.tasks()?.collect()
    }

    /// The canonical index range covering all tasks in the file.
    pub fn array_range(&self) -> Result<ArrayRange> {
        let mut indices = Vec::new();
        for task in self.tasks()? {
            indices.push(task?.index);
        }
        Ok(ArrayRange::from_indices(indices))
    }

    /// Resolve the task at `index`.
    ///
    /// Fails with [`DsqError::IndexNotFound`] when the file is too short, or
    /// when the line at `index` is blank or a comment.
    pub fn get(&self, index: u64) -> Result<Task> {
        for task in self.tasks()? {
            let task = task?;
            if task.index == index {
                return Ok(task);
            }
            if task.index > index {
                break;
            }
        }
        Err(DsqError::IndexNotFound {
            path: self.path.clone(),
            index,
        })
    }
}

/// Iterator returned by [`TaskFile::tasks`].
pub struct TaskIter {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    next_index: u64,
}

impl Iterator for TaskIter {
    type Item = Result<Task>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(DsqError::TaskFile {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };

            let index = self.next_index;
            self.next_index += 1;

            if let Some(command) = task_command(&line) {
                return Some(Ok(Task {
                    index,
                    command: command.to_string(),
                }));
            }
        }
    }
}

/// The command text for a raw line, or `None` if the line is not a task.
pub fn task_command(line: &str) -> Option<&str> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(trimmed)
    }
}
