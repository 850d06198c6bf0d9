// tests/task_file.rs
mod common;
use crate::common::builders::TaskFileBuilder;
use crate::common::init_tracing;

use std::error::Error;

use dsq::errors::DsqError;
use dsq::taskfile::TaskFile;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn indices_count_comments_and_blank_lines() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new()
        .comment("preprocessing")
        .task("python prep.py a")
        .blank()
        .task("python prep.py b")
        .comment("fit")
        .task("python fit.py")
        .build();

    let tasks = built.task_file().read_all()?;
    let indices: Vec<u64> = tasks.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![1, 3, 5]);
    assert_eq!(tasks[2].command, "python fit.py");

    assert_eq!(built.task_file().array_range()?.to_string(), "1,3,5");
    Ok(())
}

#[test]
fn sequence_can_be_walked_twice() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new().echo_tasks(4).build();
    let tf = built.task_file();

    let first: Vec<_> = tf.tasks()?.collect::<Result<_, _>>()?;
    let second: Vec<_> = tf.tasks()?.collect::<Result<_, _>>()?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    Ok(())
}

#[test]
fn get_resolves_by_raw_line_number() -> TestResult {
    init_tracing();

    let built = TaskFileBuilder::new()
        .comment("header")
        .task("echo one")
        .task("echo two   ")
        .build();

    let task = built.task_file().get(2)?;
    assert_eq!(task.index, 2);
    assert_eq!(task.command, "echo two");
    Ok(())
}

#[test]
fn get_past_end_of_file_is_index_not_found() {
    init_tracing();

    let built = TaskFileBuilder::new().echo_tasks(3).build();
    match built.task_file().get(3) {
        Err(DsqError::IndexNotFound { index, path }) => {
            assert_eq!(index, 3);
            assert_eq!(path, built.path);
        }
        other => panic!("expected IndexNotFound, got {other:?}"),
    }
}

#[test]
fn get_on_comment_line_is_index_not_found() {
    init_tracing();

    let built = TaskFileBuilder::new().comment("not a task").task("echo x").build();
    assert!(matches!(
        built.task_file().get(0),
        Err(DsqError::IndexNotFound { index: 0, .. })
    ));
}

#[test]
fn unreadable_file_is_task_file_error() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let tf = TaskFile::new(dir.path().join("missing.txt"));
    assert!(matches!(tf.tasks(), Err(DsqError::TaskFile { .. })));
    assert!(matches!(tf.get(0), Err(DsqError::TaskFile { .. })));
}
