//! Integration tests for fail-fast and collect-all error policies

use crate::integration::test_utils::{named, numbered, std_line, ToolSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use variant_engine::{run, BufferSink, EngineError, ExecutionError, StreamKind};

#[test]
fn test_single_failure_collect_all_reports_exactly_one() {
    let mut sink = BufferSink::new();

    let result = run(
        &named(&["a", "b", "c", "d"]),
        |settings: &ToolSettings| {
            if settings.name == "c" {
                Err(ExecutionError::failed("c is broken"))
            } else {
                Ok(vec![std_line(settings)])
            }
        },
        &mut sink,
        1,
        false,
    );

    let composite = match result {
        Err(EngineError::Failed(composite)) => composite,
        other => panic!("expected composite failure, got {:?}", other),
    };
    assert_eq!(composite.len(), 1);
    assert_eq!(composite.total, 4);
    let failure = composite.first().unwrap();
    assert_eq!(failure.index, 2);
    assert_eq!(failure.error.to_string(), "c is broken");

    let texts: Vec<_> = sink.lines().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["a done", "b done", "d done"]);
}

#[test]
fn test_collect_all_reports_every_failure() {
    let calls = AtomicUsize::new(0);
    let mut sink = BufferSink::new();

    let result = run(
        &numbered(10),
        |settings: &ToolSettings| {
            calls.fetch_add(1, Ordering::SeqCst);
            let n: usize = settings.name[1..].parse().unwrap();
            if n % 3 == 0 {
                Err(ExecutionError::failed(format!("{} failed", settings.name)))
            } else {
                Ok(Vec::new())
            }
        },
        &mut sink,
        3,
        false,
    );

    assert_eq!(calls.load(Ordering::SeqCst), 10);
    let err = result.unwrap_err();
    let composite = err.as_composite().unwrap();
    assert_eq!(composite.indices(), vec![0, 3, 6, 9]);
    assert!(err.to_string().starts_with("4 of 10 variant(s) failed"));
}

#[test]
fn test_sequential_fail_fast_starts_nothing_after_failure() {
    let calls = AtomicUsize::new(0);
    let mut sink = BufferSink::new();

    let result = run(
        &named(&["a", "b", "c"]),
        |settings: &ToolSettings| {
            calls.fetch_add(1, Ordering::SeqCst);
            if settings.name == "a" {
                Err(ExecutionError::process(Some(3), "a exited with 3", vec![
                    variant_engine::OutputLine::err("a: fatal"),
                ]))
            } else {
                Ok(vec![std_line(settings)])
            }
        },
        &mut sink,
        1,
        true,
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let composite = result.unwrap_err();
    let composite = composite.as_composite().unwrap();
    assert_eq!(composite.total, 1);
    assert_eq!(sink.lines().len(), 1);
    assert_eq!(sink.lines()[0].kind, StreamKind::Err);
}

#[test]
fn test_parallel_fail_fast_lets_in_flight_work_finish() {
    let started = AtomicUsize::new(0);
    let finished = AtomicUsize::new(0);
    let mut sink = BufferSink::new();

    let result = run(
        &numbered(40),
        |settings: &ToolSettings| {
            started.fetch_add(1, Ordering::SeqCst);
            if settings.name == "v0" {
                std::thread::sleep(Duration::from_millis(5));
                return Err(ExecutionError::failed("v0 failed"));
            }
            std::thread::sleep(Duration::from_millis(30));
            finished.fetch_add(1, Ordering::SeqCst);
            Ok(vec![std_line(settings)])
        },
        &mut sink,
        4,
        true,
    );

    let err = result.unwrap_err();
    let composite = err.as_composite().unwrap();
    let started = started.load(Ordering::SeqCst);

    // Every started variant was recorded, and dispatch stopped early.
    assert_eq!(composite.total, started);
    assert!(started < 40);
    assert_eq!(composite.indices(), vec![0]);
    // The in-flight successes still delivered their output.
    assert_eq!(sink.lines().len(), finished.load(Ordering::SeqCst));
    assert_eq!(finished.load(Ordering::SeqCst), started - 1);
}

#[test]
fn test_panicking_step_is_reported_not_propagated() {
    let mut sink = BufferSink::new();

    let result = run(
        &named(&["ok", "explodes"]),
        |settings: &ToolSettings| {
            if settings.name == "explodes" {
                panic!("tool crashed");
            }
            Ok(vec![std_line(settings)])
        },
        &mut sink,
        2,
        false,
    );

    let err = result.unwrap_err();
    let composite = err.as_composite().unwrap();
    assert!(matches!(
        composite.failures[0].error,
        ExecutionError::Panicked(ref message) if message == "tool crashed"
    ));
    assert_eq!(sink.lines().len(), 1);
}

#[test]
fn test_anyhow_errors_are_execution_failures() {
    let mut sink = BufferSink::new();

    let result = run(
        &named(&["io"]),
        |_: &ToolSettings| -> Result<Vec<variant_engine::OutputLine>, ExecutionError> {
            let err = std::io::Error::new(std::io::ErrorKind::NotFound, "tool not found");
            Err(anyhow::Error::new(err).context("resolving tool path").into())
        },
        &mut sink,
        1,
        true,
    );

    let err = result.unwrap_err();
    let composite = err.as_composite().unwrap();
    assert_eq!(composite.failures[0].error.to_string(), "resolving tool path");
}
