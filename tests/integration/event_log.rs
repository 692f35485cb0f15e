//! Recorded events on disk and the offline report built from them.

use tokio::sync::mpsc;

use syntaxlab::actors::EventRecorderActor;
use syntaxlab::report::{self, EventLog};
use syntaxlab::task::{Group, TaskCatalog};

use crate::fixtures::Harness;

fn finished_run(id: &str, group: Group) -> Harness {
    let mut harness = Harness::new();
    harness.start(id, group);
    harness.unlock();
    for _ in 0..10 {
        harness.solve_current_task();
    }
    harness
}

/// Test: Event log round trip
/// Given two participants' runs recorded through the recorder actor
/// When the log is loaded and summarized
/// Then both participants appear with their groups and every task
#[tokio::test]
async fn test_recorded_runs_summarize() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("events.jsonl");
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let recorder = EventRecorderActor::new(msg_tx, &path).spawn();

    let first = finished_run("a1", Group::AB);
    let second = finished_run("b2", Group::BA);
    let total = first.events.len() + second.events.len();
    for event in first.events.into_iter().chain(second.events) {
        assert!(recorder.record(event));
    }
    recorder.close().await;
    assert!(msg_rx.try_recv().is_err(), "No write failures");

    let log = EventLog::load(&path).unwrap();
    assert_eq!(log.events().len(), total);
    assert_eq!(log.skipped(), 0);
    assert_eq!(log.participants(), vec!["a1", "b2"]);

    let catalog = TaskCatalog::builtin().unwrap();
    let summaries = report::summarize(&log, &catalog);
    assert_eq!(summaries[0].group, Some(Group::AB));
    assert_eq!(summaries[1].group, Some(Group::BA));
    assert!(summaries.iter().all(|s| s.tasks.len() == catalog.len()));

    let table = report::render(&summaries);
    assert!(table.starts_with("participant\tgroup\ttask"));
    assert_eq!(table.lines().count(), 1 + 2 * catalog.len());
    assert!(table.contains("b2\tBA\t7\tjv\t"));
}

/// Test: Damaged log
/// Given a log with a truncated last line
/// When it is loaded
/// Then the good lines are kept and the bad one is counted
#[tokio::test]
async fn test_truncated_log_line_is_skipped() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("events.jsonl");
    let (msg_tx, _msg_rx) = mpsc::unbounded_channel();
    let recorder = EventRecorderActor::new(msg_tx, &path).spawn();

    let mut harness = Harness::new();
    harness.start("c3", Group::AB);
    let count = harness.events.len();
    for event in harness.events.drain(..) {
        recorder.record(event);
    }
    recorder.close().await;

    let mut text = std::fs::read_to_string(&path).unwrap();
    text.push_str("{\"experiment\":\"c3\",\"ty");
    let log = EventLog::parse(&text);
    assert_eq!(log.events().len(), count);
    assert_eq!(log.skipped(), 1);
}
