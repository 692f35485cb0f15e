//! A participant through the whole experiment.

use crossterm::event::KeyCode;

use syntaxlab::events::EventType;
use syntaxlab::grid::{Cell, CellRange};
use syntaxlab::orchestrator::Phase;
use syntaxlab::report::{self, EventLog};
use syntaxlab::route::Route;
use syntaxlab::task::{sequence_for, Group, PerLanguage, TaskCatalog, TaskConfig, EXAMPLE_TASKS};

use crate::fixtures::{snake, write_answer, Harness};

/// Test: Full run
/// Given a participant in group AB
/// When every task is answered and acknowledged
/// Then the runner ends on the end page with a complete event trail
#[test]
fn test_full_experiment_run() {
    let mut harness = Harness::new();
    harness.start("p7", Group::AB);
    assert_eq!(harness.model.route, Route::Consent);
    harness.unlock();
    assert_eq!(harness.model.route, Route::Task(0));

    for index in 0..10 {
        assert_eq!(harness.model.route, Route::Task(index));
        harness.solve_current_task();
    }

    assert_eq!(harness.model.route, Route::End("p7".to_string()));
    assert!(harness.model.orchestrator.is_none());
    harness.key(KeyCode::Char('q'));
    assert!(harness.quit);

    assert_eq!(harness.events_of(EventType::ExperimentStart).len(), 1);
    // consent, preparation, ten tasks, end
    assert_eq!(harness.events_of(EventType::PageEnter).len(), 13);
    assert_eq!(harness.events_of(EventType::TaskStart).len(), 10);
    assert_eq!(harness.events_of(EventType::TaskCompleted).len(), 10);
    assert!(harness.events.iter().all(|e| e.experiment == "p7"));

    let sequence = sequence_for(Group::AB);
    for (index, start) in harness.events_of(EventType::TaskStart).iter().enumerate() {
        assert_eq!(start.location.task_index(), Some(index));
        assert_eq!(start.context["language"], sequence.get(index).unwrap().tag());
    }
}

/// Test: Report over a full run
/// Given the events of a correct run
/// When summarized
/// Then read tasks score 1.0 and write answers are normalized
#[test]
fn test_full_run_report() {
    let mut harness = Harness::new();
    harness.start("p7", Group::AB);
    harness.unlock();
    for _ in 0..10 {
        harness.solve_current_task();
    }

    let catalog = TaskCatalog::builtin().unwrap();
    let summaries = report::summarize(&EventLog::from_events(harness.events.clone()), &catalog);
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.group, Some(Group::AB));

    for task in &summary.tasks {
        assert!(task.duration_secs.is_some(), "task {} has a duration", task.task);
        match task.task {
            0..=4 => {
                let expected = match task.language {
                    Some(syntaxlab::task::Language::Jv) => "A2:K4",
                    _ => "1:4, :",
                };
                assert_eq!(task.answer.as_deref(), Some(expected));
                assert_eq!(task.correctness, None);
            }
            // Example read task: nothing expected, nothing selected.
            5 => assert_eq!(task.correctness, Some(0.0)),
            _ => assert_eq!(task.correctness, Some(1.0), "task {}", task.task),
        }
    }
    assert!(EXAMPLE_TASKS.contains(&5));
}

/// Test: Group BA
/// Given a participant in group BA
/// When the first measured task starts
/// Then it uses the opposite language from group AB
#[test]
fn test_group_ba_language_order() {
    let mut harness = Harness::new();
    harness.start("p8", Group::BA);
    harness.unlock();
    harness.solve_current_task();

    let starts = harness.events_of(EventType::TaskStart);
    assert_eq!(starts[0].context["language"], "jv");
    assert_eq!(starts[1].context["language"], "py");
    assert_eq!(harness.model.route, Route::Task(1));
}

/// Test: 33-cell highlight
/// Given group AB on task 1 as a read task over the rectangle (1,0)-(3,10)
/// When those 33 cells are dragged and submitted
/// Then the task moves to its completion notice with one TASKCOMPLETED
/// carrying 33 coordinates
#[test]
fn test_highlight_rectangle_completes_read_task() {
    let builtin = TaskCatalog::builtin().unwrap();
    let mut configs = builtin.configs().to_vec();
    let range = CellRange::new(Cell::new(1, 0), Cell::new(3, 10)).unwrap();
    configs[1] = TaskConfig::read(
        configs[1].table.clone(),
        PerLanguage::same("select: range A2:K4;".to_string()),
        Some(range),
    );
    let mut harness = Harness::with_catalog(TaskCatalog::from_configs(configs).unwrap());

    harness.start("p1", Group::AB);
    harness.unlock();
    harness.type_text(write_answer(syntaxlab::task::Language::Jv));
    harness.enter();
    harness.enter();
    assert_eq!(harness.orchestrator().phase(), Phase::ShowingTask(1));
    assert_eq!(harness.orchestrator().language().tag(), "jv");

    harness.drag(&snake(range));
    assert_eq!(harness.orchestrator().view().grid().selected_count(), 33);
    let completed_before = harness.events_of(EventType::TaskCompleted).len();
    harness.enter();

    assert_eq!(harness.orchestrator().phase(), Phase::ShowingCompletion(1));
    let completed = harness.events_of(EventType::TaskCompleted);
    assert_eq!(completed.len(), completed_before + 1);
    let solution = completed.last().unwrap().context["solution"].as_array().unwrap();
    assert_eq!(solution.len(), 33);
}

/// Test: Write task answer on the bundled catalog
/// Given the bundled task 1 (write, fixed rectangle (1,0)-(3,10))
/// Then its grid shows exactly the 33 target cells and a typed answer completes it
#[test]
fn test_write_task_shows_target_and_accepts_answer() {
    let mut harness = Harness::new();
    harness.start("p1", Group::AB);
    harness.unlock();
    harness.solve_current_task();

    let grid = harness.orchestrator().view().grid();
    assert_eq!(grid.selected_count(), 33);
    assert!(grid.is_selected(Cell::new(1, 0)));
    assert!(grid.is_selected(Cell::new(3, 10)));
    assert!(!grid.is_selected(Cell::new(0, 0)));

    // Clicking the fixed grid changes nothing.
    harness.click(Cell::new(0, 0));
    assert_eq!(harness.orchestrator().view().grid().selected_count(), 33);

    harness.enter();
    assert!(!harness.orchestrator().is_completed(), "empty answer never submits");
    harness.type_text("A");
    assert!(harness.orchestrator().can_submit());
    harness.enter();
    assert_eq!(harness.orchestrator().phase(), Phase::ShowingCompletion(1));
}

/// Test: Gates before the first task
/// Given a new participant
/// When consent is not given or the password is wrong
/// Then the runner stays put and shows an error
#[test]
fn test_consent_and_password_gates() {
    let mut harness = Harness::new();
    harness.start("p1", Group::AB);

    harness.enter();
    assert_eq!(harness.model.route, Route::Consent);
    assert!(harness.model.notification.is_some());

    harness.key(KeyCode::Char(' '));
    harness.enter();
    assert_eq!(harness.model.route, Route::Preparation);
    assert!(harness.model.notification.is_none());

    harness.type_text("made25");
    harness.enter();
    assert_eq!(harness.model.route, Route::Preparation);
    assert!(harness.events_of(EventType::TaskStart).is_empty());
}

/// Test: Drag release
/// Given a drag over three cells
/// When the pointer keeps moving after release
/// Then exactly the three dragged cells are selected
#[test]
fn test_moves_after_release_do_not_select() {
    let mut harness = Harness::new();
    harness.start("p1", Group::AB);
    harness.unlock();
    for _ in 0..6 {
        harness.solve_current_task();
    }
    assert_eq!(harness.model.route, Route::Task(6));

    let path = [Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)];
    harness.drag(&path);
    harness.mouse(crossterm::event::MouseEventKind::Moved, Cell::new(1, 2));
    harness.mouse(crossterm::event::MouseEventKind::Moved, Cell::new(1, 3));

    let mut selection = harness.orchestrator().view().grid().selection();
    selection.sort();
    assert_eq!(selection, path.to_vec());
}

/// Test: Wide read rectangle on a small terminal
/// Given a 120x40 terminal on task 9 (rectangle E5:I8, columns 4 to 8)
/// When the rectangle is dragged and submitted
/// Then every column is reachable and the answer scores 1.0
#[test]
fn test_wide_read_rectangle_on_small_terminal() {
    let mut harness = Harness::new();
    harness.send(syntaxlab::tea::Message::Resize(120, 40));
    harness.start("p3", Group::AB);
    harness.unlock();
    for _ in 0..9 {
        harness.solve_current_task();
    }
    assert_eq!(harness.model.route, Route::Task(9));

    let geometry = harness.model.grid_geometry().unwrap();
    let table = &harness.orchestrator().config().table;
    assert!(geometry.fits);
    assert_eq!(geometry.cols(), table.col_count());

    harness.solve_current_task();
    let catalog = TaskCatalog::builtin().unwrap();
    let summaries = report::summarize(&EventLog::from_events(harness.events.clone()), &catalog);
    let last = summaries[0].tasks.iter().find(|t| t.task == 9).unwrap();
    assert_eq!(last.correctness, Some(1.0));
}
