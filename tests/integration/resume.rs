//! Restarting the runner mid-experiment.

use syntaxlab::events::EventType;
use syntaxlab::identity::{self, IdentityStore, MemoryIdentityStore, KEY_GROUP, KEY_LOCATION};
use syntaxlab::route::Route;
use syntaxlab::task::{Group, TaskCatalog};
use syntaxlab::tea::update::resume;

use crate::fixtures::Harness;

/// Run a participant up to `tasks` completed tasks and return their store.
fn store_after(tasks: usize, group: Group) -> MemoryIdentityStore {
    let mut harness = Harness::new();
    harness.start("p3", group);
    harness.unlock();
    for _ in 0..tasks {
        harness.solve_current_task();
    }
    harness.store
}

fn restart(store: MemoryIdentityStore) -> Harness {
    let catalog = TaskCatalog::builtin().unwrap();
    let restored = identity::restore(&store, &catalog);
    let mut harness = Harness::with_store(catalog, store);
    if let Some(restored) = restored {
        let cmds = resume(&mut harness.model, restored);
        harness.run(cmds);
    }
    harness
}

/// Test: Resume on a task page
/// Given a participant who stopped on task 3
/// When the runner restarts
/// Then task 3 starts again with the same language and no page enter
#[test]
fn test_resume_mid_experiment() {
    let store = store_after(3, Group::BA);
    assert_eq!(store.get(KEY_LOCATION).as_deref(), Some("/s/3"));

    let harness = restart(store);

    assert_eq!(harness.model.route, Route::Task(3));
    assert_eq!(harness.model.metadata.id, "p3");
    assert_eq!(harness.events.len(), 1);
    let start = &harness.events[0];
    assert_eq!(start.event_type, EventType::TaskStart);
    assert_eq!(start.location.pathname, "/s/3");
    assert_eq!(start.context["language"], "py");
}

/// Test: Resume continues normally
/// Given a resumed participant on task 3
/// When they answer it
/// Then the run carries on to task 4 and persists the new location
#[test]
fn test_resumed_run_continues() {
    let mut harness = restart(store_after(3, Group::AB));
    harness.solve_current_task();

    assert_eq!(harness.model.route, Route::Task(4));
    assert_eq!(harness.store.get(KEY_LOCATION).as_deref(), Some("/s/4"));
    assert_eq!(harness.events_of(EventType::TaskCompleted).len(), 1);
}

/// Test: Resume after the end
/// Given a participant who finished
/// When the runner restarts
/// Then the end page shows again without new events
#[test]
fn test_resume_after_end() {
    let harness = restart(store_after(10, Group::AB));
    assert_eq!(harness.model.route, Route::End("p3".to_string()));
    assert!(harness.events.is_empty());
}

/// Test: Tampered group
/// Given a stored group other than AB or BA
/// When the runner restarts
/// Then it starts fresh on the metadata page
#[test]
fn test_invalid_group_starts_fresh() {
    let mut store = store_after(2, Group::AB);
    store.set(KEY_GROUP, "CD").unwrap();

    let harness = restart(store);
    assert_eq!(harness.model.route, Route::Metadata);
    assert!(harness.model.session.is_none());
    assert!(harness.events.is_empty());
}
