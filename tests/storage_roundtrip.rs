use chrono::{Duration, TimeZone, Utc};
use tempfile::tempdir;

use trak::command::Command;
use trak::logic::{Instruction, Logic};
use trak::storage::{FileStorage, StoredState, TaskStorage};
use trak::store::ViewId;
use trak::task::Task;

#[test]
fn saved_state_reloads_with_derived_views() {
    let dir = tempdir().expect("tempdir");
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    let mut logic = Logic::load(FileStorage::new(dir.path().to_path_buf()), now).expect("load");
    logic.handle(
        &Instruction::Mutate(Command::AddFloating {
            task: Task::floating("Buy milk").with_tags(["errand"]),
        }),
        now,
    );
    logic.handle(
        &Instruction::Mutate(Command::AddDeadline {
            task: Task::deadline("Report", now + Duration::days(2)),
        }),
        now,
    );
    logic.save().expect("save");

    let reloaded = Logic::load(FileStorage::new(dir.path().to_path_buf()), now).expect("reload");
    let views = reloaded.store().views();
    assert_eq!(views.len(ViewId::Pending), 2);
    assert_eq!(views.len(ViewId::General), 1);
    assert_eq!(views.len(ViewId::Deadline), 1);
    assert_eq!(views.len(ViewId::ThisWeek), 1);
    assert_eq!(reloaded.store().tags().count("errand"), Some(1));
}

#[test]
fn tasks_expiring_between_sessions_move_on_load() {
    let dir = tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path().to_path_buf());
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    let state = StoredState {
        pending: vec![Task::deadline("Yesterday", now - Duration::days(1))],
        ..StoredState::default()
    };
    storage.save(&state).expect("save");

    let logic = Logic::load(storage, now).expect("load");
    let views = logic.store().views();
    assert!(views.is_empty(ViewId::Pending));
    assert!(views.is_empty(ViewId::Deadline));
    assert_eq!(views.len(ViewId::Expired), 1);
}

#[test]
fn completed_tasks_survive_reload_untouched() {
    let dir = tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path().to_path_buf());
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    let state = StoredState {
        completed: vec![Task::floating("Done thing")],
        ..StoredState::default()
    };
    storage.save(&state).expect("save");

    let logic = Logic::load(storage, now).expect("load");
    assert_eq!(logic.store().views().len(ViewId::Completed), 1);
    assert!(logic.store().views().is_empty(ViewId::Pending));
}
