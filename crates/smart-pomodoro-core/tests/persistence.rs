//! Persistence round-trips through the SQLite store.

use chrono::{TimeZone, Utc};
use smart_pomodoro_core::storage::{load_snapshot, save_snapshot, StateStore};
use smart_pomodoro_core::{Command, Database, Durations, ManualClock, MemoryStore, PomodoroStore};

const KEY: &str = "smart-pomodoro-state-v1";

#[test]
fn state_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());

    {
        let db = Database::open_at(&path).unwrap();
        let mut store = PomodoroStore::open(db, clock.clone(), KEY, Durations::default());
        store
            .dispatch(Command::AddTask {
                name: "Draft chapter".into(),
                category: Some("writing".into()),
            })
            .unwrap();
        store.dispatch(Command::Start).unwrap();
        clock.advance_secs(1500);
        store.dispatch(Command::Tick).unwrap();
        clock.advance_secs(42);
        store.dispatch(Command::Tick).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let store = PomodoroStore::open(db, clock, KEY, Durations::default());
    let engine = store.state();
    assert!(!engine.is_running());
    assert_eq!(engine.sessions().len(), 1);
    assert_eq!(engine.seconds_left(), 258);
    assert_eq!(engine.tasks().len(), 1);
    assert_eq!(
        engine.tasks().active().map(|t| t.category.as_deref()),
        Some(Some("writing"))
    );
    engine.check_invariants().unwrap();
}

#[test]
fn corrupt_state_falls_back_to_defaults() {
    let db = Database::open_memory().unwrap();
    db.save(KEY, r#"{"mode":"sideways"}"#).unwrap();
    let engine = load_snapshot(&db, KEY, Durations::from_minutes(30, 5, 15));
    assert_eq!(engine.seconds_left(), 1800);
    assert!(engine.sessions().is_empty());
}

#[test]
fn memory_and_sqlite_stores_hold_the_same_blob() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap());
    let mut store = PomodoroStore::open(MemoryStore::new(), clock, KEY, Durations::default());
    store
        .dispatch(Command::SetDurations {
            work: 50,
            short_break: 10,
            long_break: 30,
        })
        .unwrap();

    let db = Database::open_memory().unwrap();
    save_snapshot(&db, KEY, store.state()).unwrap();
    assert_eq!(db.load(KEY).unwrap(), store.backend().get(KEY));

    let reloaded = load_snapshot(&db, KEY, Durations::default());
    assert_eq!(reloaded.durations().work_secs, 3000);
    assert_eq!(reloaded.seconds_left(), 3000);
}
