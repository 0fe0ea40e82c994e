//! QA tests for snapshot persistence.
//!
//! These tests verify that session state survives a restart and that
//! exported snapshots load back unchanged.
//! Run with: `cargo test -p trainer-core --test qa_persistence`

use tempfile::TempDir;
use trainer_core::persist::{load_state, SAVE_VERSION};
use trainer_core::testing::{sample_creature, sample_trainer};
use trainer_core::{
    AppState, Condition, FileStore, Intent, KeyValueStore, PersistError, ResourcePool,
    SavedState, Session, SessionConfig, SessionError, StatusEffect, StatusSlot,
};

fn file_session(dir: &TempDir) -> Session<FileStore> {
    let store = FileStore::open(dir.path()).expect("Failed to open store");
    Session::restore(SessionConfig::new(), store).expect("Failed to restore session")
}

// =============================================================================
// TEST 1: State survives a restart
// =============================================================================

#[test]
fn test_restart_restores_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let (id, before) = {
        let mut session = file_session(&temp_dir);
        session.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Ash"),
        });
        let id = session.add_creature(sample_creature("Sparky")).unwrap();
        session.dispatch(Intent::DamageCreature { id, amount: 12 });
        session.dispatch(Intent::ApplyStatus {
            id,
            slot: StatusSlot::Primary,
            effect: StatusEffect::new(Condition::BadlyPoisoned).with_duration(4),
        });
        (id, session.state().clone())
    };

    let session = file_session(&temp_dir);
    assert_eq!(session.state(), &before);

    let creature = session.creature(id).expect("creature should survive restart");
    assert_eq!(creature.hp.current, 28);
    assert_eq!(
        creature.primary_status.as_ref().map(|s| s.duration),
        Some(Some(4))
    );
}

// =============================================================================
// TEST 2: Fresh directory starts empty
// =============================================================================

#[test]
fn test_fresh_store_starts_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let session = file_session(&temp_dir);

    assert!(session.state().trainer.is_none());
    assert!(session.state().team.is_empty());
}

// =============================================================================
// TEST 3: Corrupt snapshot is reported, not overwritten
// =============================================================================

#[test]
fn test_corrupt_snapshot_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut store = FileStore::open(temp_dir.path()).unwrap();
    store.set("trainer-state", "garbage").unwrap();

    let result = Session::restore(SessionConfig::new(), store.clone());
    assert!(matches!(
        result,
        Err(SessionError::Persist(PersistError::Json(_)))
    ));
    assert_eq!(store.get("trainer-state").unwrap().as_deref(), Some("garbage"));
}

// =============================================================================
// TEST 4: Reset clears the stored snapshot
// =============================================================================

#[test]
fn test_reset_persists_empty_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    {
        let mut session = file_session(&temp_dir);
        session.dispatch(Intent::CreateTrainer {
            trainer: sample_trainer("Ash"),
        });
        session.reset().unwrap();
    }

    let store = FileStore::open(temp_dir.path()).unwrap();
    let state = load_state(&store, "trainer-state").unwrap().unwrap();
    assert!(state.trainer.is_none());
}

// =============================================================================
// TEST 5: Separate storage keys do not collide
// =============================================================================

#[test]
fn test_storage_keys_are_independent() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = FileStore::open(temp_dir.path()).unwrap();

    let mut first = Session::new(SessionConfig::new().with_storage_key("slot-1"), store.clone());
    first.dispatch(Intent::CreateTrainer {
        trainer: sample_trainer("Ash"),
    });

    let second = Session::restore(SessionConfig::new().with_storage_key("slot-2"), store).unwrap();
    assert!(second.state().trainer.is_none());
    assert!(temp_dir.path().join("slot-1.json").exists());
}

// =============================================================================
// TEST 6: Export and import
// =============================================================================

#[tokio::test]
async fn test_export_and_import() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let export_path = temp_dir.path().join("export.json");

    let mut session = file_session(&temp_dir);
    session.dispatch(Intent::CreateTrainer {
        trainer: sample_trainer("Ash"),
    });
    session.add_creature(sample_creature("Sparky")).unwrap();

    SavedState::new(session.state().clone())
        .save_json(&export_path)
        .await
        .expect("Failed to export");

    let mut other = Session::new(
        SessionConfig::new().with_storage_key("imported"),
        FileStore::open(temp_dir.path()).unwrap(),
    );
    let loaded = SavedState::load_json(&export_path)
        .await
        .expect("Failed to import");
    assert_eq!(loaded.version, SAVE_VERSION);

    other.replace_state(loaded.state);
    assert_eq!(other.state(), session.state());
    assert!(temp_dir.path().join("imported.json").exists());
}

#[tokio::test]
async fn test_import_rejects_future_version() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("future.json");
    tokio::fs::write(&path, r#"{"version":99,"savedAt":"0","state":{}}"#)
        .await
        .unwrap();

    let result = SavedState::load_json(&path).await;
    assert!(matches!(
        result,
        Err(PersistError::VersionMismatch { found: 99, .. })
    ));
}

// =============================================================================
// TEST 7: Out-of-range pools are clamped on load
// =============================================================================

#[test]
fn test_restore_clamps_out_of_range_pools() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut store = FileStore::open(temp_dir.path()).unwrap();

    let mut state = AppState::new();
    let mut over = sample_creature("Over");
    over.hp = ResourcePool { current: 500, max: 100 };
    let over_id = state.team.add(over);
    let mut under = sample_creature("Under");
    under.hp = ResourcePool {
        current: i32::MIN,
        max: 10,
    };
    let under_id = state.team.add(under);
    let json = SavedState::new(state).to_json().unwrap();
    store.set("trainer-state", &json).unwrap();

    let mut session = Session::restore(SessionConfig::new(), store).unwrap();
    assert_eq!(
        session.creature(over_id).map(|c| c.hp),
        Some(ResourcePool { current: 100, max: 100 })
    );
    assert_eq!(
        session.creature(under_id).map(|c| c.hp),
        Some(ResourcePool { current: 0, max: 10 })
    );

    let response = session.dispatch(Intent::HealCreature {
        id: over_id,
        amount: 20,
    });
    assert!(!response.changed());

    let response = session.dispatch(Intent::HealCreature {
        id: under_id,
        amount: 5,
    });
    assert!(response.narrative.contains("recovers 5 HP"));
    assert_eq!(session.creature(under_id).map(|c| c.hp.current), Some(5));
}
