//! Persistence and recovery tests for the inference engine.
//!
//! These tests verify that the state record and the enabled flag survive an
//! engine restart, and that damaged records fall back to defaults.

use std::sync::Arc;

use sakura_cycle::engine::{EngineConfig, InferenceEngine};
use sakura_cycle::signal::{Signal, SignalKind};
use sakura_cycle::state::InferenceState;
use sakura_cycle::store::{DurableStore, ENABLED_KEY, KvStore, RecordStore, STATE_KEY};

fn persistent_engine(dir: &std::path::Path) -> InferenceEngine {
    InferenceEngine::new(EngineConfig {
        data_dir: Some(dir.to_path_buf()),
        auto_start: false,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn state_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();

    // First session: log a few signals.
    {
        let engine = persistent_engine(dir.path());
        engine.log_signal(SignalKind::TaskComplete);
        engine.log_signal(Signal::game("breathing"));
    }

    // Second session: the last saved state is picked up.
    {
        let engine = persistent_engine(dir.path());
        let state = engine.state();
        assert!((state.mood - 7.0).abs() < 1e-9);
        assert!((state.energy - 6.0).abs() < 1e-9);
        assert!(state.last_update > 0);
        assert!(engine.is_enabled());
    }
}

#[test]
fn disabled_flag_survives_restart_and_keeps_timer_off() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let engine = persistent_engine(dir.path());
        engine.log_signal(SignalKind::TaskDelete);
        engine.set_enabled(false);
    }

    {
        let engine = InferenceEngine::new(EngineConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();
        assert!(!engine.is_enabled());
        assert!(!engine.is_decay_running());

        engine.log_signal(SignalKind::TaskComplete);
        assert!((engine.state().mood - 4.5).abs() < 1e-9);
    }
}

#[test]
fn reset_is_persisted() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let engine = persistent_engine(dir.path());
        engine.log_signal(Signal::chat("so tired today"));
        engine.reset();
    }

    {
        let engine = persistent_engine(dir.path());
        assert!(engine.state().is_baseline());
    }
}

#[test]
fn records_are_plain_json_under_fixed_keys() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let engine = persistent_engine(dir.path());
        engine.log_signal(SignalKind::TaskComplete);
        engine.set_enabled(false);
    }

    let store = DurableStore::open(dir.path()).unwrap();
    let state: serde_json::Value =
        serde_json::from_slice(&store.get(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(state["mood"], 5.5);
    assert_eq!(state["energy"], 5.5);
    assert!(state["lastUpdate"].as_u64().unwrap() > 0);

    let enabled = store.get(ENABLED_KEY).unwrap().unwrap();
    assert_eq!(enabled, b"false");
}

#[test]
fn corrupted_records_fall_back_to_defaults() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let store = DurableStore::open(dir.path()).unwrap();
        store.put(STATE_KEY, b"{not json").unwrap();
        store.put(ENABLED_KEY, b"\"maybe\"").unwrap();
    }

    let engine = persistent_engine(dir.path());
    assert!(engine.state().is_baseline());
    assert!(engine.is_enabled());
}

#[test]
fn out_of_range_record_is_clamped_on_load() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let store = DurableStore::open(dir.path()).unwrap();
        store
            .put(STATE_KEY, br#"{"mood":14.0,"energy":-3.0,"lastUpdate":1}"#)
            .unwrap();
    }

    let store = DurableStore::open(dir.path()).unwrap();
    let records = RecordStore::new(Arc::new(store));
    assert_eq!(
        records.load_state(),
        InferenceState {
            mood: 10.0,
            energy: 0.0,
            last_update: 1,
        }
    );
}
