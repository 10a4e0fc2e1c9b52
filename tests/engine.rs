//! End-to-end tests for the inference engine's public surface.

use std::sync::Arc;
use std::time::Duration;

use sakura_cycle::engine::{EngineConfig, InferenceEngine};
use sakura_cycle::insight::InsightLevel;
use sakura_cycle::signal::{Signal, SignalKind, SignalPayload};
use sakura_cycle::state::BASELINE;

const EPS: f64 = 1e-9;

fn test_engine() -> InferenceEngine {
    InferenceEngine::new(EngineConfig {
        auto_start: false,
        ..Default::default()
    })
    .unwrap()
}

fn assert_state(engine: &InferenceEngine, mood: f64, energy: f64) {
    let state = engine.state();
    assert!(
        (state.mood - mood).abs() < EPS && (state.energy - energy).abs() < EPS,
        "expected ({mood}, {energy}), got ({}, {})",
        state.mood,
        state.energy
    );
}

#[test]
fn daily_session_moves_labels() {
    let engine = test_engine();
    let insights = engine.insights();
    assert_eq!(insights.mood.label, InsightLevel::Moderate);
    assert_eq!(insights.energy.label, InsightLevel::Moderate);

    for _ in 0..4 {
        engine.log_signal(SignalKind::TaskComplete);
    }
    engine.log_signal(Signal::game("bubble-pop"));
    assert_state(&engine, 8.0, 7.2);
    assert_eq!(engine.insights().mood.label, InsightLevel::High);
    assert_eq!(engine.insights().energy.label, InsightLevel::Moderate);

    engine.log_signal(Signal::chat("I'm sad and tired and stressed"));
    assert_state(&engine, 6.5, 6.7);

    // 7.5 sits exactly on the threshold and is still Moderate.
    engine.log_signal(Signal::chat("awesome, I feel good"));
    assert_state(&engine, 7.5, 6.7);
    assert_eq!(engine.insights().mood.label, InsightLevel::Moderate);
}

#[test]
fn draining_day_reaches_low_and_clamps_at_zero() {
    let engine = test_engine();
    for _ in 0..10 {
        engine.log_signal(SignalKind::TaskDelete);
        engine.log_signal(Signal::chat("exhausted"));
    }
    assert_state(&engine, 0.0, 0.0);
    assert_eq!(engine.insights().mood.label, InsightLevel::Low);
    assert_eq!(engine.insights().energy.label, InsightLevel::Low);

    engine.reset();
    assert_state(&engine, BASELINE, BASELINE);
}

#[test]
fn unknown_and_noop_signals_leave_state_alone() {
    let engine = test_engine();
    engine.log_signal(SignalKind::AppSession);
    engine.log_signal(SignalKind::from("SOMETHING_NEW".to_string()));
    engine.log_signal(Signal::game("chess"));
    engine.log_signal(Signal::chat("the weather is cloudy"));
    engine.log_signal(Signal::with_payload(
        SignalKind::GamePlayed,
        SignalPayload::default(),
    ));
    assert_state(&engine, BASELINE, BASELINE);
}

#[test]
fn signals_parsed_from_json_are_classified() {
    let engine = test_engine();
    let signal: Signal =
        serde_json::from_str(r#"{"kind":"GAME_PLAYED","payload":{"gameId":"mandala"}}"#).unwrap();
    engine.log_signal(signal);
    assert_state(&engine, 6.5, 5.5);
}

#[test]
fn disabled_engine_ignores_signals_and_decay_until_reenabled() {
    let engine = test_engine();
    engine.log_signal(SignalKind::TaskComplete);
    engine.set_enabled(false);

    engine.log_signal(SignalKind::TaskComplete);
    engine.decay_tick();
    assert_state(&engine, 5.5, 5.5);

    engine.set_enabled(true);
    engine.log_signal(SignalKind::TaskComplete);
    assert_state(&engine, 6.0, 6.0);
    engine.dispose();
}

#[test]
fn background_decay_converges_to_baseline() {
    let engine = InferenceEngine::new(EngineConfig {
        decay_interval: Duration::from_millis(5),
        ..Default::default()
    })
    .unwrap();
    assert!(engine.is_decay_running());

    for _ in 0..4 {
        engine.log_signal(SignalKind::TaskComplete);
    }
    // 2.0 above baseline needs 20 ticks; allow generous slack.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while std::time::Instant::now() < deadline && !engine.state().is_baseline() {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_state(&engine, BASELINE, BASELINE);

    engine.dispose();
    assert!(!engine.is_decay_running());
}

#[test]
fn concurrent_signals_are_not_lost() {
    let engine = Arc::new(test_engine());
    engine.log_signal(SignalKind::TaskDelete);
    engine.log_signal(SignalKind::TaskDelete);
    engine.log_signal(SignalKind::TaskDelete);
    engine.log_signal(SignalKind::TaskDelete);
    assert_state(&engine, 3.0, 5.0);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..2 {
                    engine.log_signal(SignalKind::TaskComplete);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // 8 × +0.5 from (3.0, 5.0), never touching either bound.
    assert_state(&engine, 7.0, 9.0);
}
