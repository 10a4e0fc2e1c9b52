//! Engine facade: the behavioral inference engine.
//!
//! `InferenceEngine` owns the inference state, the enabled flag, the record
//! store and the decay timer. Every mutation (signal, decay tick, reset,
//! toggle) runs the same read-modify-write under one mutex and ends with an
//! explicit, fire-and-forget save. None of the runtime operations return
//! errors; storage failures are logged and the in-memory state stays
//! authoritative.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{EngineError, SakuraResult};
use crate::insight::Insights;
use crate::scheduler::DecayScheduler;
use crate::signal::{self, Signal};
use crate::state::{self, InferenceState};
use crate::store::{DurableStore, RecordStore};

/// Default wall-clock time between decay ticks.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Configuration for the inference engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Data directory for persistence. `None` for memory-only mode.
    pub data_dir: Option<PathBuf>,
    /// Time between decay ticks (default: 30 min).
    pub decay_interval: Duration,
    /// Start the decay timer as part of construction (default: true).
    pub auto_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            decay_interval: DEFAULT_DECAY_INTERVAL,
            auto_start: true,
        }
    }
}

/// State shared between the caller and the decay thread.
struct Core {
    inner: Mutex<Inner>,
    records: RecordStore,
}

struct Inner {
    state: InferenceState,
    enabled: bool,
}

impl Core {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic mid-update can't leave the pair half-written (both fields
        // are plain values), so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read-modify-write of the state, persisted before the lock is released.
    /// Skipped entirely when `gated` and the engine is disabled.
    fn update<F>(&self, gated: bool, op: &'static str, f: F)
    where
        F: FnOnce(&InferenceState, u64) -> InferenceState,
    {
        let mut inner = self.lock();
        if gated && !inner.enabled {
            tracing::debug!(op, "inference disabled, ignoring");
            return;
        }
        let next = f(&inner.state, state::now_millis());
        inner.state = next;
        tracing::debug!(op, mood = next.mood, energy = next.energy, "inference state updated");
        if let Err(e) = self.records.save_state(&next) {
            tracing::warn!(op, error = %e, "failed to persist inference state");
        }
    }

    fn decay_tick(&self) {
        self.update(true, "decay", state::decay)
    }
}

/// The behavioral mood & energy inference engine.
///
/// Construct one per application, share it by reference (or `Arc`), and
/// call [`dispose`](Self::dispose) on shutdown. Dropping the engine disposes
/// it as well.
pub struct InferenceEngine {
    config: EngineConfig,
    core: Arc<Core>,
    scheduler: Mutex<DecayScheduler>,
}

impl InferenceEngine {
    /// Open an engine, loading persisted records from `config.data_dir`
    /// (or starting memory-only). Starts the decay timer if
    /// `config.auto_start` is set and the persisted flag is enabled.
    pub fn new(config: EngineConfig) -> SakuraResult<Self> {
        let records = match config.data_dir {
            Some(ref dir) => {
                let durable = DurableStore::open(dir).map_err(|e| EngineError::DataDir {
                    path: dir.display().to_string(),
                    source: e,
                })?;
                RecordStore::new(Arc::new(durable))
            }
            None => RecordStore::memory_only(),
        };

        Self::with_records(config, records)
    }

    /// Open an engine over an existing record store.
    pub fn with_records(config: EngineConfig, records: RecordStore) -> SakuraResult<Self> {
        if config.decay_interval.is_zero() {
            return Err(EngineError::InvalidConfig {
                message: "decay_interval must be > 0".into(),
            }
            .into());
        }

        let state = records.load_state();
        let enabled = records.load_enabled();
        tracing::info!(
            mood = state.mood,
            energy = state.energy,
            enabled,
            persistent = config.data_dir.is_some(),
            "initializing inference engine"
        );

        let engine = Self {
            core: Arc::new(Core {
                inner: Mutex::new(Inner { state, enabled }),
                records,
            }),
            scheduler: Mutex::new(DecayScheduler::new()),
            config,
        };
        if engine.config.auto_start {
            engine.init();
        }
        Ok(engine)
    }

    /// Start the decay timer if the engine is enabled. Idempotent.
    pub fn init(&self) {
        let mut scheduler = self.scheduler();
        if self.core.lock().enabled {
            self.start_decay(&mut scheduler);
        }
    }

    /// Stop the decay timer. Idempotent; the engine stays usable and
    /// [`init`](Self::init) restarts the timer.
    pub fn dispose(&self) {
        self.scheduler().stop();
    }

    /// Record one interaction signal. No-op while disabled.
    pub fn log_signal(&self, signal: impl Into<Signal>) {
        let signal = signal.into();
        let adjustment = signal::classify(&signal);
        tracing::debug!(
            kind = %signal.kind,
            d_mood = adjustment.mood,
            d_energy = adjustment.energy,
            "signal classified"
        );
        self.core.update(true, "signal", |current, now| {
            state::apply(current, adjustment, now)
        });
    }

    /// Labelled projection of the current state.
    pub fn insights(&self) -> Insights {
        Insights::from(&self.core.lock().state)
    }

    /// Snapshot of the raw state.
    pub fn state(&self) -> InferenceState {
        self.core.lock().state
    }

    /// Whether signals are processed and decay runs.
    pub fn is_enabled(&self) -> bool {
        self.core.lock().enabled
    }

    /// Whether the decay timer thread is alive.
    pub fn is_decay_running(&self) -> bool {
        self.scheduler().is_running()
    }

    /// Enable or disable processing.
    ///
    /// Disabling stops the decay timer before returning; enabling starts a
    /// fresh timer whose first tick is one full interval from now. Time
    /// spent disabled never produces decay.
    pub fn set_enabled(&self, enabled: bool) {
        // Scheduler lock first, held throughout, so concurrent toggles can't
        // leave a timer running behind a disabled flag.
        let mut scheduler = self.scheduler();
        {
            let mut inner = self.core.lock();
            inner.enabled = enabled;
            if let Err(e) = self.core.records.save_enabled(enabled) {
                tracing::warn!(error = %e, "failed to persist enabled flag");
            }
        }
        tracing::info!(enabled, "inference toggled");

        if enabled {
            self.start_decay(&mut scheduler);
        } else {
            scheduler.stop();
        }
    }

    /// Force the state back to baseline, regardless of the enabled flag.
    pub fn reset(&self) {
        self.core.update(false, "reset", |_, now| InferenceState::baseline_at(now));
    }

    /// Apply one decay step now, through the same path the timer uses.
    /// No-op while disabled.
    pub fn decay_tick(&self) {
        self.core.decay_tick();
    }

    /// The configuration this engine was opened with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn scheduler(&self) -> MutexGuard<'_, DecayScheduler> {
        self.scheduler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_decay(&self, scheduler: &mut DecayScheduler) {
        let core = Arc::clone(&self.core);
        scheduler.start(self.config.decay_interval, move || {
            core.decay_tick();
        });
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.core.lock();
        f.debug_struct("InferenceEngine")
            .field("state", &inner.state)
            .field("enabled", &inner.enabled)
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for InferenceEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightLevel;
    use crate::signal::SignalKind;
    use crate::store::{KvStore, MemStore, STATE_KEY};

    const EPS: f64 = 1e-9;

    fn manual() -> EngineConfig {
        EngineConfig {
            auto_start: false,
            ..Default::default()
        }
    }

    fn engine_with_mem() -> (Arc<MemStore>, InferenceEngine) {
        let mem = Arc::new(MemStore::new());
        let engine = InferenceEngine::with_records(manual(), RecordStore::new(mem.clone())).unwrap();
        (mem, engine)
    }

    fn assert_state(engine: &InferenceEngine, mood: f64, energy: f64) {
        let s = engine.state();
        assert!((s.mood - mood).abs() < EPS, "mood {} != {mood}", s.mood);
        assert!((s.energy - energy).abs() < EPS, "energy {} != {energy}", s.energy);
    }

    #[test]
    fn starts_at_baseline() {
        let (_, engine) = engine_with_mem();
        assert!(engine.state().is_baseline());
        assert!(engine.is_enabled());
        let insights = engine.insights();
        assert_eq!(insights.mood.label, InsightLevel::Moderate);
        assert_eq!(insights.energy.value, 5.0);
    }

    #[test]
    fn game_delete_decay_sequence() {
        let (_, engine) = engine_with_mem();
        engine.log_signal(Signal::game("breathing"));
        assert_state(&engine, 6.5, 5.5);
        engine.log_signal(SignalKind::TaskDelete);
        assert_state(&engine, 6.0, 5.5);
        engine.decay_tick();
        assert_state(&engine, 5.9, 5.4);
    }

    #[test]
    fn disabled_engine_ignores_signals_and_decay() {
        let (mem, engine) = engine_with_mem();
        engine.log_signal(SignalKind::TaskComplete);
        engine.set_enabled(false);
        let writes = mem.write_count();
        let before = engine.insights();

        engine.log_signal(SignalKind::TaskComplete);
        engine.decay_tick();
        assert_eq!(engine.insights(), before);
        assert_eq!(mem.write_count(), writes);
    }

    #[test]
    fn reset_restores_baseline_even_when_disabled() {
        let (_, engine) = engine_with_mem();
        for _ in 0..10 {
            engine.log_signal(Signal::game("mandala"));
            engine.log_signal(Signal::chat("so tired and sad"));
        }
        engine.set_enabled(false);
        engine.reset();
        assert!(engine.state().is_baseline());
        assert!(engine.state().last_update > 0);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (mem, engine) = engine_with_mem();
        engine.log_signal(SignalKind::TaskComplete);
        assert_eq!(mem.write_count(), 1);
        engine.decay_tick();
        engine.reset();
        engine.set_enabled(true);
        assert_eq!(mem.write_count(), 4);

        let records = RecordStore::new(mem.clone());
        assert_eq!(records.load_state(), engine.state());
    }

    #[test]
    fn persistence_failure_keeps_in_memory_state() {
        let (mem, engine) = engine_with_mem();
        mem.set_fail_writes(true);
        engine.log_signal(Signal::chat("I love this"));
        assert_state(&engine, 6.0, 5.0);
        engine.set_enabled(false);
        assert!(!engine.is_enabled());
        assert!(mem.get(STATE_KEY).unwrap().is_none());
    }

    #[test]
    fn toggling_controls_the_timer() {
        let engine = InferenceEngine::new(EngineConfig::default()).unwrap();
        assert!(engine.is_decay_running());

        engine.set_enabled(false);
        assert!(!engine.is_decay_running());

        engine.set_enabled(true);
        assert!(engine.is_decay_running());

        engine.dispose();
        assert!(!engine.is_decay_running());
    }

    #[test]
    fn persisted_disabled_flag_suppresses_auto_start() {
        let mem = Arc::new(MemStore::new());
        RecordStore::new(mem.clone()).save_enabled(false).unwrap();
        let engine =
            InferenceEngine::with_records(EngineConfig::default(), RecordStore::new(mem)).unwrap();
        assert!(!engine.is_enabled());
        assert!(!engine.is_decay_running());
    }

    #[test]
    fn timer_decays_state() {
        let config = EngineConfig {
            decay_interval: Duration::from_millis(5),
            ..Default::default()
        };
        let engine = InferenceEngine::new(config).unwrap();
        engine.log_signal(Signal::game("bubble-pop"));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !engine.state().is_baseline() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(engine.state().is_baseline());
    }

    #[test]
    fn rejects_zero_interval() {
        let config = EngineConfig {
            decay_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(InferenceEngine::new(config).is_err());
    }
}
