//! Persistence for the inference engine.
//!
//! Two backends implement the raw [`KvStore`] interface:
//!
//! - [`MemStore`]: in-memory (DashMap), for memory-only sessions and tests
//! - [`DurableStore`]: ACID transactions (redb), for real sessions
//!
//! [`RecordStore`] sits on top and owns the persisted layout: two independent
//! flat JSON records under fixed keys, one for the inference state and one
//! for the enabled flag. Loads never fail: missing or corrupted records fall
//! back to defaults.

pub mod durable;
pub mod mem;

use std::sync::Arc;

use crate::error::StoreError;
use crate::state::InferenceState;

pub use durable::DurableStore;
pub use mem::MemStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key of the `{mood, energy, lastUpdate}` record.
pub const STATE_KEY: &str = "sakura_inference_state";
/// Key of the boolean enabled flag.
pub const ENABLED_KEY: &str = "sakura_inference_enabled";

/// Raw byte-level key-value backend.
pub trait KvStore: Send + Sync {
    /// Insert or replace a value.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;
    /// Read a value. `Ok(None)` if the key doesn't exist.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Delete a key. Returns whether it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// Typed access to the two persisted inference records.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KvStore>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self { backend }
    }

    /// A record store over a fresh [`MemStore`].
    pub fn memory_only() -> Self {
        Self::new(Arc::new(MemStore::new()))
    }

    /// Strict read of the state record.
    pub fn try_load_state(&self) -> StoreResult<Option<InferenceState>> {
        self.read_json(STATE_KEY)
    }

    /// Strict read of the enabled flag.
    pub fn try_load_enabled(&self) -> StoreResult<Option<bool>> {
        self.read_json(ENABLED_KEY)
    }

    /// Load the state record, falling back to baseline when it is missing,
    /// unreadable or corrupted. Loaded values are clamped into the domain.
    pub fn load_state(&self) -> InferenceState {
        match self.try_load_state() {
            Ok(Some(state)) => state.sanitized(),
            Ok(None) => InferenceState::baseline(),
            Err(e) => {
                tracing::warn!(key = STATE_KEY, error = %e, "discarding persisted state, using baseline");
                InferenceState::baseline()
            }
        }
    }

    /// Load the enabled flag, defaulting to `true`.
    pub fn load_enabled(&self) -> bool {
        match self.try_load_enabled() {
            Ok(Some(enabled)) => enabled,
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(key = ENABLED_KEY, error = %e, "discarding persisted flag, defaulting to enabled");
                true
            }
        }
    }

    pub fn save_state(&self, state: &InferenceState) -> StoreResult<()> {
        self.write_json(STATE_KEY, state)
    }

    pub fn save_enabled(&self, enabled: bool) -> StoreResult<()> {
        self.write_json(ENABLED_KEY, &enabled)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.backend.put(key, &bytes)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> (Arc<MemStore>, RecordStore) {
        let mem = Arc::new(MemStore::new());
        let records = RecordStore::new(mem.clone());
        (mem, records)
    }

    #[test]
    fn missing_records_fall_back_to_defaults() {
        let (_, records) = records();
        assert!(records.load_state().is_baseline());
        assert!(records.load_enabled());
    }

    #[test]
    fn records_are_independent() {
        let (mem, records) = records();
        records.save_enabled(false).unwrap();
        assert!(!records.load_enabled());
        assert!(mem.get(STATE_KEY).unwrap().is_none());
        assert!(records.load_state().is_baseline());
    }

    #[test]
    fn state_round_trips_through_json() {
        let (mem, records) = records();
        let state = InferenceState {
            mood: 6.5,
            energy: 5.5,
            last_update: 1_700_000_000_000,
        };
        records.save_state(&state).unwrap();
        assert_eq!(records.load_state(), state);

        let raw = String::from_utf8(mem.get(STATE_KEY).unwrap().unwrap()).unwrap();
        assert!(raw.contains("\"lastUpdate\":1700000000000"));
        assert_eq!(mem.get(ENABLED_KEY).unwrap(), None);
    }

    #[test]
    fn corrupted_records_fall_back_to_defaults() {
        let (mem, records) = records();
        mem.put(STATE_KEY, b"{not json").unwrap();
        mem.put(ENABLED_KEY, b"\"maybe\"").unwrap();

        assert!(matches!(
            records.try_load_state(),
            Err(StoreError::Serialization { .. })
        ));
        assert!(records.load_state().is_baseline());
        assert!(records.load_enabled());
    }

    #[test]
    fn out_of_range_records_are_clamped() {
        let (mem, records) = records();
        mem.put(STATE_KEY, br#"{"mood": 14.0, "energy": -3.0, "lastUpdate": 1}"#)
            .unwrap();
        let state = records.load_state();
        assert_eq!(state.mood, 10.0);
        assert_eq!(state.energy, 0.0);
    }

    #[test]
    fn write_failures_surface_as_errors() {
        let (mem, records) = records();
        mem.set_fail_writes(true);
        assert!(records.save_enabled(true).is_err());
        assert!(records.save_state(&InferenceState::baseline()).is_err());
    }
}
