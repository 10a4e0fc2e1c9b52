//! Inference state and the two pure transitions on it: applying an
//! adjustment and decaying toward baseline.
//!
//! Both transitions return a new value and never touch storage, so callers
//! decide when (and whether) to persist.

use serde::{Deserialize, Serialize};

use crate::signal::Adjustment;

/// Neutral resting value for mood and energy.
pub const BASELINE: f64 = 5.0;
/// Lower bound of the mood/energy domain.
pub const MIN_VALUE: f64 = 0.0;
/// Upper bound of the mood/energy domain.
pub const MAX_VALUE: f64 = 10.0;
/// Distance moved toward baseline per decay tick.
pub const DECAY_RATE: f64 = 0.1;

/// Inferred mood and energy, both in `[MIN_VALUE, MAX_VALUE]`.
///
/// Serialized as the flat `{mood, energy, lastUpdate}` record, with
/// `lastUpdate` in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceState {
    pub mood: f64,
    pub energy: f64,
    /// Unix milliseconds of the last mutation. Informational only.
    #[serde(default)]
    pub last_update: u64,
}

impl InferenceState {
    /// Baseline state stamped with the current time.
    pub fn baseline() -> Self {
        Self::baseline_at(now_millis())
    }

    /// Baseline state stamped with `at`.
    pub fn baseline_at(at: u64) -> Self {
        Self {
            mood: BASELINE,
            energy: BASELINE,
            last_update: at,
        }
    }

    /// Whether both values sit exactly on the baseline.
    pub fn is_baseline(&self) -> bool {
        self.mood == BASELINE && self.energy == BASELINE
    }

    /// Re-establish the domain invariant on a state from an untrusted source.
    ///
    /// Non-finite values fall back to baseline; finite ones are clamped.
    pub fn sanitized(self) -> Self {
        Self {
            mood: sanitize(self.mood),
            energy: sanitize(self.energy),
            last_update: self.last_update,
        }
    }
}

impl Default for InferenceState {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Apply an adjustment, clamping each value into the domain and stamping `now`.
pub fn apply(state: &InferenceState, adjustment: Adjustment, now: u64) -> InferenceState {
    InferenceState {
        mood: clamp(state.mood + adjustment.mood),
        energy: clamp(state.energy + adjustment.energy),
        last_update: now,
    }
}

/// One decay step toward baseline, stamping `now`. Never overshoots.
pub fn decay(state: &InferenceState, now: u64) -> InferenceState {
    InferenceState {
        mood: decay_value(state.mood),
        energy: decay_value(state.energy),
        last_update: now,
    }
}

/// Move a single value one step toward [`BASELINE`].
pub fn decay_value(value: f64) -> f64 {
    if value > BASELINE {
        (value - DECAY_RATE).max(BASELINE)
    } else if value < BASELINE {
        (value + DECAY_RATE).min(BASELINE)
    } else {
        value
    }
}

fn clamp(value: f64) -> f64 {
    value.clamp(MIN_VALUE, MAX_VALUE)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { clamp(value) } else { BASELINE }
}

/// Current wall-clock time in unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
