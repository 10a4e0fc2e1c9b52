//! Read-only projection of inference state into display labels.

use serde::{Deserialize, Serialize};

use crate::state::InferenceState;

/// Values strictly below this are `Low`.
pub const LOW_THRESHOLD: f64 = 3.5;
/// Values strictly above this are `High`.
pub const HIGH_THRESHOLD: f64 = 7.5;

/// Coarse label for a mood or energy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightLevel {
    Low,
    Moderate,
    High,
}

impl InsightLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for InsightLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Label a raw value.
///
/// Both thresholds belong to the middle band: 3.5 and 7.5 are `Moderate`.
pub fn label(value: f64) -> InsightLevel {
    if value < LOW_THRESHOLD {
        InsightLevel::Low
    } else if value > HIGH_THRESHOLD {
        InsightLevel::High
    } else {
        InsightLevel::Moderate
    }
}

/// One projected signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub value: f64,
    pub label: InsightLevel,
}

impl Insight {
    pub fn of(value: f64) -> Self {
        Self {
            value,
            label: label(value),
        }
    }
}

/// Mood and energy insights, as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub mood: Insight,
    pub energy: Insight,
}

impl From<&InferenceState> for Insights {
    fn from(state: &InferenceState) -> Self {
        Self {
            mood: Insight::of(state.mood),
            energy: Insight::of(state.energy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_bands() {
        assert_eq!(label(0.0), InsightLevel::Low);
        assert_eq!(label(3.49), InsightLevel::Low);
        assert_eq!(label(3.5), InsightLevel::Moderate);
        assert_eq!(label(5.0), InsightLevel::Moderate);
        assert_eq!(label(7.5), InsightLevel::Moderate);
        assert_eq!(label(7.51), InsightLevel::High);
        assert_eq!(label(10.0), InsightLevel::High);
    }

    #[test]
    fn projection_uses_both_axes() {
        let state = InferenceState {
            mood: 8.0,
            energy: 2.0,
            last_update: 0,
        };
        let insights = Insights::from(&state);
        assert_eq!(insights.mood.label, InsightLevel::High);
        assert_eq!(insights.energy.label, InsightLevel::Low);
        assert_eq!(insights.mood.value, 8.0);
    }
}
