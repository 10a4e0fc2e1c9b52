//! Cycle-phase arithmetic and phase-based baseline predictions.
//!
//! Pure functions over calendar dates and symptom lists. The inference
//! engine doesn't depend on anything here; callers combine both when
//! rendering the dashboard.

use std::collections::HashMap;

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from cycle arithmetic.
#[derive(Debug, Error, Diagnostic)]
pub enum CycleError {
    #[error("invalid cycle length: {length}")]
    #[diagnostic(
        code(sakura::cycle::invalid_length),
        help("A cycle must be at least one day long. Typical values are 21 to 35.")
    )]
    InvalidCycleLength { length: u32 },
}

pub type CycleResult<T> = std::result::Result<T, CycleError>;

/// Days up to and including this one are follicular (after menstruation).
const FOLLICULAR_LAST_DAY: u32 = 13;
/// Days up to and including this one are the ovulation window.
const OVULATION_LAST_DAY: u32 = 16;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// A segment of the cycle, or the stable post-menopause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    PostMenopause,
}

impl Phase {
    /// Name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Menstrual => "Menstrual",
            Self::Follicular => "Follicular",
            Self::Ovulation => "Ovulation",
            Self::Luteal => "Luteal",
            Self::PostMenopause => "Post-Menopause",
        }
    }

    /// One-line guidance shown under the phase name.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Menstrual => "Rest and self-care time. Your body is renewing itself.",
            Self::Follicular => "Energy is rising! Great time for new projects and creativity.",
            Self::Ovulation => "Peak energy and confidence! Perfect for important tasks.",
            Self::Luteal => "Time to slow down. Focus on completion and gentle activities.",
            Self::PostMenopause => {
                "Focus on overall wellbeing, stable energy, and consistent self-care. \
                 Cycle-based fluctuations are minimal."
            }
        }
    }

    /// Index used by the prediction service (`-1` for post-menopause).
    pub fn index(&self) -> i8 {
        match self {
            Self::Menstrual => 0,
            Self::Follicular => 1,
            Self::Ovulation => 2,
            Self::Luteal => 3,
            Self::PostMenopause => -1,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Three-level mood expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Low,
    Neutral,
    High,
}

impl MoodLabel {
    /// Value used by the prediction service (1–3).
    pub fn score(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Neutral => 2,
            Self::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Neutral => "neutral",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Phase for a 1-based cycle day.
pub fn calculate_phase(cycle_day: u32, period_duration: u32, menopausal: bool) -> Phase {
    if menopausal {
        Phase::PostMenopause
    } else if cycle_day <= period_duration {
        Phase::Menstrual
    } else if cycle_day <= FOLLICULAR_LAST_DAY {
        Phase::Follicular
    } else if cycle_day <= OVULATION_LAST_DAY {
        Phase::Ovulation
    } else {
        Phase::Luteal
    }
}

/// 1-based day of the current cycle, wrapping every `cycle_length` days.
///
/// A start date in the future wraps backwards rather than going negative.
/// Post-menopause always reports day 1.
pub fn calculate_cycle_day(
    last_period_start: NaiveDate,
    today: NaiveDate,
    cycle_length: u32,
    menopausal: bool,
) -> CycleResult<u32> {
    if cycle_length == 0 {
        return Err(CycleError::InvalidCycleLength {
            length: cycle_length,
        });
    }
    if menopausal {
        return Ok(1);
    }
    let days = (today - last_period_start).num_days();
    let day = days.rem_euclid(i64::from(cycle_length)) + 1;
    Ok(day as u32)
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

fn has(symptoms: &[String], name: &str) -> bool {
    symptoms.iter().any(|s| s == name)
}

/// Expected mood for a phase, lowered by anxiety or fatigue.
pub fn predict_mood(phase: Phase, symptoms: &[String]) -> MoodLabel {
    let base = match phase {
        Phase::PostMenopause => return MoodLabel::Neutral,
        Phase::Menstrual | Phase::Luteal => MoodLabel::Low,
        Phase::Follicular | Phase::Ovulation => MoodLabel::High,
    };

    if has(symptoms, "anxiety") || has(symptoms, "fatigue") {
        // High steps down to Neutral and then again to Low.
        return MoodLabel::Low;
    }
    base
}

/// Expected energy (1–10) for a phase, reduced by fatigue and cramps.
pub fn predict_energy(phase: Phase, symptoms: &[String]) -> u8 {
    let mut energy: u8 = match phase {
        Phase::PostMenopause => return 7,
        Phase::Menstrual => 3,
        Phase::Follicular => 8,
        Phase::Ovulation => 9,
        Phase::Luteal => 4,
    };
    if has(symptoms, "fatigue") {
        energy = energy.saturating_sub(2).max(1);
    }
    if has(symptoms, "cramps") {
        energy = energy.saturating_sub(1).max(1);
    }
    energy
}

/// Expected focus (1–10) for a phase, reduced by headaches and anxiety.
pub fn predict_focus(phase: Phase, symptoms: &[String]) -> u8 {
    let mut focus: u8 = match phase {
        Phase::PostMenopause => return 7,
        Phase::Menstrual => 4,
        Phase::Follicular => 8,
        Phase::Ovulation => 9,
        Phase::Luteal => 5,
    };
    if has(symptoms, "headaches") {
        focus = focus.saturating_sub(2).max(1);
    }
    if has(symptoms, "anxiety") {
        focus = focus.saturating_sub(1).max(1);
    }
    focus
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One daily check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub phase: Phase,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub energy: Option<f64>,
}

/// Pattern observed across past check-ins in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseHistory {
    pub phase: Phase,
    pub log_count: usize,
    /// Mean energy rounded to one decimal. Missing or zero entries count as 5.
    pub avg_energy: f64,
    /// Most frequent mood; the earliest-seen wins ties.
    pub common_mood: Option<String>,
}

/// Minimum number of logs in a phase before a pattern is reported.
pub const MIN_HISTORY_LOGS: usize = 3;

/// Summarize past logs for `phase`. `None` below [`MIN_HISTORY_LOGS`].
pub fn analyze_history(phase: Phase, logs: &[DailyLog]) -> Option<PhaseHistory> {
    let relevant: Vec<&DailyLog> = logs.iter().filter(|log| log.phase == phase).collect();
    if relevant.len() < MIN_HISTORY_LOGS {
        return None;
    }

    let total: f64 = relevant
        .iter()
        .map(|log| log.energy.filter(|e| *e != 0.0).unwrap_or(5.0))
        .sum();
    let avg_energy = (total / relevant.len() as f64 * 10.0).round() / 10.0;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for mood in relevant
        .iter()
        .filter_map(|log| log.mood.as_deref())
        .filter(|m| !m.is_empty())
    {
        let count = counts.entry(mood).or_insert(0);
        if *count == 0 {
            order.push(mood);
        }
        *count += 1;
    }
    let mut common_mood: Option<&str> = None;
    let mut best = 0;
    for mood in order {
        if counts[mood] > best {
            best = counts[mood];
            common_mood = Some(mood);
        }
    }

    Some(PhaseHistory {
        phase,
        log_count: relevant.len(),
        avg_energy,
        common_mood: common_mood.map(str::to_string),
    })
}
