//! Phase-based mood/energy prediction behind an injectable service.
//!
//! The dashboard asks a [`PredictionService`] for a mood label and an energy
//! score given the current phase, symptom list and a few user attributes.
//! [`HttpPredictor`] talks to an optional local model server;
//! [`RuleBasedPredictor`] uses the fixed phase tables in [`crate::cycle`];
//! [`FallbackPredictor`] chains the two so the answer never depends on the
//! server being reachable. The inference engine never calls into this module.

use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PredictionConfig;
use crate::cycle::{self, MoodLabel, Phase};

/// Errors from the prediction service.
#[derive(Debug, Error, Diagnostic)]
pub enum PredictError {
    #[error("prediction service is not available at {url}")]
    #[diagnostic(
        code(sakura::predict::unavailable),
        help("Start the model server or set `prediction.enabled = false` to use rule-based predictions.")
    )]
    Unavailable { url: String },

    #[error("prediction request failed: {message}")]
    #[diagnostic(
        code(sakura::predict::request_failed),
        help("Check that the model server is running and its model is loaded.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse prediction response: {message}")]
    #[diagnostic(
        code(sakura::predict::parse_error),
        help("The server returned an unexpected response format.")
    )]
    ParseError { message: String },
}

pub type PredictResult<T> = std::result::Result<T, PredictError>;

/// Inputs to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub phase: Phase,
    pub symptoms: Vec<String>,
    pub age: u32,
    pub sleep_hours: f64,
    pub current_mood: MoodLabel,
    /// Self-reported stress, 1–5.
    pub stress: u8,
    /// Activity level, 0–2.
    pub activity: u8,
}

impl PredictionRequest {
    /// A request for `phase` with default user attributes.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            symptoms: Vec::new(),
            age: 25,
            sleep_hours: 8.0,
            current_mood: MoodLabel::Neutral,
            stress: 3,
            activity: 2,
        }
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = symptoms;
        self
    }

    pub fn menopausal(&self) -> bool {
        self.phase == Phase::PostMenopause
    }
}

/// A predicted mood label and energy score (1–10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub mood: MoodLabel,
    pub energy: u8,
}

/// Anything that can turn a request into a prediction.
pub trait PredictionService: Send + Sync {
    fn predict(&self, request: &PredictionRequest) -> PredictResult<Prediction>;

    /// Cheap liveness check.
    fn is_available(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Rule-based
// ---------------------------------------------------------------------------

/// Fixed phase tables. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPredictor;

impl PredictionService for RuleBasedPredictor {
    fn predict(&self, request: &PredictionRequest) -> PredictResult<Prediction> {
        Ok(Prediction {
            mood: cycle::predict_mood(request.phase, &request.symptoms),
            energy: cycle::predict_energy(request.phase, &request.symptoms),
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Client for the local model server (`/health`, `/predict_energy`,
/// `/predict_mood`).
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    base_url: String,
    timeout: Duration,
}

impl HttpPredictor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &PredictionConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new().timeout(self.timeout).build()
    }

    fn post(&self, path: &str, body: serde_json::Value) -> PredictResult<serde_json::Value> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .agent()
            .post(&url)
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Transport(_) => PredictError::Unavailable { url: url.clone() },
                ureq::Error::Status(code, _) => PredictError::RequestFailed {
                    message: format!("{url} returned status {code}"),
                },
            })?;
        resp.into_json().map_err(|e| PredictError::ParseError {
            message: e.to_string(),
        })
    }

    /// Energy score from `/predict_energy`, rounded and clamped to 1–10.
    pub fn predict_energy(&self, request: &PredictionRequest) -> PredictResult<u8> {
        let body = serde_json::json!({
            "cycle_phase": request.phase.index(),
            "symptoms": request.symptoms.len(),
            "age": request.age,
            "menopause": u8::from(request.menopausal()),
            "sleep_hours": request.sleep_hours,
            "mood": request.current_mood.score(),
            "stress": request.stress,
            "activity": request.activity,
        });
        let json = self.post("/predict_energy", body)?;
        let score = json["energy_score"]
            .as_f64()
            .ok_or_else(|| PredictError::ParseError {
                message: "missing 'energy_score' field".into(),
            })?;
        Ok(score.round().clamp(1.0, 10.0) as u8)
    }

    /// Mood label from `/predict_mood`.
    pub fn predict_mood(&self, request: &PredictionRequest) -> PredictResult<MoodLabel> {
        let body = serde_json::json!({
            "cycle_phase": request.phase.index(),
            "symptoms": request.symptoms,
            "menopause": u8::from(request.menopausal()),
        });
        let json = self.post("/predict_mood", body)?;
        serde_json::from_value(json["mood"].clone()).map_err(|e| PredictError::ParseError {
            message: format!("bad 'mood' field: {e}"),
        })
    }
}

impl PredictionService for HttpPredictor {
    fn predict(&self, request: &PredictionRequest) -> PredictResult<Prediction> {
        Ok(Prediction {
            mood: self.predict_mood(request)?,
            energy: self.predict_energy(request)?,
        })
    }

    fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.agent().get(&url).call() {
            Ok(resp) => resp
                .into_json::<serde_json::Value>()
                .map(|json| json["model_loaded"].as_bool().unwrap_or(false))
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!(url, error = %e, "prediction health check failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Tries `primary`, answering from `fallback` on any error.
#[derive(Debug, Clone)]
pub struct FallbackPredictor<P, F = RuleBasedPredictor> {
    primary: P,
    fallback: F,
}

impl<P: PredictionService> FallbackPredictor<P> {
    /// Fall back to the rule-based tables.
    pub fn new(primary: P) -> Self {
        Self::with_fallback(primary, RuleBasedPredictor)
    }
}

impl<P: PredictionService, F: PredictionService> FallbackPredictor<P, F> {
    pub fn with_fallback(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: PredictionService, F: PredictionService> PredictionService for FallbackPredictor<P, F> {
    fn predict(&self, request: &PredictionRequest) -> PredictResult<Prediction> {
        match self.primary.predict(request) {
            Ok(prediction) => Ok(prediction),
            Err(e) => {
                tracing::warn!(error = %e, "prediction service unavailable, using fallback");
                self.fallback.predict(request)
            }
        }
    }

    fn is_available(&self) -> bool {
        self.primary.is_available() || self.fallback.is_available()
    }
}

/// The predictor described by `config`: HTTP with rule-based fallback when
/// enabled, rule-based only otherwise.
pub fn from_config(config: &PredictionConfig) -> Box<dyn PredictionService> {
    if config.enabled {
        Box::new(FallbackPredictor::new(HttpPredictor::from_config(config)))
    } else {
        Box::new(RuleBasedPredictor)
    }
}
