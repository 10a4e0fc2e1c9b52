// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # sakura-cycle
//!
//! Behavioral inference engine for a wellness companion. Discrete user
//! activity signals nudge two bounded scores (mood and energy) which drift
//! back toward a neutral baseline over time and are exposed as coarse
//! Low/Moderate/High labels.
//!
//! ## Architecture
//!
//! - **Signals** (`signal`): signal kinds, payloads and the classifier that maps
//!   each one to a mood/energy adjustment
//! - **State** (`state`): clamped state updates and one-step decay toward baseline
//! - **Insights** (`insight`): threshold labelling of the current state
//! - **Storage** (`store`): two JSON records in a key-value backend (redb or memory)
//! - **Engine** (`engine`): the public surface, with a background decay timer (`scheduler`)
//! - **Cycle** (`cycle`, `predict`): phase calendar and phase-based predictions
//!
//! ## Library usage
//!
//! ```no_run
//! use sakura_cycle::engine::{EngineConfig, InferenceEngine};
//! use sakura_cycle::signal::{Signal, SignalKind};
//!
//! let engine = InferenceEngine::new(EngineConfig::default()).unwrap();
//! engine.log_signal(SignalKind::TaskComplete);
//! engine.log_signal(Signal::chat("feeling great today"));
//! let insights = engine.insights();
//! println!("mood: {} ({:.1})", insights.mood.label, insights.mood.value);
//! ```

pub mod config;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod insight;
pub mod paths;
pub mod predict;
pub mod scheduler;
pub mod signal;
pub mod state;
pub mod store;
