//! Diagnostic error types for sakura-cycle.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. The inference engine itself never
//! surfaces these to its callers after construction: storage failures are
//! logged and the in-memory state stays authoritative.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::cycle::CycleError;
use crate::paths::PathError;
use crate::predict::PredictError;

/// Top-level error type for sakura-cycle.
#[derive(Debug, Error, Diagnostic)]
pub enum SakuraError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(sakura::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(sakura::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Another process may hold the database open, or the file is damaged. \
             Deleting the data directory resets the tracker to its baseline."
        )
    )]
    Redb { message: String },

    #[error("serialization error for record \"{key}\": {message}")]
    #[diagnostic(
        code(sakura::store::serde),
        help(
            "A persisted record could not be encoded or decoded as JSON. \
             Corrupted records are replaced by defaults on the next load."
        )
    )]
    Serialization { key: String, message: String },

    #[error("storage unavailable: {message}")]
    #[diagnostic(
        code(sakura::store::unavailable),
        help("The storage backend rejected the write. The running session keeps its in-memory state.")
    )]
    Unavailable { message: String },
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(sakura::engine::invalid_config),
        help("Check the EngineConfig fields. {message}")
    )]
    InvalidConfig { message: String },

    #[error("cannot open data directory: {path}")]
    #[diagnostic(
        code(sakura::engine::data_dir),
        help("Ensure the directory exists and is writable, or run without --data-dir for memory-only mode.")
    )]
    DataDir {
        path: String,
        #[source]
        source: StoreError,
    },
}

/// Convenience result type for top-level operations.
pub type SakuraResult<T> = std::result::Result<T, SakuraError>;
