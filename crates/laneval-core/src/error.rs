//! Error taxonomy for laneval.
//!
//! Structural problems inside a requirement spec (cycles, dangling
//! prerequisites, gate failures) are never errors here: they become issues
//! on the affected validator. Only input that cannot be interpreted at all,
//! I/O failures, and validator faults under [`FaultPolicy::Abort`] surface
//! as [`LanevalError`].
//!
//! [`FaultPolicy::Abort`]: crate::orchestrator::FaultPolicy::Abort

use std::path::PathBuf;

/// A single validator could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorFault {
    #[error("no validator registered under name '{name}'")]
    NotRegistered { name: String },

    #[error("{name} failed: {reason}")]
    Failed { name: String, reason: String },
}

/// laneval library errors.
#[derive(Debug, thiserror::Error)]
pub enum LanevalError {
    #[error("invalid requirement spec: {0}")]
    InvalidSpec(String),

    #[error("invalid map document: {0}")]
    InvalidMap(String),

    #[error("invalid checks filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("validator execution aborted the run: {0}")]
    ValidatorFault(#[from] ValidatorFault),

    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LanevalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for laneval operations.
pub type Result<T> = std::result::Result<T, LanevalError>;
