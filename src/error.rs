//! Crate-level error taxonomy.
//!
//! Loading never produces one of these (it degrades to warnings). Edits
//! return them before any side effect; external-tool problems are carried
//! inline by the operations that report them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;

pub type TmdlResult<T> = Result<T, TmdlError>;

#[derive(Debug, Error)]
pub enum TmdlError {
    /// A path or entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input did not have the expected structure.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The requested name is already taken by a sibling.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An external program failed, exited with an error status, or timed out.
    #[error("external tool failed: {0}")]
    ExternalToolFailure(String),

    /// Cooperative cancellation was observed.
    #[error("cancelled after {completed} step(s)")]
    Cancelled { completed: usize },

    /// Writing the model at its commit point failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TmdlError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short category name, stable for machine consumers.
    pub fn category(&self) -> &'static str {
        match self {
            TmdlError::NotFound(_) => "not_found",
            TmdlError::Malformed(_) => "malformed",
            TmdlError::Conflict(_) => "conflict",
            TmdlError::ExternalToolFailure(_) => "external_tool_failure",
            TmdlError::Cancelled { .. } => "cancelled",
            TmdlError::Io { .. } => "io",
        }
    }
}

impl From<ModelError> for TmdlError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicateName { .. } => TmdlError::Conflict(err.to_string()),
            ModelError::NotFound { .. } => TmdlError::NotFound(err.to_string()),
        }
    }
}
