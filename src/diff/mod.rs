//! Chunked unified diff between two documents.
//!
//! The comparison itself is delegated to an external program (by default
//! `git diff --no-index`). This module owns everything around it: bounded
//! line-aligned chunks, cancellation, the timeout, and making sure the
//! child and its process group never outlive the stream.

mod chunker;
mod process;

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::error::TmdlError;

pub use chunker::{LineChunker, MIN_CHUNK_BYTES};
pub use process::diff_documents;

/// Errors reported inline by the diff stream.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("invalid diff configuration: {0}")]
    Config(String),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read diff output: {0}")]
    Read(#[from] io::Error),

    #[error("diff program timed out after {0:?}")]
    Timeout(Duration),

    #[error("diff program {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("diff cancelled")]
    Cancelled,
}

/// One item of a diff stream.
#[derive(Debug)]
pub enum DiffItem {
    /// Up to the configured budget of diff text, ending on a line boundary.
    Chunk(String),
    /// The program could not run to completion. Always the last item.
    ToolFailure(DiffError),
}

impl From<DiffError> for TmdlError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::Cancelled => TmdlError::Cancelled { completed: 0 },
            other => TmdlError::ExternalToolFailure(other.to_string()),
        }
    }
}
