//! # tmdl
//!
//! A text-format engine for TMDL semantic models.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          model.tmdl (folder, definition/, or file)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Database / Model graph                  │
//! │   (tables, columns, measures, hierarchies, partitions,   │
//! │                     relationships)                       │
//! └─────────────────────────────────────────────────────────┘
//!          │                 │                  │
//!          ▼ [refactor]      ▼ [refactor]       ▼ [analysis]
//!       rename            format          unused / validate
//!          │                 │
//!          ▼ [emitter]       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                  canonical model.tmdl                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Formula text is never parsed into a tree. References such as
//! `Sales[Amount]` or `[Total Sales]` are recovered lexically by
//! [`dax::references`], and renames rewrite them in place.
//!
//! The [`diff`] module streams a unified diff between two documents in
//! bounded chunks, delegating the comparison to an external program.

pub mod analysis;
pub mod config;
pub mod dax;
pub mod diff;
pub mod emitter;
pub mod error;
pub mod loader;
pub mod model;
pub mod ops;
pub mod progress;
pub mod refactor;

pub use error::{TmdlError, TmdlResult};
pub use loader::{load, LoadOutcome, LoadWarning};
pub use model::{
    Column, ColumnKind, ColumnRef, CrossFilter, DataType, Database, EntityKind, Hierarchy,
    Level, Measure, Model, ModelError, NamedCollection, Partition, PartitionMode, Relationship,
    Table,
};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::dax::{column_references, extract_references, Reference};
    pub use crate::emitter::{save, to_tmdl};
    pub use crate::loader::{load, load_str, LoadOutcome};
    pub use crate::model::*;
    pub use crate::progress::{NoProgress, ProgressSink, ProgressUpdate};
    pub use crate::refactor::{format_model, rename, ObjectKind, RenameRequest};
}
