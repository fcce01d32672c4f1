//! Structural edits on a loaded model: renames and canonical ordering.

mod format;
mod rename;

pub use format::format_model;
pub use rename::{rename, ObjectKind, RenameReport, RenameRequest};
