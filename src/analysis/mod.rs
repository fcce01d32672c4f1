//! Read-only analyses over a loaded model.

pub mod unused;
pub mod validate;

pub use unused::unused_columns;
pub use validate::{Severity, ValidationIssue};
