//! Path-level operations.
//!
//! Every operation loads the model fresh from disk, works on the in-memory
//! graph and writes back once at its commit point. Edits that fail leave the
//! document untouched.

pub mod blueprint;
mod create;
pub mod registry;
mod summary;
mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use futures::Stream;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::unused_columns;
use crate::config::Settings;
use crate::diff::{diff_documents, DiffItem};
use crate::emitter::{save_with, to_tmdl};
use crate::error::{TmdlError, TmdlResult};
use crate::loader::{load_with, LoadOutcome};
use crate::model::{Database, Measure, Named};
use crate::refactor::{format_model, RenameReport, RenameRequest};

pub use blueprint::Blueprint;
pub use create::{create, CreateReport};
pub use registry::{list_tools, ToolInfo, TOOLS};
pub use summary::{load_summary, ModelSummary, TableSummary};
pub use validate::{validate, ValidationReport};

/// Load a model. Never fails; problems are reported as warnings.
pub fn load(path: impl AsRef<Path>, settings: &Settings) -> LoadOutcome {
    load_with(path.as_ref(), &settings.layout)
}

/// Serialize `db` to `path` (a `.tmdl` file, or a folder receiving the root
/// document).
pub fn save(db: &Database, path: impl AsRef<Path>, settings: &Settings) -> TmdlResult<PathBuf> {
    save_with(db, path.as_ref(), &settings.layout, settings.indent())
}

/// Write back to the document the model was loaded from, or to `path` when
/// nothing was loaded.
fn commit(db: &Database, outcome_document: Option<&Path>, path: &Path, settings: &Settings) -> TmdlResult<PathBuf> {
    save_with(
        db,
        outcome_document.unwrap_or(path),
        &settings.layout,
        settings.indent(),
    )
}

/// Rename an object and rewrite every formula that refers to it.
pub fn rename(
    path: impl AsRef<Path>,
    request: &RenameRequest,
    settings: &Settings,
) -> TmdlResult<RenameReport> {
    let path = path.as_ref();
    let LoadOutcome {
        mut database,
        document,
        ..
    } = load(path, settings);

    let report = crate::refactor::rename(&mut database, request)?;
    commit(&database, document.as_deref(), path, settings)?;
    Ok(report)
}

/// Declared columns that no formula references, as `Table[Column]`.
pub fn detect_unused_columns(path: impl AsRef<Path>, settings: &Settings) -> Vec<String> {
    let outcome = load(path, settings);
    unused_columns(&outcome.database.model)
}

/// Result of [`format`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatReport {
    pub document: PathBuf,
    /// Whether the document's bytes changed.
    pub changed: bool,
    pub tables: usize,
    pub relationships: usize,
}

/// Sort the model canonically and rewrite it. Running it twice changes
/// nothing the second time.
pub fn format(path: impl AsRef<Path>, settings: &Settings) -> TmdlResult<FormatReport> {
    let path = path.as_ref();
    let LoadOutcome {
        mut database,
        document,
        ..
    } = load(path, settings);

    let before = document
        .as_deref()
        .and_then(|doc| fs::read_to_string(doc).ok());
    format_model(&mut database);
    let after = to_tmdl(&database, settings.indent());

    let written = commit(&database, document.as_deref(), path, settings)?;
    let report = FormatReport {
        document: written,
        changed: before.as_deref() != Some(after.as_str()),
        tables: database.model.tables.len(),
        relationships: database.model.relationships.len(),
    };
    info!(document = %report.document.display(), changed = report.changed, "formatted model");
    Ok(report)
}

/// Stream a unified diff of two documents. See [`diff_documents`].
pub fn diff(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
    settings: &Settings,
    cancel: CancellationToken,
) -> impl Stream<Item = DiffItem> + Send + 'static {
    diff_documents(
        left.as_ref().to_path_buf(),
        right.as_ref().to_path_buf(),
        settings.diff.clone(),
        cancel,
    )
}

/// Whether [`add_measure`] created or replaced the measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureChange {
    Added,
    Updated,
}

/// Add `measure` to `table`, or replace the expression (and any supplied
/// format string or description) of the measure with that name.
pub fn add_measure(
    path: impl AsRef<Path>,
    table: &str,
    measure: Measure,
    settings: &Settings,
) -> TmdlResult<MeasureChange> {
    let path = path.as_ref();
    let LoadOutcome {
        mut database,
        document,
        ..
    } = load(path, settings);

    let target = database.model.tables.require_mut(table)?;
    let change = match target.measures.get_mut(measure.name()) {
        Some(existing) => {
            existing.expression = measure.expression;
            if measure.format_string.is_some() {
                existing.format_string = measure.format_string;
            }
            if measure.description.is_some() {
                existing.description = measure.description;
            }
            MeasureChange::Updated
        }
        None => {
            target.measures.add(measure)?;
            MeasureChange::Added
        }
    };

    commit(&database, document.as_deref(), path, settings)?;
    Ok(change)
}

/// Table names in document order.
pub fn list_tables(path: impl AsRef<Path>, settings: &Settings) -> Vec<String> {
    let outcome = load(path, settings);
    outcome
        .database
        .model
        .tables
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Measure names of one table, in document order.
pub fn list_measures(
    path: impl AsRef<Path>,
    table: &str,
    settings: &Settings,
) -> TmdlResult<Vec<String>> {
    let outcome = load(path, settings);
    let table = outcome.database.model.tables.require(table)?;
    Ok(table.measures.names().into_iter().map(str::to_string).collect())
}

/// Fail with `NotFound` when `path` does not exist.
fn require_path(path: &Path) -> TmdlResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(TmdlError::NotFound(format!(
            "path '{}' does not exist",
            path.display()
        )))
    }
}
