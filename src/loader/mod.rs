//! TMDL document → model graph.
//!
//! Loading never fails. A missing path, a missing root document or an
//! unreadable file yields an empty database named after the path, and every
//! problem is reported as a [`LoadWarning`] next to the partial graph.

mod parser;
mod scanner;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LayoutSettings;
use crate::model::{Database, EntityKind};

/// A non-fatal problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum LoadWarning {
    /// The path does not exist.
    PathNotFound { path: PathBuf },

    /// The folder exists but holds no root document.
    RootDocumentMissing { path: PathBuf },

    /// The root document could not be read.
    Unreadable { path: PathBuf, message: String },

    /// A declaration could not be fully read.
    Malformed { line: usize, message: String },

    /// A declaration reused a sibling's name; the first one was kept.
    Duplicate {
        line: usize,
        kind: EntityKind,
        name: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::PathNotFound { path } => {
                write!(f, "path '{}' does not exist", path.display())
            }
            LoadWarning::RootDocumentMissing { path } => {
                write!(f, "no root document found in '{}'", path.display())
            }
            LoadWarning::Unreadable { path, message } => {
                write!(f, "cannot read '{}': {}", path.display(), message)
            }
            LoadWarning::Malformed { line, message } => write!(f, "line {}: {}", line, message),
            LoadWarning::Duplicate { line, kind, name } => write!(
                f,
                "line {}: duplicate {} '{}' ignored, the first declaration is kept",
                line, kind, name
            ),
        }
    }
}

/// Result of loading a model.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub database: Database,
    pub warnings: Vec<LoadWarning>,
    /// The root document that was read, if one was found.
    pub document: Option<PathBuf>,
}

impl LoadOutcome {
    fn empty(name: String, warning: LoadWarning) -> Self {
        warn!("{}", warning);
        Self {
            database: Database::new(name),
            warnings: vec![warning],
            document: None,
        }
    }
}

/// Load a model from a document or folder using the default layout.
pub fn load(path: impl AsRef<Path>) -> LoadOutcome {
    load_with(path.as_ref(), &LayoutSettings::default())
}

/// Load a model from a document or folder.
///
/// A folder is probed for `<folder>/<root>` and then
/// `<folder>/<definition>/<root>`.
pub fn load_with(path: &Path, layout: &LayoutSettings) -> LoadOutcome {
    let fallback = fallback_name(path);

    if !path.exists() {
        return LoadOutcome::empty(
            fallback,
            LoadWarning::PathNotFound {
                path: path.to_path_buf(),
            },
        );
    }

    let Some(document) = resolve_document(path, layout) else {
        return LoadOutcome::empty(
            fallback,
            LoadWarning::RootDocumentMissing {
                path: path.to_path_buf(),
            },
        );
    };
    debug!(document = %document.display(), "resolved root document");

    let text = match fs::read_to_string(&document) {
        Ok(text) => text,
        Err(e) => {
            let mut outcome = LoadOutcome::empty(
                fallback,
                LoadWarning::Unreadable {
                    path: document.clone(),
                    message: e.to_string(),
                },
            );
            outcome.document = Some(document);
            return outcome;
        }
    };

    let mut outcome = load_str(&text, &fallback);
    outcome.document = Some(document);
    info!(
        model = %outcome.database.name,
        tables = outcome.database.model.tables.len(),
        warnings = outcome.warnings.len(),
        "loaded model"
    );
    outcome
}

/// Parse document text. `fallback_name` is used when the text has no
/// `model` line.
pub fn load_str(text: &str, fallback_name: &str) -> LoadOutcome {
    let (database, warnings) = parser::parse_document(text, fallback_name);
    for warning in &warnings {
        warn!("{}", warning);
    }
    LoadOutcome {
        database,
        warnings,
        document: None,
    }
}

/// The root document for `path`, if any.
pub fn resolve_document(path: &Path, layout: &LayoutSettings) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let candidates = [
        path.join(&layout.root_document),
        path.join(&layout.definition_dir).join(&layout.root_document),
    ];
    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Name used when the document does not declare one: the folder name, or
/// the file stem for a document path.
fn fallback_name(path: &Path) -> String {
    let segment = if path.is_file() {
        path.file_stem()
    } else {
        path.file_name()
    };
    segment
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
