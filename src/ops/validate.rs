//! Model validation with progress reporting and cancellation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::require_path;
use crate::analysis::validate::{
    check_ambiguous_paths, check_descriptions, check_references, check_relationship_endpoints,
    check_round_trip, load_warning_issues,
};
use crate::analysis::{Severity, ValidationIssue};
use crate::config::Settings;
use crate::error::{TmdlError, TmdlResult};
use crate::loader::resolve_document;
use crate::progress::{ProgressSink, Reporter};

/// Findings of [`validate`], most severe first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub document: Option<PathBuf>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// No error-level issues.
    pub fn is_valid(&self) -> bool {
        self.count(Severity::Error) == 0
    }
}

/// Validate the model at `path`.
///
/// Cancellation is checked between steps; a cancelled run returns
/// [`TmdlError::Cancelled`] with the number of steps already reported.
pub fn validate(
    path: impl AsRef<Path>,
    settings: &Settings,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> TmdlResult<ValidationReport> {
    let path = path.as_ref();
    require_path(path)?;

    let mut progress = Reporter::new(sink, None);
    progress.step(format!("Starting validation of {}", path.display()));
    checkpoint(cancel, &progress)?;

    let Some(document) = resolve_document(path, &settings.layout) else {
        progress.step("No root document found in the folder or its definition subfolder");
        return Ok(ValidationReport {
            document: None,
            issues: vec![ValidationIssue::new(
                Severity::Error,
                "document",
                path.display().to_string(),
                format!(
                    "neither {} nor {}/{} exists",
                    settings.layout.root_document,
                    settings.layout.definition_dir,
                    settings.layout.root_document
                ),
            )],
        });
    };
    let in_definition = document
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == settings.layout.definition_dir.as_str())
        && path.is_dir();
    if in_definition {
        progress.step(format!(
            "Found root document in definition subfolder: {}",
            document.display()
        ));
    }

    checkpoint(cancel, &progress)?;
    progress.step("Loading model");
    let outcome = super::load(path, settings);
    let db = &outcome.database;
    let mut issues = load_warning_issues(&outcome.warnings, &document.display().to_string());
    progress.step(format!(
        "Loaded {} table(s) and {} relationship(s)",
        db.model.tables.len(),
        db.model.relationships.len()
    ));

    checkpoint(cancel, &progress)?;
    progress.step("Checking round trip");
    issues.extend(check_round_trip(db));

    checkpoint(cancel, &progress)?;
    progress.step("Checking formula references");
    issues.extend(check_references(&db.model));

    checkpoint(cancel, &progress)?;
    progress.step("Checking relationships");
    issues.extend(check_relationship_endpoints(&db.model));
    issues.extend(check_ambiguous_paths(&db.model));

    checkpoint(cancel, &progress)?;
    progress.step("Checking measure descriptions");
    issues.extend(check_descriptions(&db.model));

    issues.sort_by_key(|i| i.severity);
    let report = ValidationReport {
        document: Some(document),
        issues,
    };
    progress.step(format!(
        "Validation finished: {} error(s), {} warning(s), {} note(s)",
        report.count(Severity::Error),
        report.count(Severity::Warning),
        report.count(Severity::Info)
    ));
    info!(valid = report.is_valid(), issues = report.issues.len(), "validated model");
    Ok(report)
}

fn checkpoint(cancel: &CancellationToken, progress: &Reporter<'_>) -> TmdlResult<()> {
    if cancel.is_cancelled() {
        Err(TmdlError::Cancelled {
            completed: progress.completed(),
        })
    } else {
        Ok(())
    }
}
