//! Creating or extending a model from a [`Blueprint`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::blueprint::Blueprint;
use crate::config::Settings;
use crate::error::TmdlResult;
use crate::model::{Database, ModelResult, Named, Table};
use crate::progress::{ProgressSink, Reporter};

/// What [`create`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateReport {
    pub model: String,
    /// Where the model was written; `None` when nothing was persisted.
    pub document: Option<PathBuf>,
    pub tables_created: Vec<String>,
    pub tables_skipped: Vec<String>,
    pub relationships_created: Vec<String>,
    pub relationships_skipped: Vec<String>,
    /// Measures as `Table[Measure]`.
    pub measures_created: Vec<String>,
    pub measures_skipped: Vec<String>,
    pub completed_steps: usize,
    pub cancelled: bool,
}

impl CreateReport {
    pub fn persisted(&self) -> bool {
        self.document.is_some()
    }
}

/// Apply `blueprint` to the model at `path`, creating it if needed.
///
/// Existing tables, relationships and measures are kept and reported as
/// skipped. Relationships whose endpoints do not resolve are skipped too.
/// The model is saved once at the end; a cancelled run saves nothing.
pub fn create(
    path: impl AsRef<Path>,
    blueprint: &Blueprint,
    settings: &Settings,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> TmdlResult<CreateReport> {
    let path = path.as_ref();
    let mut progress = Reporter::new(sink, None);

    // Reject an inconsistent blueprint before touching anything.
    let tables: Vec<Table> = blueprint
        .tables
        .iter()
        .map(|t| t.build())
        .collect::<ModelResult<_>>()?;

    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Model".to_string());
    let name = blueprint.name.clone().unwrap_or(fallback);
    progress.step(format!("Starting creation of model '{}'", name));

    let (mut db, document) = if path.exists() {
        progress.step("Loading existing model to preserve its tables");
        let outcome = super::load(path, settings);
        match outcome.document {
            Some(document) => {
                progress.step(format!(
                    "Loaded existing model with {} table(s)",
                    outcome.database.model.tables.len()
                ));
                (outcome.database, Some(document))
            }
            None => {
                progress.step("No existing model found, creating a new one");
                (Database::new(&name), None)
            }
        }
    } else {
        (Database::new(&name), None)
    };

    let mut report = CreateReport {
        model: db.model.name.clone(),
        ..CreateReport::default()
    };

    for table in tables {
        if cancel.is_cancelled() {
            return Ok(cancelled(report, &progress));
        }
        let table_name = table.name().to_string();
        if db.model.tables.contains(&table_name) {
            progress.step(format!("Table '{}' already exists, skipping", table_name));
            report.tables_skipped.push(table_name);
        } else {
            db.model.tables.add(table)?;
            progress.step(format!("Created table '{}'", table_name));
            report.tables_created.push(table_name);
        }
    }

    for relationship_blueprint in &blueprint.relationships {
        if cancel.is_cancelled() {
            return Ok(cancelled(report, &progress));
        }
        let relationship = relationship_blueprint.build();
        let name = relationship.name().to_string();
        let model = &db.model;
        let unresolved = [&relationship.from, &relationship.to]
            .into_iter()
            .find(|end| !model.has_column(&end.table, &end.column));

        if model.relationships.contains(&name) {
            progress.step(format!("Relationship '{}' already exists, skipping", name));
            report.relationships_skipped.push(name);
        } else if let Some(end) = unresolved {
            progress.step(format!(
                "Relationship '{}' skipped: {} is not a declared column",
                name, end
            ));
            report.relationships_skipped.push(name);
        } else {
            db.model.relationships.add(relationship)?;
            progress.step(format!("Created relationship '{}'", name));
            report.relationships_created.push(name);
        }
    }

    for table_blueprint in &blueprint.tables {
        for measure_blueprint in &table_blueprint.measures {
            if cancel.is_cancelled() {
                return Ok(cancelled(report, &progress));
            }
            let table = db.model.tables.require_mut(table_blueprint.name.trim())?;
            let qualified = format!("{}[{}]", table.name(), measure_blueprint.name);
            if table.measures.contains(&measure_blueprint.name) {
                progress.step(format!("Measure {} already exists, skipping", qualified));
                report.measures_skipped.push(qualified);
            } else {
                table.measures.add(measure_blueprint.build())?;
                progress.step(format!("Created measure {}", qualified));
                report.measures_created.push(qualified);
            }
        }
    }

    if cancel.is_cancelled() {
        return Ok(cancelled(report, &progress));
    }
    let written = super::commit(&db, document.as_deref(), path, settings)?;
    progress.step(format!("Model saved to {}", written.display()));
    info!(
        document = %written.display(),
        tables = report.tables_created.len(),
        "created model"
    );

    report.document = Some(written);
    report.completed_steps = progress.completed();
    Ok(report)
}

fn cancelled(mut report: CreateReport, progress: &Reporter<'_>) -> CreateReport {
    warn!(completed = progress.completed(), "model creation cancelled, nothing saved");
    report.cancelled = true;
    report.completed_steps = progress.completed();
    report
}
