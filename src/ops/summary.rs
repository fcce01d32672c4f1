//! Model summary with progress reporting.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Settings;
use crate::model::Named;
use crate::progress::{ProgressSink, Reporter};

/// Per-table counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: usize,
    pub measures: usize,
    pub hierarchies: usize,
    pub partitions: usize,
}

/// What [`load_summary`] found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub document: Option<PathBuf>,
    pub tables: Vec<TableSummary>,
    pub measures: usize,
    pub relationships: usize,
    pub warnings: Vec<String>,
}

/// Load `path` and summarise it, reporting each finding to `sink`.
pub fn load_summary(path: impl AsRef<Path>, settings: &Settings, sink: &dyn ProgressSink) -> ModelSummary {
    let path = path.as_ref();
    let mut progress = Reporter::new(sink, None);
    progress.step(format!("Loading model from {}", path.display()));

    let outcome = super::load(path, settings);
    match &outcome.document {
        Some(document) => progress.step(format!("Read {}", document.display())),
        None => progress.step("No root document found; the model is empty"),
    }

    let model = &outcome.database.model;
    progress.step(format!("Model '{}'", model.name));
    progress.step(format!("{} table(s)", model.tables.len()));
    progress.step(format!("{} measure(s)", model.measure_count()));

    let warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
    for warning in &warnings {
        progress.step(format!("Warning: {}", warning));
    }

    ModelSummary {
        name: model.name.clone(),
        document: outcome.document.clone(),
        tables: model
            .tables
            .iter()
            .map(|t| TableSummary {
                name: t.name().to_string(),
                columns: t.columns.len(),
                measures: t.measures.len(),
                hierarchies: t.hierarchies.len(),
                partitions: t.partitions.len(),
            })
            .collect(),
        measures: model.measure_count(),
        relationships: model.relationships.len(),
        warnings,
    }
}
