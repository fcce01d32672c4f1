//! Entity rename with formula-reference rewriting.
//!
//! The name change goes through the owning collection, so collisions are
//! rejected before anything is touched. Every measure and calculated-column
//! formula in the model is then rewritten from extracted reference spans,
//! which leaves partial identifiers and string literals alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dax::{bracket_name, rewrite_references, table_qualifier, Edit, Reference};
use crate::error::{TmdlError, TmdlResult};
use crate::model::{names_equal, Database, Model, Named};

/// What kind of object is being renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    Column,
    Measure,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Table => "table",
            ObjectKind::Column => "column",
            ObjectKind::Measure => "measure",
        };
        f.write_str(s)
    }
}

impl FromStr for ObjectKind {
    type Err = TmdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(ObjectKind::Table),
            "column" => Ok(ObjectKind::Column),
            "measure" => Ok(ObjectKind::Measure),
            other => Err(TmdlError::Malformed(format!(
                "unsupported object kind '{}', expected table | column | measure",
                other
            ))),
        }
    }
}

/// A rename to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub kind: ObjectKind,
    /// Containing table; required for columns and measures.
    pub table: Option<String>,
    pub old_name: String,
    pub new_name: String,
}

impl RenameRequest {
    pub fn table(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Table,
            table: None,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    pub fn column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: ObjectKind::Column,
            table: Some(table.into()),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    pub fn measure(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: ObjectKind::Measure,
            table: Some(table.into()),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    fn containing_table(&self) -> TmdlResult<&str> {
        self.table
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TmdlError::Malformed(format!(
                    "renaming a {} requires its containing table",
                    self.kind
                ))
            })
    }
}

/// What a rename changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub kind: ObjectKind,
    pub old_name: String,
    pub new_name: String,
    /// Formulas whose text changed.
    pub formulas_rewritten: usize,
    /// Relationship endpoints that now point at the new name.
    pub relationship_endpoints: usize,
    /// Hierarchy levels that now point at the new column name.
    pub hierarchy_levels: usize,
}

impl fmt::Display for RenameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "renamed {} '{}' to '{}' ({} formula(s) rewritten)",
            self.kind, self.old_name, self.new_name, self.formulas_rewritten
        )
    }
}

/// Rename a table, column or measure and rewrite every reference to it.
///
/// On error the database is left untouched.
pub fn rename(db: &mut Database, request: &RenameRequest) -> TmdlResult<RenameReport> {
    let new_name = request.new_name.trim();
    if new_name.is_empty() {
        return Err(TmdlError::Malformed("the new name must not be empty".to_string()));
    }

    let model = &mut db.model;
    let mut report = RenameReport {
        kind: request.kind,
        old_name: request.old_name.clone(),
        new_name: new_name.to_string(),
        formulas_rewritten: 0,
        relationship_endpoints: 0,
        hierarchy_levels: 0,
    };

    match request.kind {
        ObjectKind::Table => rename_table(model, &request.old_name, new_name, &mut report)?,
        ObjectKind::Column => {
            let table = request.containing_table()?;
            rename_column(model, table, &request.old_name, new_name, &mut report)?
        }
        ObjectKind::Measure => {
            let table = request.containing_table()?;
            rename_measure(model, table, &request.old_name, new_name, &mut report)?
        }
    }

    info!(
        kind = %report.kind,
        old = %report.old_name,
        new = %report.new_name,
        formulas = report.formulas_rewritten,
        "renamed object"
    );
    Ok(report)
}

fn rename_table(
    model: &mut Model,
    old: &str,
    new: &str,
    report: &mut RenameReport,
) -> TmdlResult<()> {
    let previous = model.tables.rename(old, new)?.name().to_string();
    debug!(from = %previous, to = %new, "table renamed in collection");

    for relationship in &mut model.relationships {
        for endpoint in relationship.endpoints_mut() {
            if names_equal(&endpoint.table, old) {
                endpoint.table = new.to_string();
                report.relationship_endpoints += 1;
            }
        }
    }

    report.formulas_rewritten = rewrite_formulas(model, |r| {
        let (table, span) = (r.table.as_deref()?, r.table_span.clone()?);
        names_equal(table, old).then(|| Edit {
            range: span,
            text: table_qualifier(new, r.table_quoted),
        })
    });
    Ok(())
}

fn rename_column(
    model: &mut Model,
    table_name: &str,
    old: &str,
    new: &str,
    report: &mut RenameReport,
) -> TmdlResult<()> {
    let table = model.tables.require_mut(table_name)?;
    table.columns.rename(old, new)?;
    let table_name = table.name().to_string();

    for hierarchy in &mut table.hierarchies {
        for level in &mut hierarchy.levels {
            if names_equal(&level.column, old) {
                level.column = new.to_string();
                report.hierarchy_levels += 1;
            }
        }
    }

    for relationship in &mut model.relationships {
        for endpoint in relationship.endpoints_mut() {
            if endpoint.matches(&table_name, old) {
                endpoint.column = new.to_string();
                report.relationship_endpoints += 1;
            }
        }
    }

    report.formulas_rewritten = rewrite_formulas(model, |r| {
        let qualified_here = r.table.as_deref().is_some_and(|t| names_equal(t, &table_name));
        (qualified_here && names_equal(&r.name, old)).then(|| rename_bracket(r, new))
    });
    Ok(())
}

fn rename_measure(
    model: &mut Model,
    table_name: &str,
    old: &str,
    new: &str,
    report: &mut RenameReport,
) -> TmdlResult<()> {
    let table = model.tables.require_mut(table_name)?;
    table.measures.rename(old, new)?;
    let table_name = table.name().to_string();

    report.formulas_rewritten = rewrite_formulas(model, |r| {
        let scope_ok = r.table.as_deref().map_or(true, |t| names_equal(t, &table_name));
        (scope_ok && names_equal(&r.name, old)).then(|| rename_bracket(r, new))
    });
    Ok(())
}

fn rename_bracket(reference: &Reference, new: &str) -> Edit {
    Edit {
        range: reference.name_span.clone(),
        text: bracket_name(new),
    }
}

/// Apply `edit` to every formula; returns how many formulas changed.
fn rewrite_formulas<F>(model: &mut Model, mut edit: F) -> usize
where
    F: FnMut(&Reference) -> Option<Edit>,
{
    let mut changed = 0;
    model.for_each_formula_mut(|expression| {
        if let Some(rewritten) = rewrite_references(expression, &mut edit) {
            if rewritten != *expression {
                *expression = rewritten;
                changed += 1;
            }
        }
    });
    changed
}
