//! The in-memory model graph.
//!
//! Ownership is a strict tree: a [`Database`] owns one [`Model`], which owns
//! its tables and relationships; tables own their columns, measures,
//! hierarchies and partitions. Every collection is a [`NamedCollection`]
//! that rejects case-insensitive duplicates.

pub mod collection;
pub mod measure;
pub mod relationship;
pub mod table;
pub mod types;

pub use collection::{compare_names, names_equal, ModelError, ModelResult, Named, NamedCollection};
pub use measure::Measure;
pub use relationship::{ColumnRef, Relationship};
pub use table::{Column, ColumnKind, Hierarchy, Level, Partition, Table};
pub use types::{CrossFilter, DataType, PartitionMode};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of named entities, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    Column,
    Measure,
    Hierarchy,
    Partition,
    Relationship,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Table => "table",
            EntityKind::Column => "column",
            EntityKind::Measure => "measure",
            EntityKind::Hierarchy => "hierarchy",
            EntityKind::Partition => "partition",
            EntityKind::Relationship => "relationship",
        };
        f.write_str(s)
    }
}

/// Root of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub name: String,
    pub model: Model,
}

impl Database {
    /// An empty database whose model shares its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            model: Model::new(name.clone()),
            name,
        }
    }
}

/// The semantic model: tables plus the relationships between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub tables: NamedCollection<Table>,
    pub relationships: NamedCollection<Relationship>,
}

/// Where a formula lives in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaOwner<'a> {
    Measure { table: &'a str, measure: &'a str },
    CalculatedColumn { table: &'a str, column: &'a str },
}

impl fmt::Display for FormulaOwner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaOwner::Measure { table, measure } => write!(f, "{}[{}]", table, measure),
            FormulaOwner::CalculatedColumn { table, column } => {
                write!(f, "{}[{}]", table, column)
            }
        }
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: NamedCollection::new("model"),
            relationships: NamedCollection::new("model"),
        }
    }

    /// Every measure and calculated-column formula in the model, in
    /// document order (measures of a table after its calculated columns).
    pub fn formulas(&self) -> Vec<(FormulaOwner<'_>, &str)> {
        let mut out = Vec::new();
        for table in &self.tables {
            for (column, expr) in table.calculated_columns() {
                out.push((
                    FormulaOwner::CalculatedColumn {
                        table: table.name(),
                        column: column.name(),
                    },
                    expr,
                ));
            }
            for measure in &table.measures {
                out.push((
                    FormulaOwner::Measure {
                        table: table.name(),
                        measure: measure.name(),
                    },
                    measure.expression.as_str(),
                ));
            }
        }
        out
    }

    /// Apply `f` to every measure and calculated-column formula.
    pub fn for_each_formula_mut(&mut self, mut f: impl FnMut(&mut String)) {
        for table in &mut self.tables {
            for column in &mut table.columns {
                if let Some(expr) = column.expression_mut() {
                    f(expr);
                }
            }
            for measure in &mut table.measures {
                f(&mut measure.expression);
            }
        }
    }

    /// Whether `table[column]` is a declared column.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|t| t.columns.contains(column))
    }

    pub fn measure_count(&self) -> usize {
        self.tables.iter().map(|t| t.measures.len()).sum()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}
