//! Relationships between tables.
//!
//! A relationship never owns the columns it joins; it names them by
//! `(table, column)` key. Renames of either end are propagated by the
//! rename engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collection::{names_equal, Named, Rename};
use super::types::CrossFilter;
use super::EntityKind;

/// A `(table, column)` key addressing a column anywhere in the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Case-insensitive match against a table and column name.
    pub fn matches(&self, table: &str, column: &str) -> bool {
        names_equal(&self.table, table) && names_equal(&self.column, column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.column)
    }
}

/// A many-to-one relationship from one column to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    name: String,
    pub from: ColumnRef,
    pub to: ColumnRef,
    pub cross_filter: CrossFilter,
    pub is_active: bool,
}

impl Relationship {
    pub fn new(name: impl Into<String>, from: ColumnRef, to: ColumnRef) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            cross_filter: CrossFilter::default(),
            is_active: true,
        }
    }

    pub fn with_cross_filter(mut self, cross_filter: CrossFilter) -> Self {
        self.cross_filter = cross_filter;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Both endpoints, `from` first.
    pub fn endpoints_mut(&mut self) -> [&mut ColumnRef; 2] {
        [&mut self.from, &mut self.to]
    }
}

impl Named for Relationship {
    const KIND: EntityKind = EntityKind::Relationship;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Relationship {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
