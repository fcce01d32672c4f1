// src/model/table.rs
use super::collection::{ModelResult, Named, NamedCollection, Rename};
use super::measure::Measure;
use super::types::{DataType, PartitionMode};
use super::EntityKind;

/// A table with its columns, measures, hierarchies and partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    pub columns: NamedCollection<Column>,
    pub measures: NamedCollection<Measure>,
    pub hierarchies: NamedCollection<Hierarchy>,
    pub partitions: NamedCollection<Partition>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let scope = table_scope(&name);
        Self {
            columns: NamedCollection::new(scope.clone()),
            measures: NamedCollection::new(scope.clone()),
            hierarchies: NamedCollection::new(scope.clone()),
            partitions: NamedCollection::new(scope),
            name,
        }
    }

    /// Builder-style column add; fails on a duplicate name.
    pub fn with_column(mut self, column: Column) -> ModelResult<Self> {
        self.columns.add(column)?;
        Ok(self)
    }

    pub fn with_measure(mut self, measure: Measure) -> ModelResult<Self> {
        self.measures.add(measure)?;
        Ok(self)
    }

    pub fn with_hierarchy(mut self, hierarchy: Hierarchy) -> ModelResult<Self> {
        self.hierarchies.add(hierarchy)?;
        Ok(self)
    }

    pub fn with_partition(mut self, partition: Partition) -> ModelResult<Self> {
        self.partitions.add(partition)?;
        Ok(self)
    }

    /// Calculated columns of this table, in collection order.
    pub fn calculated_columns(&self) -> impl Iterator<Item = (&Column, &str)> {
        self.columns
            .iter()
            .filter_map(|c| c.expression().map(|expr| (c, expr)))
    }
}

fn table_scope(name: &str) -> String {
    format!("table '{}'", name)
}

impl Named for Table {
    const KIND: EntityKind = EntityKind::Table;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Table {
    fn set_name(&mut self, name: String) {
        let scope = table_scope(&name);
        self.columns.set_scope(scope.clone());
        self.measures.set_scope(scope.clone());
        self.hierarchies.set_scope(scope.clone());
        self.partitions.set_scope(scope);
        self.name = name;
    }
}

/// A column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    pub data_type: DataType,
    pub kind: ColumnKind,
}

/// Regular columns are loaded from the source; calculated columns are
/// evaluated from a formula.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Regular { source_column: Option<String> },
    Calculated { expression: String },
}

impl Column {
    pub fn regular(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            kind: ColumnKind::Regular {
                source_column: None,
            },
        }
    }

    pub fn calculated(
        name: impl Into<String>,
        data_type: DataType,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            kind: ColumnKind::Calculated {
                expression: expression.into(),
            },
        }
    }

    /// Set the source column of a regular column. No effect on calculated
    /// columns.
    pub fn with_source_column(mut self, source: impl Into<String>) -> Self {
        if let ColumnKind::Regular { source_column } = &mut self.kind {
            *source_column = Some(source.into());
        }
        self
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, ColumnKind::Calculated { .. })
    }

    pub fn expression(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Calculated { expression } => Some(expression),
            ColumnKind::Regular { .. } => None,
        }
    }

    pub fn expression_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            ColumnKind::Calculated { expression } => Some(expression),
            ColumnKind::Regular { .. } => None,
        }
    }

    pub fn source_column(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Regular { source_column } => source_column.as_deref(),
            ColumnKind::Calculated { .. } => None,
        }
    }
}

impl Named for Column {
    const KIND: EntityKind = EntityKind::Column;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Column {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// A drill-down hierarchy over columns of its own table.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    name: String,
    pub levels: Vec<Level>,
}

/// One level of a hierarchy, bound to a column of the owning table.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    pub column: String,
}

impl Hierarchy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: Vec::new(),
        }
    }

    pub fn with_level(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.levels.push(Level {
            name: name.into(),
            column: column.into(),
        });
        self
    }
}

impl Named for Hierarchy {
    const KIND: EntityKind = EntityKind::Hierarchy;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Hierarchy {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// A partition: the source of a table's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    name: String,
    pub mode: PartitionMode,
    /// Source query (M for import/directQuery, a formula for calculated).
    pub source: String,
}

impl Partition {
    pub fn new(name: impl Into<String>, mode: PartitionMode, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode,
            source: source.into(),
        }
    }
}

impl Named for Partition {
    const KIND: EntityKind = EntityKind::Partition;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Partition {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
