//! Declarative model blueprints for [`create`](super::create).
//!
//! ```toml
//! name = "Sales"
//!
//! [[tables]]
//! name = "Sales"
//! columns = [
//!     { name = "Amount", data_type = "decimal", source_column = "amount" },
//!     { name = "Net", data_type = "decimal", expression = "Sales[Amount] * 0.8" },
//! ]
//! measures = [{ name = "Total", expression = "SUM(Sales[Amount])", format_string = "#,0" }]
//! partitions = [{ name = "Sales", mode = "import", source = "SELECT * FROM sales" }]
//!
//! [[relationships]]
//! name = "Sales_Date"
//! from = { table = "Sales", column = "DateKey" }
//! to = { table = "Date", column = "DateKey" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TmdlError, TmdlResult};
use crate::model::{
    Column, ColumnRef, CrossFilter, DataType, Hierarchy, Measure, ModelResult, Partition,
    PartitionMode, Relationship, Table,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Blueprint {
    /// Model name used when no model exists yet at the destination.
    pub name: Option<String>,
    pub tables: Vec<TableBlueprint>,
    pub relationships: Vec<RelationshipBlueprint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableBlueprint {
    pub name: String,
    pub columns: Vec<ColumnBlueprint>,
    pub measures: Vec<MeasureBlueprint>,
    pub hierarchies: Vec<HierarchyBlueprint>,
    pub partitions: Vec<PartitionBlueprint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColumnBlueprint {
    pub name: String,
    #[serde(default)]
    pub data_type: DataType,
    /// Makes the column regular.
    pub source_column: Option<String>,
    /// Makes the column calculated. Wins over `source_column`.
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeasureBlueprint {
    pub name: String,
    pub expression: String,
    pub format_string: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HierarchyBlueprint {
    pub name: String,
    #[serde(default)]
    pub levels: Vec<LevelBlueprint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LevelBlueprint {
    pub name: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PartitionBlueprint {
    pub name: String,
    #[serde(default)]
    pub mode: PartitionMode,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RelationshipBlueprint {
    pub name: String,
    pub from: ColumnRef,
    pub to: ColumnRef,
    #[serde(default)]
    pub cross_filter: CrossFilter,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Blueprint {
    pub fn from_toml_str(text: &str) -> TmdlResult<Self> {
        toml::from_str(text).map_err(|e| TmdlError::Malformed(format!("blueprint: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> TmdlResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TmdlError::NotFound(format!(
                "blueprint '{}' does not exist",
                path.display()
            )));
        }
        let text = fs::read_to_string(path).map_err(|e| TmdlError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}

impl TableBlueprint {
    /// The table with its columns, hierarchies and partitions. Measures are
    /// added in a separate step.
    pub fn build(&self) -> ModelResult<Table> {
        let mut table = Table::new(self.name.trim());
        for column in &self.columns {
            table.columns.add(column.build())?;
        }
        for hierarchy in &self.hierarchies {
            let built = hierarchy
                .levels
                .iter()
                .fold(Hierarchy::new(&hierarchy.name), |h, level| {
                    h.with_level(&level.name, &level.column)
                });
            table.hierarchies.add(built)?;
        }
        for partition in &self.partitions {
            table.partitions.add(Partition::new(
                &partition.name,
                partition.mode,
                &partition.source,
            ))?;
        }
        Ok(table)
    }
}

impl ColumnBlueprint {
    pub fn build(&self) -> Column {
        match (&self.expression, &self.source_column) {
            (Some(expression), _) => Column::calculated(&self.name, self.data_type, expression),
            (None, Some(source)) => {
                Column::regular(&self.name, self.data_type).with_source_column(source)
            }
            (None, None) => Column::regular(&self.name, self.data_type),
        }
    }
}

impl MeasureBlueprint {
    pub fn build(&self) -> Measure {
        let mut measure = Measure::new(&self.name, &self.expression);
        measure.format_string = self.format_string.clone();
        measure.description = self.description.clone();
        measure
    }
}

impl RelationshipBlueprint {
    pub fn build(&self) -> Relationship {
        let relationship = Relationship::new(&self.name, self.from.clone(), self.to.clone())
            .with_cross_filter(self.cross_filter);
        if self.active {
            relationship
        } else {
            relationship.inactive()
        }
    }
}
