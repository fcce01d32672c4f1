//! Columns that no formula references.

use std::collections::BTreeSet;

use crate::dax::{column_references, ColumnKey};
use crate::model::{compare_names, Model, Named};

/// Every declared `Table[Column]` that no measure or calculated-column
/// formula references by qualified name, sorted case-insensitively.
pub fn unused_columns(model: &Model) -> Vec<String> {
    let used: BTreeSet<ColumnKey> = model
        .formulas()
        .into_iter()
        .flat_map(|(_, formula)| column_references(formula))
        .collect();

    let mut unused: Vec<String> = model
        .tables
        .iter()
        .flat_map(|table| {
            table
                .columns
                .iter()
                .map(move |column| (table.name(), column.name()))
        })
        .filter(|(table, column)| !used.contains(&ColumnKey::new(table, column)))
        .map(|(table, column)| format!("{}[{}]", table, column))
        .collect();

    unused.sort_by(|a, b| compare_names(a, b));
    unused
}
