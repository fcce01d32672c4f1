//! Canonical ordering.

use tracing::debug;

use crate::model::Database;

/// Sort tables, relationships and each table's columns, measures and
/// hierarchies by case-insensitive name. Partitions keep their order.
///
/// Sorting is stable and the ordering total, so a second call is a no-op.
pub fn format_model(db: &mut Database) {
    let model = &mut db.model;
    model.tables.sort_by_name();
    model.relationships.sort_by_name();

    for table in &mut model.tables {
        table.columns.sort_by_name();
        table.measures.sort_by_name();
        table.hierarchies.sort_by_name();
    }

    debug!(model = %model.name, "sorted model collections");
}
