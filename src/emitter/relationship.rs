//! Relationship → TMDL emission.

use super::format::{quote_name, IndentWriter};
use crate::dax::{bracket_name, table_qualifier};
use crate::model::{ColumnRef, CrossFilter, Named, Relationship};

/// Emit a relationship. Default flags (one direction, active) are omitted.
///
/// ```text
/// relationship Sales_Customer: Sales[CustomerKey] -> Customer[CustomerKey]
///     crossFilter: bothDirections
///     inactive
/// ```
pub fn emit_relationship(w: &mut IndentWriter, relationship: &Relationship) {
    w.write_line(&format!(
        "relationship {}: {} -> {}",
        quote_name(relationship.name()),
        endpoint(&relationship.from),
        endpoint(&relationship.to)
    ));

    w.indent();
    if relationship.cross_filter != CrossFilter::OneDirection {
        w.write_line(&format!("crossFilter: {}", relationship.cross_filter));
    }
    if !relationship.is_active {
        w.write_line("inactive");
    }
    w.dedent();
}

fn endpoint(column: &ColumnRef) -> String {
    format!(
        "{}[{}]",
        table_qualifier(&column.table, false),
        bracket_name(&column.column)
    )
}
