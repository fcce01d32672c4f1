//! Table → TMDL emission.

use super::format::{always_quote_name, braced, quote_name, quote_text, IndentWriter};
use crate::model::{Column, ColumnKind, DataType, Hierarchy, Measure, Named, Partition, Table};

/// Emit a table block: columns, measures, hierarchies, partitions, in
/// collection order.
///
/// ```text
/// table Sales
/// {
///     column Amount: decimal = amount
///     measure 'Total' = { SUM(Sales[Amount]) }
/// }
/// ```
pub fn emit_table(w: &mut IndentWriter, table: &Table) {
    w.write_line(&format!("table {}", quote_name(table.name())));
    w.write_line("{");
    w.indent();

    for column in &table.columns {
        emit_column(w, column);
    }
    for measure in &table.measures {
        emit_measure(w, measure);
    }
    for hierarchy in &table.hierarchies {
        emit_hierarchy(w, hierarchy);
    }
    for partition in &table.partitions {
        emit_partition(w, partition);
    }

    w.dedent();
    w.write_line("}");
}

fn emit_column(w: &mut IndentWriter, column: &Column) {
    let mut line = format!("column {}", quote_name(column.name()));
    if column.data_type != DataType::Automatic {
        line.push_str(&format!(": {}", column.data_type));
    }
    match &column.kind {
        ColumnKind::Regular {
            source_column: Some(source),
        } => line.push_str(&format!(" = {}", quote_name(source))),
        ColumnKind::Regular {
            source_column: None,
        } => {}
        ColumnKind::Calculated { expression } => {
            line.push_str(&format!(" = {}", braced(expression)));
        }
    }
    w.write_line(&line);
}

fn emit_measure(w: &mut IndentWriter, measure: &Measure) {
    w.write_line(&format!(
        "measure {} = {}",
        always_quote_name(measure.name()),
        braced(&measure.expression)
    ));

    w.indent();
    if let Some(format_string) = &measure.format_string {
        w.write_line(&format!("formatString: {}", quote_text(format_string)));
    }
    if let Some(description) = &measure.description {
        w.write_line(&format!("description: {}", quote_text(description)));
    }
    w.dedent();
}

fn emit_hierarchy(w: &mut IndentWriter, hierarchy: &Hierarchy) {
    w.write_line(&format!("hierarchy {}", quote_name(hierarchy.name())));
    w.indent();
    for level in &hierarchy.levels {
        w.write_line(&format!(
            "level {}: {}",
            quote_name(&level.name),
            quote_name(&level.column)
        ));
    }
    w.dedent();
}

fn emit_partition(w: &mut IndentWriter, partition: &Partition) {
    w.write_line(&format!(
        "partition {} = {}",
        quote_name(partition.name()),
        partition.mode
    ));
    w.indent();
    w.write_line(&format!("source = {}", braced(&partition.source)));
    w.dedent();
}
