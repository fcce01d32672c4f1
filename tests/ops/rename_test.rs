//! Path-level rename: rewriting formulas across the whole model and
//! leaving the document untouched on failure.

use std::fs;
use std::path::Path;

use tmdl::config::Settings;
use tmdl::model::Named;
use tmdl::ops;
use tmdl::refactor::{ObjectKind, RenameRequest};
use tmdl::TmdlError;

const MODEL: &str = "\
model Retail

table Sales
{
\tcolumn Amount: decimal = amount
\tcolumn CustomerKey: int64 = customer_key
\tcolumn Net: decimal = { Sales[Amount] * 0.8 }
\tmeasure 'Total' = { SUM(Sales[Amount]) }
\tmeasure 'Doubled' = { [Total] * 2 + Sales[Total] }
\thierarchy ByAmount
\t\tlevel Amount: Amount
}

table Customer
{
\tcolumn CustomerKey: int64
\tcolumn Amount: decimal
\tmeasure 'Customer Sales' = { CALCULATE([Total], 'Sales'[CustomerKey] > 0) + SUM(Customer[Amount]) }
}

relationship Sales_Customer: Sales[CustomerKey] -> Customer[CustomerKey]
";

fn write_model(dir: &Path) {
    fs::write(dir.join("model.tmdl"), MODEL).unwrap();
}

fn read_model(dir: &Path) -> String {
    fs::read_to_string(dir.join("model.tmdl")).unwrap()
}

#[test]
fn test_rename_table_rewrites_all_qualifiers() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let report = ops::rename(
        dir.path(),
        &RenameRequest::table("Sales", "Orders"),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(report.relationship_endpoints, 1);

    let text = read_model(dir.path());
    assert!(text.contains("table Orders\n"));
    assert!(text.contains("column Net: decimal = { Orders[Amount] * 0.8 }"));
    assert!(text.contains("{ [Total] * 2 + Orders[Total] }"));
    // Quoting of the original qualifier is preserved.
    assert!(text.contains("CALCULATE([Total], 'Orders'[CustomerKey] > 0)"));
    assert!(text.contains("relationship Sales_Customer: Orders[CustomerKey] -> Customer[CustomerKey]"));
    assert!(!text.contains("Sales["));
}

#[test]
fn test_rename_column_only_touches_its_table() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let report = ops::rename(
        dir.path(),
        &RenameRequest::column("Sales", "Amount", "Gross Amount"),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(report.formulas_rewritten, 2);
    assert_eq!(report.hierarchy_levels, 1);

    let db = ops::load(dir.path(), &Settings::default()).database;
    let sales = db.model.tables.get("Sales").unwrap();
    assert_eq!(sales.columns.names(), vec!["Gross Amount", "CustomerKey", "Net"]);
    assert_eq!(sales.columns.get("Net").unwrap().expression(), Some("Sales[Gross Amount] * 0.8"));
    assert_eq!(sales.hierarchies.get("ByAmount").unwrap().levels[0].column, "Gross Amount");

    // Customer[Amount] is a different column.
    let customer = db.model.tables.get("Customer").unwrap();
    assert!(customer.measures.get("Customer Sales").unwrap().expression.contains("SUM(Customer[Amount])"));
}

#[test]
fn test_rename_relationship_column() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let report = ops::rename(
        dir.path(),
        &RenameRequest::column("customer", "customerkey", "Key"),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(report.relationship_endpoints, 1);

    let db = ops::load(dir.path(), &Settings::default()).database;
    let relationship = db.model.relationships.get("Sales_Customer").unwrap();
    assert_eq!(relationship.to.column, "Key");
    assert_eq!(relationship.from.column, "CustomerKey");
}

#[test]
fn test_rename_measure_rewrites_bare_and_qualified() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let report = ops::rename(
        dir.path(),
        &RenameRequest::measure("Sales", "Total", "Revenue"),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(report.kind, ObjectKind::Measure);
    assert_eq!(report.formulas_rewritten, 2);

    let text = read_model(dir.path());
    assert!(text.contains("measure 'Revenue' = { SUM(Sales[Amount]) }"));
    assert!(text.contains("{ [Revenue] * 2 + Sales[Revenue] }"));
    assert!(text.contains("CALCULATE([Revenue], 'Sales'[CustomerKey] > 0)"));
}

#[test]
fn test_rewrites_respect_identifier_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("model.tmdl"),
        "\
model Boundaries

table Sales
{
\tcolumn A: int64
\tmeasure 'Total' = { SUM(Sales[A]) }
\tmeasure 'Total Sales' = { SUM(MySales[A]) }
\tmeasure 'Mix' = { MySales[A] + Sales2[A] + [Total Sales] + [Total] + Sales[A] }
}

table MySales
{
\tcolumn A: int64
}

table Sales2
{
\tcolumn A: int64
}
",
    )
    .unwrap();

    ops::rename(dir.path(), &RenameRequest::table("Sales", "Orders"), &Settings::default()).unwrap();
    ops::rename(
        dir.path(),
        &RenameRequest::measure("Orders", "Total", "T2"),
        &Settings::default(),
    )
    .unwrap();

    let text = read_model(dir.path());
    assert!(text.contains("{ MySales[A] + Sales2[A] + [Total Sales] + [T2] + Orders[A] }"));
    assert!(text.contains("{ SUM(MySales[A]) }"));
    assert!(text.contains("table MySales\n"));
    assert!(text.contains("table Sales2\n"));
}

#[test]
fn test_conflict_leaves_document_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let err = ops::rename(
        dir.path(),
        &RenameRequest::table("Sales", "customer"),
        &Settings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TmdlError::Conflict(_)));
    assert_eq!(read_model(dir.path()), MODEL);
}

#[test]
fn test_missing_entity_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let err = ops::rename(
        dir.path(),
        &RenameRequest::measure("Sales", "Ghost", "Other"),
        &Settings::default(),
    )
    .unwrap_err();
    assert_eq!(err.category(), "not_found");
    assert_eq!(err.to_string(), "measure 'Ghost' not found in table 'Sales'");
    assert_eq!(read_model(dir.path()), MODEL);
}

#[test]
fn test_same_name_rewrites_canonically() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("model.tmdl"),
        "model M\ntable T\n{\n    column A\n}\n",
    )
    .unwrap();

    let report = ops::rename(dir.path(), &RenameRequest::table("T", "T"), &Settings::default()).unwrap();
    assert_eq!(report.formulas_rewritten, 0);
    assert_eq!(read_model(dir.path()), "model M\n\ntable T\n{\n\tcolumn A\n}\n");
}

#[test]
fn test_column_rename_requires_table() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let request = RenameRequest {
        kind: ObjectKind::Column,
        table: None,
        old_name: "Amount".to_string(),
        new_name: "Value".to_string(),
    };
    let err = ops::rename(dir.path(), &request, &Settings::default()).unwrap_err();
    assert!(matches!(err, TmdlError::Malformed(_)));
}

#[test]
fn test_object_kind_parsing() {
    assert_eq!(" Column ".parse::<ObjectKind>().unwrap(), ObjectKind::Column);
    assert_eq!("MEASURE".parse::<ObjectKind>().unwrap(), ObjectKind::Measure);
    assert!("hierarchy".parse::<ObjectKind>().is_err());
}

#[test]
fn test_renamed_table_keeps_members() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    ops::rename(dir.path(), &RenameRequest::table("Customer", "Client"), &Settings::default()).unwrap();

    let db = ops::load(dir.path(), &Settings::default()).database;
    let client = db.model.tables.get("Client").unwrap();
    assert_eq!(client.name(), "Client");
    assert_eq!(client.columns.len(), 2);
    assert_eq!(client.measures.names(), vec!["Customer Sales"]);
}
