//! Integration tests for name-keyed collections.

use tmdl::model::{compare_names, names_equal, ModelError, Named, NamedCollection};
use tmdl::{Column, DataType, EntityKind, Measure, Table};

#[test]
fn test_lookup_ignores_case() {
    let mut columns: NamedCollection<Column> = NamedCollection::new("table 'Sales'");
    columns.add(Column::regular("Amount", DataType::Decimal)).unwrap();

    assert!(columns.contains("amount"));
    assert!(columns.contains("AMOUNT"));
    assert_eq!(columns.get("aMoUnT").unwrap().name(), "Amount");
    assert_eq!(columns.position("amount"), Some(0));
}

#[test]
fn test_duplicate_rejected_and_first_kept() {
    let mut measures: NamedCollection<Measure> = NamedCollection::new("table 'Sales'");
    measures.add(Measure::new("Total", "SUM(Sales[Amount])")).unwrap();

    let err = measures.add(Measure::new("TOTAL", "0")).unwrap_err();
    assert_eq!(
        err,
        ModelError::DuplicateName {
            kind: EntityKind::Measure,
            name: "TOTAL".to_string(),
            scope: "table 'Sales'".to_string(),
        }
    );
    assert_eq!(err.to_string(), "measure 'TOTAL' already exists in table 'Sales'");
    assert_eq!(measures.len(), 1);
    assert_eq!(measures.get("total").unwrap().expression, "SUM(Sales[Amount])");
}

#[test]
fn test_require_reports_scope() {
    let tables: NamedCollection<Table> = NamedCollection::new("model");
    let err = tables.require("Sales").unwrap_err();
    assert_eq!(err.to_string(), "table 'Sales' not found in model");
}

#[test]
fn test_insertion_order_until_sorted() {
    let mut tables: NamedCollection<Table> = NamedCollection::new("model");
    for name in ["sales", "Date", "Customer", "account"] {
        tables.add(Table::new(name)).unwrap();
    }
    assert_eq!(tables.names(), vec!["sales", "Date", "Customer", "account"]);

    tables.sort_by_name();
    assert_eq!(tables.names(), vec!["account", "Customer", "Date", "sales"]);
}

#[test]
fn test_remove() {
    let mut tables: NamedCollection<Table> = NamedCollection::new("model");
    tables.add(Table::new("Sales")).unwrap();
    tables.add(Table::new("Date")).unwrap();

    let removed = tables.remove("SALES").unwrap();
    assert_eq!(removed.name(), "Sales");
    assert_eq!(tables.names(), vec!["Date"]);
    assert!(matches!(
        tables.remove("Sales"),
        Err(ModelError::NotFound { .. })
    ));
}

#[test]
fn test_check_rename() {
    let mut tables: NamedCollection<Table> = NamedCollection::new("model");
    tables.add(Table::new("Sales")).unwrap();
    tables.add(Table::new("Date")).unwrap();

    assert_eq!(tables.check_rename("sales", "Orders").unwrap(), 0);
    // Changing only the casing of its own name is allowed.
    assert_eq!(tables.check_rename("Sales", "SALES").unwrap(), 0);
    assert!(matches!(
        tables.check_rename("Sales", "date"),
        Err(ModelError::DuplicateName { .. })
    ));
    assert!(matches!(
        tables.check_rename("Ghost", "Other"),
        Err(ModelError::NotFound { .. })
    ));
}

#[test]
fn test_name_helpers() {
    assert!(names_equal("Ärger", "ärger"));
    assert!(!names_equal("Sales", "Sale"));

    let mut names = vec!["b", "B", "a"];
    names.sort_by(|x, y| compare_names(x, y));
    assert_eq!(names, vec!["a", "B", "b"]);
}
