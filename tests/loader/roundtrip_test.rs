//! Load → save → load stability for canonical documents.

use std::fs;

use tmdl::config::LayoutSettings;
use tmdl::emitter::format::Indent;
use tmdl::emitter::{save_with, to_tmdl};
use tmdl::loader::{load_str, load_with};
use tmdl::model::Named;
use tmdl::{CrossFilter, PartitionMode};

const CANONICAL: &str = "\
model Retail

table Sales
{
\tcolumn Amount: decimal = amount
\tcolumn CustomerKey: int64 = customer_key
\tcolumn Net: decimal = { Sales[Amount] * 0.8 }
\tmeasure 'Total Sales' = { SUM(Sales[Amount]) }
\t\tformatString: \"#,0.00\"
\t\tdescription: \"All sales\"
\tmeasure 'Net Sales' = { SUMX(Sales, Sales[Net]) }
\tpartition Sales = import
\t\tsource = { SELECT * FROM sales }
}

table 'Customer Dim'
{
\tcolumn Key: int64
\tcolumn Region: string
\thierarchy Geography
\t\tlevel Region: Region
}

relationship Sales_Customer: Sales[CustomerKey] -> 'Customer Dim'[Key]
relationship Sales_Customer_Alt: Sales[CustomerKey] -> 'Customer Dim'[Key]
\tcrossFilter: bothDirections
\tinactive
";

#[test]
fn test_canonical_document_is_a_fixed_point() {
    let outcome = load_str(CANONICAL, "fallback");
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(to_tmdl(&outcome.database, Indent::Tabs), CANONICAL);
}

#[test]
fn test_loaded_graph() {
    let db = load_str(CANONICAL, "fallback").database;
    assert_eq!(db.model.name, "Retail");
    assert_eq!(db.model.tables.names(), vec!["Sales", "Customer Dim"]);

    let sales = db.model.tables.get("sales").unwrap();
    let total = sales.measures.get("total sales").unwrap();
    assert_eq!(total.expression, "SUM(Sales[Amount])");
    assert_eq!(total.format_string.as_deref(), Some("#,0.00"));
    assert_eq!(total.description.as_deref(), Some("All sales"));
    assert_eq!(
        sales.partitions.get("Sales").unwrap().mode,
        PartitionMode::Import
    );

    let alt = db.model.relationships.get("Sales_Customer_Alt").unwrap();
    assert_eq!(alt.to.table, "Customer Dim");
    assert_eq!(alt.cross_filter, CrossFilter::BothDirections);
    assert!(!alt.is_active);
    assert!(db.model.relationships.get("Sales_Customer").unwrap().is_active);
}

#[test]
fn test_save_then_load_preserves_graph() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_str(CANONICAL, "fallback").database;

    let written = save_with(&db, dir.path(), &LayoutSettings::default(), Indent::Spaces(2)).unwrap();
    assert_eq!(written, dir.path().join("model.tmdl"));
    assert!(fs::read_to_string(&written).unwrap().contains("\n  column Amount"));

    let reloaded = load_with(dir.path(), &LayoutSettings::default());
    assert!(reloaded.warnings.is_empty(), "{:?}", reloaded.warnings);
    assert_eq!(reloaded.document.as_deref(), Some(written.as_path()));
    assert_eq!(reloaded.database, db);
}

#[test]
fn test_no_temporary_file_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let db = load_str(CANONICAL, "fallback").database;
    save_with(&db, dir.path(), &LayoutSettings::default(), Indent::Tabs).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["model.tmdl".to_string()]);
}

#[test]
fn test_names_needing_quotes_survive() {
    let text = "\
model 'It''s a model'

table 'O''Brien Sales'
{
\tcolumn 'Unit Price': decimal
\tmeasure 'Avg ''Price''' = { AVERAGE('O''Brien Sales'[Unit Price]) }
}
";
    let outcome = load_str(text, "x");
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

    let db = &outcome.database;
    assert_eq!(db.model.name, "It's a model");
    let table = db.model.tables.get("O'Brien Sales").unwrap();
    assert_eq!(table.name(), "O'Brien Sales");
    assert!(table.measures.contains("Avg 'Price'"));
    assert_eq!(to_tmdl(db, Indent::Tabs), text);
}

#[test]
fn test_names_outside_the_word_class_are_quoted() {
    let outcome = load_str("model M\n\ntable 'x²'\n{\n\tcolumn 'n²': int64\n}\n", "x");
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

    let text = to_tmdl(&outcome.database, Indent::Tabs);
    assert!(text.contains("table 'x²'\n"), "{}", text);

    let reloaded = load_str(&text, "x").database;
    assert_eq!(reloaded.model.tables.names(), vec!["x²"]);
    assert!(reloaded.model.tables.get("x²").unwrap().columns.contains("n²"));
}
