//! Creating and extending models from blueprints.

use std::cell::RefCell;
use std::fs;

use tmdl::config::Settings;
use tmdl::model::Named;
use tmdl::ops::{self, Blueprint};
use tmdl::progress::{NoProgress, ProgressUpdate};
use tmdl::{PartitionMode, TmdlError};
use tokio_util::sync::CancellationToken;

const BLUEPRINT: &str = r##"
name = "Finance"

[[tables]]
name = "GL"
columns = [
    { name = "AccountKey", data_type = "int64", source_column = "account_key" },
    { name = "Amount", data_type = "decimal", source_column = "amount" },
]
measures = [
    { name = "Balance", expression = "SUM(GL[Amount])", format_string = "#,0.00" },
]
partitions = [{ name = "GL", mode = "directQuery", source = "SELECT * FROM gl" }]

[[tables]]
name = "Account"
columns = [{ name = "AccountKey", data_type = "int64" }]
hierarchies = [{ name = "Chart", levels = [{ name = "Key", column = "AccountKey" }] }]

[[relationships]]
name = "GL_Account"
from = { table = "GL", column = "AccountKey" }
to = { table = "Account", column = "AccountKey" }

[[relationships]]
name = "GL_Ghost"
from = { table = "GL", column = "AccountKey" }
to = { table = "Ghost", column = "Key" }
"##;

fn blueprint() -> Blueprint {
    Blueprint::from_toml_str(BLUEPRINT).unwrap()
}

#[test]
fn test_create_new_model() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("finance");

    let report = ops::create(
        &target,
        &blueprint(),
        &Settings::default(),
        &NoProgress,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(report.model, "Finance");
    assert_eq!(report.tables_created, vec!["GL", "Account"]);
    assert_eq!(report.relationships_created, vec!["GL_Account"]);
    assert_eq!(report.relationships_skipped, vec!["GL_Ghost"]);
    assert_eq!(report.measures_created, vec!["GL[Balance]"]);
    assert!(report.persisted());
    assert!(!report.cancelled);
    assert_eq!(report.document, Some(target.join("model.tmdl")));

    let outcome = ops::load(&target, &Settings::default());
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    let model = outcome.database.model;
    assert_eq!(model.name, "Finance");
    let gl = model.tables.get("GL").unwrap();
    assert_eq!(gl.measures.get("Balance").unwrap().format_string.as_deref(), Some("#,0.00"));
    assert_eq!(gl.partitions.get("GL").unwrap().mode, PartitionMode::DirectQuery);
    assert_eq!(model.relationships.names(), vec!["GL_Account"]);
}

#[test]
fn test_create_preserves_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("model.tmdl"),
        "\
model Existing

table GL
{
\tcolumn Amount: decimal
\tmeasure 'Balance' = { 42 }
}
",
    )
    .unwrap();

    let report = ops::create(
        dir.path(),
        &blueprint(),
        &Settings::default(),
        &NoProgress,
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(report.model, "Existing");
    assert_eq!(report.tables_created, vec!["Account"]);
    assert_eq!(report.tables_skipped, vec!["GL"]);
    assert_eq!(report.measures_skipped, vec!["GL[Balance]"]);
    // The existing GL table has no AccountKey column.
    assert_eq!(report.relationships_skipped, vec!["GL_Account", "GL_Ghost"]);

    let db = ops::load(dir.path(), &Settings::default()).database;
    assert_eq!(db.model.tables.names(), vec!["GL", "Account"]);
    let gl = db.model.tables.get("GL").unwrap();
    assert_eq!(gl.measures.get("Balance").unwrap().expression, "42");
    assert_eq!(gl.columns.len(), 1);
}

#[test]
fn test_create_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let seen = RefCell::new(Vec::new());
    let sink = |update: ProgressUpdate| seen.borrow_mut().push(update);

    let report = ops::create(
        dir.path().join("m"),
        &blueprint(),
        &Settings::default(),
        &sink,
        &CancellationToken::new(),
    )
    .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), report.completed_steps);
    assert_eq!(seen[0].message, "Starting creation of model 'Finance'");
    assert!(seen.iter().enumerate().all(|(i, u)| u.ordinal == i + 1));
    assert!(seen.last().unwrap().message.starts_with("Model saved to "));
}

#[test]
fn test_cancelled_create_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("m");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = ops::create(&target, &blueprint(), &Settings::default(), &NoProgress, &cancel)
        .unwrap();

    assert!(report.cancelled);
    assert!(!report.persisted());
    assert_eq!(report.completed_steps, 1);
    assert!(report.tables_created.is_empty());
    assert!(!target.exists());
}

#[test]
fn test_inconsistent_blueprint_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let blueprint = Blueprint::from_toml_str(
        r#"
[[tables]]
name = "T"
columns = [{ name = "A" }, { name = "a" }]
"#,
    )
    .unwrap();

    let err = ops::create(
        dir.path().join("m"),
        &blueprint,
        &Settings::default(),
        &NoProgress,
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, TmdlError::Conflict(_)));
    assert!(!dir.path().join("m").exists());
}

#[test]
fn test_unreadable_blueprint() {
    let err = Blueprint::from_toml_str("tables = 3").unwrap_err();
    assert_eq!(err.category(), "malformed");

    let err = Blueprint::from_file("/nonexistent/blueprint.toml").unwrap_err();
    assert_eq!(err.category(), "not_found");
}
