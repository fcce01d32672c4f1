//! Root document resolution and graceful degradation.

use std::fs;

use tmdl::config::LayoutSettings;
use tmdl::loader::{load_with, resolve_document, LoadWarning};
use tmdl::EntityKind;

fn layout() -> LayoutSettings {
    LayoutSettings::default()
}

#[test]
fn test_folder_with_root_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.tmdl"), "model Direct\n").unwrap();

    let outcome = load_with(dir.path(), &layout());
    assert_eq!(outcome.database.name, "Direct");
    assert_eq!(outcome.document, Some(dir.path().join("model.tmdl")));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_definition_subfolder_is_probed() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("definition");
    fs::create_dir(&definition).unwrap();
    fs::write(definition.join("model.tmdl"), "model Nested\n").unwrap();

    let outcome = load_with(dir.path(), &layout());
    assert_eq!(outcome.database.name, "Nested");
    assert_eq!(outcome.document, Some(definition.join("model.tmdl")));
}

#[test]
fn test_root_document_wins_over_definition() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("definition")).unwrap();
    fs::write(dir.path().join("definition/model.tmdl"), "model Nested\n").unwrap();
    fs::write(dir.path().join("model.tmdl"), "model Top\n").unwrap();

    assert_eq!(
        resolve_document(dir.path(), &layout()),
        Some(dir.path().join("model.tmdl"))
    );
}

#[test]
fn test_document_path_directly() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("finance.tmdl");
    fs::write(&file, "table T\n{\n}\n").unwrap();

    let outcome = load_with(&file, &layout());
    // No model line: the file stem names the model.
    assert_eq!(outcome.database.name, "finance");
    assert_eq!(outcome.database.model.tables.len(), 1);
}

#[test]
fn test_empty_folder_gives_empty_model() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("Empty Model");
    fs::create_dir(&folder).unwrap();

    let outcome = load_with(&folder, &layout());
    assert_eq!(outcome.database.name, "Empty Model");
    assert!(outcome.database.model.tables.is_empty());
    assert!(outcome.document.is_none());
    assert!(matches!(
        outcome.warnings.as_slice(),
        [LoadWarning::RootDocumentMissing { .. }]
    ));
}

#[test]
fn test_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = load_with(&dir.path().join("nope"), &layout());
    assert_eq!(outcome.database.name, "nope");
    assert!(matches!(
        outcome.warnings.as_slice(),
        [LoadWarning::PathNotFound { .. }]
    ));
}

#[test]
fn test_custom_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("def")).unwrap();
    fs::write(dir.path().join("def/root.tmdl"), "model Custom\n").unwrap();

    let custom = LayoutSettings {
        root_document: "root.tmdl".to_string(),
        definition_dir: "def".to_string(),
    };
    assert_eq!(load_with(dir.path(), &custom).database.name, "Custom");
    assert_eq!(resolve_document(dir.path(), &layout()), None);
}

#[test]
fn test_warning_serializes_with_warning_tag() {
    let warning = LoadWarning::Malformed {
        line: 4,
        message: "bad column".to_string(),
    };
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["warning"], "malformed");
    assert_eq!(json["line"], 4);

    let duplicate = LoadWarning::Duplicate {
        line: 7,
        kind: EntityKind::Column,
        name: "Amount".to_string(),
    };
    let json = serde_json::to_value(&duplicate).unwrap();
    assert_eq!(json["warning"], "duplicate");
    assert_eq!(json["kind"], "column");
    assert_eq!(json["name"], "Amount");
}
