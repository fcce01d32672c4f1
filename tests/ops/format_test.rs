//! Canonical ordering and idempotence of `format`.

use std::fs;

use tmdl::config::Settings;
use tmdl::ops;

const UNSORTED: &str = "\
model Shop

table Zeta
{
\tcolumn b: string
\tcolumn A: string
\tmeasure 'z' = { 1 }
\tmeasure 'Y' = { 2 }
\tpartition p2 = import
\t\tsource = { two }
\tpartition p1 = import
\t\tsource = { one }
}

table Alpha
{
\tcolumn Id: int64
\thierarchy Second
\t\tlevel Id: Id
\thierarchy first
\t\tlevel Id: Id
}

relationship z_rel: Zeta[A] -> Alpha[Id]
relationship a_rel: Zeta[b] -> Alpha[Id]
\tinactive
";

const SORTED: &str = "\
model Shop

table Alpha
{
\tcolumn Id: int64
\thierarchy first
\t\tlevel Id: Id
\thierarchy Second
\t\tlevel Id: Id
}

table Zeta
{
\tcolumn A: string
\tcolumn b: string
\tmeasure 'Y' = { 2 }
\tmeasure 'z' = { 1 }
\tpartition p2 = import
\t\tsource = { two }
\tpartition p1 = import
\t\tsource = { one }
}

relationship a_rel: Zeta[b] -> Alpha[Id]
\tinactive
relationship z_rel: Zeta[A] -> Alpha[Id]
";

#[test]
fn test_format_sorts_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.tmdl"), UNSORTED).unwrap();

    let report = ops::format(dir.path(), &Settings::default()).unwrap();
    assert!(report.changed);
    assert_eq!(report.tables, 2);
    assert_eq!(report.relationships, 2);
    assert_eq!(report.document, dir.path().join("model.tmdl"));

    let text = fs::read_to_string(dir.path().join("model.tmdl")).unwrap();
    assert_eq!(text, SORTED);
}

#[test]
fn test_format_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.tmdl"), UNSORTED).unwrap();

    ops::format(dir.path(), &Settings::default()).unwrap();
    let once = fs::read_to_string(dir.path().join("model.tmdl")).unwrap();

    let report = ops::format(dir.path(), &Settings::default()).unwrap();
    let twice = fs::read_to_string(dir.path().join("model.tmdl")).unwrap();

    assert!(!report.changed);
    assert_eq!(once, twice);
}

#[test]
fn test_format_writes_to_definition_document() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("definition");
    fs::create_dir(&definition).unwrap();
    fs::write(definition.join("model.tmdl"), UNSORTED).unwrap();

    let report = ops::format(dir.path(), &Settings::default()).unwrap();
    assert_eq!(report.document, definition.join("model.tmdl"));
    assert!(!dir.path().join("model.tmdl").exists());
}

#[test]
fn test_format_uses_configured_indent() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.tmdl"), UNSORTED).unwrap();

    let settings: Settings = toml::from_str("[format]\nindent = 2\n").unwrap();
    ops::format(dir.path(), &settings).unwrap();

    let text = fs::read_to_string(dir.path().join("model.tmdl")).unwrap();
    insta::assert_snapshot!(text.lines().take(9).collect::<Vec<_>>().join("\n"), @r"
    model Shop

    table Alpha
    {
      column Id: int64
      hierarchy first
        level Id: Id
      hierarchy Second
        level Id: Id
    ");
}
