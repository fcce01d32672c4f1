//! Formula-text helpers.
//!
//! Formulas are kept as opaque text in the model graph. This module finds
//! the object references embedded in them and knows how to spell a name
//! back into formula syntax.

use std::sync::LazyLock;

use regex::Regex;

pub mod references;

pub use references::{
    column_references, extract_references, rewrite_references, ColumnKey, Edit, Reference,
};

/// Same word class the document scanner and the reference pattern accept
/// for unquoted names.
static BARE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Alphabetic}_]\w*$").unwrap());

/// Whether `name` can be written as a bare table qualifier (`Sales[...]`).
#[must_use]
pub fn is_bare_table_name(name: &str) -> bool {
    BARE_NAME.is_match(name)
}

/// Spell a table qualifier. Quoted when asked to, or when the name cannot
/// be written bare.
#[must_use]
pub fn table_qualifier(name: &str, quoted: bool) -> String {
    if quoted || !is_bare_table_name(name) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

/// Escape a name for use between brackets (`]` doubles).
#[must_use]
pub fn bracket_name(name: &str) -> String {
    name.replace(']', "]]")
}
