//! Model graph → canonical TMDL text.
//!
//! Output is a pure function of the graph: entities are written in their
//! current collection order using one fixed template per entity kind.
//! Sorting is the formatter's job, not the emitter's.

pub mod format;
mod relationship;
mod table;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::LayoutSettings;
use crate::error::{TmdlError, TmdlResult};
use crate::model::Database;

use format::{quote_name, Indent, IndentWriter};

pub use relationship::emit_relationship;
pub use table::emit_table;

/// Serialize a database to a single TMDL document.
///
/// ```text
/// model Sales
///
/// table Customer
/// {
///     ...
/// }
///
/// relationship ...
/// ```
#[must_use]
pub fn to_tmdl(db: &Database, indent: Indent) -> String {
    let mut w = IndentWriter::new(indent);
    w.write_line(&format!("model {}", quote_name(&db.model.name)));

    for table in &db.model.tables {
        w.blank_line();
        emit_table(&mut w, table);
    }

    if !db.model.relationships.is_empty() {
        w.blank_line();
        for relationship in &db.model.relationships {
            emit_relationship(&mut w, relationship);
        }
    }

    w.into_string()
}

/// Where a save to `path` lands: a `.tmdl` path is the document itself,
/// anything else is a folder receiving the root document.
#[must_use]
pub fn document_path(path: &Path, layout: &LayoutSettings) -> PathBuf {
    let is_document = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tmdl"));
    if is_document {
        path.to_path_buf()
    } else {
        path.join(&layout.root_document)
    }
}

/// Save with the default layout and tab indentation.
///
/// Returns the path of the written document.
pub fn save(db: &Database, path: impl AsRef<Path>) -> TmdlResult<PathBuf> {
    save_with(db, path.as_ref(), &LayoutSettings::default(), Indent::default())
}

/// Save to `path`, creating the destination folder when needed.
pub fn save_with(
    db: &Database,
    path: &Path,
    layout: &LayoutSettings,
    indent: Indent,
) -> TmdlResult<PathBuf> {
    let document = document_path(path, layout);
    let text = to_tmdl(db, indent);
    write_atomic(&document, &text)?;

    info!(
        path = %document.display(),
        tables = db.model.tables.len(),
        relationships = db.model.relationships.len(),
        "saved model"
    );
    Ok(document)
}

/// Write through a sibling temporary file so readers never observe a
/// partially written document.
fn write_atomic(document: &Path, text: &str) -> TmdlResult<()> {
    let parent = match document.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| TmdlError::io(&parent, e))?;

    let file_name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.tmdl".to_string());
    let tmp = parent.join(format!(".{}.tmp", file_name));

    debug!(tmp = %tmp.display(), "writing temporary document");
    let mut file = fs::File::create(&tmp).map_err(|e| TmdlError::io(&tmp, e))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| TmdlError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, document).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        TmdlError::io(document, e)
    })
}
