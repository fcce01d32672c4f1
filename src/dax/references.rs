//! Lexical extraction of bracketed object references from formula text.
//!
//! Recognized forms:
//!
//! - `Sales[Amount]` and `'Sales Orders'[Amount]`: a column (or a
//!   table-qualified measure);
//! - `[Total Sales]`: an unqualified reference, normally a measure.
//!
//! Escapes are decoded (`''` inside quoted table names, `]]` inside
//! brackets) and names are trimmed. Anything inside a double-quoted string
//! literal is ignored.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Optional quoted or bare table, immediately followed by a bracketed name.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:'(?P<qtable>(?:[^']|'')+)'|(?P<table>\w+))?\[(?P<name>(?:[^\]]|\]\])+)\]",
    )
    .unwrap()
});

/// A reference found in a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Decoded, trimmed table qualifier.
    pub table: Option<String>,
    /// Whether the qualifier was written in single quotes.
    pub table_quoted: bool,
    /// Byte range of the qualifier, quotes included.
    pub table_span: Option<Range<usize>>,
    /// Decoded, trimmed bracketed name.
    pub name: String,
    /// Byte range between the brackets.
    pub name_span: Range<usize>,
    /// Byte range of the whole reference.
    pub span: Range<usize>,
}

impl Reference {
    pub fn is_qualified(&self) -> bool {
        self.table.is_some()
    }
}

/// A text replacement produced while rewriting references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

/// Case-folded `(table, column)` key for set membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub table: String,
    pub column: String,
}

impl ColumnKey {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.trim().to_lowercase(),
            column: column.trim().to_lowercase(),
        }
    }
}

/// Extract every reference, qualified or not, in source order.
pub fn extract_references(formula: &str) -> Vec<Reference> {
    let masked = mask_string_literals(formula);

    let mut refs = Vec::new();
    for caps in REFERENCE_PATTERN.captures_iter(&masked) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };

        let (table, table_quoted, table_span) = if let Some(q) = caps.name("qtable") {
            (
                Some(formula[q.range()].replace("''", "'").trim().to_string()),
                true,
                Some(q.start() - 1..q.end() + 1),
            )
        } else if let Some(t) = caps.name("table") {
            (Some(formula[t.range()].to_string()), false, Some(t.range()))
        } else {
            (None, false, None)
        };

        refs.push(Reference {
            table,
            table_quoted,
            table_span,
            name: formula[name.range()].replace("]]", "]").trim().to_string(),
            name_span: name.range(),
            span: whole.range(),
        });
    }
    refs
}

/// The set of qualified `(table, column)` references in a formula.
pub fn column_references(formula: &str) -> BTreeSet<ColumnKey> {
    extract_references(formula)
        .into_iter()
        .filter_map(|r| r.table.map(|t| ColumnKey::new(&t, &r.name)))
        .collect()
}

/// Rewrite references in `formula`.
///
/// `edit` is called once per reference and may return a replacement for a
/// range inside that reference. Returns `None` when nothing changed.
pub fn rewrite_references<F>(formula: &str, mut edit: F) -> Option<String>
where
    F: FnMut(&Reference) -> Option<Edit>,
{
    let edits: Vec<Edit> = extract_references(formula)
        .iter()
        .filter_map(|r| edit(r))
        .collect();
    if edits.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(formula.len());
    let mut cursor = 0;
    for e in edits {
        out.push_str(&formula[cursor..e.range.start]);
        out.push_str(&e.text);
        cursor = e.range.end;
    }
    out.push_str(&formula[cursor..]);
    Some(out)
}

/// Blank out double-quoted string literals (`""` is an escaped quote),
/// keeping byte offsets intact.
fn mask_string_literals(formula: &str) -> String {
    let mut bytes = formula.as_bytes().to_vec();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        i += 1;
        while i < bytes.len() {
            if bytes[i] == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    bytes[i] = b' ';
                    bytes[i + 1] = b' ';
                    i += 2;
                    continue;
                }
                break;
            }
            bytes[i] = b' ';
            i += 1;
        }
        i += 1;
    }
    // Only whole UTF-8 sequences inside literals were replaced, byte by byte,
    // with ASCII spaces.
    String::from_utf8(bytes).unwrap_or_else(|_| formula.to_string())
}
