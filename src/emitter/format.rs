//! TMDL formatting utilities for model emission.
//!
//! Provides name quoting, text literals, and indentation management.

use crate::dax::is_bare_table_name;

/// Quote a name if needed.
///
/// Returns the name as-is if it's a bare identifier, otherwise wraps it in
/// single quotes with embedded quotes doubled: `'Sales Orders'`.
#[must_use]
pub fn quote_name(name: &str) -> String {
    if is_bare_table_name(name) {
        name.to_string()
    } else {
        always_quote_name(name)
    }
}

/// Single-quote a name unconditionally.
#[must_use]
pub fn always_quote_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Quote a property value with double quotes (`"` doubles).
#[must_use]
pub fn quote_text(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Wrap a formula in braces: `{ SUM(Sales[Amount]) }`.
#[must_use]
pub fn braced(expression: &str) -> String {
    format!("{{ {} }}", expression.trim())
}

/// Indentation style for emitted documents.
#[derive(Debug, Clone, Default)]
pub enum Indent {
    /// Use tabs for indentation (default).
    #[default]
    Tabs,
    /// Use spaces for indentation.
    Spaces(usize),
}

impl Indent {
    /// Get the indent string.
    #[must_use]
    pub fn to_string_owned(&self) -> String {
        match self {
            Indent::Tabs => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(*n),
        }
    }
}

/// A writer that manages indentation for document output.
pub struct IndentWriter {
    buffer: String,
    indent_str: String,
    current_indent: usize,
}

impl IndentWriter {
    /// Create a new indent writer with the specified indentation style.
    #[must_use]
    pub fn new(indent: Indent) -> Self {
        Self {
            buffer: String::new(),
            indent_str: indent.to_string_owned(),
            current_indent: 0,
        }
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.current_indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        self.current_indent = self.current_indent.saturating_sub(1);
    }

    /// Write a complete line (with newline at end).
    ///
    /// Only the first physical line is indented; embedded newlines (from
    /// multi-line formulas) are written verbatim.
    pub fn write_line(&mut self, s: &str) {
        for _ in 0..self.current_indent {
            self.buffer.push_str(&self.indent_str);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
    }

    /// Write a blank line.
    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Consume the writer and return the final string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Default for IndentWriter {
    fn default() -> Self {
        Self::new(Indent::default())
    }
}
