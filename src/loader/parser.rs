//! Best-effort document parser.
//!
//! Top-level `table` and `relationship` declarations are found lexically.
//! Table bodies are delimited by brace-depth matching and scanned for
//! member declarations; anything unrecognised is skipped. A member
//! declaration that cannot be read is dropped with a warning and parsing
//! resumes after it. Tables are always declared, even without a body.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::scanner::{
    decode_name, line_end, matching_brace, next_line_start, quoted_text, skip_whitespace,
    LineIndex, NAME,
};
use super::LoadWarning;
use crate::model::{
    Column, ColumnRef, CrossFilter, DataType, Database, EntityKind, Hierarchy, Measure,
    ModelError, ModelResult, Named, Partition, PartitionMode, Relationship, Table,
};

static MODEL_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?m)^[ \t]*model[ \t]+({NAME})")).unwrap());

static TOP_LEVEL_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^[ \t]*(table|relationship)[ \t]+({NAME})")).unwrap()
});

static MEMBER_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*(column|measure|hierarchy|partition)[ \t]+({NAME})"
    ))
    .unwrap()
});

/// `: dataType` and `= source` / `= {` after a column name.
static COLUMN_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[ \t]*(?::[ \t]*(\w+))?[ \t]*(?:=[ \t]*(\{{|{NAME}))?"
    ))
    .unwrap()
});

static ASSIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*=[ \t]*").unwrap());

static PARTITION_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:=[ \t]*(\w+))?").unwrap());

static RELATIONSHIP_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    let endpoint = |side: &str| format!(r"(?P<{side}_table>{NAME})\[(?P<{side}_column>(?:[^\]]|\]\])+)\]");
    Regex::new(&format!(
        r"^[ \t]*:[ \t]*{}[ \t]*->[ \t]*{}",
        endpoint("from"),
        endpoint("to")
    ))
    .unwrap()
});

/// `key: value` or `key = value` on its own line.
static PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(\w+)[ \t]*[:=][ \t]*").unwrap());

static LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[ \t]*level[ \t]+({NAME})[ \t]*:[ \t]*({NAME})"
    ))
    .unwrap()
});

static LEVEL_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*level\b").unwrap());

static INACTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*inactive[ \t]*\r?(?:\n|$)").unwrap());

/// Parse a whole document. `fallback_name` names the database when the
/// document has no `model` line.
pub(crate) fn parse_document(text: &str, fallback_name: &str) -> (Database, Vec<LoadWarning>) {
    let mut parser = Parser {
        text,
        lines: LineIndex::new(text),
        warnings: Vec::new(),
    };
    let db = parser.document(fallback_name);
    (db, parser.warnings)
}

struct Parser<'a> {
    text: &'a str,
    lines: LineIndex,
    warnings: Vec<LoadWarning>,
}

/// A property value and the offset just past it.
type Value = (String, usize);

impl<'a> Parser<'a> {
    fn document(&mut self, fallback_name: &str) -> Database {
        let name = MODEL_DECL
            .captures(self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_name(m.as_str()))
            .unwrap_or_else(|| fallback_name.to_string());
        let mut db = Database::new(name);

        let mut pos = 0;
        while let Some(caps) = TOP_LEVEL_DECL.captures_at(self.text, pos) {
            let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            let line = self.lines.line(whole.start());
            let decoded = decode_name(name.as_str());

            pos = match keyword.as_str() {
                "table" => self.table(&mut db, decoded, name.end(), line),
                _ => self.relationship(&mut db, decoded, name.end(), line),
            };
        }

        db
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// A table without a readable body is still declared, empty.
    fn table(&mut self, db: &mut Database, name: String, after: usize, line: usize) -> usize {
        let open = skip_whitespace(self.text, after);
        let (body, resume) = if self.text.as_bytes().get(open) != Some(&b'{') {
            self.malformed(line, format!("table '{}' has no body", name));
            (None, after)
        } else if let Some(close) = matching_brace(self.text, open) {
            (Some((open + 1, close)), close + 1)
        } else {
            self.malformed(line, format!("table '{}' body is never closed", name));
            (None, open + 1)
        };

        if db.model.tables.contains(&name) {
            self.warnings.push(LoadWarning::Duplicate {
                line,
                kind: EntityKind::Table,
                name,
            });
            return resume;
        }

        let mut table = Table::new(name);
        if let Some((start, end)) = body {
            self.table_body(&mut table, start, end);
        }
        let added = db.model.tables.add(table).map(|_| ());
        self.record(line, added);
        resume
    }

    fn table_body(&mut self, table: &mut Table, start: usize, end: usize) {
        let text = self.text;
        let body = &text[..end];
        let mut pos = start;

        while pos < end {
            let Some(caps) = MEMBER_DECL.captures_at(body, pos) else {
                break;
            };
            let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            let line = self.lines.line(whole.start());
            let decoded = decode_name(name.as_str());

            pos = match keyword.as_str() {
                "column" => self.column(table, decoded, name.end(), end, line),
                "measure" => self.measure(table, decoded, name.end(), end, line),
                "hierarchy" => self.hierarchy(table, decoded, name.end(), end, line),
                _ => self.partition(table, decoded, name.end(), end, line),
            };
        }
    }

    fn column(&mut self, table: &mut Table, name: String, at: usize, end: usize, line: usize) -> usize {
        let text = self.text;
        let body = &text[..end];
        let Some(caps) = COLUMN_TAIL.captures(&body[at..]) else {
            return line_end(body, at);
        };

        let data_type = match caps.get(1) {
            Some(m) => match DataType::from_str(m.as_str()) {
                Ok(dt) => dt,
                Err(message) => {
                    self.malformed(line, format!("column '{}': {}", name, message));
                    return line_end(body, at);
                }
            },
            None => DataType::Automatic,
        };

        let tail_end = at + caps.get(0).map_or(0, |m| m.end());
        let (mut column, mut pos) = match caps.get(2) {
            Some(m) if m.as_str() == "{" => match self.braced(body, at + m.start()) {
                Some((expression, next)) => {
                    (Column::calculated(name, data_type, expression), next)
                }
                None => {
                    self.malformed(line, format!("expression of column '{}' is never closed", name));
                    return end;
                }
            },
            Some(m) => (
                Column::regular(name, data_type).with_source_column(decode_name(m.as_str())),
                tail_end,
            ),
            None => (Column::regular(name, data_type), tail_end),
        };

        while let Some((key, value_at)) = self.property(body, pos) {
            pos = match key.to_ascii_lowercase().as_str() {
                "datatype" => {
                    let (value, next) = self.rest_of_line(body, value_at);
                    match DataType::from_str(&value) {
                        Ok(dt) => column.data_type = dt,
                        Err(message) => self.malformed(self.lines.line(value_at), message),
                    }
                    next
                }
                "sourcecolumn" if !column.is_calculated() => {
                    let (value, next) = self.rest_of_line(body, value_at);
                    column = column.with_source_column(decode_name(&value));
                    next
                }
                _ => line_end(body, value_at),
            };
        }

        let added = table.columns.add(column).map(|_| ());
        self.record(line, added);
        pos
    }

    fn measure(&mut self, table: &mut Table, name: String, at: usize, end: usize, line: usize) -> usize {
        let text = self.text;
        let body = &text[..end];
        let Some(assign) = ASSIGN.find(&body[at..]) else {
            self.malformed(line, format!("measure '{}' has no expression", name));
            return line_end(body, at);
        };

        // A braced formula may open on the line after the `=`.
        let mut value_at = at + assign.end();
        let brace = skip_whitespace(body, value_at);
        if body.as_bytes().get(brace) == Some(&b'{') {
            value_at = brace;
        }
        let Some((expression, mut pos)) = self.value(body, value_at) else {
            self.malformed(line, format!("expression of measure '{}' is never closed", name));
            return end;
        };
        let mut measure = Measure::new(name, expression);

        while let Some((key, value_at)) = self.property(body, pos) {
            let slot = match key.to_ascii_lowercase().as_str() {
                "formatstring" => &mut measure.format_string,
                "description" => &mut measure.description,
                _ => {
                    pos = line_end(body, value_at);
                    continue;
                }
            };
            match self.value(body, value_at) {
                Some((value, next)) => {
                    *slot = Some(value);
                    pos = next;
                }
                None => {
                    let message = format!("{} of measure '{}' is never closed", key, measure.name());
                    self.malformed(self.lines.line(value_at), message);
                    pos = end;
                }
            }
        }

        let added = table.measures.add(measure).map(|_| ());
        self.record(line, added);
        pos
    }

    fn hierarchy(&mut self, table: &mut Table, name: String, at: usize, end: usize, line: usize) -> usize {
        let text = self.text;
        let body = &text[..end];
        let mut hierarchy = Hierarchy::new(name);
        let mut pos = line_end(body, at);

        loop {
            let start = next_line_start(body, pos);
            if start >= end || !LEVEL_KEYWORD.is_match(&body[start..]) {
                break;
            }
            match LEVEL.captures(&body[start..]) {
                Some(caps) => {
                    let level = caps.get(1).map_or("", |m| m.as_str());
                    let column = caps.get(2).map_or("", |m| m.as_str());
                    hierarchy = hierarchy.with_level(decode_name(level), decode_name(column));
                }
                None => self.malformed(
                    self.lines.line(start),
                    "level must be written as `level <name>: <column>`".to_string(),
                ),
            }
            pos = line_end(body, start);
        }

        let added = table.hierarchies.add(hierarchy).map(|_| ());
        self.record(line, added);
        pos
    }

    fn partition(&mut self, table: &mut Table, name: String, at: usize, end: usize, line: usize) -> usize {
        let text = self.text;
        let body = &text[..end];
        let caps = PARTITION_TAIL.captures(&body[at..]);
        let mode = match caps.as_ref().and_then(|c| c.get(1)) {
            Some(m) => match PartitionMode::from_str(m.as_str()) {
                Ok(mode) => mode,
                Err(message) => {
                    self.malformed(line, format!("partition '{}': {}", name, message));
                    return line_end(body, at);
                }
            },
            None => PartitionMode::default(),
        };

        let mut pos = at + caps.and_then(|c| c.get(0)).map_or(0, |m| m.end());
        let mut source = String::new();

        while let Some((key, value_at)) = self.property(body, pos) {
            pos = match key.to_ascii_lowercase().as_str() {
                "source" => match self.value(body, value_at) {
                    Some((value, next)) => {
                        source = value;
                        next
                    }
                    None => {
                        self.malformed(
                            self.lines.line(value_at),
                            format!("source of partition '{}' is never closed", name),
                        );
                        end
                    }
                },
                _ => line_end(body, value_at),
            };
        }

        let added = table
            .partitions
            .add(Partition::new(name, mode, source))
            .map(|_| ());
        self.record(line, added);
        pos
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    fn relationship(&mut self, db: &mut Database, name: String, at: usize, line: usize) -> usize {
        let text = self.text;
        let Some(caps) = RELATIONSHIP_TAIL.captures(&text[at..]) else {
            self.malformed(
                line,
                format!("relationship '{}' must be written as `relationship <name>: T[c] -> T[c]`", name),
            );
            return line_end(text, at);
        };

        let endpoint = |side: &str| {
            let table = caps
                .name(&format!("{side}_table"))
                .map_or(String::new(), |m| decode_name(m.as_str()));
            let column = caps
                .name(&format!("{side}_column"))
                .map_or(String::new(), |m| m.as_str().replace("]]", "]").trim().to_string());
            ColumnRef::new(table, column)
        };
        let mut relationship = Relationship::new(name, endpoint("from"), endpoint("to"));
        let mut pos = at + caps.get(0).map_or(0, |m| m.end());

        loop {
            let start = next_line_start(text, pos);
            if start >= text.len() {
                break;
            }
            if INACTIVE.is_match(&text[start..]) {
                relationship.is_active = false;
                pos = line_end(text, start);
                continue;
            }
            let Some((key, value_at)) = self.property(text, pos) else {
                break;
            };
            let (value, next) = self.rest_of_line(text, value_at);
            match key.to_ascii_lowercase().as_str() {
                "crossfilter" | "crossfilteringbehavior" => match CrossFilter::from_str(&value) {
                    Ok(cf) => relationship.cross_filter = cf,
                    Err(message) => self.malformed(self.lines.line(value_at), message),
                },
                "isactive" => relationship.is_active = !value.eq_ignore_ascii_case("false"),
                _ => {}
            }
            pos = next;
        }

        let added = db.model.relationships.add(relationship).map(|_| ());
        self.record(line, added);
        pos
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// The property on the line after `pos`, if that line is one.
    fn property(&self, text: &'a str, pos: usize) -> Option<(&'a str, usize)> {
        let start = next_line_start(text, pos);
        if start >= text.len() {
            return None;
        }
        let caps = PROPERTY.captures(&text[start..])?;
        let key = caps.get(1)?.as_str();
        let value_at = start + caps.get(0)?.end();
        Some((key, value_at))
    }

    /// A braced formula, a quoted literal, or the rest of the line.
    fn value(&self, text: &str, at: usize) -> Option<Value> {
        match text.as_bytes().get(at) {
            Some(b'{') => self.braced(text, at),
            Some(b'"') => quoted_text(text, at),
            _ => Some(self.rest_of_line(text, at)),
        }
    }

    fn braced(&self, text: &str, open: usize) -> Option<Value> {
        let close = matching_brace(text, open)?;
        Some((text[open + 1..close].trim().to_string(), close + 1))
    }

    fn rest_of_line(&self, text: &str, at: usize) -> Value {
        let end = line_end(text, at);
        (text[at..end].trim().to_string(), end)
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    fn malformed(&mut self, line: usize, message: String) {
        self.warnings.push(LoadWarning::Malformed { line, message });
    }

    fn record(&mut self, line: usize, result: ModelResult<()>) {
        match result {
            Ok(()) => {}
            Err(ModelError::DuplicateName { kind, name, .. }) => {
                self.warnings.push(LoadWarning::Duplicate { line, kind, name });
            }
            Err(err) => self.malformed(line, err.to_string()),
        }
    }
}
