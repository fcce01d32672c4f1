//! Structural checks over a loaded model.
//!
//! Each check appends [`ValidationIssue`]s; none of them stops the others.

use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::Serialize;

use crate::dax::extract_references;
use crate::emitter::format::Indent;
use crate::emitter::to_tmdl;
use crate::loader::{load_str, LoadWarning};
use crate::model::{Database, FormulaOwner, Model, Named};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Stable rule identifier, e.g. `dangling_reference`.
    pub rule: &'static str,
    /// The object the issue is about, e.g. `Sales[Total]`.
    pub object: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        rule: &'static str,
        object: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            rule,
            object: object.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.rule, self.object, self.message
        )
    }
}

/// Load warnings become warnings against the document.
pub fn load_warning_issues(warnings: &[LoadWarning], document: &str) -> Vec<ValidationIssue> {
    warnings
        .iter()
        .map(|w| ValidationIssue::new(Severity::Warning, "load_warning", document, w.to_string()))
        .collect()
}

/// Serialize, parse the output and serialize again; the two texts must match
/// and the parse must be clean.
pub fn check_round_trip(db: &Database) -> Vec<ValidationIssue> {
    let first = to_tmdl(db, Indent::Tabs);
    let reparsed = load_str(&first, &db.name);
    let second = to_tmdl(&reparsed.database, Indent::Tabs);

    let mut issues: Vec<ValidationIssue> = reparsed
        .warnings
        .iter()
        .map(|w| {
            ValidationIssue::new(
                Severity::Error,
                "round_trip",
                &db.model.name,
                format!("serialized document does not parse cleanly: {}", w),
            )
        })
        .collect();

    if first != second {
        let line = first
            .lines()
            .zip(second.lines())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| first.lines().count().min(second.lines().count()))
            + 1;
        issues.push(ValidationIssue::new(
            Severity::Error,
            "round_trip",
            &db.model.name,
            format!("serialization is not stable, first difference at line {}", line),
        ));
    }
    issues
}

/// Formula references that resolve to nothing.
///
/// A qualified `T[x]` must name a column or measure of table `T`. A bare
/// `[x]` must name a measure somewhere in the model or a column of the
/// formula's own table; since formulas may introduce their own columns,
/// an unresolved bare reference is only a warning.
pub fn check_references(model: &Model) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (owner, formula) in model.formulas() {
        let own_table = match owner {
            FormulaOwner::Measure { table, .. } | FormulaOwner::CalculatedColumn { table, .. } => {
                table
            }
        };

        for reference in extract_references(formula) {
            match &reference.table {
                Some(table_name) => match model.tables.get(table_name) {
                    None => issues.push(ValidationIssue::new(
                        Severity::Error,
                        "dangling_reference",
                        owner.to_string(),
                        format!("references unknown table '{}'", table_name),
                    )),
                    Some(table) => {
                        if !table.columns.contains(&reference.name)
                            && !table.measures.contains(&reference.name)
                        {
                            issues.push(ValidationIssue::new(
                                Severity::Error,
                                "dangling_reference",
                                owner.to_string(),
                                format!(
                                    "references unknown column '{}[{}]'",
                                    table.name(),
                                    reference.name
                                ),
                            ));
                        }
                    }
                },
                None => {
                    let is_measure = model
                        .tables
                        .iter()
                        .any(|t| t.measures.contains(&reference.name));
                    let is_own_column = model.has_column(own_table, &reference.name);
                    if !is_measure && !is_own_column {
                        issues.push(ValidationIssue::new(
                            Severity::Warning,
                            "dangling_reference",
                            owner.to_string(),
                            format!("[{}] matches no measure in the model", reference.name),
                        ));
                    }
                }
            }
        }
    }
    issues
}

/// Both endpoints of every relationship must be declared columns.
pub fn check_relationship_endpoints(model: &Model) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for relationship in &model.relationships {
        for endpoint in [&relationship.from, &relationship.to] {
            if !model.has_column(&endpoint.table, &endpoint.column) {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    "relationship_endpoint",
                    relationship.name(),
                    format!("endpoint {} is not a declared column", endpoint),
                ));
            }
        }
    }
    issues
}

/// Active relationships must not connect any two tables by more than one
/// path, otherwise filter propagation is ambiguous.
pub fn check_ambiguous_paths(model: &Model) -> Vec<ValidationIssue> {
    let mut graph: UnGraph<String, &str> = UnGraph::new_undirected();
    let mut nodes: Vec<(String, NodeIndex)> = Vec::new();
    let mut node = |graph: &mut UnGraph<String, &str>, name: &str| -> NodeIndex {
        let key = name.to_lowercase();
        if let Some((_, idx)) = nodes.iter().find(|(k, _)| *k == key) {
            return *idx;
        }
        let idx = graph.add_node(name.to_string());
        nodes.push((key, idx));
        idx
    };

    for relationship in model.relationships.iter().filter(|r| r.is_active) {
        let a = node(&mut graph, &relationship.from.table);
        let b = node(&mut graph, &relationship.to.table);
        graph.add_edge(a, b, relationship.name());
    }

    let mut components = UnionFind::<usize>::new(graph.node_count());
    let mut issues = Vec::new();
    for edge in graph.raw_edges() {
        let (a, b) = (edge.source(), edge.target());
        if !components.union(a.index(), b.index()) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                "ambiguous_relationships",
                edge.weight,
                format!(
                    "closes a cycle of active relationships between '{}' and '{}'",
                    graph[a], graph[b]
                ),
            ));
        }
    }
    issues
}

/// Measures without a description.
pub fn check_descriptions(model: &Model) -> Vec<ValidationIssue> {
    model
        .tables
        .iter()
        .flat_map(|table| {
            table
                .measures
                .iter()
                .filter(|m| m.description.as_deref().map_or(true, |d| d.trim().is_empty()))
                .map(move |m| {
                    ValidationIssue::new(
                        Severity::Info,
                        "measure_description",
                        format!("{}[{}]", table.name(), m.name()),
                        "measure has no description",
                    )
                })
        })
        .collect()
}
