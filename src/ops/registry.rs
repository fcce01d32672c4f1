//! Static catalogue of the operations this crate exposes.
//!
//! A transport layer advertises these names; the CLI lists them with
//! `tmdl tools`.

use serde::Serialize;

/// A named operation and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub static TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "tmdl_load_model",
        description: "Loads a TMDL model and summarises its tables, measures and warnings",
    },
    ToolInfo {
        name: "tmdl_rename_object",
        description: "Renames a table / column / measure and updates all formula references",
    },
    ToolInfo {
        name: "tmdl_detect_unused_columns",
        description: "Lists columns that are not referenced by any measure or calculated column",
    },
    ToolInfo {
        name: "tmdl_format_model",
        description: "Sorts model objects by name and rewrites the document canonically",
    },
    ToolInfo {
        name: "diff_tmdl",
        description: "Streams a unified diff between two TMDL documents in bounded chunks",
    },
    ToolInfo {
        name: "tmdl_validate_model",
        description: "Checks round-trip stability, references and relationships of a model",
    },
    ToolInfo {
        name: "add_measure",
        description: "Adds a measure to a table, or replaces the expression of an existing one",
    },
    ToolInfo {
        name: "tmdl_list_tables",
        description: "Lists the tables of a model in document order",
    },
    ToolInfo {
        name: "tmdl_list_measures",
        description: "Lists the measures of one table",
    },
    ToolInfo {
        name: "tmdl_create_model",
        description: "Creates or extends a model from a TOML blueprint",
    },
    ToolInfo {
        name: "list_tools",
        description: "Lists the available operations",
    },
];

pub fn list_tools() -> &'static [ToolInfo] {
    TOOLS
}

/// Look up an operation by name (case-insensitive).
pub fn find_tool(name: &str) -> Option<&'static ToolInfo> {
    TOOLS.iter().find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}
