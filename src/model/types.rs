//! Enumerated attribute types shared across entities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// No explicit type; the engine infers it. Not written to the document.
    #[default]
    Automatic,
    String,
    Int64,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Binary,
    Variant,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Automatic => "automatic",
            DataType::String => "string",
            DataType::Int64 => "int64",
            DataType::Double => "double",
            DataType::Decimal => "decimal",
            DataType::Boolean => "boolean",
            DataType::DateTime => "dateTime",
            DataType::Binary => "binary",
            DataType::Variant => "variant",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" => Ok(DataType::Automatic),
            "string" | "text" => Ok(DataType::String),
            "int64" | "integer" | "whole" => Ok(DataType::Int64),
            "double" => Ok(DataType::Double),
            "decimal" | "currency" => Ok(DataType::Decimal),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "datetime" | "date" => Ok(DataType::DateTime),
            "binary" => Ok(DataType::Binary),
            "variant" => Ok(DataType::Variant),
            other => Err(format!("unknown data type '{}'", other)),
        }
    }
}

/// How a partition obtains its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartitionMode {
    #[default]
    Import,
    DirectQuery,
    /// Rows produced by a formula (calculated table).
    Calculated,
}

impl PartitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionMode::Import => "import",
            PartitionMode::DirectQuery => "directQuery",
            PartitionMode::Calculated => "calculated",
        }
    }
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "import" => Ok(PartitionMode::Import),
            "directquery" | "direct" => Ok(PartitionMode::DirectQuery),
            "calculated" => Ok(PartitionMode::Calculated),
            other => Err(format!("unknown partition mode '{}'", other)),
        }
    }
}

/// Cross-filtering direction of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossFilter {
    #[default]
    OneDirection,
    BothDirections,
}

impl CrossFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossFilter::OneDirection => "oneDirection",
            CrossFilter::BothDirections => "bothDirections",
        }
    }
}

impl fmt::Display for CrossFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrossFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onedirection" | "single" => Ok(CrossFilter::OneDirection),
            "bothdirections" | "both" => Ok(CrossFilter::BothDirections),
            other => Err(format!("unknown cross filter '{}'", other)),
        }
    }
}
