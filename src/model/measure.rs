// src/model/measure.rs
use super::collection::{Named, Rename};
use super::EntityKind;

/// A measure: a named formula evaluated in filter context.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    name: String,
    /// Formula text with `Table[Column]` / `[Measure]` references embedded.
    pub expression: String,
    pub format_string: Option<String>,
    pub description: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            format_string: None,
            description: None,
        }
    }

    pub fn with_format_string(mut self, format_string: impl Into<String>) -> Self {
        self.format_string = Some(format_string.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Named for Measure {
    const KIND: EntityKind = EntityKind::Measure;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Rename for Measure {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
