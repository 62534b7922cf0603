//! Top-level shape classification of parsed fact files.
//!
//! A fact file parses into exactly one [`ParsedDocument`] variant, decided
//! once right after parsing. Everything downstream matches on the variant
//! instead of re-inspecting the YAML value.

use serde::de::Error as _;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{FactError, Result};

/// A single fact: one YAML mapping handed to the queue as-is.
pub type Record = Mapping;

/// Shape of a parsed fact file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDocument {
    /// Empty document or explicit `null`; produces no records.
    Absent,
    /// A single mapping; produces one record.
    Mapping(Record),
    /// A list whose elements are all mappings; one record per element.
    Sequence(Vec<Record>),
    /// Anything else. Carries a description of the offending value.
    Invalid(String),
}

impl ParsedDocument {
    /// Parse YAML text and classify its top-level value.
    ///
    /// A stream with no document at all is [`ParsedDocument::Absent`]; more than
    /// one document is rejected. Merge keys (`<<: *anchor`) are resolved before
    /// classification. Syntax errors are returned as [`FactError::Yaml`]; an
    /// unsupported shape is *not* an error here, it is the
    /// [`ParsedDocument::Invalid`] variant.
    pub fn parse(text: &str) -> Result<Self> {
        let mut documents = serde_yaml::Deserializer::from_str(text);
        let Some(document) = documents.next() else {
            return Ok(ParsedDocument::Absent);
        };
        let mut value = Value::deserialize(document)?;
        if documents.next().is_some() {
            let err = serde_yaml::Error::custom("expected a single YAML document, found several");
            return Err(err.into());
        }
        value.apply_merge()?;
        Ok(Self::classify(value))
    }

    /// Classify an already parsed YAML value.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Null => ParsedDocument::Absent,
            Value::Mapping(map) => ParsedDocument::Mapping(map),
            Value::Sequence(items) => {
                let mut records = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Mapping(map) => records.push(map),
                        other => {
                            return ParsedDocument::Invalid(format!(
                                "list with {} at index {index}",
                                type_name(&other)
                            ))
                        }
                    }
                }
                ParsedDocument::Sequence(records)
            }
            other => ParsedDocument::Invalid(type_name(&other).to_string()),
        }
    }

    /// Number of records this document produces.
    pub fn len(&self) -> usize {
        match self {
            ParsedDocument::Absent | ParsedDocument::Invalid(_) => 0,
            ParsedDocument::Mapping(_) => 1,
            ParsedDocument::Sequence(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turn the document into its records, rejecting [`ParsedDocument::Invalid`].
    pub fn into_records(self) -> Result<Vec<Record>> {
        match self {
            ParsedDocument::Absent => Ok(Vec::new()),
            ParsedDocument::Mapping(map) => Ok(vec![map]),
            ParsedDocument::Sequence(records) => Ok(records),
            ParsedDocument::Invalid(found) => Err(FactError::Shape {
                path: Default::default(),
                found,
            }),
        }
    }
}

/// Human-readable YAML type name for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
