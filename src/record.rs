//! Change records and their normalized form.
//!
//! A [`Record`] is one JSON object exactly as it appeared in the input file.
//! [`NormalizedRecord`] is what the renderer consumes: snake_case keys,
//! SQL datetime literals, and the status tag split out of the field set.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::naming::camel_to_snake;
use crate::temporal::to_sql_datetime;

/// Normalized name of the field carrying the status tag.
pub const STATUS_FIELD: &str = "status";

/// Represents the value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a SQL value: strings single-quoted, everything else bare.
    ///
    /// Embedded quotes are not escaped.
    pub fn to_sql_literal(&self) -> String {
        match self {
            FieldValue::String(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Number(n) => FieldValue::Number(n),
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Null => FieldValue::Null,
            // Nested arrays and objects are carried as their JSON text
            nested => FieldValue::String(nested.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Number(i.into())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// SQL operation selected by a record's status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status tag names no known operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Operation {
    type Err = UnknownStatus;

    /// Status tags are matched exactly: `Create`, `Update`, `Delete`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Operation::Create),
            "Update" => Ok(Operation::Update),
            "Delete" => Ok(Operation::Delete),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One change record as read from the input, field order preserved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rewrite keys to snake_case, convert timestamps and split off the status tag.
    pub fn normalize(self) -> NormalizedRecord {
        NormalizedRecord::from(self)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, serde_json::Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A record ready for rendering.
///
/// Keys are snake_case and ISO-8601 strings are SQL datetime literals. When
/// two source keys normalize to the same column the later value wins but
/// the column keeps the position of the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    status: Option<FieldValue>,
    fields: IndexMap<String, FieldValue>,
}

impl NormalizedRecord {
    /// The raw status tag, if the record had one.
    pub fn status(&self) -> Option<&FieldValue> {
        self.status.as_ref()
    }

    /// Operation named by the status tag.
    ///
    /// `None` when the tag is absent, not a string, or not one of the
    /// three known operations.
    pub fn operation(&self) -> Option<Operation> {
        self.status.as_ref()?.as_str()?.parse().ok()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Remove a field, keeping the order of the rest.
    pub fn take(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn into_fields(self) -> IndexMap<String, FieldValue> {
        self.fields
    }
}

impl From<Record> for NormalizedRecord {
    fn from(record: Record) -> Self {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::with_capacity(record.len());

        for (key, value) in record.fields {
            let value = match value {
                serde_json::Value::String(s) => {
                    FieldValue::String(to_sql_datetime(&s).into_owned())
                }
                other => FieldValue::from(other),
            };
            fields.insert(camel_to_snake(&key), value);
        }

        let status = fields.shift_remove(STATUS_FIELD);

        Self { status, fields }
    }
}
