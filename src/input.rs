//! Input loading and shape checks.
//!
//! The whole file is read and parsed up front, so a bad document fails
//! before any statement is written.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::config::InputMode;
use crate::error::ConvertError;
use crate::record::Record;

/// Records split by the producer into deletes and creates/updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedInput {
    pub deletes: Vec<Record>,
    pub upserts: Vec<Record>,
}

/// A parsed input document.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Flat(Vec<Record>),
    Partitioned(PartitionedInput),
}

impl Input {
    /// Total number of records across all partitions.
    pub fn record_count(&self) -> usize {
        match self {
            Input::Flat(records) => records.len(),
            Input::Partitioned(p) => p.deletes.len() + p.upserts.len(),
        }
    }
}

/// Read and parse `path` according to `mode`.
pub fn load<P: AsRef<Path>>(path: P, mode: InputMode) -> Result<Input, ConvertError> {
    let path = path.as_ref();
    let contents = read_input_file(path)?;

    let input = match mode {
        InputMode::Flat => Input::Flat(parse_flat(&contents)?),
        InputMode::Partitioned => Input::Partitioned(parse_partitioned(&contents)?),
    };

    tracing::debug!(
        "Loaded {} records from {}",
        input.record_count(),
        path.display()
    );
    Ok(input)
}

/// Read the input file, mapping a missing file to [`ConvertError::NotFound`].
pub fn read_input_file(path: &Path) -> Result<String, ConvertError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConvertError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConvertError::IoError(e),
    })
}

/// Parse a flat `[record, ...]` document.
///
/// Each element has to be a JSON object; anything else is a parse error.
pub fn parse_flat(contents: &str) -> Result<Vec<Record>, ConvertError> {
    Ok(serde_json::from_str(contents)?)
}

/// Parse a `[[deletes...], [creates_or_updates...]]` document.
pub fn parse_partitioned(contents: &str) -> Result<PartitionedInput, ConvertError> {
    let document: JsonValue = serde_json::from_str(contents)?;

    let parts = match document {
        JsonValue::Array(parts) if parts.len() == 2 => parts,
        JsonValue::Array(parts) => {
            return Err(ConvertError::Shape(format!(
                "expected 2 top-level arrays, found {} elements",
                parts.len()
            )))
        }
        other => {
            return Err(ConvertError::Shape(format!(
                "expected a top-level array, found {}",
                json_type_name(&other)
            )))
        }
    };

    let mut parts = parts.into_iter();
    let deletes = records_from(parts.next(), "first")?;
    let upserts = records_from(parts.next(), "second")?;

    Ok(PartitionedInput { deletes, upserts })
}

fn records_from(part: Option<JsonValue>, position: &str) -> Result<Vec<Record>, ConvertError> {
    let items = match part {
        Some(JsonValue::Array(items)) => items,
        Some(other) => {
            return Err(ConvertError::Shape(format!(
                "{} element must be an array, found {}",
                position,
                json_type_name(&other)
            )))
        }
        None => {
            return Err(ConvertError::Shape(format!("{} element is missing", position)))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            JsonValue::Object(map) => Ok(Record::from(map)),
            other => Err(ConvertError::Shape(format!(
                "record {} of the {} array must be an object, found {}",
                index,
                position,
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_preserves_order() {
        let records = parse_flat(r#"[{"b":1,"a":2},{"Status":"Delete"}]"#).unwrap();
        assert_eq!(records.len(), 2);

        let normalized = records[0].clone().normalize();
        assert_eq!(normalized.columns().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_parse_flat_rejects_non_objects() {
        assert!(matches!(parse_flat(r#"[1, 2]"#), Err(ConvertError::JsonError(_))));
        assert!(matches!(parse_flat(r#"{"a":1}"#), Err(ConvertError::JsonError(_))));
        assert!(matches!(parse_flat("not json"), Err(ConvertError::JsonError(_))));
    }

    #[test]
    fn test_parse_flat_empty() {
        assert!(parse_flat("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_partitioned() {
        let input = parse_partitioned(
            r#"[[{"Status":"Delete","Id":1}],[{"Status":"Create","Id":2},{"Status":"Update","Id":3}]]"#,
        )
        .unwrap();
        assert_eq!(input.deletes.len(), 1);
        assert_eq!(input.upserts.len(), 2);
        assert_eq!(input.deletes[0].get("Id"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_parse_partitioned_rejects_flat_array() {
        let err = parse_partitioned(r#"[{"Status":"Delete","Id":1},{"Status":"Create","Id":2}]"#)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Shape(_)));
        assert!(err.to_string().contains("first element must be an array"));
    }

    #[test]
    fn test_parse_partitioned_rejects_wrong_count() {
        for doc in ["[]", "[[]]", "[[],[],[]]"] {
            assert!(
                matches!(parse_partitioned(doc), Err(ConvertError::Shape(_))),
                "doc: {}",
                doc
            );
        }
    }

    #[test]
    fn test_parse_partitioned_rejects_non_array_top_level() {
        let err = parse_partitioned(r#"{"deletes":[]}"#).unwrap_err();
        assert!(err.to_string().contains("found an object"));
    }

    #[test]
    fn test_parse_partitioned_rejects_non_object_records() {
        let err = parse_partitioned(r#"[[], [{"Id":1}, 5]]"#).unwrap_err();
        assert!(matches!(err, ConvertError::Shape(_)));
        assert!(err.to_string().contains("record 1 of the second array"));
    }

    #[test]
    fn test_missing_file() {
        let err = load("definitely-not-here.json", InputMode::Flat).unwrap_err();
        assert!(matches!(err, ConvertError::NotFound { .. }));
    }
}
