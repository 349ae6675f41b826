//! SQL statement rendering for normalized records.
//!
//! [`Renderer`] turns one [`NormalizedRecord`] into at most one
//! [`Statement`]. Values are interpolated as literals; nothing is escaped.
//!
//! Update and Delete need a non-null unique-id value or the record is
//! skipped. An Update with no columns left besides the unique id is skipped
//! as well rather than rendered as `UPDATE t SET  WHERE ...`.

use std::fmt;

use crate::naming::camel_to_snake;
use crate::record::{FieldValue, NormalizedRecord, Operation};

/// One rendered DML statement. `Display` yields the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<FieldValue>,
    },
    Update {
        table: String,
        assignments: Vec<(String, FieldValue)>,
        key: String,
        key_value: FieldValue,
    },
    Delete {
        table: String,
        key: String,
        key_value: FieldValue,
    },
}

impl Statement {
    pub fn operation(&self) -> Operation {
        match self {
            Statement::Insert { .. } => Operation::Create,
            Statement::Update { .. } => Operation::Update,
            Statement::Delete { .. } => Operation::Delete,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Insert { table, columns, values } => {
                let values: Vec<String> = values.iter().map(FieldValue::to_sql_literal).collect();
                write!(
                    f,
                    "INSERT INTO {} ({}) VALUES ({});",
                    table,
                    columns.join(", "),
                    values.join(", ")
                )
            }
            Statement::Update { table, assignments, key, key_value } => {
                let pairs: Vec<String> = assignments
                    .iter()
                    .map(|(column, value)| format!("{} = {}", column, value.to_sql_literal()))
                    .collect();
                write!(
                    f,
                    "UPDATE {} SET {} WHERE {} = '{}';",
                    table,
                    pairs.join(", "),
                    key,
                    key_value
                )
            }
            Statement::Delete { table, key, key_value } => {
                write!(f, "DELETE FROM {} WHERE {} = '{}';", table, key, key_value)
            }
        }
    }
}

/// Why a record produced no statement
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No status tag at all
    MissingStatus,
    /// Status tag present but not Create/Update/Delete
    UnknownStatus(FieldValue),
    /// Update/Delete without a (non-null) unique-id value
    MissingUniqueId { key: String },
    /// Update where nothing is left to SET once the unique id is removed
    EmptyUpdate,
    /// Status does not belong in the partition the record came from
    WrongPartition(Operation),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingStatus => write!(f, "no status"),
            SkipReason::UnknownStatus(status) => write!(f, "unrecognized status {}", status.to_sql_literal()),
            SkipReason::MissingUniqueId { key } => write!(f, "missing unique id '{}'", key),
            SkipReason::EmptyUpdate => write!(f, "no columns to update"),
            SkipReason::WrongPartition(op) => write!(f, "{} record in the wrong partition", op),
        }
    }
}

/// Renders records for a single table keyed by one unique-id column.
#[derive(Debug, Clone)]
pub struct Renderer {
    table: String,
    unique_id_key: String,
}

impl Renderer {
    /// `unique_id` is the field name as callers know it; it is normalized
    /// the same way record keys are.
    pub fn new(table: impl Into<String>, unique_id: &str) -> Self {
        Self {
            table: table.into(),
            unique_id_key: camel_to_snake(unique_id),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn unique_id_key(&self) -> &str {
        &self.unique_id_key
    }

    /// Classify by the record's own status tag, then render.
    pub fn render_record(&self, record: NormalizedRecord) -> Result<Statement, SkipReason> {
        let operation = match (record.operation(), record.status()) {
            (Some(op), _) => op,
            (None, Some(status)) => return Err(SkipReason::UnknownStatus(status.clone())),
            (None, None) => return Err(SkipReason::MissingStatus),
        };
        self.render(operation, record)
    }

    /// Render `record` as the given operation, ignoring its status tag.
    pub fn render(&self, operation: Operation, mut record: NormalizedRecord) -> Result<Statement, SkipReason> {
        match operation {
            Operation::Create => {
                let (columns, values) = record.into_fields().into_iter().unzip();
                Ok(Statement::Insert {
                    table: self.table.clone(),
                    columns,
                    values,
                })
            }
            Operation::Update => {
                let key_value = self.take_unique_id(&mut record)?;
                if record.is_empty() {
                    return Err(SkipReason::EmptyUpdate);
                }
                Ok(Statement::Update {
                    table: self.table.clone(),
                    assignments: record.into_fields().into_iter().collect(),
                    key: self.unique_id_key.clone(),
                    key_value,
                })
            }
            Operation::Delete => {
                let key_value = self.take_unique_id(&mut record)?;
                Ok(Statement::Delete {
                    table: self.table.clone(),
                    key: self.unique_id_key.clone(),
                    key_value,
                })
            }
        }
    }

    fn take_unique_id(&self, record: &mut NormalizedRecord) -> Result<FieldValue, SkipReason> {
        match record.take(&self.unique_id_key) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(SkipReason::MissingUniqueId {
                key: self.unique_id_key.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn normalized(json: &str) -> NormalizedRecord {
        serde_json::from_str::<Record>(json).unwrap().normalize()
    }

    fn users() -> Renderer {
        Renderer::new("users", "Id")
    }

    #[test]
    fn test_create() {
        let record = normalized(r#"{"Status":"Create","UserName":"Alice","Age":30}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "INSERT INTO users (user_name, age) VALUES ('Alice', 30);");
    }

    #[test]
    fn test_create_keeps_unique_id_column() {
        let record = normalized(r#"{"Status":"Create","Id":7,"Active":false,"Note":null}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "INSERT INTO users (id, active, note) VALUES (7, false, null);");
    }

    #[test]
    fn test_create_converts_timestamps() {
        let record = normalized(r#"{"Status":"Create","CreatedAt":"2024-05-06T07:08:09Z"}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "INSERT INTO users (created_at) VALUES ('2024-05-06 07:08:09');");
    }

    #[test]
    fn test_large_numbers_keep_their_digits() {
        let record = normalized(
            r#"{"Status":"Create","Big":123456789012345678901234567890,"Precise":3.1415926535897932385}"#,
        );
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(
            sql,
            "INSERT INTO users (big, precise) VALUES (123456789012345678901234567890, 3.1415926535897932385);"
        );

        let record = normalized(r#"{"Status":"Delete","Id":98765432109876543210}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "DELETE FROM users WHERE id = '98765432109876543210';");
    }

    #[test]
    fn test_update() {
        let record = normalized(r#"{"Status":"Update","Id":5,"UserName":"Bob"}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "UPDATE users SET user_name = 'Bob' WHERE id = '5';");
    }

    #[test]
    fn test_update_with_mixed_types() {
        let record = normalized(r#"{"Status":"Update","UserName":"Bob","Id":"abc","Score":1.5,"Banned":true}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(
            sql,
            "UPDATE users SET user_name = 'Bob', score = 1.5, banned = true WHERE id = 'abc';"
        );
    }

    #[test]
    fn test_update_without_unique_id_is_skipped() {
        let record = normalized(r#"{"Status":"Update","UserName":"Bob"}"#);
        assert_eq!(
            users().render_record(record),
            Err(SkipReason::MissingUniqueId { key: "id".to_string() })
        );

        let record = normalized(r#"{"Status":"Update","Id":null,"UserName":"Bob"}"#);
        assert!(matches!(
            users().render_record(record),
            Err(SkipReason::MissingUniqueId { .. })
        ));
    }

    #[test]
    fn test_update_with_nothing_to_set_is_skipped() {
        let record = normalized(r#"{"Status":"Update","Id":5}"#);
        assert_eq!(users().render_record(record), Err(SkipReason::EmptyUpdate));
    }

    #[test]
    fn test_delete() {
        let record = normalized(r#"{"Status":"Delete","Id":5}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "DELETE FROM users WHERE id = '5';");
    }

    #[test]
    fn test_delete_ignores_other_fields() {
        let record = normalized(r#"{"Name":"x","Status":"Delete","Id":5,"Age":3}"#);
        let statement = users().render_record(record).unwrap();
        assert_eq!(statement.operation(), Operation::Delete);
        assert_eq!(statement.to_string(), "DELETE FROM users WHERE id = '5';");
    }

    #[test]
    fn test_delete_without_unique_id_is_skipped() {
        let record = normalized(r#"{"Status":"Delete","Name":"x"}"#);
        assert!(matches!(
            users().render_record(record),
            Err(SkipReason::MissingUniqueId { .. })
        ));
    }

    #[test]
    fn test_camel_case_unique_id() {
        let renderer = Renderer::new("orders", "orderId");
        assert_eq!(renderer.unique_id_key(), "order_id");

        let record = normalized(r#"{"Status":"Delete","OrderId":"A-1"}"#);
        let sql = renderer.render_record(record).unwrap().to_string();
        assert_eq!(sql, "DELETE FROM orders WHERE order_id = 'A-1';");
    }

    #[test]
    fn test_unknown_and_missing_status() {
        let record = normalized(r#"{"Status":"Archived","Id":5}"#);
        assert_eq!(
            users().render_record(record),
            Err(SkipReason::UnknownStatus(FieldValue::from("Archived")))
        );

        let record = normalized(r#"{"Id":5}"#);
        assert_eq!(users().render_record(record), Err(SkipReason::MissingStatus));
    }

    #[test]
    fn test_render_overrides_status() {
        let record = normalized(r#"{"Id":5}"#);
        let sql = users().render(Operation::Delete, record).unwrap().to_string();
        assert_eq!(sql, "DELETE FROM users WHERE id = '5';");
    }

    #[test]
    fn test_empty_create() {
        let record = normalized(r#"{"Status":"Create"}"#);
        let sql = users().render_record(record).unwrap().to_string();
        assert_eq!(sql, "INSERT INTO users () VALUES ();");
    }
}
