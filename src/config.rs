//! Run settings for a conversion.
//!
//! The CLI builds a [`ConvertConfig`] from its arguments and environment;
//! library callers can build one directly.

use std::path::PathBuf;

use crate::error::ConvertError;
use crate::render::Renderer;

/// Input file used by partitioned mode when none is given.
pub const DEFAULT_PARTITIONED_INPUT: &str = "changes.json";

/// Layout of the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// `[record, ...]`, each record tagged with its own status
    Flat,
    /// `[[deletes...], [creates_or_updates...]]`
    Partitioned,
}

/// Where rendered statements go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Target table, written into every statement as-is
    pub table_name: String,

    /// Unique-id field as named in the input (normalized before use)
    pub unique_id: String,

    /// Input JSON file, relative paths resolve against the working directory
    pub input: PathBuf,

    pub mode: InputMode,

    pub output: OutputTarget,
}

impl ConvertConfig {
    pub fn new(
        table_name: impl Into<String>,
        unique_id: impl Into<String>,
        input: impl Into<PathBuf>,
        mode: InputMode,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            unique_id: unique_id.into(),
            input: input.into(),
            mode,
            output: OutputTarget::Stdout,
        }
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Reject settings that cannot produce usable SQL.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.table_name.trim().is_empty() {
            return Err(ConvertError::Config("table name is empty".to_string()));
        }
        if self.unique_id.trim().is_empty() {
            return Err(ConvertError::Config("unique id field is empty".to_string()));
        }
        Ok(())
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.table_name.clone(), &self.unique_id)
    }
}
