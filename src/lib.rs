//! # json2sql: JSON change records to SQL DML
//!
//! Reads a JSON document of row-level change records and renders one
//! `INSERT`, `UPDATE` or `DELETE` statement per record for a single table.
//!
//! ## Input layouts
//!
//! Flat: every record carries its own status tag.
//!
//! ```json
//! [
//!   {"Status": "Create", "UserName": "Alice", "Age": 30},
//!   {"Status": "Update", "Id": 5, "UserName": "Bob"},
//!   {"Status": "Delete", "Id": 5}
//! ]
//! ```
//!
//! Partitioned: deletes first, then creates/updates.
//!
//! ```json
//! [
//!   [{"Status": "Delete", "Id": 5}],
//!   [{"Status": "Create", "UserName": "Alice", "Age": 30}]
//! ]
//! ```
//!
//! With table `users` and unique id `Id` the flat example renders:
//!
//! ```sql
//! INSERT INTO users (user_name, age) VALUES ('Alice', 30);
//! UPDATE users SET user_name = 'Bob' WHERE id = '5';
//! DELETE FROM users WHERE id = '5';
//! ```
//!
//! Values are interpolated without escaping. Do not feed untrusted input.

use std::fs::File;
use std::io::{self, BufWriter, Write};

pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod naming;
pub mod record;
pub mod render;
pub mod temporal;

pub use config::{ConvertConfig, InputMode, OutputTarget, DEFAULT_PARTITIONED_INPUT};
pub use dispatch::{Dispatcher, Partition, SqlWriter, Summary};
pub use error::ConvertError;
pub use input::{Input, PartitionedInput};
pub use naming::camel_to_snake;
pub use record::{FieldValue, NormalizedRecord, Operation, Record};
pub use render::{Renderer, SkipReason, Statement};
pub use temporal::to_sql_datetime;

/// Load the configured input and write its statements to the configured output.
pub fn run(config: &ConvertConfig) -> Result<Summary, ConvertError> {
    config.validate()?;

    // Load before opening the output so a bad input never truncates it
    let input = input::load(&config.input, config.mode)?;

    match &config.output {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            convert(config, input, BufWriter::new(stdout.lock()))
        }
        OutputTarget::File(path) => {
            tracing::debug!("Writing statements to {}", path.display());
            convert(config, input, BufWriter::new(File::create(path)?))
        }
    }
}

/// Render an already-loaded input into `out`.
pub fn convert<W: Write>(config: &ConvertConfig, input: Input, out: W) -> Result<Summary, ConvertError> {
    let mut dispatcher = Dispatcher::new(config.renderer(), out);
    dispatcher.dispatch(input)?;
    dispatcher.finish()
}
