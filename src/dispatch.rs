//! Record dispatch: normalize, classify, render, write.

use std::fmt;
use std::io::Write;

use crate::error::ConvertError;
use crate::input::{Input, PartitionedInput};
use crate::record::{Operation, Record};
use crate::render::{Renderer, SkipReason, Statement};

/// Statement writer
///
/// Writes one statement per line.
pub struct SqlWriter<W: Write> {
    writer: W,
}

impl<W: Write> SqlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(&mut self, statement: &Statement) -> Result<(), ConvertError> {
        writeln!(self.writer, "{}", statement)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ConvertError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub insert_count: usize,
    pub update_count: usize,
    pub delete_count: usize,
    pub skipped_count: usize,
}

impl Summary {
    pub fn statement_count(&self) -> usize {
        self.insert_count + self.update_count + self.delete_count
    }

    fn record(&mut self, operation: Operation) {
        match operation {
            Operation::Create => self.insert_count += 1,
            Operation::Update => self.update_count += 1,
            Operation::Delete => self.delete_count += 1,
        }
    }
}

/// Partition a record came from in partitioned mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Deletes,
    Upserts,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Deletes => f.write_str("deletes"),
            Partition::Upserts => f.write_str("creates/updates"),
        }
    }
}

/// Position of a record in the input, for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordPosition {
    partition: Option<Partition>,
    index: usize,
}

impl fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.partition {
            Some(partition) => write!(f, "{} record {}", partition, self.index),
            None => write!(f, "record {}", self.index),
        }
    }
}

impl Partition {
    pub fn allows(&self, operation: Operation) -> bool {
        match self {
            Partition::Deletes => operation == Operation::Delete,
            Partition::Upserts => matches!(operation, Operation::Create | Operation::Update),
        }
    }
}

/// Drives records through the renderer and writes each statement as soon
/// as it is produced.
pub struct Dispatcher<W: Write> {
    renderer: Renderer,
    writer: SqlWriter<W>,
    summary: Summary,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(renderer: Renderer, writer: W) -> Self {
        Self {
            renderer,
            writer: SqlWriter::new(writer),
            summary: Summary::default(),
        }
    }

    pub fn dispatch(&mut self, input: Input) -> Result<(), ConvertError> {
        match input {
            Input::Flat(records) => self.dispatch_flat(records),
            Input::Partitioned(input) => self.dispatch_partitioned(input),
        }
    }

    /// Every record picks its own operation from its status tag.
    pub fn dispatch_flat(&mut self, records: Vec<Record>) -> Result<(), ConvertError> {
        for (index, record) in records.into_iter().enumerate() {
            let outcome = self.renderer.render_record(record.normalize());
            self.emit(RecordPosition { partition: None, index }, outcome)?;
        }
        Ok(())
    }

    /// Deletes first, then creates/updates. A status that does not match
    /// its partition is skipped.
    pub fn dispatch_partitioned(&mut self, input: PartitionedInput) -> Result<(), ConvertError> {
        self.dispatch_partition(Partition::Deletes, input.deletes)?;
        self.dispatch_partition(Partition::Upserts, input.upserts)
    }

    fn dispatch_partition(&mut self, partition: Partition, records: Vec<Record>) -> Result<(), ConvertError> {
        for (index, record) in records.into_iter().enumerate() {
            let record = record.normalize();
            let outcome = match record.operation() {
                Some(op) if partition.allows(op) => self.renderer.render(op, record),
                Some(op) => Err(SkipReason::WrongPartition(op)),
                None => self.renderer.render_record(record),
            };
            self.emit(RecordPosition { partition: Some(partition), index }, outcome)?;
        }
        Ok(())
    }

    fn emit(&mut self, position: RecordPosition, outcome: Result<Statement, SkipReason>) -> Result<(), ConvertError> {
        match outcome {
            Ok(statement) => {
                self.writer.write(&statement)?;
                self.summary.record(statement.operation());
            }
            Err(reason @ SkipReason::MissingUniqueId { .. }) => {
                tracing::warn!("Skipping {}: {}", position, reason);
                self.summary.skipped_count += 1;
            }
            Err(reason) => {
                tracing::debug!("Skipping {}: {}", position, reason);
                self.summary.skipped_count += 1;
            }
        }
        Ok(())
    }

    /// Flush the writer and hand back the run summary.
    pub fn finish(mut self) -> Result<Summary, ConvertError> {
        self.writer.flush()?;
        Ok(self.summary)
    }
}
