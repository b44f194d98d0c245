//! # Row Appender
//!
//! The [`Appender`] is the inverse of a result stream: callers supply scalar
//! values row by row, the appender assembles them into data chunks, and
//! complete chunks are handed to storage through the [`TableSink`] seam.
//!
//! ## Row Protocol
//!
//! ```text
//! begin_row → append_<kind> × column_count → end_row
//! ```
//!
//! A row only becomes part of the buffered chunk when `end_row` sees exactly
//! `column_count` values. Appending too many values fails that call and
//! every later append in the row; the row is abandoned at `end_row`, which
//! records a descriptive error and rewinds the cursor so the next row starts
//! clean. Values already written for an abandoned row are simply overwritten
//! by the next one.
//!
//! ## Error Surface
//!
//! Failures are returned from each call **and** recorded in a sticky
//! `last_error` string readable at any time ([`Appender::error`]); the
//! empty string means healthy. Closing the appender clears the error, and
//! every operation on a closed appender fails with the same uniform
//! condition without panicking.

use std::sync::Arc;

use eyre::{bail, Result};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::types::value::{Date, Decimal, Interval, Time, Timestamp, Value};
use crate::types::LogicalType;
use crate::vector::chunk::DataChunk;

/// Storage seam the appender flushes into. Implemented by the in-memory
/// table store; a real storage engine plugs in the same way.
pub trait TableSink: Send + Sync {
    /// Column types of the target table.
    fn sink_column_types(&self) -> &[LogicalType];

    /// Accepts one chunk of complete rows. Either applies the whole chunk or
    /// fails without side effects.
    fn append_chunk(&mut self, chunk: DataChunk) -> Result<()>;
}

/// Shared handle to a sink, as handed out by the engine facade.
pub type SharedSink = Arc<RwLock<dyn TableSink>>;

/// Buffers rows into columnar chunks and flushes them to a [`TableSink`].
pub struct Appender {
    sink: SharedSink,
    types: SmallVec<[LogicalType; 8]>,
    chunk: DataChunk,
    /// Next column of the row in progress.
    cursor: usize,
    /// Set once a row has failed; every later append in the row fails too.
    row_failed: bool,
    last_error: String,
    closed: bool,
}

impl Appender {
    /// Creates an appender over `sink`, reading the column layout from it.
    pub fn new(sink: SharedSink) -> Result<Self> {
        let types: SmallVec<[LogicalType; 8]> = {
            let guard = sink.read();
            guard.sink_column_types().iter().cloned().collect()
        };
        if types.is_empty() {
            bail!("cannot append to a table with no columns");
        }
        let chunk = DataChunk::new(&types)?;
        Ok(Appender {
            sink,
            types,
            chunk,
            cursor: 0,
            row_failed: false,
            last_error: String::new(),
            closed: false,
        })
    }

    pub fn column_count(&self) -> usize {
        self.types.len()
    }

    /// The sticky diagnostic; empty means no error (and always empty after
    /// close, by design).
    pub fn error(&self) -> &str {
        &self.last_error
    }

    fn guard_open(&self) -> Result<()> {
        if self.closed {
            bail!("appender is closed");
        }
        Ok(())
    }

    fn fail<T>(&mut self, message: String) -> Result<T> {
        self.last_error = message.clone();
        bail!(message)
    }

    /// Starts a fresh row: cursor back to column zero. Values of an
    /// unfinished previous row are abandoned.
    pub fn begin_row(&mut self) -> Result<()> {
        self.guard_open()?;
        self.cursor = 0;
        self.row_failed = false;
        Ok(())
    }

    /// Writes `value` into the current column and advances the cursor.
    pub fn append_value(&mut self, value: Value) -> Result<()> {
        self.guard_open()?;
        if self.row_failed {
            return self.fail("row already failed; call end_row to start over".to_string());
        }
        if self.cursor >= self.types.len() {
            self.row_failed = true;
            let message = format!(
                "too many values for row: table has {} columns",
                self.types.len()
            );
            return self.fail(message);
        }
        let row = self.chunk.size();
        let column = self.cursor;
        if let Err(err) = self
            .chunk
            .vector_mut(column)
            .and_then(|vector| vector.set_value(row, &value))
        {
            self.row_failed = true;
            let message = format!("append to column {column} failed: {err}");
            return self.fail(message);
        }
        self.cursor += 1;
        Ok(())
    }

    /// Appends a NULL to the current column.
    pub fn append_null(&mut self) -> Result<()> {
        self.append_value(Value::Null)
    }

    append_value_methods! {
        boolean => bool as Boolean,
        int8 => i8 as Int8,
        int16 => i16 as Int16,
        int32 => i32 as Int32,
        int64 => i64 as Int64,
        uint8 => u8 as UInt8,
        uint16 => u16 as UInt16,
        uint32 => u32 as UInt32,
        uint64 => u64 as UInt64,
        float => f32 as Float,
        double => f64 as Double,
        hugeint => i128 as HugeInt,
        decimal => Decimal as Decimal,
        date => Date as Date,
        time => Time as Time,
        timestamp => Timestamp as Timestamp,
        interval => Interval as Interval,
    }

    /// Appends a string to the current column.
    pub fn append_varchar(&mut self, value: &str) -> Result<()> {
        self.append_value(Value::Varchar(value.to_string()))
    }

    /// Appends the first `len` bytes of `value`.
    pub fn append_varchar_len(&mut self, value: &str, len: usize) -> Result<()> {
        if len > value.len() || !value.is_char_boundary(len) {
            return self.fail(format!("length {len} is not a valid prefix of the string"));
        }
        self.append_value(Value::Varchar(value[..len].to_string()))
    }

    /// Appends a blob to the current column.
    pub fn append_blob(&mut self, value: &[u8]) -> Result<()> {
        self.append_value(Value::Blob(value.to_vec()))
    }

    /// Commits the row in progress. Fails — recording a descriptive error
    /// and rewinding the cursor for the next attempt — unless exactly
    /// `column_count` values were appended.
    pub fn end_row(&mut self) -> Result<()> {
        self.guard_open()?;
        let supplied = self.cursor;
        self.cursor = 0;
        if self.row_failed {
            self.row_failed = false;
            return self.fail("row abandoned after a failed append".to_string());
        }
        if supplied != self.types.len() {
            let message = format!(
                "row has {supplied} of {} required values",
                self.types.len()
            );
            return self.fail(message);
        }
        let committed = self.chunk.size() + 1;
        self.chunk.set_size(committed)?;
        if committed == self.chunk.capacity() {
            self.hand_off_chunk()?;
        }
        Ok(())
    }

    /// Pushes all buffered complete rows to the sink. A no-op when nothing
    /// is buffered; fails if a row is still in progress.
    pub fn flush(&mut self) -> Result<()> {
        self.guard_open()?;
        if self.cursor > 0 {
            return self.fail("cannot flush with a row in progress".to_string());
        }
        if self.chunk.is_empty() {
            return Ok(());
        }
        self.hand_off_chunk()
    }

    /// Bulk-appends a whole chunk whose column types must structurally match
    /// the target table. Fails without applying anything on a mismatched or
    /// empty chunk; buffered rows are flushed first so row order holds.
    pub fn append_data_chunk(&mut self, chunk: DataChunk) -> Result<()> {
        self.guard_open()?;
        if chunk.is_empty() {
            return self.fail("cannot append an empty data chunk".to_string());
        }
        if chunk.column_types() != &self.types[..] {
            return self.fail("chunk column types do not match the target table".to_string());
        }
        if self.cursor > 0 {
            return self.fail("cannot bulk-append with a row in progress".to_string());
        }
        if !self.chunk.is_empty() {
            self.hand_off_chunk()?;
        }
        let result = self.sink.write().append_chunk(chunk);
        if let Err(err) = result {
            return self.fail(format!("storage rejected the chunk: {err}"));
        }
        Ok(())
    }

    fn hand_off_chunk(&mut self) -> Result<()> {
        let fresh = DataChunk::new(&self.types)?;
        let full = std::mem::replace(&mut self.chunk, fresh);
        let result = self.sink.write().append_chunk(full);
        if let Err(err) = result {
            return self.fail(format!("storage rejected the chunk: {err}"));
        }
        Ok(())
    }

    /// Flushes buffered rows and closes the appender. Idempotent; clears the
    /// sticky error. A row in progress is abandoned, never committed.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.cursor = 0;
        self.row_failed = false;
        let result = if self.chunk.is_empty() {
            Ok(())
        } else {
            self.hand_off_chunk()
        };
        self.closed = true;
        self.last_error.clear();
        result
    }
}

impl Drop for Appender {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
