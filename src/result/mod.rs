//! # Result Streams
//!
//! A [`ResultStream`] carries the output of a query, a table scan, or a
//! table-function call: column metadata plus a sequence of data chunks.
//!
//! ## Two Consumption Modes
//!
//! Two mutually exclusive modes coexist for backward compatibility:
//!
//! 1. **Chunk mode** — [`ResultStream::fetch_chunk`] consumes chunks by
//!    index, forward-only. Requesting past the last chunk (or a chunk
//!    already taken) reports exhaustion (`Ok(None)`), which is distinct
//!    from a broken stream (`Err`).
//! 2. **Scalar mode** — the `value_*` accessors and [`ResultStream::is_null`]
//!    read single cells at random. Out-of-range cells return the type's
//!    zero value and `is_null` reports `false`; this relaxed-bounds
//!    convention is deliberate legacy behavior, kept as documented.
//!
//! The first chunk fetch commits the stream to chunk mode and the first
//! scalar read commits it to scalar mode. Crossing over afterwards fails
//! deterministically in both directions: `fetch_chunk` returns an error,
//! and the scalar accessors — which have no error channel by design —
//! return their zero values.

use eyre::{bail, Result};

use crate::types::value::{Date, Decimal, Interval, Time, Timestamp, Value};
use crate::types::{LogicalType, TypeKind};
use crate::vector::chunk::DataChunk;

#[derive(Debug, Clone)]
struct ColumnMeta {
    name: String,
    ty: LogicalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AccessMode {
    #[default]
    Unresolved,
    Chunk,
    Scalar,
}

/// The materialized output of one execution.
#[derive(Debug, Default)]
pub struct ResultStream {
    columns: Vec<ColumnMeta>,
    chunks: Vec<Option<DataChunk>>,
    /// Starting global row of each chunk.
    offsets: Vec<usize>,
    mode: AccessMode,
    row_count: usize,
    rows_changed: usize,
    error: String,
}

impl ResultStream {
    /// Builds a stream over `chunks`, one metadata entry per column.
    pub fn from_chunks(columns: Vec<(String, LogicalType)>, chunks: Vec<DataChunk>) -> Self {
        let mut offsets = Vec::with_capacity(chunks.len());
        let mut row_count = 0;
        for chunk in &chunks {
            offsets.push(row_count);
            row_count += chunk.size();
        }
        ResultStream {
            columns: columns
                .into_iter()
                .map(|(name, ty)| ColumnMeta { name, ty })
                .collect(),
            chunks: chunks.into_iter().map(Some).collect(),
            offsets,
            mode: AccessMode::Unresolved,
            row_count,
            rows_changed: 0,
            error: String::new(),
        }
    }

    /// A zero-column result for data-changing statements.
    pub fn dml(rows_changed: usize) -> Self {
        ResultStream {
            rows_changed,
            ..Default::default()
        }
    }

    /// A broken stream carrying only a diagnostic. Chunk fetches fail with
    /// the message; scalar reads degrade to zero values.
    pub fn failed(error: impl Into<String>) -> Self {
        ResultStream {
            error: error.into(),
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The name of column `index`; out of range fails.
    pub fn column_name(&self, index: usize) -> Result<&str> {
        self.columns
            .get(index)
            .map(|c| c.name.as_str())
            .ok_or_else(|| eyre::eyre!("column index {index} out of range"))
    }

    /// The kind of column `index`, `Invalid` out of range.
    pub fn column_kind(&self, index: usize) -> TypeKind {
        self.columns.get(index).map(|c| c.ty.kind()).unwrap_or_default()
    }

    /// The full type of column `index`, `Invalid` out of range.
    pub fn column_logical_type(&self, index: usize) -> LogicalType {
        self.columns
            .get(index)
            .map(|c| c.ty.clone())
            .unwrap_or_default()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows affected by a data-changing statement.
    pub fn rows_changed(&self) -> usize {
        self.rows_changed
    }

    /// The sticky diagnostic, empty for a healthy stream.
    pub fn error(&self) -> &str {
        &self.error
    }

    // ------------------------------------------------------------------
    // Chunk mode
    // ------------------------------------------------------------------

    /// Takes the chunk at `index`, committing the stream to chunk mode.
    ///
    /// `Ok(None)` means exhaustion: the index is past the last chunk or was
    /// already consumed. A broken stream or a stream already committed to
    /// scalar mode fails instead.
    pub fn fetch_chunk(&mut self, index: usize) -> Result<Option<DataChunk>> {
        if !self.error.is_empty() {
            bail!("result stream is broken: {}", self.error);
        }
        if self.mode == AccessMode::Scalar {
            bail!("result stream is committed to scalar access; chunk fetch is unavailable");
        }
        self.mode = AccessMode::Chunk;
        Ok(self.chunks.get_mut(index).and_then(Option::take))
    }

    // ------------------------------------------------------------------
    // Scalar mode
    // ------------------------------------------------------------------

    /// Reads the cell at `(col, row)`, committing the stream to scalar mode.
    ///
    /// `None` covers every degraded case — out of range, nested column,
    /// broken stream, or a stream already committed to chunk mode — and the
    /// typed accessors map it to their zero values.
    fn scalar_value(&mut self, col: usize, row: usize) -> Option<Value> {
        if !self.error.is_empty() || self.mode == AccessMode::Chunk {
            return None;
        }
        self.mode = AccessMode::Scalar;
        if col >= self.columns.len() || row >= self.row_count {
            return None;
        }
        let chunk_index = self.offsets.partition_point(|&start| start <= row) - 1;
        let chunk = self.chunks[chunk_index].as_ref()?;
        chunk
            .vector(col)
            .ok()?
            .value_at(row - self.offsets[chunk_index])
            .ok()
    }

    /// True when the cell holds NULL. Out-of-range cells report `false`,
    /// matching the relaxed-bounds convention of the scalar surface.
    pub fn is_null(&mut self, col: usize, row: usize) -> bool {
        matches!(self.scalar_value(col, row), Some(Value::Null))
    }

    scalar_value_methods! {
        boolean => bool, false, |v| match v { Value::Boolean(b) => Some(*b), _ => None },
        int8 => i8, 0, |v| v.integer().and_then(|i| i8::try_from(i).ok()),
        int16 => i16, 0, |v| v.integer().and_then(|i| i16::try_from(i).ok()),
        int32 => i32, 0, |v| v.integer().and_then(|i| i32::try_from(i).ok()),
        int64 => i64, 0, |v| v.integer().and_then(|i| i64::try_from(i).ok()),
        uint8 => u8, 0, |v| v.integer().and_then(|i| u8::try_from(i).ok()),
        uint16 => u16, 0, |v| v.integer().and_then(|i| u16::try_from(i).ok()),
        uint32 => u32, 0, |v| v.integer().and_then(|i| u32::try_from(i).ok()),
        uint64 => u64, 0, |v| v.integer().and_then(|i| u64::try_from(i).ok()),
        hugeint => i128, 0, |v| v.integer(),
        float => f32, 0.0, |v| v.real().map(|f| f as f32),
        double => f64, 0.0, |v| v.real(),
        date => Date, Date::default(), |v| match v { Value::Date(d) => Some(*d), _ => None },
        time => Time, Time::default(), |v| match v { Value::Time(t) => Some(*t), _ => None },
        timestamp => Timestamp, Timestamp::default(), |v| match v { Value::Timestamp(t) => Some(*t), _ => None },
        interval => Interval, Interval::default(), |v| match v { Value::Interval(i) => Some(*i), _ => None },
        decimal => Decimal, Decimal::ZERO, |v| match v { Value::Decimal(d) => Some(*d), _ => None },
    }

    /// Renders the cell as text; non-renderable kinds and degraded cases
    /// yield the empty string.
    pub fn value_varchar(&mut self, col: usize, row: usize) -> String {
        self.scalar_value(col, row)
            .map(|v| v.render())
            .unwrap_or_default()
    }

    /// The cell's blob payload, empty for anything that is not a blob.
    pub fn value_blob(&mut self, col: usize, row: usize) -> Vec<u8> {
        match self.scalar_value(col, row) {
            Some(Value::Blob(bytes)) => bytes,
            _ => Vec::new(),
        }
    }
}
