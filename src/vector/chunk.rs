//! # Data Chunks
//!
//! A [`DataChunk`] is the unit of vectorized transfer: an ordered set of
//! vectors, one per column, all sharing one logical row count. Result
//! streams hand chunks out; appenders and table functions fill them in.
//!
//! Rows `[0, size)` of every vector are meaningful; rows `[size, capacity)`
//! are undefined. `reset` rewinds the size and invalidates the auxiliary
//! buffers so a chunk can be refilled with different string and list content
//! without reallocating its structure.

use eyre::{bail, ensure, Result};
use smallvec::SmallVec;

use crate::config::VECTOR_CAPACITY;
use crate::types::LogicalType;

use super::Vector;

/// A fixed-capacity batch of column vectors sharing one row count.
#[derive(Debug, Clone, Default)]
pub struct DataChunk {
    types: SmallVec<[LogicalType; 8]>,
    vectors: Vec<Vector>,
    size: usize,
    capacity: usize,
}

impl DataChunk {
    /// Creates a chunk with one eagerly-built vector per type and capacity
    /// [`VECTOR_CAPACITY`]. Fails on an empty type list.
    pub fn new(types: &[LogicalType]) -> Result<Self> {
        Self::with_capacity(types, VECTOR_CAPACITY)
    }

    /// Creates a chunk with an explicit row capacity.
    pub fn with_capacity(types: &[LogicalType], capacity: usize) -> Result<Self> {
        ensure!(!types.is_empty(), "cannot create a data chunk with no columns");
        ensure!(capacity > 0, "data chunk capacity must be positive");
        let vectors = types
            .iter()
            .map(|ty| Vector::new(ty, capacity))
            .collect::<Result<Vec<_>>>()?;
        Ok(DataChunk {
            types: types.iter().cloned().collect(),
            vectors,
            size: 0,
            capacity,
        })
    }

    fn is_initialized(&self) -> bool {
        !self.vectors.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn column_types(&self) -> &[LogicalType] {
        &self.types
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The logical row count.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The column vector at `index`; out-of-range indices and uninitialized
    /// chunks fail with a range error rather than panicking.
    pub fn vector(&self, index: usize) -> Result<&Vector> {
        ensure!(self.is_initialized(), "data chunk is not initialized");
        self.vectors
            .get(index)
            .ok_or_else(|| eyre::eyre!("column index {index} out of range"))
    }

    pub fn vector_mut(&mut self, index: usize) -> Result<&mut Vector> {
        ensure!(self.is_initialized(), "data chunk is not initialized");
        let columns = self.vectors.len();
        self.vectors
            .get_mut(index)
            .ok_or_else(|| eyre::eyre!("column index {index} out of range ({columns} columns)"))
    }

    /// Declares the logical row count. Fails beyond the capacity, leaving
    /// the previous size in place.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if !self.is_initialized() {
            bail!("data chunk is not initialized");
        }
        ensure!(
            size <= self.capacity,
            "chunk size {size} exceeds capacity {}",
            self.capacity
        );
        self.size = size;
        Ok(())
    }

    /// Rewinds the size to zero and resets every vector, keeping the
    /// type-derived structure for reuse.
    pub fn reset(&mut self) {
        self.size = 0;
        for vector in &mut self.vectors {
            vector.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::Value;
    use crate::types::TypeKind;

    fn two_column_chunk() -> DataChunk {
        DataChunk::new(&[
            LogicalType::new(TypeKind::Int64),
            LogicalType::new(TypeKind::Varchar),
        ])
        .expect("chunk")
    }

    #[test]
    fn empty_type_list_is_rejected() {
        assert!(DataChunk::new(&[]).is_err());
    }

    #[test]
    fn uninitialized_chunk_fails_without_panicking() {
        let mut chunk = DataChunk::default();
        assert!(chunk.vector(0).is_err());
        assert!(chunk.set_size(1).is_err());
        chunk.reset();
        assert_eq!(chunk.size(), 0);
    }

    #[test]
    fn vectors_are_created_eagerly_per_type() {
        let chunk = two_column_chunk();
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(chunk.capacity(), VECTOR_CAPACITY);
        assert_eq!(
            chunk.vector(0).expect("col 0").logical_type().kind(),
            TypeKind::Int64
        );
        assert!(chunk.vector(2).is_err());
    }

    #[test]
    fn set_size_clamps_to_capacity() {
        let mut chunk = two_column_chunk();
        chunk.set_size(VECTOR_CAPACITY).expect("exactly capacity");
        assert_eq!(chunk.size(), VECTOR_CAPACITY);

        assert!(chunk.set_size(VECTOR_CAPACITY + 1).is_err());
        assert_eq!(chunk.size(), VECTOR_CAPACITY, "failed set leaves size alone");
    }

    #[test]
    fn reset_allows_reuse_with_new_content() {
        let mut chunk = two_column_chunk();
        chunk
            .vector_mut(1)
            .expect("varchar column")
            .assign_string(0, "a string long enough for the heap")
            .expect("assign");
        chunk.set_size(1).expect("size");

        chunk.reset();
        assert_eq!(chunk.size(), 0);
        assert_eq!(
            chunk.vector(1).expect("col").string_at(0).expect("cleared"),
            ""
        );

        chunk
            .vector_mut(0)
            .expect("int column")
            .set_value(0, &Value::Int64(5))
            .expect("refill");
        chunk.set_size(1).expect("size again");
    }
}
