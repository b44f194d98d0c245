//! # Typed Columnar Vectors
//!
//! This module provides [`Vector`], a single column's storage for up to
//! `VECTOR_CAPACITY` rows, and the payload layouts behind it.
//!
//! ## Payload Layouts
//!
//! | Column kind | Payload |
//! |-------------|---------|
//! | primitives, decimal internals, enum ordinals, date/time/timestamp/interval, uuid | flat fixed-width buffer |
//! | varchar, blob, json | string slots + auxiliary byte heap |
//! | list, map | `(offset, length)` entries + one child vector |
//! | struct | one child vector per field, aligned by row |
//!
//! The flat buffer is backed by 16-byte-aligned words so any primitive view
//! (`i8` through `i128`) can be taken with `zerocopy` without copying.
//!
//! ## Null Handling
//!
//! The validity bitmap is lazily allocated: a vector without one is entirely
//! valid, and reads never allocate. Writing a null (or calling
//! [`Vector::ensure_validity_writable`]) materializes a full all-valid
//! bitmap first, then applies the write.
//!
//! ## String Storage
//!
//! Strings at or below `STRING_INLINE_LEN` (12) bytes are stored inline in
//! the slot; longer ones are copied to the heap and referenced by
//! `(offset, length)`. The threshold affects locality only — `string_at`
//! behaves identically either side of it.
//!
//! ## Ownership
//!
//! A vector exclusively owns its bitmap, payload buffers, and child
//! vectors; dropping it releases the whole subtree.

pub mod chunk;
pub mod validity;

use eyre::{bail, ensure, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::config::STRING_INLINE_LEN;
use crate::types::value::{Decimal, Value};
use crate::types::{LogicalType, TypeKind};
use validity::ValidityBitmap;

/// One list row: `length` child elements starting at `offset`.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct ListEntry {
    pub offset: u64,
    pub length: u64,
}

/// Fixed-width payload storage, 16-byte aligned so every primitive slice
/// view is valid.
#[derive(Debug, Clone)]
struct FlatBuffer {
    raw: Vec<u128>,
    len: usize,
    width: usize,
}

impl FlatBuffer {
    fn new(width: usize, rows: usize) -> Self {
        let len = width * rows;
        FlatBuffer {
            raw: vec![0u128; len.div_ceil(16)],
            len,
            width,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.raw.as_bytes()[..self.len]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.raw.as_mut_bytes()[..self.len]
    }

    fn zero(&mut self) {
        self.raw.fill(0);
    }

    fn grow(&mut self, rows: usize) {
        let len = self.width * rows;
        self.raw.resize(len.div_ceil(16), 0);
        self.len = len;
    }
}

#[derive(Debug, Clone, Copy)]
enum StringSlot {
    Inline {
        len: u8,
        bytes: [u8; STRING_INLINE_LEN],
    },
    Heap {
        offset: u32,
        len: u32,
    },
}

impl Default for StringSlot {
    fn default() -> Self {
        StringSlot::Inline {
            len: 0,
            bytes: [0; STRING_INLINE_LEN],
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Payload {
    /// A default-constructed vector: every accessor fails.
    #[default]
    Uninitialized,
    Flat(FlatBuffer),
    Varlen {
        slots: Vec<StringSlot>,
        heap: Vec<u8>,
    },
    List {
        entries: Vec<ListEntry>,
        child: Box<Vector>,
        child_len: usize,
    },
    Struct {
        children: Vec<Vector>,
    },
}

/// A single column's storage: typed payload plus lazy validity.
#[derive(Debug, Clone, Default)]
pub struct Vector {
    ty: LogicalType,
    capacity: usize,
    validity: Option<ValidityBitmap>,
    payload: Payload,
}

impl Vector {
    /// Builds a vector for `ty` with `capacity` row slots.
    pub fn new(ty: &LogicalType, capacity: usize) -> Result<Self> {
        ensure!(capacity > 0, "vector capacity must be positive");
        let payload = match ty.kind() {
            TypeKind::Invalid => bail!("cannot create a vector of an invalid type"),
            TypeKind::Varchar | TypeKind::Blob | TypeKind::Json => Payload::Varlen {
                slots: vec![StringSlot::default(); capacity],
                heap: Vec::new(),
            },
            TypeKind::List => Payload::List {
                entries: vec![ListEntry::default(); capacity],
                child: Box::new(Vector::new(&ty.list_child_type(), capacity)?),
                child_len: 0,
            },
            TypeKind::Map => {
                // A map is transferred as a list of (key, value) structs.
                let entry_ty = LogicalType::structure([
                    ("key", ty.map_key_type()),
                    ("value", ty.map_value_type()),
                ])?;
                Payload::List {
                    entries: vec![ListEntry::default(); capacity],
                    child: Box::new(Vector::new(&entry_ty, capacity)?),
                    child_len: 0,
                }
            }
            TypeKind::Struct => {
                let mut children = Vec::with_capacity(ty.struct_child_count());
                for i in 0..ty.struct_child_count() {
                    children.push(Vector::new(&ty.struct_child_type(i), capacity)?);
                }
                Payload::Struct { children }
            }
            kind => {
                let width = ty
                    .storage_width()
                    .ok_or_else(|| eyre::eyre!("type kind {kind:?} has no storage width"))?;
                Payload::Flat(FlatBuffer::new(width, capacity))
            }
        };
        Ok(Vector {
            ty: ty.clone(),
            capacity,
            validity: None,
            payload,
        })
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.ty
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_initialized(&self) -> bool {
        !matches!(self.payload, Payload::Uninitialized)
    }

    // ------------------------------------------------------------------
    // Raw payload access
    // ------------------------------------------------------------------

    /// Raw payload bytes of a flat vector, or the list-entry buffer of a
    /// list vector. Fails with a "not available" condition on uninitialized
    /// vectors and on payloads without a raw byte form.
    pub fn data(&self) -> Result<&[u8]> {
        match &self.payload {
            Payload::Flat(buf) => Ok(buf.bytes()),
            Payload::List { entries, .. } => Ok(entries.as_slice().as_bytes()),
            _ => bail!("vector data not available"),
        }
    }

    pub fn data_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.payload {
            Payload::Flat(buf) => Ok(buf.bytes_mut()),
            Payload::List { entries, .. } => Ok(entries.as_mut_slice().as_mut_bytes()),
            _ => bail!("vector data not available"),
        }
    }

    /// Typed view over a flat payload. The element width must match the
    /// column's storage width.
    pub fn slice<T>(&self) -> Result<&[T]>
    where
        T: FromBytes + Immutable + KnownLayout,
    {
        let buf = self.flat()?;
        ensure!(
            core::mem::size_of::<T>() == buf.width,
            "element width {} does not match column storage width {}",
            core::mem::size_of::<T>(),
            buf.width
        );
        <[T]>::ref_from_bytes(buf.bytes()).map_err(|_| eyre::eyre!("payload view misaligned"))
    }

    /// Mutable typed view over a flat payload.
    pub fn slice_mut<T>(&mut self) -> Result<&mut [T]>
    where
        T: FromBytes + IntoBytes + Immutable + KnownLayout,
    {
        let buf = self.flat_mut()?;
        ensure!(
            core::mem::size_of::<T>() == buf.width,
            "element width {} does not match column storage width {}",
            core::mem::size_of::<T>(),
            buf.width
        );
        <[T]>::mut_from_bytes(buf.bytes_mut()).map_err(|_| eyre::eyre!("payload view misaligned"))
    }

    fn flat(&self) -> Result<&FlatBuffer> {
        match &self.payload {
            Payload::Flat(buf) => Ok(buf),
            _ => bail!("vector data not available"),
        }
    }

    fn flat_mut(&mut self) -> Result<&mut FlatBuffer> {
        match &mut self.payload {
            Payload::Flat(buf) => Ok(buf),
            _ => bail!("vector data not available"),
        }
    }

    // ------------------------------------------------------------------
    // Validity
    // ------------------------------------------------------------------

    /// The validity bitmap, failing with a "not available" condition while
    /// it has not been materialized (absent bitmap = all rows valid).
    pub fn validity(&self) -> Result<&ValidityBitmap> {
        ensure!(self.is_initialized(), "vector validity not available");
        self.validity
            .as_ref()
            .ok_or_else(|| eyre::eyre!("vector validity not available"))
    }

    /// Materializes an all-valid bitmap if none exists, upgrading later
    /// [`Vector::validity`] reads.
    pub fn ensure_validity_writable(&mut self) -> Result<&mut ValidityBitmap> {
        ensure!(self.is_initialized(), "vector validity not available");
        Ok(self
            .validity
            .get_or_insert_with(|| ValidityBitmap::all_valid(self.capacity)))
    }

    /// Lenient read path: an absent bitmap means every row is valid.
    pub fn row_is_valid(&self, row: usize) -> bool {
        match &self.validity {
            Some(bitmap) => bitmap.row_is_valid(row),
            None => true,
        }
    }

    /// Write path: materializes the bitmap before the first write.
    pub fn set_row_validity(&mut self, row: usize, valid: bool) -> Result<()> {
        ensure!(row < self.capacity, "row {row} out of range");
        self.ensure_validity_writable()?.set_row_validity(row, valid);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Strings and blobs
    // ------------------------------------------------------------------

    /// Stores a string at `row` of a varchar (or json) vector, choosing
    /// inline or heap storage internally.
    pub fn assign_string(&mut self, row: usize, text: &str) -> Result<()> {
        ensure!(
            matches!(self.ty.kind(), TypeKind::Varchar | TypeKind::Json),
            "assign_string on a {:?} vector",
            self.ty.kind()
        );
        self.assign_bytes(row, text.as_bytes())
    }

    /// Stores the first `len` bytes of `text`, which must fall on a char
    /// boundary.
    pub fn assign_string_len(&mut self, row: usize, text: &str, len: usize) -> Result<()> {
        ensure!(
            len <= text.len() && text.is_char_boundary(len),
            "length {len} is not a valid prefix of the string"
        );
        self.assign_string(row, &text[..len])
    }

    /// Stores a blob at `row` of a blob vector.
    pub fn assign_blob(&mut self, row: usize, data: &[u8]) -> Result<()> {
        ensure!(
            self.ty.kind() == TypeKind::Blob,
            "assign_blob on a {:?} vector",
            self.ty.kind()
        );
        self.assign_bytes(row, data)
    }

    fn assign_bytes(&mut self, row: usize, data: &[u8]) -> Result<()> {
        ensure!(row < self.capacity, "row {row} out of range");
        ensure!(data.len() <= u32::MAX as usize, "payload too large");
        let Payload::Varlen { slots, heap } = &mut self.payload else {
            bail!("vector data not available");
        };
        slots[row] = if data.len() <= STRING_INLINE_LEN {
            let mut bytes = [0u8; STRING_INLINE_LEN];
            bytes[..data.len()].copy_from_slice(data);
            StringSlot::Inline {
                len: data.len() as u8,
                bytes,
            }
        } else {
            let offset = heap.len() as u32;
            heap.extend_from_slice(data);
            StringSlot::Heap {
                offset,
                len: data.len() as u32,
            }
        };
        if let Some(bitmap) = &mut self.validity {
            bitmap.set_row_valid(row);
        }
        Ok(())
    }

    /// The string stored at `row`.
    pub fn string_at(&self, row: usize) -> Result<&str> {
        ensure!(
            matches!(self.ty.kind(), TypeKind::Varchar | TypeKind::Json),
            "string_at on a {:?} vector",
            self.ty.kind()
        );
        core::str::from_utf8(self.bytes_at(row)?)
            .map_err(|_| eyre::eyre!("row {row} holds invalid utf-8"))
    }

    /// The raw bytes stored at `row` of any variable-length vector.
    pub fn blob_at(&self, row: usize) -> Result<&[u8]> {
        self.bytes_at(row)
    }

    fn bytes_at(&self, row: usize) -> Result<&[u8]> {
        ensure!(row < self.capacity, "row {row} out of range");
        let Payload::Varlen { slots, heap } = &self.payload else {
            bail!("vector data not available");
        };
        Ok(match &slots[row] {
            StringSlot::Inline { len, bytes } => &bytes[..*len as usize],
            StringSlot::Heap { offset, len } => {
                &heap[*offset as usize..*offset as usize + *len as usize]
            }
        })
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// The element vector of a list (or map) vector.
    pub fn list_child(&self) -> Result<&Vector> {
        match &self.payload {
            Payload::List { child, .. } => Ok(child),
            _ => bail!("vector has no list child"),
        }
    }

    pub fn list_child_mut(&mut self) -> Result<&mut Vector> {
        match &mut self.payload {
            Payload::List { child, .. } => Ok(child),
            _ => bail!("vector has no list child"),
        }
    }

    /// The `(offset, length)` entries, one per row.
    pub fn list_entries(&self) -> Result<&[ListEntry]> {
        match &self.payload {
            Payload::List { entries, .. } => Ok(entries),
            _ => bail!("vector has no list entries"),
        }
    }

    pub fn list_entries_mut(&mut self) -> Result<&mut [ListEntry]> {
        match &mut self.payload {
            Payload::List { entries, .. } => Ok(entries),
            _ => bail!("vector has no list entries"),
        }
    }

    /// Number of child elements currently in use.
    pub fn list_size(&self) -> Result<usize> {
        match &self.payload {
            Payload::List { child_len, .. } => Ok(*child_len),
            _ => bail!("vector has no list size"),
        }
    }

    /// Declares `len` child elements in use; the child must already have the
    /// capacity (see [`Vector::list_reserve`]).
    pub fn list_set_size(&mut self, len: usize) -> Result<()> {
        let child_capacity = self.list_child()?.capacity();
        ensure!(
            len <= child_capacity,
            "list size {len} exceeds child capacity {child_capacity}"
        );
        match &mut self.payload {
            Payload::List { child_len, .. } => {
                *child_len = len;
                Ok(())
            }
            _ => bail!("vector has no list size"),
        }
    }

    /// Grows the child vector to hold at least `required` elements.
    pub fn list_reserve(&mut self, required: usize) -> Result<()> {
        let child = self.list_child_mut()?;
        if required > child.capacity() {
            let target = required.next_power_of_two().max(child.capacity() * 2);
            child.grow(target);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structs
    // ------------------------------------------------------------------

    pub fn struct_child_count(&self) -> usize {
        match &self.payload {
            Payload::Struct { children } => children.len(),
            _ => 0,
        }
    }

    /// The field vector at `index` of a struct vector.
    pub fn struct_child(&self, index: usize) -> Result<&Vector> {
        match &self.payload {
            Payload::Struct { children } => children
                .get(index)
                .ok_or_else(|| eyre::eyre!("struct child index {index} out of range")),
            _ => bail!("vector has no struct children"),
        }
    }

    pub fn struct_child_mut(&mut self, index: usize) -> Result<&mut Vector> {
        match &mut self.payload {
            Payload::Struct { children } => children
                .get_mut(index)
                .ok_or_else(|| eyre::eyre!("struct child index {index} out of range")),
            _ => bail!("vector has no struct children"),
        }
    }

    // ------------------------------------------------------------------
    // Scalar reads and writes
    // ------------------------------------------------------------------

    /// Writes a scalar into `row`, checking the value kind against the
    /// column type. `Null` marks the row invalid; any other value marks it
    /// valid again.
    pub fn set_value(&mut self, row: usize, value: &Value) -> Result<()> {
        ensure!(self.is_initialized(), "vector data not available");
        ensure!(row < self.capacity, "row {row} out of range");

        if value.is_null() {
            return self.set_row_validity(row, false);
        }

        match (self.ty.kind(), value) {
            (TypeKind::Boolean, Value::Boolean(v)) => self.write_flat(row, *v as u8)?,
            (TypeKind::Int8, Value::Int8(v)) => self.write_flat(row, *v)?,
            (TypeKind::Int16, Value::Int16(v)) => self.write_flat(row, *v)?,
            (TypeKind::Int32, Value::Int32(v)) => self.write_flat(row, *v)?,
            (TypeKind::Int64, Value::Int64(v)) => self.write_flat(row, *v)?,
            (TypeKind::UInt8, Value::UInt8(v)) => self.write_flat(row, *v)?,
            (TypeKind::UInt16, Value::UInt16(v)) => self.write_flat(row, *v)?,
            (TypeKind::UInt32, Value::UInt32(v)) => self.write_flat(row, *v)?,
            (TypeKind::UInt64, Value::UInt64(v)) => self.write_flat(row, *v)?,
            (TypeKind::Float, Value::Float(v)) => self.write_flat(row, *v)?,
            (TypeKind::Double, Value::Double(v)) => self.write_flat(row, *v)?,
            (TypeKind::HugeInt, Value::HugeInt(v)) => self.write_flat(row, *v)?,
            (TypeKind::Uuid, Value::HugeInt(v)) => self.write_flat(row, *v)?,
            (TypeKind::Date, Value::Date(v)) => self.write_flat(row, *v)?,
            (TypeKind::Time, Value::Time(v)) => self.write_flat(row, *v)?,
            (
                TypeKind::Timestamp | TypeKind::TimestampS | TypeKind::TimestampMs
                | TypeKind::TimestampNs,
                Value::Timestamp(v),
            ) => self.write_flat(row, *v)?,
            (TypeKind::Interval, Value::Interval(v)) => self.write_flat(row, *v)?,
            (TypeKind::Varchar | TypeKind::Json, Value::Varchar(v)) => {
                self.assign_string(row, v)?
            }
            (TypeKind::Blob, Value::Blob(v)) => self.assign_blob(row, v)?,
            (TypeKind::Decimal, Value::Decimal(v)) => {
                ensure!(
                    v.width == self.ty.decimal_width() && v.scale == self.ty.decimal_scale(),
                    "decimal({}, {}) value does not fit a decimal({}, {}) column",
                    v.width,
                    v.scale,
                    self.ty.decimal_width(),
                    self.ty.decimal_scale()
                );
                self.write_decimal(row, v.value)?
            }
            (TypeKind::Enum, _) => {
                let ordinal = value
                    .integer()
                    .ok_or_else(|| eyre::eyre!("enum columns take an unsigned ordinal"))?;
                ensure!(
                    ordinal >= 0 && (ordinal as usize) < self.ty.enum_dictionary_size(),
                    "enum ordinal {ordinal} out of range for dictionary of {}",
                    self.ty.enum_dictionary_size()
                );
                self.write_enum_ordinal(row, ordinal as u32)?
            }
            (kind, value) => bail!(
                "cannot write a {:?} value into a {kind:?} column",
                value.kind()
            ),
        }
        if let Some(bitmap) = &mut self.validity {
            bitmap.set_row_valid(row);
        }
        Ok(())
    }

    /// Reads the scalar at `row`. Invalid rows read as `Value::Null`; nested
    /// columns have no scalar form and fail.
    pub fn value_at(&self, row: usize) -> Result<Value> {
        ensure!(self.is_initialized(), "vector data not available");
        ensure!(row < self.capacity, "row {row} out of range");
        if !self.row_is_valid(row) {
            return Ok(Value::Null);
        }
        Ok(match self.ty.kind() {
            TypeKind::Boolean => Value::Boolean(self.read_flat::<u8>(row)? != 0),
            TypeKind::Int8 => Value::Int8(self.read_flat(row)?),
            TypeKind::Int16 => Value::Int16(self.read_flat(row)?),
            TypeKind::Int32 => Value::Int32(self.read_flat(row)?),
            TypeKind::Int64 => Value::Int64(self.read_flat(row)?),
            TypeKind::UInt8 => Value::UInt8(self.read_flat(row)?),
            TypeKind::UInt16 => Value::UInt16(self.read_flat(row)?),
            TypeKind::UInt32 => Value::UInt32(self.read_flat(row)?),
            TypeKind::UInt64 => Value::UInt64(self.read_flat(row)?),
            TypeKind::Float => Value::Float(self.read_flat(row)?),
            TypeKind::Double => Value::Double(self.read_flat(row)?),
            TypeKind::HugeInt | TypeKind::Uuid => Value::HugeInt(self.read_flat(row)?),
            TypeKind::Date => Value::Date(self.read_flat(row)?),
            TypeKind::Time => Value::Time(self.read_flat(row)?),
            TypeKind::Timestamp | TypeKind::TimestampS | TypeKind::TimestampMs
            | TypeKind::TimestampNs => Value::Timestamp(self.read_flat(row)?),
            TypeKind::Interval => Value::Interval(self.read_flat(row)?),
            TypeKind::Varchar | TypeKind::Json => Value::Varchar(self.string_at(row)?.to_string()),
            TypeKind::Blob => Value::Blob(self.blob_at(row)?.to_vec()),
            TypeKind::Decimal => Value::Decimal(Decimal {
                width: self.ty.decimal_width(),
                scale: self.ty.decimal_scale(),
                value: self.read_decimal(row)?,
            }),
            TypeKind::Enum => {
                let ordinal = self.read_enum_ordinal(row)?;
                Value::Varchar(self.ty.enum_dictionary_value(ordinal as usize).to_string())
            }
            kind => bail!("no scalar form for a {kind:?} column"),
        })
    }

    fn write_flat<T>(&mut self, row: usize, value: T) -> Result<()>
    where
        T: FromBytes + IntoBytes + Immutable + KnownLayout + Copy,
    {
        self.slice_mut::<T>()?[row] = value;
        Ok(())
    }

    fn read_flat<T>(&self, row: usize) -> Result<T>
    where
        T: FromBytes + Immutable + KnownLayout + Copy,
    {
        Ok(self.slice::<T>()?[row])
    }

    fn write_decimal(&mut self, row: usize, unscaled: i128) -> Result<()> {
        let overflow = || eyre::eyre!("decimal value {unscaled} overflows its storage width");
        match self.ty.decimal_internal_kind() {
            TypeKind::Int16 => {
                self.write_flat(row, i16::try_from(unscaled).map_err(|_| overflow())?)
            }
            TypeKind::Int32 => {
                self.write_flat(row, i32::try_from(unscaled).map_err(|_| overflow())?)
            }
            TypeKind::Int64 => {
                self.write_flat(row, i64::try_from(unscaled).map_err(|_| overflow())?)
            }
            _ => self.write_flat(row, unscaled),
        }
    }

    fn read_decimal(&self, row: usize) -> Result<i128> {
        Ok(match self.ty.decimal_internal_kind() {
            TypeKind::Int16 => self.read_flat::<i16>(row)? as i128,
            TypeKind::Int32 => self.read_flat::<i32>(row)? as i128,
            TypeKind::Int64 => self.read_flat::<i64>(row)? as i128,
            _ => self.read_flat::<i128>(row)?,
        })
    }

    fn write_enum_ordinal(&mut self, row: usize, ordinal: u32) -> Result<()> {
        match self.ty.enum_internal_kind() {
            TypeKind::UInt8 => self.write_flat(row, ordinal as u8),
            TypeKind::UInt16 => self.write_flat(row, ordinal as u16),
            _ => self.write_flat(row, ordinal),
        }
    }

    fn read_enum_ordinal(&self, row: usize) -> Result<u32> {
        Ok(match self.ty.enum_internal_kind() {
            TypeKind::UInt8 => self.read_flat::<u8>(row)? as u32,
            TypeKind::UInt16 => self.read_flat::<u16>(row)? as u32,
            _ => self.read_flat::<u32>(row)?,
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Drops the bitmap (back to all-valid), clears heaps and list sizes,
    /// and zeroes flat payloads. Type-derived structure is kept so the
    /// vector can be refilled without reallocating.
    pub fn reset(&mut self) {
        self.validity = None;
        match &mut self.payload {
            Payload::Uninitialized => {}
            Payload::Flat(buf) => buf.zero(),
            Payload::Varlen { slots, heap } => {
                slots.fill(StringSlot::default());
                heap.clear();
            }
            Payload::List {
                entries,
                child,
                child_len,
            } => {
                entries.fill(ListEntry::default());
                child.reset();
                *child_len = 0;
            }
            Payload::Struct { children } => {
                for child in children {
                    child.reset();
                }
            }
        }
    }

    /// Extends the row capacity, keeping existing content. Used by list
    /// vectors to grow their element child.
    pub(crate) fn grow(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }
        match &mut self.payload {
            Payload::Uninitialized => return,
            Payload::Flat(buf) => buf.grow(new_capacity),
            Payload::Varlen { slots, .. } => slots.resize(new_capacity, StringSlot::default()),
            Payload::List { entries, .. } => entries.resize(new_capacity, ListEntry::default()),
            Payload::Struct { children } => {
                for child in children {
                    child.grow(new_capacity);
                }
            }
        }
        if let Some(bitmap) = &mut self.validity {
            bitmap.grow(new_capacity);
        }
        self.capacity = new_capacity;
    }
}
