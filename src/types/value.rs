//! # Scalar Value Representation
//!
//! This module provides the owned scalar [`Value`] that crosses the engine
//! surface — appender inputs, bound statement parameters, table-function
//! call arguments — and the plain-data carrier structs for the temporal and
//! decimal kinds.
//!
//! ## Design
//!
//! 1. **Owned, no lifetimes**: values flow into buffered chunks and outlive
//!    the call that produced them, so everything is heap-owned.
//! 2. **Plain-data carriers**: [`Date`], [`Time`], [`Timestamp`] and
//!    [`Interval`] derive the `zerocopy` traits so vectors can store them
//!    directly in flat payload buffers.
//! 3. **Raw ticks**: temporal values carry raw counts (days since epoch,
//!    microseconds since midnight, ticks in the column's timestamp unit).
//!    Calendar math belongs to the host, not the transfer layer.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::TypeKind;

/// Days since the Unix epoch.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct Date {
    pub days: i32,
}

/// Microseconds since midnight.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct Time {
    pub micros: i64,
}

/// Ticks since the Unix epoch, in the unit of the column's timestamp kind
/// (microseconds for `Timestamp`, seconds for `TimestampS`, and so on).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct Timestamp {
    pub micros: i64,
}

/// A calendar-aware duration: months and days vary in length, the remainder
/// is exact microseconds.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

/// A decimal value: `value` is the unscaled integer, so the represented
/// number is `value / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decimal {
    pub width: u8,
    pub scale: u8,
    pub value: i128,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        width: 0,
        scale: 0,
        value: 0,
    };

    pub fn new(width: u8, scale: u8, value: i128) -> Self {
        Decimal { width, scale, value }
    }
}

/// An owned scalar crossing the engine surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    HugeInt(i128),
    Decimal(Decimal),
    Varchar(String),
    Blob(Vec<u8>),
    Date(Date),
    Time(Time),
    Timestamp(Timestamp),
    Interval(Interval),
}

impl Value {
    /// The type kind this value would occupy in a column.
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::Null => TypeKind::Invalid,
            Value::Boolean(_) => TypeKind::Boolean,
            Value::Int8(_) => TypeKind::Int8,
            Value::Int16(_) => TypeKind::Int16,
            Value::Int32(_) => TypeKind::Int32,
            Value::Int64(_) => TypeKind::Int64,
            Value::UInt8(_) => TypeKind::UInt8,
            Value::UInt16(_) => TypeKind::UInt16,
            Value::UInt32(_) => TypeKind::UInt32,
            Value::UInt64(_) => TypeKind::UInt64,
            Value::Float(_) => TypeKind::Float,
            Value::Double(_) => TypeKind::Double,
            Value::HugeInt(_) => TypeKind::HugeInt,
            Value::Decimal(_) => TypeKind::Decimal,
            Value::Varchar(_) => TypeKind::Varchar,
            Value::Blob(_) => TypeKind::Blob,
            Value::Date(_) => TypeKind::Date,
            Value::Time(_) => TypeKind::Time,
            Value::Timestamp(_) => TypeKind::Timestamp,
            Value::Interval(_) => TypeKind::Interval,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widening view of any integer-family value.
    pub fn integer(&self) -> Option<i128> {
        match self {
            Value::Int8(v) => Some(*v as i128),
            Value::Int16(v) => Some(*v as i128),
            Value::Int32(v) => Some(*v as i128),
            Value::Int64(v) => Some(*v as i128),
            Value::UInt8(v) => Some(*v as i128),
            Value::UInt16(v) => Some(*v as i128),
            Value::UInt32(v) => Some(*v as i128),
            Value::UInt64(v) => Some(*v as i128),
            Value::HugeInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Widening view of any numeric value as a double.
    pub fn real(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => self.integer().map(|v| v as f64),
        }
    }

    /// Renders integral, floating, boolean and string values; other kinds
    /// (and null) render as the empty string, matching the lenient scalar
    /// accessor convention.
    pub fn render(&self) -> String {
        match self {
            Value::Boolean(v) => v.to_string(),
            Value::Int8(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::UInt8(v) => v.to_string(),
            Value::UInt16(v) => v.to_string(),
            Value::UInt32(v) => v.to_string(),
            Value::UInt64(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::HugeInt(v) => v.to_string(),
            Value::Varchar(v) => v.clone(),
            _ => String::new(),
        }
    }
}
