//! # Logical Type Registry
//!
//! This module provides the logical type tree that describes every column the
//! engine can transfer: primitives, decimals, enums, and the nested list,
//! struct and map types.
//!
//! ## Design Goals
//!
//! 1. **Value semantics**: a [`LogicalType`] is an immutable tree owned
//!    independently by each holder. Cloning a type clones the tree; there is
//!    no shared registry state to synchronize.
//! 2. **Speculative introspection**: callers probe types without knowing
//!    their kind first. Every introspection method on the wrong kind (or on
//!    the `Invalid` sentinel) returns a defined zero value, empty string, or
//!    `Invalid` type — never an error and never a panic.
//! 3. **Derived storage kinds**: decimals and enums pick their physical
//!    storage width from their parameters, so the vector layer never guesses.
//!
//! ## Storage Kind Tables
//!
//! | Decimal width | Internal kind |
//! |---------------|---------------|
//! | 1..=4         | `Int16`       |
//! | 5..=9         | `Int32`       |
//! | 10..=18       | `Int64`       |
//! | 19..=38       | `HugeInt`     |
//!
//! | Enum dictionary size | Internal kind |
//! |----------------------|---------------|
//! | 1..=256              | `UInt8`       |
//! | 257..=65536          | `UInt16`      |
//! | above                | `UInt32`      |

pub mod value;

use eyre::{ensure, Result};
use smallvec::SmallVec;

use crate::config::{
    DECIMAL_WIDTH_INT16, DECIMAL_WIDTH_INT32, DECIMAL_WIDTH_INT64, ENUM_DICT_UINT16,
    ENUM_DICT_UINT8, MAX_DECIMAL_WIDTH,
};

/// Flat discriminant for every supported column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TypeKind {
    #[default]
    Invalid = 0,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    /// Timestamp in microseconds.
    Timestamp,
    /// Days since the epoch.
    Date,
    /// Microseconds since midnight.
    Time,
    Interval,
    HugeInt,
    Varchar,
    Blob,
    Decimal,
    /// Timestamp in seconds.
    TimestampS,
    /// Timestamp in milliseconds.
    TimestampMs,
    /// Timestamp in nanoseconds.
    TimestampNs,
    Enum,
    List,
    Struct,
    Map,
    Uuid,
    Json,
}

impl TypeKind {
    /// Payload width in bytes for fixed-width kinds, `None` for
    /// variable-length and nested kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TypeKind::Boolean | TypeKind::Int8 | TypeKind::UInt8 => Some(1),
            TypeKind::Int16 | TypeKind::UInt16 => Some(2),
            TypeKind::Int32 | TypeKind::UInt32 | TypeKind::Float | TypeKind::Date => Some(4),
            TypeKind::Int64
            | TypeKind::UInt64
            | TypeKind::Double
            | TypeKind::Time
            | TypeKind::Timestamp
            | TypeKind::TimestampS
            | TypeKind::TimestampMs
            | TypeKind::TimestampNs => Some(8),
            TypeKind::Interval | TypeKind::HugeInt | TypeKind::Uuid => Some(16),
            _ => None,
        }
    }

    /// True for the kinds that carry parameters and cannot be built with
    /// [`LogicalType::new`].
    pub fn is_parameterized(self) -> bool {
        matches!(
            self,
            TypeKind::Decimal | TypeKind::Enum | TypeKind::List | TypeKind::Struct | TypeKind::Map
        )
    }
}

/// One named field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: LogicalType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeRepr {
    Simple(TypeKind),
    Decimal {
        width: u8,
        scale: u8,
    },
    Enum {
        dictionary: Vec<String>,
    },
    List {
        child: Box<LogicalType>,
    },
    Struct {
        fields: Box<SmallVec<[StructField; 4]>>,
    },
    Map {
        key: Box<LogicalType>,
        value: Box<LogicalType>,
    },
}

/// A column type, described as an immutable tagged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalType {
    repr: TypeRepr,
}

impl Default for LogicalType {
    fn default() -> Self {
        Self::invalid()
    }
}

impl LogicalType {
    /// The `Invalid` sentinel, returned by all failed introspection.
    pub fn invalid() -> Self {
        LogicalType {
            repr: TypeRepr::Simple(TypeKind::Invalid),
        }
    }

    /// Creates a non-parameterized type.
    ///
    /// Parameterized kinds (decimal, enum, list, struct, map) cannot be
    /// described by a bare kind; asking for one yields the `Invalid`
    /// sentinel, matching the lenient creation contract callers rely on.
    pub fn new(kind: TypeKind) -> Self {
        if kind.is_parameterized() {
            return Self::invalid();
        }
        LogicalType {
            repr: TypeRepr::Simple(kind),
        }
    }

    /// Creates a decimal type. Width must be in `[1, 38]`, scale at most the
    /// width.
    pub fn decimal(width: u8, scale: u8) -> Result<Self> {
        ensure!(
            (1..=MAX_DECIMAL_WIDTH).contains(&width),
            "decimal width {width} out of range [1, {MAX_DECIMAL_WIDTH}]"
        );
        ensure!(scale <= width, "decimal scale {scale} exceeds width {width}");
        Ok(LogicalType {
            repr: TypeRepr::Decimal { width, scale },
        })
    }

    /// Creates an enum type over an ordered, non-empty dictionary.
    pub fn enumeration<I, S>(dictionary: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary: Vec<String> = dictionary.into_iter().map(Into::into).collect();
        ensure!(!dictionary.is_empty(), "enum dictionary must not be empty");
        Ok(LogicalType {
            repr: TypeRepr::Enum { dictionary },
        })
    }

    /// Creates a list type over `child` elements.
    pub fn list(child: LogicalType) -> Self {
        LogicalType {
            repr: TypeRepr::List {
                child: Box::new(child),
            },
        }
    }

    /// Creates a struct type from ordered `(name, type)` fields.
    pub fn structure<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, LogicalType)>,
        S: Into<String>,
    {
        let fields: SmallVec<[StructField; 4]> = fields
            .into_iter()
            .map(|(name, ty)| StructField {
                name: name.into(),
                ty,
            })
            .collect();
        ensure!(!fields.is_empty(), "struct type must have at least one field");
        for field in &fields {
            ensure!(!field.name.is_empty(), "struct field names must not be empty");
        }
        Ok(LogicalType {
            repr: TypeRepr::Struct { fields: Box::new(fields) },
        })
    }

    /// Creates a map type from `key` to `value`.
    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        LogicalType {
            repr: TypeRepr::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
        }
    }

    /// The discriminant of this type.
    pub fn kind(&self) -> TypeKind {
        match &self.repr {
            TypeRepr::Simple(kind) => *kind,
            TypeRepr::Decimal { .. } => TypeKind::Decimal,
            TypeRepr::Enum { .. } => TypeKind::Enum,
            TypeRepr::List { .. } => TypeKind::List,
            TypeRepr::Struct { .. } => TypeKind::Struct,
            TypeRepr::Map { .. } => TypeKind::Map,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.kind() == TypeKind::Invalid
    }

    // ------------------------------------------------------------------
    // Decimal introspection
    // ------------------------------------------------------------------

    pub fn decimal_width(&self) -> u8 {
        match &self.repr {
            TypeRepr::Decimal { width, .. } => *width,
            _ => 0,
        }
    }

    pub fn decimal_scale(&self) -> u8 {
        match &self.repr {
            TypeRepr::Decimal { scale, .. } => *scale,
            _ => 0,
        }
    }

    /// The integer kind a decimal of this width is stored as.
    pub fn decimal_internal_kind(&self) -> TypeKind {
        match &self.repr {
            TypeRepr::Decimal { width, .. } => {
                if *width <= DECIMAL_WIDTH_INT16 {
                    TypeKind::Int16
                } else if *width <= DECIMAL_WIDTH_INT32 {
                    TypeKind::Int32
                } else if *width <= DECIMAL_WIDTH_INT64 {
                    TypeKind::Int64
                } else {
                    TypeKind::HugeInt
                }
            }
            _ => TypeKind::Invalid,
        }
    }

    // ------------------------------------------------------------------
    // Enum introspection
    // ------------------------------------------------------------------

    /// The ordinal kind an enum of this dictionary size is stored as.
    pub fn enum_internal_kind(&self) -> TypeKind {
        match &self.repr {
            TypeRepr::Enum { dictionary } => {
                if dictionary.len() <= ENUM_DICT_UINT8 {
                    TypeKind::UInt8
                } else if dictionary.len() <= ENUM_DICT_UINT16 {
                    TypeKind::UInt16
                } else {
                    TypeKind::UInt32
                }
            }
            _ => TypeKind::Invalid,
        }
    }

    pub fn enum_dictionary_size(&self) -> usize {
        match &self.repr {
            TypeRepr::Enum { dictionary } => dictionary.len(),
            _ => 0,
        }
    }

    /// The dictionary entry at `index`, or the empty string out of range.
    pub fn enum_dictionary_value(&self, index: usize) -> &str {
        match &self.repr {
            TypeRepr::Enum { dictionary } => dictionary.get(index).map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }

    // ------------------------------------------------------------------
    // Nested type introspection
    // ------------------------------------------------------------------

    /// The element type of a list, or `Invalid` for any other kind.
    pub fn list_child_type(&self) -> LogicalType {
        match &self.repr {
            TypeRepr::List { child } => (**child).clone(),
            _ => Self::invalid(),
        }
    }

    pub fn struct_child_count(&self) -> usize {
        match &self.repr {
            TypeRepr::Struct { fields } => fields.len(),
            _ => 0,
        }
    }

    /// The name of struct field `index`, or the empty string.
    pub fn struct_child_name(&self, index: usize) -> &str {
        match &self.repr {
            TypeRepr::Struct { fields } => fields.get(index).map(|f| f.name.as_str()).unwrap_or(""),
            _ => "",
        }
    }

    /// The type of struct field `index`, or `Invalid`.
    pub fn struct_child_type(&self, index: usize) -> LogicalType {
        match &self.repr {
            TypeRepr::Struct { fields } => fields
                .get(index)
                .map(|f| f.ty.clone())
                .unwrap_or_else(Self::invalid),
            _ => Self::invalid(),
        }
    }

    pub fn map_key_type(&self) -> LogicalType {
        match &self.repr {
            TypeRepr::Map { key, .. } => (**key).clone(),
            _ => Self::invalid(),
        }
    }

    pub fn map_value_type(&self) -> LogicalType {
        match &self.repr {
            TypeRepr::Map { value, .. } => (**value).clone(),
            _ => Self::invalid(),
        }
    }

    /// Width in bytes of one payload element of this type, `None` for
    /// variable-length and nested types.
    pub(crate) fn storage_width(&self) -> Option<usize> {
        match &self.repr {
            TypeRepr::Simple(kind) => kind.fixed_width(),
            TypeRepr::Decimal { .. } => self.decimal_internal_kind().fixed_width(),
            TypeRepr::Enum { .. } => self.enum_internal_kind().fixed_width(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_kinds_construct() {
        assert_eq!(LogicalType::new(TypeKind::Int32).kind(), TypeKind::Int32);
        assert_eq!(LogicalType::new(TypeKind::Varchar).kind(), TypeKind::Varchar);
        assert_eq!(LogicalType::default().kind(), TypeKind::Invalid);
    }

    #[test]
    fn parameterized_kinds_need_parameters() {
        assert!(LogicalType::new(TypeKind::Decimal).is_invalid());
        assert!(LogicalType::new(TypeKind::List).is_invalid());
        assert!(LogicalType::new(TypeKind::Struct).is_invalid());
    }

    #[test]
    fn decimal_round_trip_and_internal_kinds() {
        let ty = LogicalType::decimal(18, 4).expect("valid decimal");
        assert_eq!(ty.kind(), TypeKind::Decimal);
        assert_eq!(ty.decimal_width(), 18);
        assert_eq!(ty.decimal_scale(), 4);
        assert_eq!(ty.decimal_internal_kind(), TypeKind::Int64);

        assert_eq!(
            LogicalType::decimal(4, 0).unwrap().decimal_internal_kind(),
            TypeKind::Int16
        );
        assert_eq!(
            LogicalType::decimal(9, 2).unwrap().decimal_internal_kind(),
            TypeKind::Int32
        );
        assert_eq!(
            LogicalType::decimal(38, 10).unwrap().decimal_internal_kind(),
            TypeKind::HugeInt
        );
    }

    #[test]
    fn decimal_rejects_bad_parameters() {
        assert!(LogicalType::decimal(0, 0).is_err());
        assert!(LogicalType::decimal(39, 0).is_err());
        assert!(LogicalType::decimal(10, 11).is_err());
    }

    #[test]
    fn enum_internal_kind_follows_dictionary_size() {
        let small = LogicalType::enumeration(["a", "b"]).unwrap();
        assert_eq!(small.enum_internal_kind(), TypeKind::UInt8);

        let medium = LogicalType::enumeration((0..300).map(|i| format!("v{i}"))).unwrap();
        assert_eq!(medium.enum_internal_kind(), TypeKind::UInt16);
        assert_eq!(medium.enum_dictionary_size(), 300);

        let large = LogicalType::enumeration((0..70000).map(|i| format!("v{i}"))).unwrap();
        assert_eq!(large.enum_internal_kind(), TypeKind::UInt32);
    }

    #[test]
    fn enum_dictionary_values() {
        let ty = LogicalType::enumeration(["red", "green", "blue"]).unwrap();
        assert_eq!(ty.enum_dictionary_value(1), "green");
        assert_eq!(ty.enum_dictionary_value(3), "");
    }

    #[test]
    fn nested_introspection() {
        let inner = LogicalType::list(LogicalType::new(TypeKind::Int64));
        let outer = LogicalType::list(inner.clone());
        assert_eq!(outer.list_child_type(), inner);
        assert_eq!(
            outer.list_child_type().list_child_type().kind(),
            TypeKind::Int64
        );

        let st = LogicalType::structure([
            ("id", LogicalType::new(TypeKind::Int32)),
            ("name", LogicalType::new(TypeKind::Varchar)),
        ])
        .unwrap();
        assert_eq!(st.struct_child_count(), 2);
        assert_eq!(st.struct_child_name(0), "id");
        assert_eq!(st.struct_child_name(1), "name");
        assert_eq!(st.struct_child_type(1).kind(), TypeKind::Varchar);
    }

    #[test]
    fn wrong_kind_introspection_returns_sentinels() {
        let ty = LogicalType::new(TypeKind::Int32);
        assert_eq!(ty.decimal_width(), 0);
        assert_eq!(ty.decimal_scale(), 0);
        assert_eq!(ty.decimal_internal_kind(), TypeKind::Invalid);
        assert_eq!(ty.enum_internal_kind(), TypeKind::Invalid);
        assert_eq!(ty.enum_dictionary_size(), 0);
        assert_eq!(ty.enum_dictionary_value(0), "");
        assert!(ty.list_child_type().is_invalid());
        assert_eq!(ty.struct_child_count(), 0);
        assert_eq!(ty.struct_child_name(0), "");
        assert!(ty.struct_child_type(0).is_invalid());
        assert!(ty.map_key_type().is_invalid());
    }
}
