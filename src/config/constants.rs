//! # Engine Layout Constants
//!
//! This module centralizes the constants that define the columnar layout,
//! grouping interdependent values together and documenting their
//! relationships. Constants that depend on each other are co-located to
//! prevent mismatch bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! VECTOR_CAPACITY (2048 rows)
//!       │
//!       ├─> DataChunk capacity (every chunk holds exactly this many slots;
//!       │     the last chunk of a stream may use fewer)
//!       │
//!       └─> ValidityBitmap word count (VECTOR_CAPACITY / 64 words per
//!             vector; the capacity must stay a multiple of 64 so a chunk
//!             never ends mid-word)
//!
//! STRING_INLINE_LEN (12 bytes)
//!       │
//!       └─> StringSlot layout: payloads at or below this length are stored
//!             inline in the slot, longer payloads go to the string heap.
//!             Performance-only; observable behavior is identical.
//!
//! MAX_DECIMAL_WIDTH (38 digits)
//!       │
//!       └─> Decimal internal storage breakpoints (4 / 9 / 18 digits select
//!             16/32/64-bit ints, anything wider is 128-bit)
//! ```
//!
//! ## Critical Invariants
//!
//! These invariants are enforced by compile-time assertions:
//!
//! 1. `VECTOR_CAPACITY > 0` and a power of two
//! 2. `VECTOR_CAPACITY % 64 == 0` (validity words never straddle a chunk)
//! 3. Decimal storage breakpoints are strictly increasing

// ============================================================================
// VECTOR LAYOUT
// ============================================================================

/// Number of row slots in every vector and data chunk.
///
/// This is the unit of vectorized transfer: result streams hand out chunks of
/// up to this many rows, and appenders hand chunks of exactly this many rows
/// to storage (the trailing partial chunk is flushed explicitly).
pub const VECTOR_CAPACITY: usize = 2048;

/// Number of 64-bit words in a validity bitmap sized to `VECTOR_CAPACITY`.
pub const VALIDITY_WORDS: usize = VECTOR_CAPACITY / 64;

const _: () = assert!(VECTOR_CAPACITY > 0, "vector capacity must be positive");
const _: () = assert!(
    VECTOR_CAPACITY.is_power_of_two(),
    "vector capacity must be a power of two"
);
const _: () = assert!(
    VECTOR_CAPACITY % 64 == 0,
    "vector capacity must be a whole number of validity words"
);

// ============================================================================
// STRING STORAGE
// ============================================================================

/// Maximum byte length stored inline in a string slot.
///
/// Longer strings are copied to the vector's auxiliary heap and the slot
/// keeps an `(offset, length)` pair. The threshold only affects locality,
/// never observable behavior.
pub const STRING_INLINE_LEN: usize = 12;

// ============================================================================
// DECIMAL AND ENUM STORAGE
// ============================================================================

/// Maximum supported decimal width (total digits).
pub const MAX_DECIMAL_WIDTH: u8 = 38;

/// Widest decimal width stored as a 16-bit integer.
pub const DECIMAL_WIDTH_INT16: u8 = 4;

/// Widest decimal width stored as a 32-bit integer.
pub const DECIMAL_WIDTH_INT32: u8 = 9;

/// Widest decimal width stored as a 64-bit integer.
pub const DECIMAL_WIDTH_INT64: u8 = 18;

/// Largest enum dictionary stored with 8-bit ordinals.
pub const ENUM_DICT_UINT8: usize = 256;

/// Largest enum dictionary stored with 16-bit ordinals.
pub const ENUM_DICT_UINT16: usize = 65536;

const _: () = assert!(
    DECIMAL_WIDTH_INT16 < DECIMAL_WIDTH_INT32 && DECIMAL_WIDTH_INT32 < DECIMAL_WIDTH_INT64,
    "decimal storage breakpoints must be strictly increasing"
);
const _: () = assert!(
    DECIMAL_WIDTH_INT64 < MAX_DECIMAL_WIDTH,
    "the widest decimals must fall through to 128-bit storage"
);
