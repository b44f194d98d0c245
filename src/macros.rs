//! # Internal Macros
//!
//! This module provides internal macros for reducing boilerplate in quiver.
//!
//! The engine surface repeats the same family of operations once per scalar
//! kind: the appender has one `append_*` method per kind, the prepared
//! statement one `bind_*` method, and the result stream one `value_*`
//! accessor. Each family funnels into a single `Value`-based implementation;
//! the macros below generate the typed wrappers so the per-kind methods
//! cannot drift apart.
//!
//! ## Usage
//!
//! ```ignore
//! impl Appender {
//!     append_value_methods! {
//!         boolean => bool as Boolean,
//!         int64 => i64 as Int64,
//!     }
//! }
//! // Generates:
//! // pub fn append_boolean(&mut self, value: bool) -> Result<()> { ... }
//! // pub fn append_int64(&mut self, value: i64) -> Result<()> { ... }
//! ```

/// Generates typed `append_<kind>` wrappers over `Appender::append_value`.
#[macro_export]
macro_rules! append_value_methods {
    ($($name:ident => $ty:ty as $variant:ident),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = concat!("Appends a `", stringify!($ty), "` to the current column of the row in progress.")]
                pub fn [<append_ $name>](&mut self, value: $ty) -> ::eyre::Result<()> {
                    self.append_value($crate::types::value::Value::$variant(value))
                }
            )*
        }
    };
}

/// Generates typed `bind_<kind>` wrappers over `PreparedStatement::bind_value`.
#[macro_export]
macro_rules! bind_value_methods {
    ($($name:ident => $ty:ty as $variant:ident),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = concat!("Binds a `", stringify!($ty), "` to the 1-based parameter at `index`.")]
                pub fn [<bind_ $name>](&mut self, index: usize, value: $ty) -> ::eyre::Result<()> {
                    self.bind_value(index, $crate::types::value::Value::$variant(value))
                }
            )*
        }
    };
}

/// Generates scalar `value_<kind>` accessors over `ResultStream::scalar_value`.
///
/// Each accessor returns the extracted value, or the supplied zero value when
/// the cell is null, out of range, of an incompatible kind, or the stream is
/// committed to chunk mode. The scalar surface deliberately has no error
/// channel.
#[macro_export]
macro_rules! scalar_value_methods {
    ($($name:ident => $ty:ty, $zero:expr, $extract:expr),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = concat!("Reads the `(col, row)` cell as `", stringify!($ty), "`, returning the zero value for null or unavailable cells.")]
                pub fn [<value_ $name>](&mut self, col: usize, row: usize) -> $ty {
                    let extract: fn(&$crate::types::value::Value) -> Option<$ty> = $extract;
                    match self.scalar_value(col, row) {
                        Some(ref value) => extract(value).unwrap_or($zero),
                        None => $zero,
                    }
                }
            )*
        }
    };
}
