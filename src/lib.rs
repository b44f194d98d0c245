//! # quiver - Embedded Columnar Data-Chunk Engine
//!
//! quiver is the vectorized transfer layer of an embedded analytical
//! database: typed columnar vectors with lazy validity bitmaps, fixed-size
//! data chunks, a pull-based result stream, a push-based row appender, a
//! positional value binder, and a three-phase table-function bridge. This
//! Rust implementation prioritizes:
//!
//! - **Flat columnar buffers**: fixed-width payloads in aligned memory,
//!   typed views taken without copying
//! - **Lazy null tracking**: a vector carries no bitmap until a null is
//!   written; reads never allocate
//! - **Uniform failure surfaces**: zero-value handles, closed appenders and
//!   exhausted streams fail predictably instead of crashing
//!
//! ## Quick Start
//!
//! ```ignore
//! use quiver::{Database, LogicalType, TypeKind};
//!
//! let db = Database::open_in_memory()?;
//! let conn = db.connect();
//!
//! conn.create_table("users", [
//!     ("id", LogicalType::new(TypeKind::Int64)),
//!     ("name", LogicalType::new(TypeKind::Varchar)),
//! ])?;
//!
//! let mut appender = conn.appender(None, "users")?;
//! appender.begin_row()?;
//! appender.append_int64(1)?;
//! appender.append_varchar("Alice")?;
//! appender.end_row()?;
//! appender.flush()?;
//!
//! let mut result = conn.scan("users")?;
//! assert_eq!(result.value_varchar(1, 0), "Alice");
//! ```
//!
//! ## Architecture
//!
//! quiver uses a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    Public API (Database/Connection)  │
//! ├─────────────────────────────────────┤
//! │ Appender │ ResultStream │ Statements │
//! ├─────────────────────────────────────┤
//! │      Table Function Bridge           │
//! ├─────────────────────────────────────┤
//! │      DataChunk (columnar batch)      │
//! ├─────────────────────────────────────┤
//! │   Vector + ValidityBitmap payloads   │
//! ├─────────────────────────────────────┤
//! │      Logical Type Registry           │
//! └─────────────────────────────────────┘
//! ```
//!
//! SQL parsing, planning, transactions and the on-disk format are external
//! collaborators; the crate reaches them only through the `TableSink` and
//! `StatementRoute` seams, with an in-memory table store standing in so
//! every path is exercisable.
//!
//! ## Module Overview
//!
//! - [`types`]: logical type tree, storage-kind mapping, scalar values
//! - [`vector`]: typed vectors, validity bitmaps, data chunks
//! - [`result`]: chunk-mode / scalar-mode result streams
//! - [`appender`]: row-to-columnar buffering writer
//! - [`statement`]: positional parameter binder
//! - [`table_function`]: bind/init/function callback protocol
//! - [`engine`]: database facade, in-memory tables, replacement scans
//! - [`config`]: option registry and validated option map

#[macro_use]
mod macros;

pub mod appender;
pub mod config;
pub mod engine;
pub mod result;
pub mod statement;
pub mod table_function;
pub mod types;
pub mod vector;

pub use appender::{Appender, SharedSink, TableSink};
pub use config::{config_count, config_flag, AccessMode, Config, ConfigFlag, VECTOR_CAPACITY};
pub use engine::{Connection, Database, MemoryTable, ReplacementCall, ReplacementScan};
pub use result::ResultStream;
pub use statement::{PreparedStatement, StatementRoute};
pub use table_function::{
    run_table_function, BindInfo, FunctionInfo, InitInfo, TableFunction, TableFunctionDef,
};
pub use types::value::{Date, Decimal, Interval, Time, Timestamp, Value};
pub use types::{LogicalType, StructField, TypeKind};
pub use vector::chunk::DataChunk;
pub use vector::validity::ValidityBitmap;
pub use vector::{ListEntry, Vector};
