//! # Engine Facade
//!
//! The database/connection surface over the transfer layer, plus the
//! in-memory stand-in for the storage collaborator.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Public API (Database)            │
//! ├─────────────────────────────────────────┤
//! │ Connection: appender / scan / register  │
//! ├───────────────┬─────────────┬───────────┤
//! │  Table store  │ Table-func  │ Replace-  │
//! │  (MemoryTable)│  registry   │ ment scans│
//! ├───────────────┴─────────────┴───────────┤
//! │   Chunk / Vector / Validity transfer    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Query planning, optimization, transactions and the on-disk format are
//! external collaborators. This module reaches storage only through the
//! [`TableSink`] seam; [`MemoryTable`] implements it so every data path —
//! append, scan, table-function call, prepared call — runs end to end
//! in-process.
//!
//! ## Concurrency
//!
//! A [`Connection`] is not internally synchronized: one connection belongs
//! to one thread at a time. Independent connections over the same database
//! may run concurrently; the shared catalog and registries sit behind
//! `parking_lot` locks. Every call blocks until its result is available —
//! there is no cancellation primitive at this layer.

use std::sync::Arc;

use eyre::{bail, ensure, Result};
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::appender::{Appender, SharedSink, TableSink};
use crate::config::{AccessMode, Config};
use crate::result::ResultStream;
use crate::statement::{PreparedStatement, StatementRoute};
use crate::table_function::{parameter_kinds, run_table_function, TableFunctionDef};
use crate::types::value::Value;
use crate::types::{LogicalType, TypeKind};
use crate::vector::chunk::DataChunk;

/// Schema tables land in when no schema is given.
pub const DEFAULT_SCHEMA: &str = "main";

/// An in-memory, chunk-backed table: the storage collaborator stand-in.
pub struct MemoryTable {
    name: String,
    column_names: Vec<String>,
    column_types: Vec<LogicalType>,
    chunks: Vec<DataChunk>,
    row_count: usize,
}

impl MemoryTable {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (S, LogicalType)>,
    ) -> Result<Self> {
        let (column_names, column_types): (Vec<String>, Vec<LogicalType>) = columns
            .into_iter()
            .map(|(name, ty)| (name.into(), ty))
            .unzip();
        ensure!(
            !column_types.is_empty(),
            "a table needs at least one column"
        );
        for name in &column_names {
            ensure!(!name.is_empty(), "column names must not be empty");
        }
        Ok(MemoryTable {
            name: name.into(),
            column_names,
            column_types,
            chunks: Vec::new(),
            row_count: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &[LogicalType] {
        &self.column_types
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Materializes the whole table as a result stream.
    pub fn scan(&self) -> ResultStream {
        let columns = self
            .column_names
            .iter()
            .cloned()
            .zip(self.column_types.iter().cloned())
            .collect();
        ResultStream::from_chunks(columns, self.chunks.clone())
    }
}

impl TableSink for MemoryTable {
    fn sink_column_types(&self) -> &[LogicalType] {
        &self.column_types
    }

    fn append_chunk(&mut self, chunk: DataChunk) -> Result<()> {
        ensure!(!chunk.is_empty(), "refusing to store an empty chunk");
        ensure!(
            chunk.column_types() == &self.column_types[..],
            "chunk column types do not match table '{}'",
            self.name
        );
        self.row_count += chunk.size();
        self.chunks.push(chunk);
        Ok(())
    }
}

/// A substitute call produced by a replacement scan.
pub struct ReplacementCall {
    pub function_name: String,
    pub parameters: Vec<Value>,
}

/// Host hook that may substitute a table function for an uncataloged table
/// name, or decline with `None`.
pub trait ReplacementScan: Send + Sync {
    fn replace(&self, table_name: &str) -> Option<ReplacementCall>;
}

struct Shared {
    config: Config,
    tables: RwLock<HashMap<String, Arc<RwLock<MemoryTable>>>>,
    table_functions: RwLock<HashMap<String, Arc<TableFunctionDef>>>,
    replacement_scans: RwLock<Vec<Arc<dyn ReplacementScan>>>,
}

/// An open database instance.
pub struct Database {
    shared: Arc<Shared>,
}

impl Database {
    /// Opens an empty in-memory database with default configuration.
    pub fn open_in_memory() -> Result<Self> {
        Self::open_with_config(Config::new())
    }

    /// Opens with a validated configuration snapshot.
    pub fn open_with_config(config: Config) -> Result<Self> {
        Ok(Database {
            shared: Arc::new(Shared {
                config,
                tables: RwLock::new(HashMap::new()),
                table_functions: RwLock::new(HashMap::new()),
                replacement_scans: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Opens a connection onto this database. Connections share the catalog
    /// but are independently usable.
    pub fn connect(&self) -> Connection {
        Connection {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Registers a replacement scan, consulted in registration order when a
    /// scanned table name is not in the catalog.
    pub fn add_replacement_scan(&self, scan: Arc<dyn ReplacementScan>) {
        self.shared.replacement_scans.write().push(scan);
    }
}

/// A handle for issuing operations against an open database.
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    fn check_writable(&self) -> Result<()> {
        if self.shared.config.access_mode() == AccessMode::ReadOnly {
            bail!("database is opened read-only");
        }
        Ok(())
    }

    /// Creates an empty table in the default schema.
    pub fn create_table<S: Into<String>>(
        &self,
        name: &str,
        columns: impl IntoIterator<Item = (S, LogicalType)>,
    ) -> Result<()> {
        self.check_writable()?;
        ensure!(!name.is_empty(), "table name must not be empty");
        let table = MemoryTable::new(name, columns)?;
        let mut tables = self.shared.tables.write();
        ensure!(
            !tables.contains_key(name),
            "table '{name}' already exists"
        );
        tables.insert(name.to_string(), Arc::new(RwLock::new(table)));
        Ok(())
    }

    /// The catalog entry for `name`.
    pub fn table(&self, name: &str) -> Result<Arc<RwLock<MemoryTable>>> {
        self.shared
            .tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| eyre::eyre!("table '{name}' does not exist"))
    }

    /// Creates an appender onto `table`. Unknown targets are a construction
    /// failure: no appender is returned.
    pub fn appender(&self, schema: Option<&str>, table: &str) -> Result<Appender> {
        self.check_writable()?;
        let key = qualified(schema, table);
        let sink: SharedSink = self.table(&key)?;
        Appender::new(sink)
    }

    /// Scans `table`: catalog first, then the replacement scans, then an
    /// error naming the table.
    pub fn scan(&self, table: &str) -> Result<ResultStream> {
        if let Ok(entry) = self.table(table) {
            let guard = entry.read();
            return Ok(guard.scan());
        }
        let scans: Vec<Arc<dyn ReplacementScan>> =
            self.shared.replacement_scans.read().clone();
        for scan in scans {
            if let Some(call) = scan.replace(table) {
                return self.call_table_function(&call.function_name, &call.parameters);
            }
        }
        bail!("table '{table}' does not exist");
    }

    /// Registers a table function under its name.
    pub fn register_table_function(&self, def: TableFunctionDef) -> Result<()> {
        ensure!(!def.name().is_empty(), "table function name must not be empty");
        let mut functions = self.shared.table_functions.write();
        ensure!(
            !functions.contains_key(def.name()),
            "table function '{}' already exists",
            def.name()
        );
        functions.insert(def.name().to_string(), Arc::new(def));
        Ok(())
    }

    fn table_function(&self, name: &str) -> Result<Arc<TableFunctionDef>> {
        self.shared
            .table_functions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| eyre::eyre!("table function '{name}' does not exist"))
    }

    /// Runs a registered table function with positional arguments.
    pub fn call_table_function(&self, name: &str, params: &[Value]) -> Result<ResultStream> {
        let def = self.table_function(name)?;
        run_table_function(&def, params)
    }

    /// Prepares a statement over a registered table function: parameter
    /// count and kinds come from the registration, execution runs the
    /// bridge.
    pub fn prepare_call(&self, function: &str) -> Result<PreparedStatement> {
        let def = self.table_function(function)?;
        let kinds = parameter_kinds(&def);
        Ok(PreparedStatement::new(Arc::new(CallRoute { def, kinds })))
    }
}

fn qualified(schema: Option<&str>, table: &str) -> String {
    match schema {
        None | Some("") | Some(DEFAULT_SCHEMA) => table.to_string(),
        Some(schema) => format!("{schema}.{table}"),
    }
}

struct CallRoute {
    def: Arc<TableFunctionDef>,
    kinds: Vec<TypeKind>,
}

impl StatementRoute for CallRoute {
    fn parameter_kinds(&self) -> &[TypeKind] {
        &self.kinds
    }

    fn execute(&self, params: &[Value]) -> Result<ResultStream> {
        run_table_function(&self.def, params)
    }
}
