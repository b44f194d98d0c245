//! # Prepared Statements
//!
//! A [`PreparedStatement`] binds typed parameters positionally in front of
//! an execution route, then produces a result stream on execute.
//!
//! ## Workflow
//!
//! ```text
//! 1. PREPARE: the engine resolves the target and its parameter layout
//!        conn.prepare_call("my_function")
//!            │
//!            ▼
//!        PreparedStatement { params: [None; n], route }
//!
//! 2. BIND: values are supplied by 1-based position
//!        stmt.bind_int64(1, 42)
//!
//! 3. EXECUTE: all parameters must be bound
//!        stmt.execute() -> ResultStream
//! ```
//!
//! The statement stays usable after execution: rebinding a position
//! overwrites it and `execute` can run again. Binding a value whose kind
//! conflicts with the declared parameter kind fails that bind only.

use std::sync::Arc;

use eyre::{ensure, Result};

use crate::result::ResultStream;
use crate::types::value::{Date, Decimal, Interval, Time, Timestamp, Value};
use crate::types::TypeKind;

/// Execution seam behind a prepared statement: the table-function bridge,
/// or a full query engine.
pub trait StatementRoute: Send + Sync {
    /// Declared parameter kinds, `Invalid` meaning "any".
    fn parameter_kinds(&self) -> &[TypeKind];

    /// Runs the statement with fully-bound parameters.
    fn execute(&self, params: &[Value]) -> Result<ResultStream>;
}

/// A positional value binder over a [`StatementRoute`].
pub struct PreparedStatement {
    route: Arc<dyn StatementRoute>,
    params: Vec<Option<Value>>,
}

impl PreparedStatement {
    pub fn new(route: Arc<dyn StatementRoute>) -> Self {
        let count = route.parameter_kinds().len();
        PreparedStatement {
            route,
            params: vec![None; count],
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Declared kind of the 1-based parameter `index`, `Invalid` out of
    /// range.
    pub fn param_kind(&self, index: usize) -> TypeKind {
        if index == 0 {
            return TypeKind::Invalid;
        }
        self.route
            .parameter_kinds()
            .get(index - 1)
            .copied()
            .unwrap_or_default()
    }

    /// Binds `value` to the 1-based parameter `index`, overwriting any
    /// previous binding.
    pub fn bind_value(&mut self, index: usize, value: Value) -> Result<()> {
        ensure!(
            (1..=self.params.len()).contains(&index),
            "parameter index {index} out of range [1, {}]",
            self.params.len()
        );
        let declared = self.route.parameter_kinds()[index - 1];
        ensure!(
            declared == TypeKind::Invalid || value.is_null() || value.kind() == declared,
            "parameter {index} expects {declared:?}, got {:?}",
            value.kind()
        );
        self.params[index - 1] = Some(value);
        Ok(())
    }

    /// Binds NULL to the 1-based parameter `index`.
    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        self.bind_value(index, Value::Null)
    }

    bind_value_methods! {
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

    /// Binds a string to the 1-based parameter `index`.
    pub fn bind_varchar(&mut self, index: usize, value: &str) -> Result<()> {
        self.bind_value(index, Value::Varchar(value.to_string()))
    }

    /// Binds a blob to the 1-based parameter `index`.
    pub fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.bind_value(index, Value::Blob(value.to_vec()))
    }

    /// Drops every binding, keeping the statement prepared.
    pub fn clear_bindings(&mut self) {
        for slot in &mut self.params {
            *slot = None;
        }
    }

    /// Runs the statement. Every parameter must be bound.
    pub fn execute(&self) -> Result<ResultStream> {
        let mut values = Vec::with_capacity(self.params.len());
        for (i, slot) in self.params.iter().enumerate() {
            match slot {
                Some(value) => values.push(value.clone()),
                None => eyre::bail!("parameter {} is not bound", i + 1),
            }
        }
        self.route.execute(&values)
    }
}
