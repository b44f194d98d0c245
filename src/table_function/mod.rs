//! # Table Function Bridge
//!
//! Table functions let external code act as a virtual table: the engine
//! drives a three-phase callback protocol and the callback fills data
//! chunks directly, bypassing any scan operator.
//!
//! ## Protocol
//!
//! ```text
//! 1. BIND     callback reads call parameters, registers result columns,
//!             may stash opaque bind-state; set_error aborts compilation
//! 2. INIT     callback builds per-execution state (e.g. a cursor);
//!             set_error aborts before any row is produced
//! 3. FUNCTION callback fills the output chunk up to VECTOR_CAPACITY rows
//!             and calls set_size; set_size(0) ends the scan, set_error
//!             aborts it
//! ```
//!
//! Bind-state is read-only once bound; init-state stays mutable across
//! function calls. Both live in a [`state::StateArena`] owned by the
//! driver: the callback hands state over and never frees it, the driver
//! releases each slot exactly once on every exit path.

pub mod state;

use std::any::Any;
use std::sync::Arc;

use eyre::{bail, ensure, Result};

use crate::result::ResultStream;
use crate::types::value::Value;
use crate::types::{LogicalType, TypeKind};
use crate::vector::chunk::DataChunk;

use state::{StateArena, StateHandle};

/// A virtual table implemented by caller code.
pub trait TableFunction: Send + Sync {
    /// Registers result columns and bind-state for one call site.
    fn bind(&self, info: &mut BindInfo);

    /// Builds per-execution init-state.
    fn init(&self, info: &mut InitInfo);

    /// Fills `output` with the next batch of rows.
    fn function(&self, info: &mut FunctionInfo, output: &mut DataChunk);
}

/// A registered table function: name, declared parameters, callback.
#[derive(Clone)]
pub struct TableFunctionDef {
    name: String,
    parameters: Vec<LogicalType>,
    projection_pushdown: bool,
    callback: Arc<dyn TableFunction>,
}

impl TableFunctionDef {
    pub fn new(name: impl Into<String>, callback: Arc<dyn TableFunction>) -> Self {
        TableFunctionDef {
            name: name.into(),
            parameters: Vec::new(),
            projection_pushdown: false,
            callback,
        }
    }

    /// Declares the next positional parameter.
    pub fn add_parameter(&mut self, ty: LogicalType) {
        self.parameters.push(ty);
    }

    /// Builder-style variant of [`TableFunctionDef::add_parameter`].
    pub fn with_parameter(mut self, ty: LogicalType) -> Self {
        self.add_parameter(ty);
        self
    }

    /// Declares that the function can skip unprojected columns. Carried for
    /// the registration surface; this layer always asks for every column.
    pub fn set_projection_pushdown(&mut self, enabled: bool) {
        self.projection_pushdown = enabled;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[LogicalType] {
        &self.parameters
    }

    pub fn supports_projection_pushdown(&self) -> bool {
        self.projection_pushdown
    }
}

/// Bind-phase view: call parameters in, result columns and bind-state out.
pub struct BindInfo<'a> {
    parameters: &'a [Value],
    columns: Vec<(String, LogicalType)>,
    bind_data: Option<Box<dyn Any + Send>>,
    error: Option<String>,
}

impl BindInfo<'_> {
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// The call parameter at `index`, `Null` out of range.
    pub fn parameter(&self, index: usize) -> Value {
        self.parameters.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Registers the next result column.
    pub fn add_result_column(&mut self, name: impl Into<String>, ty: LogicalType) {
        self.columns.push((name.into(), ty));
    }

    /// Hands opaque bind-state to the engine, which owns it from here on.
    pub fn set_bind_data<T: Any + Send>(&mut self, data: T) {
        self.bind_data = Some(Box::new(data));
    }

    /// Aborts compilation of this call.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// Init-phase view: read-only bind-state in, init-state out.
pub struct InitInfo<'a> {
    bind: Option<&'a (dyn Any + Send)>,
    init_data: Option<Box<dyn Any + Send>>,
    column_count: usize,
    error: Option<String>,
}

impl InitInfo<'_> {
    /// The bind-state, downcast to its concrete type.
    pub fn bind_data<T: Any>(&self) -> Result<&T> {
        self.bind
            .and_then(|b| b.downcast_ref::<T>())
            .ok_or_else(|| eyre::eyre!("bind state not available"))
    }

    /// Hands opaque init-state to the engine, which owns it from here on.
    pub fn set_init_data<T: Any + Send>(&mut self, data: T) {
        self.init_data = Some(Box::new(data));
    }

    /// Number of result columns the function phase will be asked to fill.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// The output position of result column `index`. This layer performs no
    /// projection, so the mapping is the identity.
    pub fn column_index(&self, index: usize) -> usize {
        index
    }

    /// Aborts the call before any row is produced.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// Function-phase view: read-only bind-state, mutable init-state.
pub struct FunctionInfo<'a> {
    bind: Option<&'a (dyn Any + Send)>,
    init: Option<&'a mut (dyn Any + Send)>,
    error: Option<String>,
}

impl FunctionInfo<'_> {
    pub fn bind_data<T: Any>(&self) -> Result<&T> {
        self.bind
            .and_then(|b| b.downcast_ref::<T>())
            .ok_or_else(|| eyre::eyre!("bind state not available"))
    }

    pub fn init_data_mut<T: Any>(&mut self) -> Result<&mut T> {
        self.init
            .as_deref_mut()
            .and_then(|i| i.downcast_mut::<T>())
            .ok_or_else(|| eyre::eyre!("init state not available"))
    }

    /// Aborts the scan.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

fn phase_states<'a>(
    arena: &'a mut StateArena,
    bind: Option<StateHandle>,
    init: Option<StateHandle>,
) -> Result<(
    Option<&'a (dyn Any + Send)>,
    Option<&'a mut (dyn Any + Send)>,
)> {
    match (bind, init) {
        (Some(b), Some(i)) => {
            let (shared, mutable) = arena.pair_mut(b, i)?;
            Ok((Some(shared), Some(mutable)))
        }
        (Some(b), None) => Ok((Some(arena.get_dyn(b)?), None)),
        (None, Some(i)) => Ok((None, Some(arena.get_dyn_mut(i)?))),
        (None, None) => Ok((None, None)),
    }
}

/// Drives the three-phase protocol for one call and materializes the
/// produced chunks as a result stream.
///
/// State teardown is uniform: the arena owns bind- and init-state, the
/// normal path releases both explicitly, and every abort path releases them
/// when the arena drops — exactly once either way.
pub fn run_table_function(def: &TableFunctionDef, params: &[Value]) -> Result<ResultStream> {
    ensure!(
        params.len() == def.parameters.len(),
        "table function '{}' expects {} parameters, got {}",
        def.name,
        def.parameters.len(),
        params.len()
    );
    for (i, (param, declared)) in params.iter().zip(def.parameters.iter()).enumerate() {
        ensure!(
            declared.is_invalid() || param.is_null() || param.kind() == declared.kind(),
            "table function '{}' parameter {} expects {:?}, got {:?}",
            def.name,
            i + 1,
            declared.kind(),
            param.kind()
        );
    }

    let mut arena = StateArena::new();

    // Bind phase: result columns + optional bind-state.
    let mut bind_info = BindInfo {
        parameters: params,
        columns: Vec::new(),
        bind_data: None,
        error: None,
    };
    def.callback.bind(&mut bind_info);
    let BindInfo {
        columns,
        bind_data,
        error,
        ..
    } = bind_info;
    if let Some(message) = error {
        bail!("table function '{}' bind failed: {message}", def.name);
    }
    ensure!(
        !columns.is_empty(),
        "table function '{}' bound no result columns",
        def.name
    );
    let bind_handle = bind_data.map(|data| arena.insert(data));

    // Init phase: optional per-execution state.
    let mut init_info = InitInfo {
        bind: match bind_handle {
            Some(handle) => Some(arena.get_dyn(handle)?),
            None => None,
        },
        init_data: None,
        column_count: columns.len(),
        error: None,
    };
    def.callback.init(&mut init_info);
    let InitInfo {
        init_data, error, ..
    } = init_info;
    if let Some(message) = error {
        bail!("table function '{}' init failed: {message}", def.name);
    }
    let init_handle = init_data.map(|data| arena.insert(data));

    // Function phase: fill chunks until set_size(0).
    let column_types: Vec<LogicalType> = columns.iter().map(|(_, ty)| ty.clone()).collect();
    let mut chunks = Vec::new();
    loop {
        let mut output = DataChunk::new(&column_types)?;
        let error = {
            let (bind, init) = phase_states(&mut arena, bind_handle, init_handle)?;
            let mut info = FunctionInfo {
                bind,
                init,
                error: None,
            };
            def.callback.function(&mut info, &mut output);
            info.error
        };
        if let Some(message) = error {
            bail!("table function '{}' execution failed: {message}", def.name);
        }
        if output.size() == 0 {
            break;
        }
        chunks.push(output);
    }

    if let Some(handle) = init_handle {
        arena.release(handle);
    }
    if let Some(handle) = bind_handle {
        arena.release(handle);
    }
    debug_assert_eq!(arena.live_count(), 0, "call teardown leaked state");

    Ok(ResultStream::from_chunks(columns, chunks))
}

/// Kinds of the declared parameters, `Invalid` where any kind is accepted.
pub(crate) fn parameter_kinds(def: &TableFunctionDef) -> Vec<TypeKind> {
    def.parameters.iter().map(|ty| ty.kind()).collect()
}
