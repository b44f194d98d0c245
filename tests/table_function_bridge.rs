//! # Table Function Bridge Test Suite
//!
//! Drives the three-phase bind/init/function protocol through the engine
//! facade: registration, direct calls, prepared calls through the value
//! binder, phase errors, and replacement scans substituting a function for
//! an uncataloged table name.
//!
//! The generator under test mirrors the classic "emit N rows" scenario:
//! bind reads `N` from its one parameter, the function phase fills chunks
//! of up to `VECTOR_CAPACITY` rows, and `set_size(0)` terminates the scan.
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test table_function_bridge
//! ```

use std::sync::Arc;

use quiver::{
    BindInfo, Connection, Database, DataChunk, FunctionInfo, InitInfo, LogicalType,
    ReplacementCall, ReplacementScan, TableFunction, TableFunctionDef, TypeKind, Value,
    VECTOR_CAPACITY,
};

struct SeriesBind {
    total: i64,
}

struct SeriesCursor {
    next: i64,
}

/// Emits the integers `0..N`, `N` taken from the only call parameter.
struct SeriesFunction;

impl TableFunction for SeriesFunction {
    fn bind(&self, info: &mut BindInfo) {
        info.add_result_column("value", LogicalType::new(TypeKind::Int64));
        match info.parameter(0) {
            Value::Int64(total) if total >= 0 => info.set_bind_data(SeriesBind { total }),
            other => info.set_error(format!("series takes a non-negative count, got {other:?}")),
        }
    }

    fn init(&self, info: &mut InitInfo) {
        info.set_init_data(SeriesCursor { next: 0 });
    }

    fn function(&self, info: &mut FunctionInfo, output: &mut DataChunk) {
        let total = info.bind_data::<SeriesBind>().expect("bind state").total;
        let cursor = info.init_data_mut::<SeriesCursor>().expect("init state");
        let mut rows = 0;
        while rows < output.capacity() && cursor.next < total {
            output
                .vector_mut(0)
                .expect("column")
                .set_value(rows, &Value::Int64(cursor.next))
                .expect("write");
            cursor.next += 1;
            rows += 1;
        }
        output.set_size(rows).expect("size");
    }
}

fn series_def() -> TableFunctionDef {
    TableFunctionDef::new("series", Arc::new(SeriesFunction))
        .with_parameter(LogicalType::new(TypeKind::Int64))
}

fn open_with_series() -> (Database, Connection) {
    let db = Database::open_in_memory().expect("open");
    let conn = db.connect();
    conn.register_table_function(series_def()).expect("register");
    (db, conn)
}

mod scan_tests {
    use super::*;

    #[test]
    fn emits_exactly_n_rows_across_capacity_sized_chunks() {
        let (_db, conn) = open_with_series();
        let n = VECTOR_CAPACITY as i64 * 2 + 5;

        let mut result = conn
            .call_table_function("series", &[Value::Int64(n)])
            .expect("call");
        assert_eq!(result.row_count(), n as usize);

        let mut total = 0usize;
        let mut index = 0;
        while let Some(chunk) = result.fetch_chunk(index).expect("fetch") {
            assert!(chunk.size() <= VECTOR_CAPACITY);
            if (index as usize + 1) * VECTOR_CAPACITY <= n as usize {
                assert_eq!(chunk.size(), VECTOR_CAPACITY, "interior chunks are full");
            }
            total += chunk.size();
            index += 1;
        }
        assert_eq!(total, n as usize, "emitted rows sum to N");
    }

    #[test]
    fn produced_values_are_in_order() {
        let (_db, conn) = open_with_series();
        let mut result = conn
            .call_table_function("series", &[Value::Int64(5)])
            .expect("call");
        for row in 0..5 {
            assert_eq!(result.value_int64(0, row), row as i64);
        }
        assert_eq!(result.column_name(0).expect("column"), "value");
    }

    #[test]
    fn zero_count_terminates_immediately() {
        let (_db, conn) = open_with_series();
        let result = conn
            .call_table_function("series", &[Value::Int64(0)])
            .expect("call");
        assert_eq!(result.row_count(), 0);
    }

    #[test]
    fn bind_error_aborts_compilation() {
        let (_db, conn) = open_with_series();
        let err = conn
            .call_table_function("series", &[Value::Int64(-1)])
            .expect_err("negative count");
        assert!(err.to_string().contains("bind failed"));
    }

    #[test]
    fn unknown_function_and_duplicate_registration() {
        let (_db, conn) = open_with_series();
        assert!(conn.call_table_function("nope", &[]).is_err());
        assert!(conn.register_table_function(series_def()).is_err());
    }
}

mod prepared_call_tests {
    use super::*;

    #[test]
    fn binder_feeds_the_bridge() {
        let (_db, conn) = open_with_series();
        let mut stmt = conn.prepare_call("series").expect("prepare");
        assert_eq!(stmt.param_count(), 1);
        assert_eq!(stmt.param_kind(1), TypeKind::Int64);

        assert!(stmt.execute().is_err(), "unbound parameter blocks execute");
        assert!(stmt.bind_varchar(1, "three").is_err(), "kind mismatch");

        stmt.bind_int64(1, 3).expect("bind");
        let mut result = stmt.execute().expect("run");
        assert_eq!(result.row_count(), 3);
        assert_eq!(result.value_int64(0, 2), 2);

        stmt.bind_int64(1, 7).expect("rebind");
        let result = stmt.execute().expect("run again");
        assert_eq!(result.row_count(), 7);
    }
}

mod replacement_scan_tests {
    use super::*;

    /// Substitutes `series(N)` for any table named `magic_<N>`.
    struct MagicTables;

    impl ReplacementScan for MagicTables {
        fn replace(&self, table_name: &str) -> Option<ReplacementCall> {
            let count: i64 = table_name.strip_prefix("magic_")?.parse().ok()?;
            Some(ReplacementCall {
                function_name: "series".to_string(),
                parameters: vec![Value::Int64(count)],
            })
        }
    }

    #[test]
    fn uncataloged_names_route_through_the_scan() {
        let (db, conn) = open_with_series();
        db.add_replacement_scan(Arc::new(MagicTables));

        let mut result = conn.scan("magic_4").expect("substituted scan");
        assert_eq!(result.row_count(), 4);
        assert_eq!(result.value_int64(0, 3), 3);
    }

    #[test]
    fn declined_names_still_error() {
        let (db, conn) = open_with_series();
        db.add_replacement_scan(Arc::new(MagicTables));
        assert!(conn.scan("not_magic").is_err());
    }

    #[test]
    fn catalog_tables_win_over_replacement_scans() {
        let (db, conn) = open_with_series();
        db.add_replacement_scan(Arc::new(MagicTables));

        conn.create_table("magic_2", [("value", LogicalType::new(TypeKind::Int64))])
            .expect("create");
        let result = conn.scan("magic_2").expect("catalog scan");
        assert_eq!(result.row_count(), 0, "the real (empty) table was scanned");
    }
}

mod error_phase_tests {
    use super::*;

    struct InitFails;

    impl TableFunction for InitFails {
        fn bind(&self, info: &mut BindInfo) {
            info.add_result_column("x", LogicalType::new(TypeKind::Int32));
        }

        fn init(&self, info: &mut InitInfo) {
            info.set_error("cursor could not be created");
        }

        fn function(&self, _info: &mut FunctionInfo, output: &mut DataChunk) {
            output.set_size(0).expect("unreachable in this suite");
        }
    }

    struct FunctionFails;

    impl TableFunction for FunctionFails {
        fn bind(&self, info: &mut BindInfo) {
            info.add_result_column("x", LogicalType::new(TypeKind::Int32));
        }

        fn init(&self, _info: &mut InitInfo) {}

        fn function(&self, info: &mut FunctionInfo, _output: &mut DataChunk) {
            info.set_error("source went away mid-scan");
        }
    }

    #[test]
    fn init_and_function_errors_abort_the_scan() {
        let db = Database::open_in_memory().expect("open");
        let conn = db.connect();
        conn.register_table_function(TableFunctionDef::new("init_fails", Arc::new(InitFails)))
            .expect("register");
        conn.register_table_function(TableFunctionDef::new(
            "function_fails",
            Arc::new(FunctionFails),
        ))
        .expect("register");

        let err = conn
            .call_table_function("init_fails", &[])
            .expect_err("init aborts");
        assert!(err.to_string().contains("init failed"));

        let err = conn
            .call_table_function("function_fails", &[])
            .expect_err("function aborts");
        assert!(err.to_string().contains("execution failed"));
    }
}
