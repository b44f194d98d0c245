//! # Appender Round-Trip Test Suite
//!
//! This suite drives the full append path end to end: values go in row by
//! row through the appender, chunks land in the in-memory table store, and
//! the scan path reads them back through the scalar accessors.
//!
//! ## Test Categories
//!
//! 1. **Primitive round-trip**: every appendable kind survives
//!    append → flush → scan exactly
//! 2. **Null round-trip**: appended nulls read back as NULL with
//!    type-appropriate zero values
//! 3. **Row protocol**: short and overlong rows fail without poisoning the
//!    next row
//! 4. **Capacity boundary**: filling to exactly `VECTOR_CAPACITY` and one
//!    row beyond hands off chunks correctly
//! 5. **Lifecycle**: double close and post-close operations fail uniformly
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test appender_roundtrip
//! ```

use quiver::{
    Connection, Database, Date, Decimal, Interval, LogicalType, Time, Timestamp, TypeKind,
    VECTOR_CAPACITY,
};

fn open() -> (Database, Connection) {
    let db = Database::open_in_memory().expect("open in-memory database");
    let conn = db.connect();
    (db, conn)
}

mod primitive_roundtrip_tests {
    use super::*;

    fn all_kinds_columns() -> Vec<(&'static str, LogicalType)> {
        vec![
            ("c_bool", LogicalType::new(TypeKind::Boolean)),
            ("c_i8", LogicalType::new(TypeKind::Int8)),
            ("c_i16", LogicalType::new(TypeKind::Int16)),
            ("c_i32", LogicalType::new(TypeKind::Int32)),
            ("c_i64", LogicalType::new(TypeKind::Int64)),
            ("c_u8", LogicalType::new(TypeKind::UInt8)),
            ("c_u16", LogicalType::new(TypeKind::UInt16)),
            ("c_u32", LogicalType::new(TypeKind::UInt32)),
            ("c_u64", LogicalType::new(TypeKind::UInt64)),
            ("c_f32", LogicalType::new(TypeKind::Float)),
            ("c_f64", LogicalType::new(TypeKind::Double)),
            ("c_huge", LogicalType::new(TypeKind::HugeInt)),
            ("c_dec", LogicalType::decimal(18, 4).expect("decimal type")),
            ("c_text", LogicalType::new(TypeKind::Varchar)),
            ("c_blob", LogicalType::new(TypeKind::Blob)),
            ("c_date", LogicalType::new(TypeKind::Date)),
            ("c_time", LogicalType::new(TypeKind::Time)),
            ("c_ts", LogicalType::new(TypeKind::Timestamp)),
            ("c_iv", LogicalType::new(TypeKind::Interval)),
        ]
    }

    fn append_sample_row(appender: &mut quiver::Appender) {
        appender.begin_row().expect("begin");
        appender.append_boolean(true).expect("bool");
        appender.append_int8(-8).expect("i8");
        appender.append_int16(-1600).expect("i16");
        appender.append_int32(-320_000).expect("i32");
        appender.append_int64(-64_000_000_000).expect("i64");
        appender.append_uint8(8).expect("u8");
        appender.append_uint16(1600).expect("u16");
        appender.append_uint32(320_000).expect("u32");
        appender.append_uint64(64_000_000_000).expect("u64");
        appender.append_float(0.25).expect("f32");
        appender.append_double(-1.5e12).expect("f64");
        appender.append_hugeint(1 << 90).expect("hugeint");
        appender
            .append_decimal(Decimal::new(18, 4, 1_234_5678))
            .expect("decimal");
        appender
            .append_varchar("a string past the inline threshold")
            .expect("varchar");
        appender.append_blob(&[0xde, 0xad, 0xbe, 0xef]).expect("blob");
        appender.append_date(Date { days: 19_000 }).expect("date");
        appender
            .append_time(Time {
                micros: 12 * 3_600 * 1_000_000,
            })
            .expect("time");
        appender
            .append_timestamp(Timestamp {
                micros: 1_700_000_000_000_000,
            })
            .expect("timestamp");
        appender
            .append_interval(Interval {
                months: 1,
                days: 2,
                micros: 3,
            })
            .expect("interval");
        appender.end_row().expect("end");
    }

    #[test]
    fn every_kind_survives_append_flush_scan() {
        let (_db, conn) = open();
        conn.create_table("wide", all_kinds_columns()).expect("create");

        let mut appender = conn.appender(None, "wide").expect("appender");
        append_sample_row(&mut appender);
        appender.flush().expect("flush");

        let mut result = conn.scan("wide").expect("scan");
        assert_eq!(result.row_count(), 1);
        assert!(result.value_boolean(0, 0));
        assert_eq!(result.value_int8(1, 0), -8);
        assert_eq!(result.value_int16(2, 0), -1600);
        assert_eq!(result.value_int32(3, 0), -320_000);
        assert_eq!(result.value_int64(4, 0), -64_000_000_000);
        assert_eq!(result.value_uint8(5, 0), 8);
        assert_eq!(result.value_uint16(6, 0), 1600);
        assert_eq!(result.value_uint32(7, 0), 320_000);
        assert_eq!(result.value_uint64(8, 0), 64_000_000_000);
        assert_eq!(result.value_float(9, 0), 0.25);
        assert_eq!(result.value_double(10, 0), -1.5e12);
        assert_eq!(result.value_hugeint(11, 0), 1 << 90);
        assert_eq!(result.value_decimal(12, 0), Decimal::new(18, 4, 1_234_5678));
        assert_eq!(
            result.value_varchar(13, 0),
            "a string past the inline threshold"
        );
        assert_eq!(result.value_blob(14, 0), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(result.value_date(15, 0), Date { days: 19_000 });
        assert_eq!(
            result.value_time(16, 0),
            Time {
                micros: 12 * 3_600 * 1_000_000
            }
        );
        assert_eq!(
            result.value_timestamp(17, 0),
            Timestamp {
                micros: 1_700_000_000_000_000
            }
        );
        assert_eq!(
            result.value_interval(18, 0),
            Interval {
                months: 1,
                days: 2,
                micros: 3
            }
        );
        for col in 0..19 {
            assert!(!result.is_null(col, 0), "column {col} must not be null");
        }
    }

    #[test]
    fn nulls_read_back_as_null_with_zero_values() {
        let (_db, conn) = open();
        conn.create_table("wide", all_kinds_columns()).expect("create");

        let mut appender = conn.appender(None, "wide").expect("appender");
        appender.begin_row().expect("begin");
        for _ in 0..19 {
            appender.append_null().expect("null");
        }
        appender.end_row().expect("end");
        appender.flush().expect("flush");

        let mut result = conn.scan("wide").expect("scan");
        assert_eq!(result.row_count(), 1);
        for col in 0..19 {
            assert!(result.is_null(col, 0), "column {col} must be null");
        }
        assert!(!result.value_boolean(0, 0));
        assert_eq!(result.value_int64(4, 0), 0);
        assert_eq!(result.value_double(10, 0), 0.0);
        assert_eq!(result.value_decimal(12, 0), Decimal::ZERO);
        assert_eq!(result.value_varchar(13, 0), "");
        assert_eq!(result.value_blob(14, 0), Vec::<u8>::new());
        assert_eq!(result.value_date(15, 0), Date::default());
    }
}

mod row_protocol_tests {
    use super::*;

    fn two_column_appender(conn: &Connection) -> quiver::Appender {
        conn.create_table(
            "pairs",
            [
                ("id", LogicalType::new(TypeKind::Int64)),
                ("label", LogicalType::new(TypeKind::Varchar)),
            ],
        )
        .expect("create");
        conn.appender(None, "pairs").expect("appender")
    }

    #[test]
    fn short_row_fails_and_next_row_is_independent() {
        let (_db, conn) = open();
        let mut appender = two_column_appender(&conn);

        appender.begin_row().expect("begin");
        appender.append_int64(1).expect("one of two");
        assert!(appender.end_row().is_err(), "short row must fail end_row");
        assert!(!appender.error().is_empty(), "sticky error recorded");

        appender.begin_row().expect("begin again");
        appender.append_int64(2).expect("id");
        appender.append_varchar("ok").expect("label");
        appender.end_row().expect("complete row commits");
        appender.flush().expect("flush");

        let mut result = conn.scan("pairs").expect("scan");
        assert_eq!(result.row_count(), 1, "only the complete row landed");
        assert_eq!(result.value_int64(0, 0), 2);
    }

    #[test]
    fn overlong_row_fails_every_later_append() {
        let (_db, conn) = open();
        let mut appender = two_column_appender(&conn);

        appender.begin_row().expect("begin");
        appender.append_int64(1).expect("id");
        appender.append_varchar("x").expect("label");
        assert!(appender.append_int64(2).is_err(), "third value fails");
        assert!(appender.append_varchar("y").is_err(), "and stays failed");
        assert!(appender.end_row().is_err(), "row is abandoned");

        appender.begin_row().expect("clean slate");
        appender.append_int64(3).expect("id");
        appender.append_varchar("z").expect("label");
        appender.end_row().expect("commits");
    }
}

mod capacity_tests {
    use super::*;

    #[test]
    fn exactly_capacity_then_one_more() {
        let (_db, conn) = open();
        conn.create_table("numbers", [("n", LogicalType::new(TypeKind::Int64))])
            .expect("create");

        let mut appender = conn.appender(None, "numbers").expect("appender");
        for i in 0..VECTOR_CAPACITY as i64 + 1 {
            appender.begin_row().expect("begin");
            appender.append_int64(i).expect("value");
            appender.end_row().expect("end");
        }
        appender.flush().expect("flush");

        let mut result = conn.scan("numbers").expect("scan");
        assert_eq!(result.row_count(), VECTOR_CAPACITY + 1);

        let first = result.fetch_chunk(0).expect("fetch").expect("full chunk");
        assert_eq!(first.size(), VECTOR_CAPACITY);
        let second = result.fetch_chunk(1).expect("fetch").expect("overflow chunk");
        assert_eq!(second.size(), 1);
        assert_eq!(
            second
                .vector(0)
                .expect("column")
                .value_at(0)
                .expect("read"),
            quiver::Value::Int64(VECTOR_CAPACITY as i64)
        );
        assert!(result.fetch_chunk(2).expect("exhausted").is_none());
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn double_close_and_post_close_operations_never_crash() {
        let (_db, conn) = open();
        conn.create_table("t", [("x", LogicalType::new(TypeKind::Int32))])
            .expect("create");
        let mut appender = conn.appender(None, "t").expect("appender");

        appender.begin_row().expect("begin");
        appender.append_int32(1).expect("value");
        appender.end_row().expect("end");

        appender.close().expect("close flushes");
        appender.close().expect("second close is a no-op");

        assert!(appender.begin_row().is_err());
        assert!(appender.append_int32(2).is_err());
        assert!(appender.append_null().is_err());
        assert!(appender.flush().is_err());
        assert_eq!(appender.error(), "", "error stays cleared after close");

        let mut result = conn.scan("t").expect("scan");
        assert_eq!(result.row_count(), 1, "the closed appender flushed its row");
        assert_eq!(result.value_int32(0, 0), 1);
    }
}
