mod common;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rowkit::driver::SqliteConnection;
use rowkit::{args, row_record, QueryRunner, RowkitError};
use uuid::Uuid;

row_record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Sample {
        pub id: i64,
        pub active: Option<bool>,
        pub score: Option<f64>,
        pub ratio: Option<f32>,
        pub tag: Option<Uuid>,
        pub initial: Option<char>,
        pub payload: Option<Vec<u8>>,
        pub born_on: Option<NaiveDate>,
        pub wake_at: Option<NaiveTime>,
        pub seen_at: Option<NaiveDateTime>,
        pub created_at: Option<DateTime<Utc>>,
    }
}

fn typed_db() -> (QueryRunner, SqliteConnection) {
    let conn = SqliteConnection::open_in_memory().expect("open in-memory database");
    conn.execute_batch_sql(
        "CREATE TABLE samples (
            id BIGINT NOT NULL,
            active BOOLEAN,
            score DOUBLE,
            ratio NUMERIC(10,2),
            tag UUID,
            initial CHAR(1),
            payload BLOB,
            born_on DATE,
            wake_at TIME,
            seen_at DATETIME,
            created_at TIMESTAMP
        );",
    )
    .expect("create schema");
    (QueryRunner::new(), conn)
}

const INSERT: &str = "INSERT INTO samples(id, active, score, ratio, tag, initial, payload, \
                      born_on, wake_at, seen_at, created_at) \
                      VALUES (:id, :active, :score, :ratio, :tag, :initial, :payload, \
                      :born_on, :wake_at, :seen_at, :created_at)";

#[test]
fn typed_values_round_trip_through_the_database() {
    let (runner, conn) = typed_db();
    let tag = Uuid::new_v4();
    let born_on = NaiveDate::from_ymd_opt(1938, 6, 1).unwrap();
    let wake_at = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
    let seen_at = born_on.and_hms_opt(12, 0, 0).unwrap();
    let created_at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 45).unwrap();

    runner
        .execute(
            &conn,
            INSERT,
            &args! {
                "id" => 1i64,
                "active" => true,
                "score" => 0.5f64,
                "ratio" => 0.25f32,
                "tag" => tag,
                "initial" => 'S',
                "payload" => vec![1u8, 2, 3],
                "born_on" => born_on,
                "wake_at" => wake_at,
                "seen_at" => seen_at,
                "created_at" => created_at,
            },
        )
        .unwrap();

    let sample: Sample = runner
        .query_single(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 1i64 })
        .unwrap()
        .expect("row inserted above");

    assert_eq!(sample.active, Some(true));
    assert_eq!(sample.score, Some(0.5));
    assert_eq!(sample.ratio, Some(0.25));
    assert_eq!(sample.tag, Some(tag));
    assert_eq!(sample.initial, Some('S'));
    assert_eq!(sample.payload, Some(vec![1, 2, 3]));
    assert_eq!(sample.born_on, Some(born_on));
    assert_eq!(sample.wake_at, Some(wake_at));
    assert_eq!(sample.seen_at, Some(seen_at));
    assert_eq!(sample.created_at, Some(created_at));
}

#[test]
fn sql_null_yields_none_for_every_converter_family() {
    let (runner, conn) = typed_db();
    runner
        .execute(
            &conn,
            "INSERT INTO samples(id) VALUES (:id)",
            &args! { "id" => 2i64 },
        )
        .unwrap();

    let sample: Sample = runner
        .query_single(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 2i64 })
        .unwrap()
        .expect("row inserted above");

    assert_eq!(sample.active, None);
    assert_eq!(sample.score, None);
    assert_eq!(sample.ratio, None);
    assert_eq!(sample.tag, None);
    assert_eq!(sample.initial, None);
    assert_eq!(sample.payload, None);
    assert_eq!(sample.born_on, None);
    assert_eq!(sample.wake_at, None);
    assert_eq!(sample.seen_at, None);
    assert_eq!(sample.created_at, None);
}

#[test]
fn uuid_stored_as_text_reads_back_identically() {
    let (runner, conn) = typed_db();
    let tag = Uuid::new_v4();
    runner
        .execute(
            &conn,
            "INSERT INTO samples(id, tag) VALUES (:id, :tag)",
            &args! { "id" => 3i64, "tag" => tag },
        )
        .unwrap();

    let sample: Sample = runner
        .query_single(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 3i64 })
        .unwrap()
        .expect("row inserted above");
    assert_eq!(sample.tag, Some(tag));
}

#[test]
fn malformed_uuid_in_the_database_is_a_conversion_error() {
    let (runner, conn) = typed_db();
    conn.execute_batch_sql("INSERT INTO samples(id, tag) VALUES (4, 'not-a-uuid');")
        .unwrap();

    let err = runner
        .query_single::<Sample>(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 4i64 })
        .unwrap_err();
    assert!(matches!(err, RowkitError::ConversionParse(_)));
}

#[test]
fn multi_character_char_column_is_a_conversion_error() {
    let (runner, conn) = typed_db();
    conn.execute_batch_sql("INSERT INTO samples(id, initial) VALUES (5, 'ABC');")
        .unwrap();

    let err = runner
        .query_single::<Sample>(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 5i64 })
        .unwrap_err();
    assert!(matches!(err, RowkitError::ConversionParse(_)));
}

#[test]
fn empty_char_column_is_a_conversion_error() {
    let (runner, conn) = typed_db();
    conn.execute_batch_sql("INSERT INTO samples(id, initial) VALUES (6, '');")
        .unwrap();

    let err = runner
        .query_single::<Sample>(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 6i64 })
        .unwrap_err();
    assert!(matches!(err, RowkitError::ConversionParse(_)));
}

#[test]
fn date_column_stored_as_epoch_millis_still_converts() {
    let (runner, conn) = typed_db();
    // 2023-10-01T00:00:00Z as milliseconds
    conn.execute_batch_sql("INSERT INTO samples(id, born_on) VALUES (7, 1696118400000);")
        .unwrap();

    let sample: Sample = runner
        .query_single(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 7i64 })
        .unwrap()
        .expect("row inserted above");
    assert_eq!(sample.born_on, Some(NaiveDate::from_ymd_opt(2023, 10, 1).unwrap()));
}

#[test]
fn unparseable_date_string_is_unsupported() {
    let (runner, conn) = typed_db();
    conn.execute_batch_sql("INSERT INTO samples(id, born_on) VALUES (8, '01/10/2023');")
        .unwrap();

    let err = runner
        .query_single::<Sample>(&conn, "SELECT * FROM samples WHERE id = :id", &args! { "id" => 8i64 })
        .unwrap_err();
    assert!(matches!(err, RowkitError::Unsupported(_)));
}
