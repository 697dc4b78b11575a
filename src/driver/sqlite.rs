//! Reference driver adapter over rusqlite.
//!
//! Rows are materialized into owned values on each advance so getters can
//! hand out data without borrowing into the driver. UUIDs are stored as
//! lowercase hyphenated text and temporal values as ISO-8601 text, which
//! the SQLite date cascade reads back without loss.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::ValueRef;
use tracing::debug;
use uuid::Uuid;

use crate::types::sqlite_dates::parse_sqlite_date;
use crate::types::{SqlType, Value};
use crate::{Result, RowkitError};
use super::{DbConnection, DbCursor, DbStatement};

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open a file-backed database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;",
        )?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }

    /// Run raw SQL without template parsing, for schema setup.
    pub fn execute_batch_sql(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl DbConnection for SqliteConnection {
    fn prepare<'c>(&'c self, sql: &str) -> Result<Box<dyn DbStatement + 'c>> {
        debug!(sql, "preparing statement");
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement {
            stmt,
            batch: Vec::new(),
        }))
    }

    fn product_name(&self) -> String {
        "SQLite".to_string()
    }

    fn auto_commit(&self) -> Result<bool> {
        Ok(self.conn.is_autocommit())
    }

    fn set_auto_commit(&self, enabled: bool) -> Result<()> {
        if enabled && !self.conn.is_autocommit() {
            // Enabling auto-commit commits the open transaction.
            self.conn.execute_batch("COMMIT")?;
        } else if !enabled && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            return Err(RowkitError::Transaction(
                "no active transaction to commit".to_string(),
            ));
        }
        self.conn.execute_batch("COMMIT")?;
        // Stay in manual-commit mode until told otherwise.
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            return Err(RowkitError::Transaction(
                "no active transaction to roll back".to_string(),
            ));
        }
        self.conn.execute_batch("ROLLBACK")?;
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }
}

struct SqliteStatement<'c> {
    stmt: rusqlite::Statement<'c>,
    batch: Vec<u64>,
}

impl DbStatement for SqliteStatement<'_> {
    fn set_null(&mut self, index: usize) -> Result<()> {
        self.stmt
            .raw_bind_parameter(index, rusqlite::types::Null)?;
        Ok(())
    }

    fn set_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value)?;
        Ok(())
    }

    fn set_i8(&mut self, index: usize, value: i8) -> Result<()> {
        self.stmt.raw_bind_parameter(index, i64::from(value))?;
        Ok(())
    }

    fn set_i16(&mut self, index: usize, value: i16) -> Result<()> {
        self.stmt.raw_bind_parameter(index, i64::from(value))?;
        Ok(())
    }

    fn set_i32(&mut self, index: usize, value: i32) -> Result<()> {
        self.stmt.raw_bind_parameter(index, i64::from(value))?;
        Ok(())
    }

    fn set_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value)?;
        Ok(())
    }

    fn set_f32(&mut self, index: usize, value: f32) -> Result<()> {
        self.stmt.raw_bind_parameter(index, f64::from(value))?;
        Ok(())
    }

    fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value)?;
        Ok(())
    }

    fn set_str(&mut self, index: usize, value: &str) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value)?;
        Ok(())
    }

    fn set_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value)?;
        Ok(())
    }

    fn set_uuid(&mut self, index: usize, value: Uuid) -> Result<()> {
        self.stmt.raw_bind_parameter(index, value.to_string())?;
        Ok(())
    }

    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()> {
        self.stmt
            .raw_bind_parameter(index, value.format("%Y-%m-%d").to_string())?;
        Ok(())
    }

    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()> {
        self.stmt
            .raw_bind_parameter(index, value.format("%H:%M:%S%.3f").to_string())?;
        Ok(())
    }

    fn set_datetime(&mut self, index: usize, value: NaiveDateTime) -> Result<()> {
        self.stmt
            .raw_bind_parameter(index, value.format("%Y-%m-%d %H:%M:%S%.3f").to_string())?;
        Ok(())
    }

    fn set_timestamp(&mut self, index: usize, value: DateTime<Utc>) -> Result<()> {
        self.stmt.raw_bind_parameter(
            index,
            value.naive_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        )?;
        Ok(())
    }

    fn execute_query(&mut self) -> Result<Box<dyn DbCursor + '_>> {
        let meta: Vec<ColumnMeta> = self
            .stmt
            .columns()
            .iter()
            .map(|column| {
                let (sql_type, type_name) = map_decl_type(column.decl_type());
                ColumnMeta {
                    label: column.name().to_string(),
                    sql_type,
                    type_name,
                }
            })
            .collect();
        let rows = self.stmt.raw_query();
        Ok(Box::new(SqliteCursor {
            rows,
            meta,
            current: Vec::new(),
        }))
    }

    fn execute_update(&mut self) -> Result<u64> {
        Ok(self.stmt.raw_execute()? as u64)
    }

    fn add_batch(&mut self) -> Result<()> {
        // SQLite has no statement batch queue; each set executes as it is
        // added and the counts are returned together by execute_batch.
        let affected = self.stmt.raw_execute()? as u64;
        self.batch.push(affected);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        Ok(std::mem::take(&mut self.batch))
    }
}

struct ColumnMeta {
    label: String,
    sql_type: SqlType,
    type_name: String,
}

struct SqliteCursor<'s> {
    rows: rusqlite::Rows<'s>,
    meta: Vec<ColumnMeta>,
    current: Vec<rusqlite::types::Value>,
}

impl SqliteCursor<'_> {
    fn column(&self, index: usize) -> Result<&ColumnMeta> {
        self.meta
            .get(index.wrapping_sub(1))
            .ok_or(RowkitError::Sqlite(rusqlite::Error::InvalidColumnIndex(
                index,
            )))
    }

    fn cell(&self, index: usize) -> Result<&rusqlite::types::Value> {
        self.current
            .get(index.wrapping_sub(1))
            .ok_or(RowkitError::Sqlite(rusqlite::Error::InvalidColumnIndex(
                index,
            )))
    }
}

impl DbCursor for SqliteCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        match self.rows.next()? {
            Some(row) => {
                let mut current = Vec::with_capacity(self.meta.len());
                for i in 0..self.meta.len() {
                    current.push(owned_value(row.get_ref(i)?)?);
                }
                self.current = current;
                Ok(true)
            }
            None => {
                self.current.clear();
                Ok(false)
            }
        }
    }

    fn column_count(&self) -> usize {
        self.meta.len()
    }

    fn column_label(&self, index: usize) -> Result<String> {
        Ok(self.column(index)?.label.clone())
    }

    fn column_type(&self, index: usize) -> Result<SqlType> {
        Ok(self.column(index)?.sql_type)
    }

    fn column_type_name(&self, index: usize) -> Result<String> {
        Ok(self.column(index)?.type_name.clone())
    }

    fn get_bool(&self, index: usize) -> Result<Option<bool>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Integer(v) => Ok(Some(*v != 0)),
            other => Err(type_mismatch("a boolean", other)),
        }
    }

    fn get_i32(&self, index: usize) -> Result<Option<i32>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Integer(v) => Ok(Some(*v as i32)),
            other => Err(type_mismatch("an integer", other)),
        }
    }

    fn get_i64(&self, index: usize) -> Result<Option<i64>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Integer(v) => Ok(Some(*v)),
            other => Err(type_mismatch("an integer", other)),
        }
    }

    fn get_f32(&self, index: usize) -> Result<Option<f32>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Real(v) => Ok(Some(*v as f32)),
            // Numeric affinity stores whole values as integers.
            rusqlite::types::Value::Integer(v) => Ok(Some(*v as f32)),
            other => Err(type_mismatch("a real", other)),
        }
    }

    fn get_f64(&self, index: usize) -> Result<Option<f64>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Real(v) => Ok(Some(*v)),
            rusqlite::types::Value::Integer(v) => Ok(Some(*v as f64)),
            other => Err(type_mismatch("a real", other)),
        }
    }

    fn get_string(&self, index: usize) -> Result<Option<String>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Text(v) => Ok(Some(v.clone())),
            rusqlite::types::Value::Integer(v) => Ok(Some(v.to_string())),
            rusqlite::types::Value::Real(v) => Ok(Some(v.to_string())),
            other => Err(type_mismatch("text", other)),
        }
    }

    fn get_bytes(&self, index: usize) -> Result<Option<Vec<u8>>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Blob(v) => Ok(Some(v.clone())),
            rusqlite::types::Value::Text(v) => Ok(Some(v.clone().into_bytes())),
            other => Err(type_mismatch("a blob", other)),
        }
    }

    fn get_date(&self, index: usize) -> Result<Option<NaiveDate>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Text(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| {
                    RowkitError::ConversionParse(format!("cannot parse '{v}' as a date: {e}"))
                }),
            other => Err(type_mismatch("a date", other)),
        }
    }

    fn get_time(&self, index: usize) -> Result<Option<NaiveTime>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Text(v) => NaiveTime::parse_from_str(v, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
                .map(Some)
                .map_err(|e| {
                    RowkitError::ConversionParse(format!("cannot parse '{v}' as a time: {e}"))
                }),
            rusqlite::types::Value::Integer(v) => epoch_millis(*v).map(|ts| Some(ts.time())),
            other => Err(type_mismatch("a time", other)),
        }
    }

    fn get_datetime(&self, index: usize) -> Result<Option<NaiveDateTime>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Text(v) => {
                parse_sqlite_date(v).map(|ts| Some(ts.naive_utc()))
            }
            rusqlite::types::Value::Integer(v) => epoch_millis(*v).map(Some),
            other => Err(type_mismatch("a date-time", other)),
        }
    }

    fn get_timestamp(&self, index: usize) -> Result<Option<DateTime<Utc>>> {
        match self.cell(index)? {
            rusqlite::types::Value::Null => Ok(None),
            rusqlite::types::Value::Text(v) => parse_sqlite_date(v).map(Some),
            rusqlite::types::Value::Integer(v) => {
                epoch_millis(*v).map(|dt| Some(dt.and_utc()))
            }
            other => Err(type_mismatch("a timestamp", other)),
        }
    }

    fn get_raw(&self, index: usize) -> Result<Option<Value>> {
        Ok(match self.cell(index)? {
            rusqlite::types::Value::Null => None,
            rusqlite::types::Value::Integer(v) => Some(Value::Long(*v)),
            rusqlite::types::Value::Real(v) => Some(Value::Double(*v)),
            rusqlite::types::Value::Text(v) => Some(Value::Text(v.clone())),
            rusqlite::types::Value::Blob(v) => Some(Value::Bytes(v.clone())),
        })
    }
}

fn owned_value(value: ValueRef<'_>) -> Result<rusqlite::types::Value> {
    Ok(match value {
        ValueRef::Null => rusqlite::types::Value::Null,
        ValueRef::Integer(v) => rusqlite::types::Value::Integer(v),
        ValueRef::Real(v) => rusqlite::types::Value::Real(v),
        ValueRef::Text(v) => rusqlite::types::Value::Text(
            std::str::from_utf8(v)
                .map_err(|e| {
                    RowkitError::ConversionParse(format!("column text is not valid UTF-8: {e}"))
                })?
                .to_string(),
        ),
        ValueRef::Blob(v) => rusqlite::types::Value::Blob(v.to_vec()),
    })
}

fn epoch_millis(millis: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.naive_utc())
        .ok_or_else(|| {
            RowkitError::ConversionParse(format!(
                "epoch value {millis} is out of range for a timestamp"
            ))
        })
}

fn type_mismatch(expected: &str, got: &rusqlite::types::Value) -> RowkitError {
    RowkitError::ConversionParse(format!(
        "expected {expected} storage class, got {}",
        got.data_type()
    ))
}

/// Map a SQLite declared column type to the standard type enumeration.
///
/// Expressions and untyped columns carry no declared type; they surface as
/// [`SqlType::Other`] with an empty type name.
fn map_decl_type(decl: Option<&str>) -> (SqlType, String) {
    let Some(decl) = decl else {
        return (SqlType::Other, String::new());
    };
    let upper = decl.to_uppercase();
    let base = upper.split('(').next().unwrap_or("").trim();
    let sql_type = match base {
        "INT" | "INTEGER" | "MEDIUMINT" => SqlType::Integer,
        "TINYINT" => SqlType::TinyInt,
        "SMALLINT" | "INT2" => SqlType::SmallInt,
        "BIGINT" | "INT8" | "UNSIGNED BIG INT" => SqlType::BigInt,
        "CHARACTER" | "CHAR" | "NCHAR" | "NATIVE CHARACTER" => SqlType::Char,
        "VARCHAR" | "NVARCHAR" | "TEXT" | "CHARACTER VARYING" | "VARYING CHARACTER"
        | "STRING" => SqlType::VarChar,
        "CLOB" => SqlType::Clob,
        "BLOB" => SqlType::Blob,
        "BINARY" => SqlType::Binary,
        "VARBINARY" => SqlType::VarBinary,
        "REAL" | "DOUBLE" | "DOUBLE PRECISION" | "FLOAT" => SqlType::Double,
        "NUMERIC" | "DECIMAL" => SqlType::Numeric,
        "BOOLEAN" | "BOOL" => SqlType::Boolean,
        "BIT" => SqlType::Bit,
        "DATE" => SqlType::Date,
        "DATETIME" | "TIMESTAMP" => SqlType::Timestamp,
        "TIME" => SqlType::Time,
        _ => SqlType::Other,
    };
    (sql_type, decl.to_string())
}
